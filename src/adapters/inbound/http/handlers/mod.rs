pub mod portal_handlers;
pub mod store_handlers;

pub use portal_handlers::*;
pub use store_handlers::*;
