mod listing_prefix;
mod object_key;

pub use listing_prefix::ListingPrefix;
pub use object_key::{ObjectKey, MAX_OBJECT_KEY_BYTES};
