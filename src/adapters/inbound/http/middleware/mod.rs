mod cache_policy;

pub use cache_policy::{CachePolicyLayer, CachePolicyMiddleware};
