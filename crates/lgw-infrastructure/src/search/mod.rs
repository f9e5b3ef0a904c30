//! Document Search
//!
//! Native (vector) search with transparent fallback to the keyword backend,
//! fronted by a query-hash result cache.

pub mod cache;
pub mod gateway;

pub use cache::{SearchCache, SearchCacheStats};
pub use gateway::{SearchGateway, SearchGatewayStats};
