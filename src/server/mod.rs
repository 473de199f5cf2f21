//! Serve phase: resource identifiers, page cache, content pool and dispatch.

pub mod cache;
pub mod dispatch;
#[cfg(feature = "http-server")]
pub mod http;
pub mod pool;
pub mod resource;

pub use cache::{CacheKey, PageCache};
pub use dispatch::{Dispatcher, Response};
pub use pool::{ContentPool, PageContent};
pub use resource::{ResourceId, ResourceKind, StaticPathTable};
