pub mod cache;
pub mod consolidate;
pub mod error;
pub mod snapshot;

pub use cache::CacheStore;
pub use consolidate::{consolidate, query, TeeTimeQuery};
pub use error::StoreError;
