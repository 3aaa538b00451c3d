//! Lookup services.
//!
//! Each service turns a caller query into a cache key plus a loader future
//! (ISS fetch, row selection, record construction) and resolves it through
//! its [`Cache`](crate::Cache). Input is validated before the cache is
//! touched; upstream errors are returned unchanged and never retried here.

pub mod board;

mod bonds;
mod search;
mod shares;

pub use bonds::BondsService;
pub use search::{rank, score, SearchQuery, SearchService, MAX_RESULTS};
pub use shares::SharesService;
