//! Uniform contract over local fixtures and remote HTTP catalogs.

pub mod cache;
pub mod fixture;
pub mod http;
pub mod rate_limit;

pub use cache::{RequestSignature, ResponseCache};
pub use fixture::FixtureSource;
pub use http::{HttpSource, RemoteCatalog, RemoteRequest};
pub use rate_limit::RateLimiter;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::state::{Entity, Filters};

#[async_trait]
pub trait DataSource<E: Entity>: Send + Sync {
    fn name(&self) -> &str;

    /// Records matching `query` and every filter. No match is `Ok(vec![])`.
    async fn search(
        &self,
        query: &str,
        filters: &Filters<E::FilterKey>,
    ) -> Result<Vec<E>, FetchError>;

    /// A miss is `Ok(None)`, never an error.
    async fn get_by_id(&self, id: &E::Id) -> Result<Option<E>, FetchError>;
}

/// Applies `query` and the non-search filters locally.
pub fn refine<E: Entity>(items: Vec<E>, query: &str, filters: &Filters<E::FilterKey>) -> Vec<E> {
    items
        .into_iter()
        .filter(|item| query.trim().is_empty() || item.matches(E::SEARCH, query))
        .filter(|item| {
            filters.iter().all(|(key, value)| {
                *key == E::SEARCH || value.trim().is_empty() || item.matches(*key, value)
            })
        })
        .collect()
}
