use std::sync::Arc;

use crate::cache::{Cache, CacheConfig, MemoryCache, NullCache};
use crate::domain::{Bond, InstrumentType, SearchResult, Share};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::services::{BondsService, SearchQuery, SearchService, SharesService};
use crate::session::IssSession;
use crate::{ClientConfig, MoexError};

/// Async MOEX ISS client.
///
/// Shares and bonds are cached with the price TTL, search results with the
/// search TTL. Every cache is a [`MemoryCache`] unless caching is disabled.
pub struct MoexClient {
    config: ClientConfig,
    shares: SharesService,
    bonds: BondsService,
    search: SearchService,
}

impl MoexClient {
    /// Client over a reqwest transport.
    pub fn new(config: ClientConfig) -> Self {
        let http = Arc::new(ReqwestHttpClient::new(&config.user_agent));
        Self::with_http_client(config, http)
    }

    /// Client configured from `MOEX_*` environment variables.
    pub fn from_env() -> Result<Self, MoexError> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    /// Client over a caller-supplied transport.
    pub fn with_http_client(config: ClientConfig, http: Arc<dyn HttpClient>) -> Self {
        let session = Arc::new(IssSession::new(http, &config));
        let price_cache = config.price_cache();
        let search_cache = config.search_cache();

        Self {
            shares: SharesService::new(
                Arc::clone(&session),
                build_cache(config.cache_enabled, price_cache),
                config.share_boards.clone(),
            ),
            bonds: BondsService::new(
                Arc::clone(&session),
                build_cache(config.cache_enabled, price_cache),
                config.bond_boards.clone(),
            ),
            search: SearchService::new(session, build_cache(config.cache_enabled, search_cache)),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn share(&self, ticker: &str) -> Result<Arc<Share>, MoexError> {
        self.shares.get_share(ticker).await
    }

    /// Looks up a bond by trading code or ISIN.
    pub async fn bond(&self, ticker: &str) -> Result<Arc<Bond>, MoexError> {
        self.bonds.get_bond(ticker).await
    }

    /// Searches instruments; `instrument_type` is `share`, `bond`, `fund` or
    /// `None` for everything.
    pub async fn find(
        &self,
        text: &str,
        instrument_type: Option<&str>,
    ) -> Result<Arc<Vec<SearchResult>>, MoexError> {
        self.search.find(text, instrument_type).await
    }

    pub async fn find_shares(&self, text: &str) -> Result<Arc<Vec<SearchResult>>, MoexError> {
        let query = SearchQuery::with_type(text, InstrumentType::Share)?;
        self.search.find_query(query).await
    }

    pub async fn find_bonds(&self, text: &str) -> Result<Arc<Vec<SearchResult>>, MoexError> {
        let query = SearchQuery::with_type(text, InstrumentType::Bond)?;
        self.search.find_query(query).await
    }

    /// Drops every cached record. Loads in flight still complete.
    pub fn clear_cache(&self) {
        self.shares.clear_cache();
        self.bonds.clear_cache();
        self.search.clear_cache();
    }
}

fn build_cache<V>(enabled: bool, config: CacheConfig) -> Arc<dyn Cache<V>>
where
    V: Clone + Send + Sync + 'static,
{
    if enabled {
        Arc::new(MemoryCache::new(config))
    } else {
        Arc::new(NullCache)
    }
}
