//! Synchronous facade over [`MoexClient`] for callers without a runtime.

use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};

use crate::domain::{Bond, SearchResult, Share};
use crate::http_client::HttpClient;
use crate::{ClientConfig, MoexClient, MoexError};

/// Blocking client driving a private current-thread runtime.
///
/// Must not be created or used from inside an async runtime.
pub struct BlockingClient {
    runtime: Runtime,
    client: MoexClient,
}

impl BlockingClient {
    pub fn new(config: ClientConfig) -> Result<Self, MoexError> {
        Self::from_client(MoexClient::new(config))
    }

    pub fn with_http_client(config: ClientConfig, http: Arc<dyn HttpClient>) -> Result<Self, MoexError> {
        Self::from_client(MoexClient::with_http_client(config, http))
    }

    fn from_client(client: MoexClient) -> Result<Self, MoexError> {
        if Handle::try_current().is_ok() {
            return Err(MoexError::internal(
                "BlockingClient cannot run inside an async runtime; use MoexClient instead",
            ));
        }

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| MoexError::internal(format!("failed to start runtime: {error}")))?;
        Ok(Self { runtime, client })
    }

    pub fn client(&self) -> &MoexClient {
        &self.client
    }

    pub fn share(&self, ticker: &str) -> Result<Arc<Share>, MoexError> {
        self.runtime.block_on(self.client.share(ticker))
    }

    pub fn bond(&self, ticker: &str) -> Result<Arc<Bond>, MoexError> {
        self.runtime.block_on(self.client.bond(ticker))
    }

    pub fn find(
        &self,
        text: &str,
        instrument_type: Option<&str>,
    ) -> Result<Arc<Vec<SearchResult>>, MoexError> {
        self.runtime.block_on(self.client.find(text, instrument_type))
    }

    pub fn find_shares(&self, text: &str) -> Result<Arc<Vec<SearchResult>>, MoexError> {
        self.runtime.block_on(self.client.find_shares(text))
    }

    pub fn find_bonds(&self, text: &str) -> Result<Arc<Vec<SearchResult>>, MoexError> {
        self.runtime.block_on(self.client.find_bonds(text))
    }

    pub fn clear_cache(&self) {
        self.client.clear_cache();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::StubHttpClient;
    use crate::MoexErrorKind;

    const SHARE: &str = r#"{
        "securities": {"columns": ["SECID", "BOARDID", "SHORTNAME"], "data": [["SBER", "TQBR", "Сбербанк"]]},
        "marketdata": {"columns": ["SECID", "BOARDID", "LAST"], "data": [["SBER", "TQBR", 312.5]]}
    }"#;

    #[test]
    fn runs_lookups_without_an_outer_runtime() {
        let stub = Arc::new(StubHttpClient::new().with_json("/shares/securities/SBER.json", SHARE));
        let client = BlockingClient::with_http_client(ClientConfig::default(), stub.clone())
            .expect("no outer runtime");

        let first = client.share("sber").expect("share");
        let second = client.share("SBER").expect("cached share");

        assert_eq!(first.short_name.as_deref(), Some("Сбербанк"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(stub.total_calls(), 1);
    }

    #[tokio::test]
    async fn refuses_to_nest_inside_a_runtime() {
        let error = BlockingClient::with_http_client(
            ClientConfig::default(),
            Arc::new(StubHttpClient::new()),
        )
        .err()
        .expect("nested runtime is rejected");

        assert_eq!(error.kind(), MoexErrorKind::Internal);
    }
}
