use std::sync::Arc;

use tracing::{debug, warn};

use crate::http_client::{HttpClient, HttpRequest};
use crate::table::IssDocument;
use crate::{ClientConfig, MoexError};

/// GET access to ISS: base URL, timeout and `User-Agent` applied to every
/// request, responses decoded into [`IssDocument`]s.
pub struct IssSession {
    http: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
    user_agent: String,
}

impl IssSession {
    pub fn new(http: Arc<dyn HttpClient>, config: &ClientConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            timeout_ms: config.timeout_ms,
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Fetches `path` with query `params`.
    ///
    /// # Errors
    ///
    /// Transport failures and non-success statuses are `Upstream` errors; a
    /// body that is not ISS JSON is a `Decode` error.
    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<IssDocument, MoexError> {
        let request = params.iter().fold(
            HttpRequest::get(self.url(path))
                .with_header("user-agent", self.user_agent.as_str())
                .with_timeout_ms(self.timeout_ms),
            |request, (name, value)| request.with_query(name, value),
        );

        debug!(path, "requesting ISS");
        let response = self.http.execute(request).await.map_err(|error| {
            warn!(path, error = %error, "ISS transport failure");
            MoexError::upstream(
                format!("network error accessing {path}: {error}"),
                error.retryable(),
            )
        })?;

        if !response.is_success() {
            warn!(path, status = response.status, "ISS returned an error status");
            return Err(MoexError::upstream_status(response.status, path));
        }

        IssDocument::parse(&response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, HttpResponse, StubHttpClient};
    use crate::MoexErrorKind;

    fn session(stub: StubHttpClient) -> (Arc<StubHttpClient>, IssSession) {
        let stub = Arc::new(stub);
        let config = ClientConfig::default().with_base_url("https://iss.test/iss/");
        let session = IssSession::new(stub.clone(), &config);
        (stub, session)
    }

    #[tokio::test]
    async fn applies_base_url_headers_and_query() {
        let (stub, session) = session(
            StubHttpClient::new().with_json("/securities.json", r#"{"securities":{"columns":[],"data":[]}}"#),
        );

        let document = session
            .get("/securities.json", &[("q", "sber"), ("limit", "100")])
            .await
            .expect("document");

        assert!(document.has_block("securities"));
        let requests = stub.requests();
        assert_eq!(requests[0].url, "https://iss.test/iss/securities.json?q=sber&limit=100");
        assert_eq!(
            requests[0].headers.get("user-agent").map(String::as_str),
            Some(crate::config::DEFAULT_USER_AGENT)
        );
        assert_eq!(requests[0].timeout_ms, 10_000);
    }

    #[tokio::test]
    async fn classifies_failures() {
        let (_, session) = session(
            StubHttpClient::new()
                .with_response("/busy.json", HttpResponse::with_status(503, "busy"))
                .with_failure("/down.json", HttpError::new("connection refused"))
                .with_failure("/bad.json", HttpError::non_retryable("invalid request"))
                .with_json("/html.json", "<html></html>"),
        );

        let busy = session.get("/busy.json", &[]).await.expect_err("503");
        assert_eq!(busy.kind(), MoexErrorKind::Upstream);
        assert!(busy.retryable());

        let missing = session.get("/missing.json", &[]).await.expect_err("404");
        assert_eq!(missing.kind(), MoexErrorKind::Upstream);
        assert!(!missing.retryable());

        let down = session.get("/down.json", &[]).await.expect_err("transport");
        assert_eq!(down.kind(), MoexErrorKind::Upstream);
        assert!(down.message().contains("connection refused"));

        let bad = session.get("/bad.json", &[]).await.expect_err("bad request");
        assert_eq!(bad.kind(), MoexErrorKind::Upstream);
        assert!(!bad.retryable());

        let html = session.get("/html.json", &[]).await.expect_err("decode");
        assert_eq!(html.kind(), MoexErrorKind::Decode);
    }
}
