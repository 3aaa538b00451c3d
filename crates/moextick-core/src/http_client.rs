use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// HTTP GET request envelope used by the ISS session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            timeout_ms: 10_000,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Appends a percent-encoded query parameter to the URL.
    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        self.url = format!(
            "{}{separator}{}={}",
            self.url,
            urlencoding::encode(name),
            urlencoding::encode(value)
        );
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// URL path without scheme, host or query string.
    pub fn path(&self) -> &str {
        let url = self.url.split(['?', '#']).next().unwrap_or_default();
        match url.split_once("://") {
            Some((_, rest)) => rest.find('/').map_or("/", |index| &rest[index..]),
            None => url,
        }
    }
}

/// HTTP response envelope returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    retryable: bool,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn non_retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Transport contract used by [`crate::IssSession`].
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Scripted offline transport for deterministic tests and demos.
///
/// Responses are routed by URL path suffix (the longest matching route wins),
/// so routes can be registered without the base URL prefix. Unrouted paths
/// answer `404`.
#[derive(Debug, Default)]
pub struct StubHttpClient {
    routes: Vec<(String, Result<HttpResponse, HttpError>)>,
    latency: Duration,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `path` with status 200 and `body`.
    pub fn with_json(self, path: impl Into<String>, body: impl Into<String>) -> Self {
        self.with_response(path, HttpResponse::ok_json(body))
    }

    pub fn with_response(mut self, path: impl Into<String>, response: HttpResponse) -> Self {
        self.routes.push((path.into(), Ok(response)));
        self
    }

    /// Fails every request to `path` at the transport level.
    pub fn with_failure(mut self, path: impl Into<String>, error: HttpError) -> Self {
        self.routes.push((path.into(), Err(error)));
        self
    }

    /// Delays every response by `latency` (tokio time, so paused tests skip it).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Every request seen so far, in arrival order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests whose path ends with `path`.
    pub fn calls(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|request| request.path().ends_with(path))
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn route(&self, path: &str) -> Result<HttpResponse, HttpError> {
        self.routes
            .iter()
            .filter(|(route, _)| path.ends_with(route.as_str()))
            .max_by_key(|(route, _)| route.len())
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or_else(|| Ok(HttpResponse::with_status(404, "{}")))
    }
}

impl HttpClient for StubHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let outcome = self.route(request.path());
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            outcome
        })
    }
}

/// Production HTTP client using reqwest for real API calls.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new(user_agent: &str) -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent(user_agent)
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .get(&request.url)
                .timeout(Duration::from_millis(request.timeout_ms));

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_builder() {
                    HttpError::non_retryable(format!("invalid request: {e}"))
                } else if e.is_timeout() {
                    HttpError::new(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    HttpError::new(format!("connection failed: {e}"))
                } else {
                    HttpError::new(format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| HttpError::new(format!("failed to read response body: {e}")))?;

            Ok(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parameters_are_percent_encoded() {
        let request = HttpRequest::get("https://iss.moex.com/iss/securities.json")
            .with_query("q", "ОФЗ 26238")
            .with_query("limit", "100");

        assert_eq!(
            request.url,
            "https://iss.moex.com/iss/securities.json?q=%D0%9E%D0%A4%D0%97%2026238&limit=100"
        );
        assert_eq!(request.path(), "/iss/securities.json");
    }

    #[test]
    fn header_names_are_lowercased() {
        let request = HttpRequest::get("https://example.test/").with_header("User-Agent", "x");

        assert_eq!(
            request.headers.get("user-agent").map(String::as_str),
            Some("x")
        );
    }

    #[tokio::test]
    async fn stub_routes_by_longest_suffix_and_records_calls() {
        let stub = StubHttpClient::new()
            .with_json("/securities.json", r#"{"securities":{}}"#)
            .with_json("/shares/securities/SBER.json", r#"{"marketdata":{}}"#);

        let search = stub
            .execute(HttpRequest::get("https://iss.test/iss/securities.json?q=sber"))
            .await
            .expect("routed");
        let share = stub
            .execute(HttpRequest::get(
                "https://iss.test/iss/engines/stock/markets/shares/securities/SBER.json",
            ))
            .await
            .expect("routed");
        let missing = stub
            .execute(HttpRequest::get("https://iss.test/iss/unknown.json"))
            .await
            .expect("404 is a response");

        assert!(search.body.contains("securities"));
        assert!(share.body.contains("marketdata"));
        assert_eq!(missing.status, 404);
        assert_eq!(stub.calls("/securities.json"), 1);
        assert_eq!(stub.total_calls(), 3);
    }
}
