//! Authenticated API client
//!
//! Joins paths onto the configured base URL, attaches `X-ApiKey`, sends
//! once and turns non-2xx responses into classified [`SdkError`]s.

use std::sync::Arc;
use std::time::Duration;

use prophy_common::auth::{ApiKeyAuthenticator, Credential};
use prophy_common::error::{ErrorClassifier, SdkError, SdkResult};
use prophy_common::run_cancellable;
use prophy_common::time::{Clock, SharedClock, SystemClock};
use prophy_domain::constants::REQUEST_ID_HEADER;
use prophy_domain::ProphyConfig;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::errors::IntoSdkError;
use crate::http::HttpClient;

/// Client for the Prophy REST API
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    auth: Arc<ApiKeyAuthenticator>,
    base_url: Url,
    classifier: ErrorClassifier,
    clock: SharedClock,
}

impl ApiClient {
    /// Create a client from validated configuration
    ///
    /// # Errors
    /// `InvalidArgument` when the configuration is incomplete or the base
    /// URL does not parse.
    pub fn new(config: &ProphyConfig) -> SdkResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a client whose rate-limit hints use `clock`
    pub fn with_clock(config: &ProphyConfig, clock: SharedClock) -> SdkResult<Self> {
        config.validate().map_err(IntoSdkError::into_sdk)?;

        let credential = Credential::new(&config.api_key, &config.organization_code)?;
        let base_url = Url::parse(&config.normalized_base_url())
            .map_err(|err| SdkError::invalid_argument("base_url", err.to_string()))?;
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            auth: Arc::new(ApiKeyAuthenticator::new(credential)),
            base_url,
            classifier: ErrorClassifier::new(Arc::clone(&clock)),
            clock,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn organization_code(&self) -> Option<&str> {
        self.auth.organization_code()
    }

    /// Resolve `path` against the base URL
    ///
    /// # Errors
    /// `InvalidArgument` for paths that do not form a valid URL.
    pub fn url(&self, path: &str) -> SdkResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| SdkError::invalid_argument("path", format!("{path}: {err}")))
    }

    #[instrument(skip(self, cancel), fields(path = %path))]
    pub async fn get<R: DeserializeOwned>(&self, path: &str, cancel: &CancellationToken) -> SdkResult<R> {
        let request = self.request(Method::GET, path)?;
        let response = self.execute(request, cancel).await?;
        self.decode(response, cancel).await
    }

    /// GET with query parameters
    #[instrument(skip(self, query, cancel), fields(path = %path))]
    pub async fn get_with_query<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        cancel: &CancellationToken,
    ) -> SdkResult<R> {
        let request = self.request(Method::GET, path)?.query(query);
        let response = self.execute(request, cancel).await?;
        self.decode(response, cancel).await
    }

    #[instrument(skip(self, body, cancel), fields(path = %path))]
    pub async fn post<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
        cancel: &CancellationToken,
    ) -> SdkResult<R> {
        let request = self.request(Method::POST, path)?.json(body);
        let response = self.execute(request, cancel).await?;
        self.decode(response, cancel).await
    }

    #[instrument(skip(self, body, cancel), fields(path = %path))]
    pub async fn put<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
        cancel: &CancellationToken,
    ) -> SdkResult<R> {
        let request = self.request(Method::PUT, path)?.json(body);
        let response = self.execute(request, cancel).await?;
        self.decode(response, cancel).await
    }

    #[instrument(skip(self, body, cancel), fields(path = %path))]
    pub async fn patch<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
        cancel: &CancellationToken,
    ) -> SdkResult<R> {
        let request = self.request(Method::PATCH, path)?.json(body);
        let response = self.execute(request, cancel).await?;
        self.decode(response, cancel).await
    }

    /// DELETE, discarding any response body
    #[instrument(skip(self, cancel), fields(path = %path))]
    pub async fn delete(&self, path: &str, cancel: &CancellationToken) -> SdkResult<()> {
        let request = self.request(Method::DELETE, path)?;
        self.execute(request, cancel).await?;
        Ok(())
    }

    /// POST a multipart form
    #[instrument(skip(self, form, cancel), fields(path = %path))]
    pub async fn post_multipart<R: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        cancel: &CancellationToken,
    ) -> SdkResult<R> {
        let request = self.request(Method::POST, path)?.multipart(form);
        let response = self.execute(request, cancel).await?;
        self.decode(response, cancel).await
    }

    fn request(&self, method: Method, path: &str) -> SdkResult<RequestBuilder> {
        let url = self.url(path)?;
        let builder = self.http.request(method, url).header(reqwest::header::ACCEPT, "application/json");
        self.auth.attach(builder)
    }

    /// Send and classify non-success statuses
    async fn execute(&self, request: RequestBuilder, cancel: &CancellationToken) -> SdkResult<Response> {
        let response = self.http.send(request, cancel).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let request_id = header_str(&headers, REQUEST_ID_HEADER);
        let body = run_cancellable(cancel, async { Ok::<_, SdkError>(response.text().await.ok()) }).await?;
        let err = self.classify(status, body.as_deref(), request_id.as_deref(), &headers);
        warn!(
            status = status.as_u16(),
            category = %err.category(),
            code = err.error_code(),
            request_id = request_id.as_deref().unwrap_or(""),
            "API request failed"
        );
        Err(err)
    }

    fn classify(
        &self,
        status: StatusCode,
        body: Option<&str>,
        request_id: Option<&str>,
        headers: &HeaderMap,
    ) -> SdkError {
        let mut err = self.classifier.classify(status.as_u16(), body, request_id);
        if let SdkError::RateLimit { retry_after, .. } = &mut err {
            let seconds = header_str(headers, RETRY_AFTER.as_str())
                .and_then(|value| value.trim().parse::<i64>().ok())
                .filter(|seconds| *seconds >= 0);
            if let Some(seconds) = seconds.filter(|_| retry_after.is_none()) {
                *retry_after = chrono::Duration::try_seconds(seconds)
                    .and_then(|delay| self.clock.now().checked_add_signed(delay));
                debug!(seconds, "retry-after taken from header");
            }
        }
        err
    }

    /// Read and decode a success body under the same cancellation token
    async fn decode<R: DeserializeOwned>(&self, response: Response, cancel: &CancellationToken) -> SdkResult<R> {
        let status = response.status();
        let timeout = self.http.timeout();
        let body = run_cancellable(cancel, async {
            response.text().await.map_err(|err| SdkError::from_reqwest(&err, timeout))
        })
        .await?;

        // 204 and empty bodies decode as JSON null so `()` and `Option<T>` work
        let text = if status == StatusCode::NO_CONTENT || body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(text).map_err(|err| SdkError::serialization::<R>(err, Some(body.as_str())))
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|value| value.to_str().ok()).map(str::to_string)
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("organization_code", &self.organization_code())
            .field("timeout", &self.http.timeout())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use prophy_common::time::MockClock;
    use prophy_common::ErrorCategory;
    use serde::Deserialize;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Echo {
        message: String,
    }

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&ProphyConfig::new("test-key", "acme").with_base_url(format!("{}/api", server.uri())))
            .unwrap()
    }

    #[tokio::test]
    async fn get_sends_api_key_and_decodes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/external/ping/"))
            .and(header("X-ApiKey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "pong"})))
            .expect(1)
            .mount(&server)
            .await;

        let echo: Echo = client_for(&server).get("external/ping/", &CancellationToken::new()).await.unwrap();
        assert_eq!(echo.message, "pong");
    }

    #[tokio::test]
    async fn query_and_json_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/items/"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "p2"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/items/"))
            .and(body_json(serde_json::json!({"name": "x"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"message": "made"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let cancel = CancellationToken::new();
        let page: Echo = client.get_with_query("/items/", &[("page", "2".to_string())], &cancel).await.unwrap();
        let made: Echo = client.post("items/", &serde_json::json!({"name": "x"}), &cancel).await.unwrap();

        assert_eq!(page.message, "p2");
        assert_eq!(made.message, "made");
    }

    #[tokio::test]
    async fn delete_accepts_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).delete("items/1/", &CancellationToken::new()).await.unwrap();
    }

    #[tokio::test]
    async fn failures_carry_request_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401)
                    .insert_header("X-Request-Id", "req-77")
                    .set_body_json(serde_json::json!({"message": "Invalid API key"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).get::<Echo>("x/", &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Authentication);
        assert_eq!(err.request_id(), Some("req-77"));
        assert_eq!(err.http_status(), Some(401));
    }

    #[tokio::test]
    async fn retry_after_header_backfills_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "12"))
            .mount(&server)
            .await;

        let clock = MockClock::new();
        let config = ProphyConfig::new("k", "acme").with_base_url(server.uri());
        let client = ApiClient::with_clock(&config, Arc::new(clock.clone())).unwrap();

        let err = client.get::<Echo>("x/", &CancellationToken::new()).await.unwrap_err();
        let SdkError::RateLimit { retry_after: Some(at), .. } = err else {
            panic!("expected rate limit with retry-after, got {err:?}");
        };
        assert_eq!(at, clock.now() + chrono::Duration::seconds(12));
    }

    #[tokio::test]
    async fn unrepresentable_retry_after_header_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", i64::MAX.to_string()))
            .mount(&server)
            .await;

        let err = client_for(&server).get::<Echo>("x/", &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, SdkError::RateLimit { retry_after: None, .. }), "{err:?}");
    }

    /// Serve one response whose headers arrive but whose body never finishes
    async fn stalled_body_server(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0_u8; 4096];
            let _ = socket.read(&mut request).await;
            let head = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: 64\r\n\r\n{{\"mess"
            );
            let _ = socket.write_all(head.as_bytes()).await;
            tokio::time::sleep(Duration::from_secs(30)).await;
        });
        format!("http://{addr}/api/")
    }

    #[tokio::test]
    async fn cancellation_covers_body_read() {
        for status_line in ["200 OK", "500 Internal Server Error"] {
            let base_url = stalled_body_server(status_line).await;
            let config = ProphyConfig::new("k", "acme").with_base_url(base_url).with_timeout_seconds(10);
            let client = ApiClient::new(&config).unwrap();

            let cancel = CancellationToken::new();
            let trigger = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                trigger.cancel();
            });

            let started = std::time::Instant::now();
            let err = client.get::<Echo>("x/", &cancel).await.unwrap_err();
            assert_eq!(err.category(), ErrorCategory::Timeout, "{status_line}: {err:?}");
            assert!(started.elapsed() < Duration::from_secs(5), "{status_line}: took {:?}", started.elapsed());
        }
    }

    #[tokio::test]
    async fn body_read_timeout_is_timeout() {
        let base_url = stalled_body_server("200 OK").await;
        let config = ProphyConfig::new("k", "acme").with_base_url(base_url).with_timeout_seconds(1);
        let client = ApiClient::new(&config).unwrap();

        let err = client.get::<Echo>("x/", &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Timeout, "{err:?}");
    }

    #[tokio::test]
    async fn malformed_body_is_serialization_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).get::<Echo>("x/", &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, SdkError::Serialization { payload: Some(ref p), .. } if p.contains("oops")));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = ApiClient::new(&ProphyConfig::new("", "acme")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);
    }

    #[test]
    fn paths_join_under_base() {
        let client = ApiClient::new(&ProphyConfig::new("k", "o")).unwrap();
        assert_eq!(
            client.url("/external/proposal/12/").unwrap().as_str(),
            "https://www.prophy.ai/api/external/proposal/12/"
        );
    }
}
