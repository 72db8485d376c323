use std::time::Duration;

use prophy_common::error::{SdkError, SdkResult};
use prophy_common::run_cancellable;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// HTTP client with a per-request timeout and cooperative cancellation.
///
/// Each call is sent exactly once. Non-2xx responses are returned as-is so
/// the caller can classify them.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> SdkResult<Self> {
        Self::builder().build()
    }

    /// Configured per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder once.
    ///
    /// # Errors
    /// `Timeout` when the client timeout elapses or `cancel` fires,
    /// `Transport` for connection failures.
    pub async fn send(
        &self,
        builder: RequestBuilder,
        cancel: &CancellationToken,
    ) -> SdkResult<Response> {
        let request =
            builder.build().map_err(|err| SdkError::from_reqwest(&err, self.timeout))?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, url = %redact_query(&url), "sending HTTP request");

        run_cancellable(cancel, async {
            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(%method, url = %redact_query(&url), %status, "received HTTP response");
                    Ok(response)
                }
                Err(err) => {
                    debug!(%method, url = %redact_query(&url), error = %err, "HTTP request failed");
                    Err(SdkError::from_reqwest(&err, self.timeout))
                }
            }
        })
        .await
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None, default_headers: None }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> SdkResult<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|err| SdkError::transport(format!("failed to build HTTP client: {err}")))?;

        Ok(HttpClient { client, timeout: self.timeout })
    }
}

/// Strip query strings from logged URLs; login tokens travel there.
fn redact_query(url: &reqwest::Url) -> String {
    let mut shown = url.clone();
    if shown.query().is_some() {
        shown.set_query(Some("<redacted>"));
    }
    shown.to_string()
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use prophy_common::ErrorCategory;
    use reqwest::{Method, StatusCode};
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn returns_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "prophy-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::builder().user_agent("prophy-test").build().unwrap();
        let response = client
            .send(client.request(Method::GET, server.uri()), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn server_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let response = client
            .send(client.request(Method::GET, server.uri()), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn slow_response_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = HttpClient::builder().timeout(Duration::from_millis(50)).build().unwrap();
        let err = client
            .send(client.request(Method::GET, server.uri()), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Timeout);
        assert!(matches!(err, SdkError::Timeout { duration, .. } if duration == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn cancellation_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = client.send(client.request(Method::GET, server.uri()), &cancel).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Timeout);
        assert_eq!(err.to_string(), "Operation was cancelled");
    }

    #[tokio::test]
    async fn connection_refused_is_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::new().unwrap();
        let err = client
            .send(client.request(Method::GET, format!("http://{addr}")), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Transport);
    }

    #[test]
    fn logged_urls_hide_query() {
        let url = reqwest::Url::parse("https://www.prophy.ai/api/auth/api-jwt-login/?token=abc").unwrap();
        assert_eq!(redact_query(&url), "https://www.prophy.ai/api/auth/api-jwt-login/?<redacted>");
    }
}
