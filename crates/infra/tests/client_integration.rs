//! Integration tests for the client facade and tenant registry

use std::sync::Mutex;
use std::time::Duration;

use prophy_common::auth::{JwtIssuer, JwtValidator, ValidationFailure};
use prophy_common::ErrorCategory;
use prophy_domain::ProphyConfig;
use prophy_infra::config::loader::{ENV_API_KEY, ENV_BASE_URL, ENV_ORGANIZATION_CODE};
use prophy_infra::{ProphyClient, TenantRegistry};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn config_for(server: &MockServer, key: &str, org: &str) -> ProphyConfig {
    ProphyConfig::new(key, org).with_base_url(format!("{}/api/", server.uri()))
}

#[tokio::test]
async fn test_from_env_builds_working_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/external/custom-fields/all/"))
        .and(header("X-ApiKey", "env-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        std::env::set_var(ENV_API_KEY, "env-key");
        std::env::set_var(ENV_ORGANIZATION_CODE, "env-org");
        std::env::set_var(ENV_BASE_URL, format!("{}/api/", server.uri()));
        let client = ProphyClient::from_env();
        for key in [ENV_API_KEY, ENV_ORGANIZATION_CODE, ENV_BASE_URL] {
            std::env::remove_var(key);
        }
        client.expect("client from env")
    };

    assert_eq!(client.organization_code(), "env-org");
    let fields = client.custom_fields().list(&CancellationToken::new()).await.expect("fields");
    assert!(fields.is_empty());
}

#[test]
fn test_from_env_without_credentials_fails() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    std::env::remove_var(ENV_API_KEY);
    std::env::remove_var(ENV_ORGANIZATION_CODE);

    let err = ProphyClient::from_env().unwrap_err();
    assert_eq!(err.category(), ErrorCategory::InvalidArgument);
    assert!(err.to_string().contains(ENV_API_KEY));
}

/// Validates tenant isolation for the two-organization scenario.
///
/// Assertions:
/// - each tenant sends its own API key
/// - a login token issued for one organization fails the other's checks
#[tokio::test]
async fn test_tenants_are_isolated() {
    let server = MockServer::start().await;
    for (key, group) in [("key-one", "One"), ("key-two", "Two")] {
        Mock::given(method("GET"))
            .and(path("/api/external/authors-group/5/"))
            .and(header("X-ApiKey", key))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5, "name": group})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let registry = TenantRegistry::new();
    registry.register(config_for(&server, "key-one", "org1")).expect("org1");
    registry.register(config_for(&server, "key-two", "org2")).expect("org2");
    let cancel = CancellationToken::new();

    let one = registry.get("org1").expect("org1 client");
    let two = registry.get("org2").expect("org2 client");
    assert_eq!(one.author_groups().get(5, &cancel).await.expect("group").name, "One");
    assert_eq!(two.author_groups().get(5, &cancel).await.expect("group").name, "Two");

    let secret = "s3cret-key-32-bytes-minimum!!";
    let token = one.jwt_issuer().issue(&one.login_claims("user-1", "u1@org1.org"), secret).expect("token");

    let validator = JwtValidator::new();
    assert!(validator.validate(&token.token, secret, &one.validation_options()).is_valid);

    let outcome = validator.validate(&token.token, secret, &two.validation_options());
    assert!(!outcome.is_valid);
    assert!(matches!(outcome.failure, Some(ValidationFailure::OrganizationMismatch { .. })));
}

#[tokio::test]
async fn test_login_url_uses_configured_endpoint() {
    let mut config = ProphyConfig::new("k", "acme");
    config.jwt.login_url = "https://sso.acme.org/prophy/".into();
    let client = ProphyClient::new(config).expect("client");

    let url = client
        .jwt_issuer()
        .issue_login_url(&client.login_claims("u", "u@acme.org"), "acme-secret-with-enough-bytes-000", None)
        .expect("login url");

    assert!(url.starts_with("https://sso.acme.org/prophy/?token="));
    let token = url.split_once("?token=").map(|(_, t)| t).unwrap_or_default();
    assert!(JwtIssuer::is_well_formed(&urlencoding::decode(token).expect("decode")));
}

#[tokio::test]
async fn test_cancellation_through_facade() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = ProphyClient::new(config_for(&server, "k", "acme")).expect("client");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = client.custom_fields().list(&cancel).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Timeout);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
