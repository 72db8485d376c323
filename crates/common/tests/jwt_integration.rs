//! Integration tests for JWT issuing and validation
//!
//! Covers the issue/validate round trip, argument rejection, signature
//! tampering, structural checks and the organization login scenario.

use std::sync::Arc;
use std::time::Duration;

use prophy_common::auth::jwt::{
    JwtIssuer, JwtSettings, JwtValidator, LoginClaims, ValidationFailure, ValidationOptions,
};
use prophy_common::time::{MockClock, SharedClock};
use prophy_common::{ErrorCategory, SdkError};

const SECRET: &str = "s3cret-key-32-bytes-minimum!!";

fn issuer_and_validator() -> (JwtIssuer, JwtValidator, MockClock) {
    let clock = MockClock::new();
    let shared: SharedClock = Arc::new(clock.clone());
    (
        JwtIssuer::with_clock(JwtSettings::default(), Arc::clone(&shared)),
        JwtValidator::with_clock(shared),
        clock,
    )
}

/// Validates the organization login scenario end to end.
///
/// # Test Steps
/// 1. Issue a token for `org1` with a one hour lifetime
/// 2. Validate with `required_organization = org1` and expect success
/// 3. Validate with `required_organization = org2` and expect an
///    organization mismatch
#[test]
fn test_organization_scenario() {
    let (issuer, validator, _) = issuer_and_validator();
    let claims = LoginClaims::new("org1", "org1", "a@b.com").with_expiration_seconds(3600);
    let token = issuer.issue(&claims, SECRET).unwrap();

    let ok = validator.validate(
        &token.token,
        SECRET,
        &ValidationOptions::default().with_required_organization("org1"),
    );
    assert!(ok.is_valid, "{:?}", ok.failure_reason);

    let mismatch = validator.validate(
        &token.token,
        SECRET,
        &ValidationOptions::default().with_required_organization("org2"),
    );
    assert!(!mismatch.is_valid);
    assert_eq!(
        mismatch.failure,
        Some(ValidationFailure::OrganizationMismatch {
            expected: "org2".into(),
            actual: Some("org1".into()),
        })
    );
    assert!(mismatch.failure_reason.unwrap().contains("Organization mismatch"));
}

#[test]
fn test_round_trip_preserves_identity() {
    let (issuer, validator, _) = issuer_and_validator();
    let samples = [
        LoginClaims::new("user-1", "acme", "one@acme.io"),
        LoginClaims::new("user-2", "globex", "two@globex.io")
            .with_name("Ada", "Lovelace")
            .with_folder("reviews"),
        LoginClaims::new("ünïcode", "org ✓", "three@example.org").with_role("referee"),
    ];

    for claims in samples {
        let token = issuer.issue(&claims, SECRET).unwrap();
        let outcome = validator.validate(&token.token, SECRET, &ValidationOptions::default());
        let resolved = outcome.claims.expect("valid token");

        assert_eq!(resolved.subject(), Some(claims.subject.clone()));
        assert_eq!(resolved.email(), Some(claims.email.clone()));
        assert_eq!(resolved.organization(), Some(claims.organization.clone()));
    }
}

#[test]
fn test_non_positive_expiration_is_rejected_before_signing() {
    let (issuer, _, _) = issuer_and_validator();
    for seconds in [0, -60] {
        let claims = LoginClaims::new("s", "o", "e@x.io").with_expiration_seconds(seconds);
        let err = issuer.issue(&claims, SECRET).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);
    }
}

#[test]
fn test_missing_required_fields_are_rejected() {
    let (issuer, _, _) = issuer_and_validator();
    for claims in [
        LoginClaims::new("", "o", "e@x.io"),
        LoginClaims::new("s", "", "e@x.io"),
        LoginClaims::new("s", "o", ""),
    ] {
        assert!(matches!(issuer.issue(&claims, SECRET), Err(SdkError::InvalidArgument { .. })));
    }
}

/// Validates that changing one byte of the secret always fails with a
/// signature mismatch.
#[test]
fn test_tampered_secret_fails_signature() {
    let (issuer, validator, _) = issuer_and_validator();
    let token = issuer.issue(&LoginClaims::new("s", "o", "e@x.io"), SECRET).unwrap();

    for index in 0..SECRET.len() {
        let mut bytes = SECRET.as_bytes().to_vec();
        bytes[index] = if bytes[index] == b'x' { b'y' } else { b'x' };
        let tampered = String::from_utf8(bytes).unwrap();

        let outcome = validator.validate(&token.token, &tampered, &ValidationOptions::default());
        assert_eq!(outcome.failure, Some(ValidationFailure::InvalidSignature), "index {index}");
    }
}

#[test]
fn test_expired_token_is_reported() {
    let (issuer, validator, clock) = issuer_and_validator();
    let token = issuer
        .issue(&LoginClaims::new("s", "o", "e@x.io").with_expiration_seconds(10), SECRET)
        .unwrap();

    clock.advance(Duration::from_secs(3600));
    let outcome = validator.validate(&token.token, SECRET, &ValidationOptions::default());
    assert!(matches!(outcome.failure, Some(ValidationFailure::Expired { .. })));

    let zero_skew = ValidationOptions::default().with_clock_skew(Duration::ZERO);
    clock.rewind(Duration::from_secs(3600 - 11));
    let outcome = validator.validate(&token.token, SECRET, &zero_skew);
    assert!(matches!(outcome.failure, Some(ValidationFailure::Expired { .. })));
}

#[test]
fn test_well_formed_checks() {
    let (issuer, _, _) = issuer_and_validator();
    let token = issuer.issue(&LoginClaims::new("s", "o", "e@x.io"), SECRET).unwrap();

    assert!(JwtIssuer::is_well_formed(&token.token));
    for bad in ["", "hello", "a.b", "..", "abc.def.", "not.a.jwt"] {
        assert!(!JwtIssuer::is_well_formed(bad), "{bad:?}");
    }
}

#[test]
fn test_login_url_round_trips_token() {
    let (issuer, validator, _) = issuer_and_validator();
    let url = issuer
        .issue_login_url(&LoginClaims::new("s", "o", "e@x.io"), SECRET, Some("https://sso.example/login"))
        .unwrap();

    let (base, encoded) = url.split_once("?token=").unwrap();
    assert_eq!(base, "https://sso.example/login/");
    let token = urlencoding::decode(encoded).unwrap();
    assert!(validator.validate(&token, SECRET, &ValidationOptions::default()).is_valid);
}

#[test]
fn test_custom_issuer_settings_are_honoured() {
    let settings = JwtSettings {
        login_url: "https://login.test/".into(),
        issuer: "Partner".into(),
        audience: "PartnerApp".into(),
    };
    let issuer = JwtIssuer::new(settings);
    let token = issuer.issue(&LoginClaims::new("s", "o", "e@x.io"), SECRET).unwrap();

    let options = ValidationOptions::default().with_issuer("Partner").with_audience("PartnerApp");
    assert!(JwtValidator::new().validate(&token.token, SECRET, &options).is_valid);

    let options = ValidationOptions::default().with_issuer("Prophy");
    assert!(!JwtValidator::new().validate(&token.token, SECRET, &options).is_valid);
}
