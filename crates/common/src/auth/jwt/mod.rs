//! HS256 JSON Web Tokens for SSO login links and service-to-service calls
//!
//! - [`JwtIssuer`]: signs [`LoginClaims`] and builds login URLs
//! - [`JwtValidator`]: verifies tokens against [`ValidationOptions`]
//!
//! ```rust
//! use prophy_common::auth::jwt::{JwtIssuer, JwtValidator, LoginClaims, ValidationOptions};
//!
//! let secret = "s3cret-key-32-bytes-minimum!!";
//! let token = JwtIssuer::default().issue(&LoginClaims::new("org1", "org1", "a@b.com"), secret)?;
//!
//! let outcome = JwtValidator::new().validate(
//!     &token.token,
//!     secret,
//!     &ValidationOptions::default().with_required_organization("org1"),
//! );
//! assert!(outcome.is_valid);
//! # Ok::<(), prophy_common::SdkError>(())
//! ```

mod claims;
mod issuer;
mod validator;

pub use claims::{
    IssuedToken, JwtSettings, LoginClaims, DEFAULT_AUDIENCE, DEFAULT_EXPIRATION_SECONDS,
    DEFAULT_ISSUER, DEFAULT_LOGIN_URL,
};
pub use issuer::{JwtIssuer, RECOMMENDED_SECRET_BYTES};
pub use validator::{
    JwtValidator, ResolvedClaims, ValidationFailure, ValidationOptions, ValidationOutcome,
    DEFAULT_CLOCK_SKEW,
};
