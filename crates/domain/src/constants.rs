//! SDK constants
//!
//! Centralized location for defaults, header names and endpoint paths.

// Platform defaults
pub const DEFAULT_BASE_URL: &str = "https://www.prophy.ai/api/";
pub const DEFAULT_LOGIN_URL: &str = "https://www.prophy.ai/api/auth/api-jwt-login/";
pub const DEFAULT_JWT_ISSUER: &str = "Prophy";
pub const DEFAULT_JWT_AUDIENCE: &str = "Prophy";
pub const DEFAULT_JWT_EXPIRATION_SECONDS: i64 = 3600;
pub const DEFAULT_CLOCK_SKEW_SECONDS: u64 = 300;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("prophy-sdk-rust/", env!("CARGO_PKG_VERSION"));

// Headers
pub const API_KEY_HEADER: &str = "X-ApiKey";
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

// Endpoints, relative to the base URL
pub const MANUSCRIPTS_PATH: &str = "external/proposal/";
pub const JOURNAL_RECOMMENDATIONS_PATH: &str = "external/recommend-journals/";
pub const AUTHOR_GROUPS_PATH: &str = "external/authors-group/";
pub const CUSTOM_FIELDS_PATH: &str = "external/custom-fields/all/";

// Multipart upload
pub const SOURCE_FILE_FIELD: &str = "source_file";
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
