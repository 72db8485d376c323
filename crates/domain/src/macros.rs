//! Macro for implementing Display and FromStr for wire-level enums
//!
//! Status and type enums in API payloads travel as short lowercase strings.
//! This macro keeps the string table in one place for both directions.
//!
//! # Example
//!
//! ```rust
//! use prophy_domain::impl_wire_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum UploadState {
//!     Queued,
//!     Processing,
//!     Done,
//! }
//!
//! impl_wire_enum_conversions!(UploadState {
//!     Queued => "queued",
//!     Processing => "processing",
//!     Done => "done",
//! });
//!
//! assert_eq!(UploadState::Done.to_string(), "done");
//! assert_eq!("QUEUED".parse::<UploadState>(), Ok(UploadState::Queued));
//! ```

/// Implements Display, FromStr and `as_str` for wire enums
///
/// - `Display` writes the mapped string
/// - `FromStr` parses case-insensitively
/// - errors name the enum and echo the rejected input
#[macro_export]
macro_rules! impl_wire_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Wire representation
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
