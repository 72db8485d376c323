//! Time abstractions
//!
//! Token issuance, validation, storage expiry and rate-limit classification
//! all read wall-clock time through the [`Clock`] trait so tests can pin or
//! advance time deterministically.
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use prophy_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_secs(5));
//! assert_eq!((clock.now() - start).num_seconds(), 5);
//! ```

pub mod clock;

pub use clock::{shared, Clock, MockClock, SharedClock, SystemClock};
