//! Symmetric encryption used for at-rest protection of cached tokens.

pub mod encryption;

pub use encryption::{EncryptedData, EncryptionService};
