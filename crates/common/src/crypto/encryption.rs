//! AES-256-GCM encryption primitives.
//!
//! - [`EncryptionService`]: AES-256-GCM encryption/decryption with a raw
//!   32-byte key
//! - [`EncryptedData`]: encrypted payload container (nonce + ciphertext)
//!
//! ## Usage
//!
//! ```rust
//! use prophy_common::crypto::encryption::EncryptionService;
//!
//! let service = EncryptionService::random();
//!
//! let plaintext = b"sensitive data";
//! let encrypted = service.encrypt(plaintext)?;
//! let decrypted = service.decrypt(&encrypted)?;
//! assert_eq!(decrypted, plaintext);
//! # Ok::<(), prophy_common::error::SdkError>(())
//! ```

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

const ALGORITHM: &str = "AES-256-GCM";
const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Encrypted data container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedData {
    /// Random 96-bit nonce
    pub nonce: Vec<u8>,
    /// Ciphertext with the GCM tag
    pub ciphertext: Vec<u8>,
    /// Algorithm label
    pub algorithm: String,
}

/// AES-GCM encryption service
pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for EncryptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionService").field("key", &"[REDACTED]").finish()
    }
}

impl EncryptionService {
    /// Create a new encryption service from a raw 32-byte key.
    pub fn new(key: &[u8]) -> SdkResult<Self> {
        if key.len() != KEY_LEN {
            return Err(SdkError::crypto("Encryption key must be exactly 32 bytes"));
        }

        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| SdkError::crypto(format!("Failed to create encryption cipher: {e}")))?;

        Ok(Self { cipher })
    }

    /// Create a service keyed with a fresh random 256-bit key.
    ///
    /// The key lives only inside the returned service.
    pub fn random() -> Self {
        let key = Self::generate_key();
        Self { cipher: Aes256Gcm::new(&key.into()) }
    }

    /// Generate a random 32-byte symmetric key.
    pub fn generate_key() -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Encrypt bytes into an `EncryptedData` payload.
    pub fn encrypt(&self, data: &[u8]) -> SdkResult<EncryptedData> {
        let nonce_bytes = Self::generate_nonce();
        let ciphertext = self
            .cipher
            .encrypt(&Nonce::from(nonce_bytes), data)
            .map_err(|e| SdkError::crypto(format!("Encryption failed: {e}")))?;

        Ok(EncryptedData {
            nonce: nonce_bytes.to_vec(),
            ciphertext,
            algorithm: ALGORITHM.to_string(),
        })
    }

    /// Decrypt an [`EncryptedData`] payload back into raw bytes.
    pub fn decrypt(&self, encrypted: &EncryptedData) -> SdkResult<Vec<u8>> {
        if encrypted.algorithm != ALGORITHM {
            return Err(SdkError::crypto(format!(
                "Unsupported algorithm: {}",
                encrypted.algorithm
            )));
        }

        let nonce_array: [u8; NONCE_LEN] = encrypted.nonce.as_slice().try_into().map_err(|_| {
            SdkError::crypto("Nonce must be exactly 12 bytes for AES-256-GCM")
        })?;

        self.cipher
            .decrypt(&Nonce::from(nonce_array), encrypted.ciphertext.as_ref())
            .map_err(|e| SdkError::crypto(format!("Decryption failed: {e}")))
    }

    /// Serialize `value` as JSON and encrypt it.
    pub fn encrypt_json<T: Serialize>(&self, value: &T) -> SdkResult<EncryptedData> {
        let plaintext = serde_json::to_vec(value)?;
        self.encrypt(&plaintext)
    }

    /// Decrypt a payload and deserialize the JSON it contains.
    pub fn decrypt_json<T: DeserializeOwned>(&self, encrypted: &EncryptedData) -> SdkResult<T> {
        let plaintext = self.decrypt(encrypted)?;
        serde_json::from_slice(&plaintext).map_err(|e| SdkError::serialization::<T>(e, None))
    }

    fn generate_nonce() -> [u8; NONCE_LEN] {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        nonce
    }
}
