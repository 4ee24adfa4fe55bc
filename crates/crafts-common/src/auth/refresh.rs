//! Refresh token values and their keyed hashes
//!
//! The raw value is handed to the client once; only
//! `hex(HMAC-SHA256(secret, value))` is persisted.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Entropy of a refresh token value
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new opaque refresh token value
#[must_use]
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Keyed hasher for refresh token values
#[derive(Clone)]
pub struct RefreshTokenHasher {
    mac: HmacSha256,
}

impl RefreshTokenHasher {
    /// Key the hasher once at startup
    ///
    /// # Errors
    /// Returns a configuration error if the key is rejected
    pub fn new(secret: &str) -> Result<Self, AppError> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| AppError::Config(format!("invalid refresh token key: {e}")))?;
        Ok(Self { mac })
    }

    /// Lowercase hex HMAC-SHA256 of `raw`
    #[must_use]
    pub fn hash(&self, raw: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(raw.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl std::fmt::Debug for RefreshTokenHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenHasher").finish_non_exhaustive()
    }
}
