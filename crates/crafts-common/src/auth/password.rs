//! Password hashing and verification
//!
//! Argon2id with a random per-hash salt.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use crafts_core::DomainError;

use crate::error::AppError;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

/// Password hasher shared by the auth service
#[derive(Debug, Clone)]
pub struct PasswordService {
    /// Hash verified against when the account does not exist, so unknown
    /// emails cost the same as wrong passwords
    dummy_hash: Option<String>,
}

impl PasswordService {
    #[must_use]
    pub fn new() -> Self {
        let dummy_hash = Self::hash_with_salt("crafts-dummy-password").ok();
        Self { dummy_hash }
    }

    fn hash_with_salt(password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))
    }

    /// Hash a password
    ///
    /// # Errors
    /// Returns an error if hashing fails
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        Self::hash_with_salt(password)
    }

    /// Verify a password against a stored hash
    ///
    /// # Errors
    /// Returns an error if the stored hash is not a valid PHC string
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash format: {e}")))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Burn one verification for an account that does not exist
    pub fn verify_dummy(&self, password: &str) {
        if let Some(hash) = &self.dummy_hash {
            let _ = self.verify(password, hash);
        }
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate password strength
///
/// Requires 8 to 128 characters with at least one uppercase letter, one
/// lowercase letter and one digit.
///
/// # Errors
/// Returns `DomainError::WeakPassword` naming the first unmet rule
pub fn validate_password_strength(password: &str) -> Result<(), DomainError> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LEN {
        return Err(DomainError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    if length > MAX_PASSWORD_LEN {
        return Err(DomainError::WeakPassword(format!(
            "Password must be at most {MAX_PASSWORD_LEN} characters long"
        )));
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(DomainError::WeakPassword(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(DomainError::WeakPassword(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(DomainError::WeakPassword(
            "Password must contain at least one digit".to_string(),
        ));
    }
    Ok(())
}
