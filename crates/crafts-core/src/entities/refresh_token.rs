//! Refresh token ledger entry
//!
//! Only the keyed hash of the token value is ever stored here.

use chrono::{DateTime, Duration, Utc};

use crate::value_objects::Snowflake;

/// A persisted refresh token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// Create a new ledger entry valid for `lifetime` from now
    pub fn new(id: Snowflake, user_id: Snowflake, token_hash: String, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            token_hash,
            created_at: now,
            expires_at: now + lifetime,
            revoked_at: None,
        }
    }

    #[inline]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Active means neither revoked nor expired
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.is_revoked() && !self.is_expired()
    }

    /// Mark the token revoked. Revocation is permanent; a second call keeps
    /// the original timestamp and returns `false`.
    pub fn revoke(&mut self, at: DateTime<Utc>) -> bool {
        if self.revoked_at.is_some() {
            return false;
        }
        self.revoked_at = Some(at);
        true
    }
}
