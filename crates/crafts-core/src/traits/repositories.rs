//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use serde::Serialize;

use crate::entities::{Coupon, Order, Product, RefreshToken, User};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Paging
// ============================================================================

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: u32 = 20;
    pub const MAX_PER_PAGE: u32 = 100;

    /// Build a request, clamping out-of-range values instead of failing
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, Self::MAX_PER_PAGE),
        }
    }

    #[inline]
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    #[inline]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_PER_PAGE)
    }
}

/// One page of results plus the total row count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }

    pub fn has_more(&self) -> bool {
        i64::from(self.page) * i64::from(self.per_page) < self.total
    }
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a non-deleted user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find a non-deleted user by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Check if email is already taken (case-insensitive)
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Check if username is already taken (case-insensitive)
    async fn username_exists(&self, username: &str) -> RepoResult<bool>;

    /// Check if phone is already taken
    async fn phone_exists(&self, phone: &str) -> RepoResult<bool>;

    /// Create a new user. Unique violations map to the field-specific conflict.
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>>;
}

// ============================================================================
// Refresh Token Repository
// ============================================================================

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a new ledger entry
    async fn create(&self, token: &RefreshToken) -> RepoResult<()>;

    /// Find an entry by its stored hash, regardless of state
    async fn find_by_hash(&self, token_hash: &str) -> RepoResult<Option<RefreshToken>>;

    /// Revoke `old_id` and persist `replacement` atomically.
    ///
    /// Returns `false` (and writes nothing) when `old_id` was no longer
    /// active at the moment of the update.
    async fn rotate(&self, old_id: Snowflake, replacement: &RefreshToken) -> RepoResult<bool>;

    /// Revoke a single entry; returns whether it was active
    async fn revoke(&self, id: Snowflake) -> RepoResult<bool>;

    /// Revoke every active entry of a user; returns how many were revoked
    async fn revoke_all_for_user(&self, user_id: Snowflake) -> RepoResult<u64>;
}

// ============================================================================
// Coupon Repository
// ============================================================================

/// Filters for coupon listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CouponFilter {
    pub active: Option<bool>,
    pub featured: Option<bool>,
    /// Skip coupons whose expiry has passed
    pub unexpired_only: bool,
}

#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Find a coupon by code (case-insensitive)
    async fn find_by_code(&self, code: &str) -> RepoResult<Option<Coupon>>;

    /// Paged listing, newest first
    async fn list(&self, filter: CouponFilter, page: PageRequest) -> RepoResult<Page<Coupon>>;

    /// Create a new coupon
    async fn create(&self, coupon: &Coupon) -> RepoResult<()>;

    /// Update mutable coupon fields
    async fn update(&self, coupon: &Coupon) -> RepoResult<()>;

    /// Atomically bump `times_used`, respecting `max_uses`.
    /// Returns `false` if the coupon is missing or already exhausted.
    async fn increment_usage(&self, code: &str) -> RepoResult<bool>;
}

// ============================================================================
// Order Repository
// ============================================================================

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Find order (with items) by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Order>>;

    /// Find order (with items) by external payment reference
    async fn find_by_payment_reference(&self, reference: &str) -> RepoResult<Option<Order>>;

    /// Paged order history of a user, newest first
    async fn find_by_user(&self, user_id: Snowflake, page: PageRequest) -> RepoResult<Page<Order>>;

    /// Insert the order and all of its items in one transaction.
    /// A duplicate payment reference yields `DomainError::PaymentAlreadyUsed`.
    async fn create(&self, order: &Order) -> RepoResult<()>;
}

// ============================================================================
// Product Repository
// ============================================================================

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Fetch the given products; missing IDs are simply absent from the result
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Product>>;
}
