//! In-memory fakes for service tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crafts_common::{JwtService, PasswordService, RefreshTokenHasher};
use crafts_core::entities::{Coupon, Order, Product, RefreshToken, User};
use crafts_core::traits::{
    CouponFilter, CouponRepository, OrderRepository, Page, PageRequest, PaymentGateway,
    PaymentIntent, PaymentIntentRequest, PaymentStatus, ProductRepository,
    RefreshTokenRepository, RepoResult, UserRepository, METADATA_USER_ID,
};
use crafts_core::{DomainError, Snowflake, SnowflakeGenerator};

use super::context::{ServiceContext, ServiceContextBuilder, ServiceSettings};

fn paginate<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let slice = items
        .iter()
        .skip(offset)
        .take(page.per_page as usize)
        .cloned()
        .collect();
    Page::new(slice, items.len() as i64, page)
}

// ============================================================================
// Users
// ============================================================================

#[derive(Default)]
pub(crate) struct InMemoryUsers {
    rows: Mutex<Vec<(User, String)>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.rows.lock().iter().find(|(u, _)| u.id == id).map(|(u, _)| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .find(|(u, _)| u.email.eq_ignore_ascii_case(email))
            .map(|(u, _)| u.clone()))
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        Ok(self.rows.lock().iter().any(|(u, _)| u.email.eq_ignore_ascii_case(email)))
    }

    async fn username_exists(&self, username: &str) -> RepoResult<bool> {
        Ok(self
            .rows
            .lock()
            .iter()
            .any(|(u, _)| u.username.eq_ignore_ascii_case(username)))
    }

    async fn phone_exists(&self, phone: &str) -> RepoResult<bool> {
        Ok(self.rows.lock().iter().any(|(u, _)| u.phone.eq_ignore_ascii_case(phone)))
    }

    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        for (existing, _) in rows.iter() {
            if existing.email.eq_ignore_ascii_case(&user.email) {
                return Err(DomainError::EmailAlreadyExists);
            }
            if existing.username.eq_ignore_ascii_case(&user.username) {
                return Err(DomainError::UsernameAlreadyExists);
            }
            if existing.phone.eq_ignore_ascii_case(&user.phone) {
                return Err(DomainError::PhoneAlreadyExists);
            }
        }
        rows.push((user.clone(), password_hash.to_string()));
        Ok(())
    }

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        Ok(self.rows.lock().iter().find(|(u, _)| u.id == id).map(|(_, h)| h.clone()))
    }
}

// ============================================================================
// Refresh tokens
// ============================================================================

#[derive(Default)]
pub(crate) struct InMemoryRefreshTokens {
    rows: Mutex<Vec<RefreshToken>>,
}

impl InMemoryRefreshTokens {
    pub fn insert(&self, token: RefreshToken) {
        self.rows.lock().push(token);
    }

    /// Every stored hash, in insertion order
    pub fn hashes(&self) -> Vec<String> {
        self.rows.lock().iter().map(|t| t.token_hash.clone()).collect()
    }

    pub fn active_count(&self, user_id: Snowflake) -> usize {
        self.rows
            .lock()
            .iter()
            .filter(|t| t.user_id == user_id && t.is_active())
            .count()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokens {
    async fn create(&self, token: &RefreshToken) -> RepoResult<()> {
        self.insert(token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> RepoResult<Option<RefreshToken>> {
        Ok(self.rows.lock().iter().find(|t| t.token_hash == token_hash).cloned())
    }

    async fn rotate(&self, old_id: Snowflake, replacement: &RefreshToken) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        let Some(old) = rows.iter_mut().find(|t| t.id == old_id && t.is_active()) else {
            return Ok(false);
        };
        old.revoke(Utc::now());
        rows.push(replacement.clone());
        Ok(true)
    }

    async fn revoke(&self, id: Snowflake) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        Ok(rows
            .iter_mut()
            .find(|t| t.id == id && t.is_active())
            .is_some_and(|t| t.revoke(Utc::now())))
    }

    async fn revoke_all_for_user(&self, user_id: Snowflake) -> RepoResult<u64> {
        let now = Utc::now();
        let mut revoked = 0;
        for token in self.rows.lock().iter_mut() {
            if token.user_id == user_id && token.is_active() && token.revoke(now) {
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}

// ============================================================================
// Coupons
// ============================================================================

#[derive(Default)]
pub(crate) struct InMemoryCoupons {
    rows: Mutex<Vec<Coupon>>,
}

impl InMemoryCoupons {
    pub fn insert(&self, coupon: Coupon) {
        self.rows.lock().push(coupon);
    }

    pub fn times_used(&self, code: &str) -> i32 {
        self.rows
            .lock()
            .iter()
            .find(|c| c.matches_code(code))
            .map_or(0, |c| c.times_used)
    }

    pub fn get(&self, code: &str) -> Option<Coupon> {
        self.rows.lock().iter().find(|c| c.matches_code(code)).cloned()
    }
}

#[async_trait]
impl CouponRepository for InMemoryCoupons {
    async fn find_by_code(&self, code: &str) -> RepoResult<Option<Coupon>> {
        Ok(self.get(code))
    }

    async fn list(&self, filter: CouponFilter, page: PageRequest) -> RepoResult<Page<Coupon>> {
        let now = Utc::now();
        let mut matching: Vec<Coupon> = self
            .rows
            .lock()
            .iter()
            .filter(|c| filter.active.is_none_or(|active| c.is_active == active))
            .filter(|c| filter.featured.is_none_or(|featured| c.is_featured == featured))
            .filter(|c| !filter.unexpired_only || !c.is_expired_at(now))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(&matching, page))
    }

    async fn create(&self, coupon: &Coupon) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        if rows.iter().any(|c| c.matches_code(&coupon.code)) {
            return Err(DomainError::CouponCodeExists);
        }
        rows.push(coupon.clone());
        Ok(())
    }

    async fn update(&self, coupon: &Coupon) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        let stored = rows
            .iter_mut()
            .find(|c| c.id == coupon.id)
            .ok_or_else(|| DomainError::CouponNotFound(coupon.code.clone()))?;
        *stored = coupon.clone();
        Ok(())
    }

    async fn increment_usage(&self, code: &str) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        match rows.iter_mut().find(|c| c.matches_code(code)) {
            Some(coupon) if !coupon.is_exhausted() => {
                coupon.times_used += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ============================================================================
// Orders
// ============================================================================

#[derive(Default)]
pub(crate) struct InMemoryOrders {
    rows: Mutex<Vec<Order>>,
    miss_next_lookup: AtomicBool,
}

impl InMemoryOrders {
    pub fn insert(&self, order: Order) {
        self.rows.lock().push(order);
    }

    pub fn count(&self) -> usize {
        self.rows.lock().len()
    }

    /// Make the next reference lookup miss, as if a concurrent insert had
    /// not committed yet
    pub fn miss_next_lookup(&self) {
        self.miss_next_lookup.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Order>> {
        Ok(self.rows.lock().iter().find(|o| o.id == id).cloned())
    }

    async fn find_by_payment_reference(&self, reference: &str) -> RepoResult<Option<Order>> {
        if self.miss_next_lookup.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self
            .rows
            .lock()
            .iter()
            .find(|o| o.payment_reference.as_deref() == Some(reference))
            .cloned())
    }

    async fn find_by_user(&self, user_id: Snowflake, page: PageRequest) -> RepoResult<Page<Order>> {
        let mut owned: Vec<Order> = self
            .rows
            .lock()
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at).then(b.id.cmp(&a.id)));
        Ok(paginate(&owned, page))
    }

    async fn create(&self, order: &Order) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        if order.payment_reference.is_some()
            && rows
                .iter()
                .any(|o| o.payment_reference == order.payment_reference)
        {
            return Err(DomainError::PaymentAlreadyUsed);
        }
        rows.push(order.clone());
        Ok(())
    }
}

// ============================================================================
// Products
// ============================================================================

#[derive(Default)]
pub(crate) struct InMemoryProducts {
    rows: Mutex<HashMap<Snowflake, Product>>,
}

impl InMemoryProducts {
    pub fn insert(&self, product: Product) {
        self.rows.lock().insert(product.id, product);
    }
}

#[async_trait]
impl ProductRepository for InMemoryProducts {
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Product>> {
        let rows = self.rows.lock();
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }
}

// ============================================================================
// Payment gateway
// ============================================================================

#[derive(Default)]
pub(crate) struct FakeGateway {
    intents: Mutex<HashMap<String, PaymentIntent>>,
    requests: Mutex<Vec<PaymentIntentRequest>>,
    sequence: AtomicU32,
}

impl FakeGateway {
    /// Register an intent as the provider would report it
    pub fn add_intent(
        &self,
        id: &str,
        amount: i64,
        status: PaymentStatus,
        owner: Option<Snowflake>,
    ) {
        let metadata = owner
            .map(|user| HashMap::from([(METADATA_USER_ID.to_string(), user.to_string())]))
            .unwrap_or_default();
        let received = if status.is_settled() { amount } else { 0 };
        self.intents.lock().insert(
            id.to_string(),
            PaymentIntent {
                id: id.to_string(),
                client_secret: Some(format!("{id}_secret")),
                amount,
                amount_received: received,
                currency: "usd".to_string(),
                status,
                metadata,
            },
        );
    }

    /// Mark a created intent as paid in full
    pub fn settle(&self, id: &str) {
        if let Some(intent) = self.intents.lock().get_mut(id) {
            intent.status = PaymentStatus::Succeeded;
            intent.amount_received = intent.amount;
        }
    }

    /// Every creation request received, oldest first
    pub fn requests(&self) -> Vec<PaymentIntentRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_intent(&self, request: PaymentIntentRequest) -> RepoResult<PaymentIntent> {
        let id = format!("pi_test_{}", self.sequence.fetch_add(1, Ordering::SeqCst));
        let intent = PaymentIntent {
            id: id.clone(),
            client_secret: Some(format!("{id}_secret")),
            amount: request.amount,
            amount_received: 0,
            currency: request.currency.clone(),
            status: PaymentStatus::RequiresPaymentMethod,
            metadata: request.metadata.clone(),
        };
        self.requests.lock().push(request);
        self.intents.lock().insert(id, intent.clone());
        Ok(intent)
    }

    async fn retrieve_intent(&self, intent_id: &str) -> RepoResult<PaymentIntent> {
        self.intents
            .lock()
            .get(intent_id)
            .cloned()
            .ok_or_else(|| DomainError::PaymentIntentNotFound(intent_id.to_string()))
    }
}

// ============================================================================
// Harness
// ============================================================================

/// A service context wired to in-memory fakes, with handles to each fake
pub(crate) struct TestHarness {
    pub ctx: ServiceContext,
    pub users: Arc<InMemoryUsers>,
    pub tokens: Arc<InMemoryRefreshTokens>,
    pub coupons: Arc<InMemoryCoupons>,
    pub orders: Arc<InMemoryOrders>,
    pub products: Arc<InMemoryProducts>,
    pub gateway: Arc<FakeGateway>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_settings(ServiceSettings::default())
    }

    pub fn with_settings(settings: ServiceSettings) -> Self {
        let users = Arc::new(InMemoryUsers::default());
        let tokens = Arc::new(InMemoryRefreshTokens::default());
        let coupons = Arc::new(InMemoryCoupons::default());
        let orders = Arc::new(InMemoryOrders::default());
        let products = Arc::new(InMemoryProducts::default());
        let gateway = Arc::new(FakeGateway::default());

        let ctx = ServiceContextBuilder::new()
            .user_repo(users.clone())
            .refresh_token_repo(tokens.clone())
            .coupon_repo(coupons.clone())
            .order_repo(orders.clone())
            .product_repo(products.clone())
            .payment_gateway(gateway.clone())
            .jwt_service(Arc::new(JwtService::new(
                "service-test-secret-that-is-long-enough",
                "crafts-test",
                "crafts-test-clients",
                900,
            )))
            .password_service(Arc::new(PasswordService::new()))
            .refresh_token_hasher(Arc::new(
                RefreshTokenHasher::new("service-test-refresh-key").unwrap(),
            ))
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
            .settings(settings)
            .build()
            .unwrap();

        Self {
            ctx,
            users,
            tokens,
            coupons,
            orders,
            products,
            gateway,
        }
    }
}
