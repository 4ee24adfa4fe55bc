//! Service context - dependency container for services
//!
//! Holds all repositories, the payment gateway, and the auth primitives
//! needed by services. Every member is behind an `Arc`, so cloning the
//! context is cheap and yields an owned handle that background tasks can
//! move.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crafts_common::{AppConfig, JwtService, PasswordService, RefreshTokenHasher};
use crafts_core::traits::{
    CouponRepository, OrderRepository, PaymentGateway, ProductRepository, RefreshTokenRepository,
    UserRepository,
};
use crafts_core::{Snowflake, SnowflakeGenerator};

use super::error::{ServiceError, ServiceResult};

/// Runtime knobs the services read on every request
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Lifetime of a freshly issued refresh token
    pub refresh_token_lifetime: Duration,
    /// Until this instant, refresh tokens stored before hashing was
    /// introduced are still looked up by their raw value
    pub legacy_lookup_until: Option<DateTime<Utc>>,
    /// ISO currency code for payment intents
    pub currency: String,
}

impl ServiceSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            refresh_token_lifetime: Duration::days(config.jwt.refresh_token_days),
            legacy_lookup_until: config.jwt.legacy_lookup_until,
            currency: config.payment.currency.to_lowercase(),
        }
    }

    /// Whether the raw-value lookup path is still open at `now`
    pub fn legacy_lookup_open_at(&self, now: DateTime<Utc>) -> bool {
        self.legacy_lookup_until.is_some_and(|until| now < until)
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            refresh_token_lifetime: Duration::days(7),
            legacy_lookup_until: None,
            currency: "usd".to_string(),
        }
    }
}

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    coupon_repo: Arc<dyn CouponRepository>,
    order_repo: Arc<dyn OrderRepository>,
    product_repo: Arc<dyn ProductRepository>,

    // External provider
    payment_gateway: Arc<dyn PaymentGateway>,

    // Auth primitives
    jwt_service: Arc<JwtService>,
    password_service: Arc<PasswordService>,
    refresh_token_hasher: Arc<RefreshTokenHasher>,

    snowflake_generator: Arc<SnowflakeGenerator>,
    settings: Arc<ServiceSettings>,
}

impl ServiceContext {
    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the refresh token ledger
    pub fn refresh_token_repo(&self) -> &dyn RefreshTokenRepository {
        self.refresh_token_repo.as_ref()
    }

    /// Get the coupon repository
    pub fn coupon_repo(&self) -> &dyn CouponRepository {
        self.coupon_repo.as_ref()
    }

    /// Get the order repository
    pub fn order_repo(&self) -> &dyn OrderRepository {
        self.order_repo.as_ref()
    }

    /// Get the product catalog view
    pub fn product_repo(&self) -> &dyn ProductRepository {
        self.product_repo.as_ref()
    }

    /// Get the payment gateway
    pub fn payment_gateway(&self) -> &dyn PaymentGateway {
        self.payment_gateway.as_ref()
    }

    // === Auth ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn password_service(&self) -> &PasswordService {
        self.password_service.as_ref()
    }

    pub fn refresh_token_hasher(&self) -> &RefreshTokenHasher {
        self.refresh_token_hasher.as_ref()
    }

    // === Misc ===

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("payment_gateway", &"...")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    refresh_token_repo: Option<Arc<dyn RefreshTokenRepository>>,
    coupon_repo: Option<Arc<dyn CouponRepository>>,
    order_repo: Option<Arc<dyn OrderRepository>>,
    product_repo: Option<Arc<dyn ProductRepository>>,
    payment_gateway: Option<Arc<dyn PaymentGateway>>,
    jwt_service: Option<Arc<JwtService>>,
    password_service: Option<Arc<PasswordService>>,
    refresh_token_hasher: Option<Arc<RefreshTokenHasher>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    settings: Option<ServiceSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn refresh_token_repo(mut self, repo: Arc<dyn RefreshTokenRepository>) -> Self {
        self.refresh_token_repo = Some(repo);
        self
    }

    pub fn coupon_repo(mut self, repo: Arc<dyn CouponRepository>) -> Self {
        self.coupon_repo = Some(repo);
        self
    }

    pub fn order_repo(mut self, repo: Arc<dyn OrderRepository>) -> Self {
        self.order_repo = Some(repo);
        self
    }

    pub fn product_repo(mut self, repo: Arc<dyn ProductRepository>) -> Self {
        self.product_repo = Some(repo);
        self
    }

    pub fn payment_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.payment_gateway = Some(gateway);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn password_service(mut self, service: Arc<PasswordService>) -> Self {
        self.password_service = Some(service);
        self
    }

    pub fn refresh_token_hasher(mut self, hasher: Arc<RefreshTokenHasher>) -> Self {
        self.refresh_token_hasher = Some(hasher);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
        }

        Ok(ServiceContext {
            user_repo: required(self.user_repo, "user_repo")?,
            refresh_token_repo: required(self.refresh_token_repo, "refresh_token_repo")?,
            coupon_repo: required(self.coupon_repo, "coupon_repo")?,
            order_repo: required(self.order_repo, "order_repo")?,
            product_repo: required(self.product_repo, "product_repo")?,
            payment_gateway: required(self.payment_gateway, "payment_gateway")?,
            jwt_service: required(self.jwt_service, "jwt_service")?,
            refresh_token_hasher: required(self.refresh_token_hasher, "refresh_token_hasher")?,
            password_service: self.password_service.unwrap_or_default(),
            snowflake_generator: self.snowflake_generator.unwrap_or_default(),
            settings: Arc::new(self.settings.unwrap_or_default()),
        })
    }
}
