//! # crafts-common
//!
//! Shared utilities including configuration, error handling, authentication, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    generate_refresh_token, validate_password_strength, AccessToken, Claims, JwtService,
    PasswordService, RefreshTokenHasher, REFRESH_TOKEN_BYTES,
};
pub use config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    PaymentConfig, RateLimitConfig, ServerConfig, SnowflakeConfig,
};
pub use error::{domain_status_code, AppError};
pub use telemetry::{try_init_tracing, TracingConfig, TracingError};
