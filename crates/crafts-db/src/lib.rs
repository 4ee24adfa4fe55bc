//! # crafts-db
//!
//! Database layer implementing repository traits with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for all repository traits
//! defined in `crafts-core`. It handles:
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Model -> entity mappers
//! - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crafts_db::pool::{create_pool, DatabaseConfig};
//! use crafts_db::repositories::PgCouponRepository;
//! use crafts_core::traits::CouponRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     let coupons = PgCouponRepository::new(pool);
//!     let spring = coupons.find_by_code("SPRING10").await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, ping, run_migrations, DatabaseConfig, PgPool, MIGRATIONS_DIR};
pub use repositories::{
    PgCouponRepository, PgOrderRepository, PgProductRepository, PgRefreshTokenRepository,
    PgUserRepository,
};
