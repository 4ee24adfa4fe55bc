//! Server setup and initialization
//!
//! Provides the application builder and the server runner.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use crafts_common::{AppConfig, AppError, JwtService, PasswordService, RefreshTokenHasher};
use crafts_core::SnowflakeGenerator;
use crafts_db::{
    create_pool, run_migrations, PgCouponRepository, PgPool, PgOrderRepository, PgProductRepository,
    PgRefreshTokenRepository, PgUserRepository, MIGRATIONS_DIR,
};
use crafts_payment::StripePaymentGateway;
use crafts_service::{ServiceContextBuilder, ServiceSettings};
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::{apply_middleware, apply_rate_limit};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware.
///
/// Health routes are mounted outside the rate limiter.
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_rate_limit(create_router(), &config.rate_limit)?;
    let router = apply_middleware(
        api.merge(health_routes()),
        &config.cors,
        config.app.env.is_production(),
    );
    Ok(router.with_state(state))
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let db_config = crafts_db::DatabaseConfig::from(&config.database);
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    if config.database.run_migrations {
        run_migrations(&pool, Path::new(MIGRATIONS_DIR))
            .await
            .map_err(|e| AppError::Database(format!("migration failed: {e}")))?;
    }

    build_app_state(config, pool)
}

/// Wire repositories and services around an existing pool
pub fn build_app_state(config: AppConfig, pool: PgPool) -> Result<AppState, AppError> {
    let payment_gateway = Arc::new(StripePaymentGateway::from_config(&config.payment)?);

    let jwt_service = Arc::new(JwtService::from_config(&config.jwt));
    let refresh_token_hasher = Arc::new(RefreshTokenHasher::new(&config.jwt.secret)?);
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    // Create repositories
    let user_repo = Arc::new(PgUserRepository::new(pool.clone()));
    let refresh_token_repo = Arc::new(PgRefreshTokenRepository::new(pool.clone()));
    let coupon_repo = Arc::new(PgCouponRepository::new(pool.clone()));
    let order_repo = Arc::new(PgOrderRepository::new(pool.clone()));
    let product_repo = Arc::new(PgProductRepository::new(pool.clone()));

    let service_context = ServiceContextBuilder::new()
        .user_repo(user_repo)
        .refresh_token_repo(refresh_token_repo)
        .coupon_repo(coupon_repo)
        .order_repo(order_repo)
        .product_repo(product_repo)
        .payment_gateway(payment_gateway)
        .jwt_service(jwt_service)
        .password_service(Arc::new(PasswordService::new()))
        .refresh_token_hasher(refresh_token_hasher)
        .snowflake_generator(snowflake_generator)
        .settings(ServiceSettings::from_config(&config))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config, pool))
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();
    let state = create_app_state(config).await?;
    let app = create_app(state)?;
    run_server(app, &addr).await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
