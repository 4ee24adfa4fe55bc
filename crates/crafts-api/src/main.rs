//! Crafts API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p crafts-api
//! ```
//!
//! Configuration is loaded from environment variables and an optional `.env`.

use crafts_common::{try_init_tracing, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Configuration first: the log format depends on the environment
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing(&TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        address = %config.api.address(),
        "Starting Crafts API server"
    );

    if let Err(e) = crafts_api::run(config).await {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}
