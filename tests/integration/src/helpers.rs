//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers, making HTTP requests,
//! seeding catalog data and standing in for the payment provider.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use crafts_api::{create_app, create_app_state};
use crafts_common::AppConfig;
use crafts_core::{Snowflake, SnowflakeGenerator};
use crafts_db::PgPool;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Worker id reserved for ids minted by the tests themselves
const FIXTURE_WORKER_ID: u16 = 1023;

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub pool: PgPool,
    /// Stands in for the payment provider API
    pub payments: MockServer,
    ids: SnowflakeGenerator,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        let config = test_config()?;
        Self::start_with_config(config).await
    }

    /// Start a test server with custom config. The payment API base is
    /// always redirected to a local mock.
    pub async fn start_with_config(mut config: AppConfig) -> Result<Self> {
        let payments = MockServer::start().await;
        config.payment.api_base = payments.uri();
        config.database.run_migrations = true;

        let state = create_app_state(config).await?;
        let pool = state.pool().clone();
        let app = create_app(state)?;

        // Port 0 lets the OS pick a free port
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            pool,
            payments,
            ids: SnowflakeGenerator::new(FIXTURE_WORKER_ID),
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    fn authorized(builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header("Authorization", format!("Bearer {token}"))
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(Self::authorized(self.client.get(self.url(path)), token)
            .send()
            .await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    /// Make a POST request with auth token
    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(Self::authorized(self.client.post(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a POST request with auth token and no body
    pub async fn post_auth_empty(&self, path: &str, token: &str) -> Result<Response> {
        Ok(Self::authorized(self.client.post(self.url(path)), token)
            .send()
            .await?)
    }

    /// Make a PATCH request with auth token
    pub async fn patch_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(Self::authorized(self.client.patch(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a DELETE request with auth token
    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(Self::authorized(self.client.delete(self.url(path)), token)
            .send()
            .await?)
    }

    /// Insert an active catalog product and return its id
    pub async fn seed_product(&self, name: &str, price: Decimal) -> Result<Snowflake> {
        let id = self.ids.generate();
        sqlx::query("INSERT INTO products (id, name, price) VALUES ($1, $2, $3)")
            .bind(id.into_inner())
            .bind(name)
            .bind(price)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    /// Grant the admin role to a registered user
    pub async fn promote_to_admin(&self, user_id: &str) -> Result<()> {
        let id: i64 = user_id.parse()?;
        sqlx::query("UPDATE users SET role = 'Admin' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Answer intent creation with `intent_id` for whatever amount is asked
    pub async fn mock_intent_creation(&self, intent_id: &str, amount: i64) {
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": intent_id,
                "amount": amount,
                "amount_received": 0,
                "currency": "usd",
                "status": "requires_payment_method",
                "client_secret": format!("{intent_id}_secret"),
                "metadata": {}
            })))
            .mount(&self.payments)
            .await;
    }

    /// Serve `intent_id` as a succeeded payment of `amount` minor units
    pub async fn mock_settled_intent(&self, intent_id: &str, amount: i64, user_id: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/payment_intents/{intent_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": intent_id,
                "amount": amount,
                "amount_received": amount,
                "currency": "usd",
                "status": "succeeded",
                "metadata": {"userId": user_id}
            })))
            .mount(&self.payments)
            .await;
    }

    /// Serve `intent_id` as still awaiting payment
    pub async fn mock_pending_intent(&self, intent_id: &str, amount: i64, user_id: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/payment_intents/{intent_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": intent_id,
                "amount": amount,
                "amount_received": 0,
                "currency": "usd",
                "status": "requires_payment_method",
                "metadata": {"userId": user_id}
            })))
            .mount(&self.payments)
            .await;
    }
}

/// Create a test configuration
pub fn test_config() -> Result<AppConfig> {
    // Load from environment or use defaults
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {e}"))?;

    Ok(config)
}

/// Helper to check if test environment is available
pub async fn check_test_env() -> bool {
    dotenvy::dotenv().ok();

    for var in ["DATABASE_URL", "JWT_SECRET"] {
        if std::env::var(var).is_err() {
            eprintln!("Skipping test: {var} not set");
            return false;
        }
    }

    true
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

/// Assert an error response carrying `expected_code`
pub async fn assert_error(
    response: Response,
    expected_status: StatusCode,
    expected_code: &str,
) -> Result<()> {
    let body: serde_json::Value = assert_json(response, expected_status).await?;
    let code = body["error"]["code"].as_str().unwrap_or_default();
    if code != expected_code {
        anyhow::bail!("Expected error code {expected_code}, got {code}. Body: {body}");
    }
    Ok(())
}
