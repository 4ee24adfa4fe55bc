//! HTTP client for the payment intents API

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{info, instrument, warn};

use crafts_common::PaymentConfig;
use crafts_core::error::DomainError;
use crafts_core::traits::{PaymentGateway, PaymentIntent, PaymentIntentRequest, RepoResult};

use super::models::{StripeErrorBody, StripePaymentIntent};

/// Stripe-compatible implementation of `PaymentGateway`
#[derive(Clone)]
pub struct StripePaymentGateway {
    client: Client,
    secret_key: String,
    api_base: String,
}

impl StripePaymentGateway {
    /// Build a gateway with its own HTTP client
    pub fn from_config(config: &PaymentConfig) -> RepoResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::PaymentGatewayError(format!("HTTP client: {e}")))?;

        Ok(Self::with_client(
            client,
            config.secret_key.clone(),
            config.api_base.clone(),
        ))
    }

    pub fn with_client(client: Client, secret_key: String, api_base: String) -> Self {
        Self {
            client,
            secret_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn intents_url(&self) -> String {
        format!("{}/v1/payment_intents", self.api_base)
    }

    /// Form fields for intent creation, metadata flattened as `metadata[key]`
    fn creation_form(request: &PaymentIntentRequest) -> Vec<(String, String)> {
        let mut form = vec![
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), request.currency.clone()),
            (
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ),
        ];

        let mut metadata: Vec<_> = request.metadata.iter().collect();
        metadata.sort();
        form.extend(
            metadata
                .into_iter()
                .map(|(k, v)| (format!("metadata[{k}]"), v.clone())),
        );
        form
    }

    async fn parse_intent(response: Response) -> RepoResult<PaymentIntent> {
        response
            .json::<StripePaymentIntent>()
            .await
            .map(PaymentIntent::from)
            .map_err(|e| DomainError::PaymentGatewayError(format!("Invalid response body: {e}")))
    }

    async fn provider_error(response: Response) -> DomainError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let summary = StripeErrorBody::parse(&body).summary();
        warn!(%status, error = %summary, "Payment provider returned an error");
        DomainError::PaymentGatewayError(format!("{status}: {summary}"))
    }
}

fn transport_error(e: &reqwest::Error) -> DomainError {
    warn!(error = %e, "Payment provider request failed");
    DomainError::PaymentGatewayError(e.to_string())
}

impl fmt::Debug for StripePaymentGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripePaymentGateway")
            .field("api_base", &self.api_base)
            .field("secret_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    #[instrument(skip(self, request), fields(amount = request.amount, currency = %request.currency))]
    async fn create_intent(&self, request: PaymentIntentRequest) -> RepoResult<PaymentIntent> {
        let response = self
            .client
            .post(self.intents_url())
            .basic_auth(&self.secret_key, Some(""))
            .form(&Self::creation_form(&request))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let intent = Self::parse_intent(response).await?;
        info!(intent_id = %intent.id, "Payment intent created");
        Ok(intent)
    }

    #[instrument(skip(self))]
    async fn retrieve_intent(&self, intent_id: &str) -> RepoResult<PaymentIntent> {
        // Ids are provider-issued tokens; anything else cannot exist there
        if intent_id.is_empty() || !intent_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(DomainError::PaymentIntentNotFound(intent_id.to_string()));
        }

        let response = self
            .client
            .get(format!("{}/{intent_id}", self.intents_url()))
            .basic_auth(&self.secret_key, Some(""))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(DomainError::PaymentIntentNotFound(intent_id.to_string())),
            status if status.is_success() => Self::parse_intent(response).await,
            _ => Err(Self::provider_error(response).await),
        }
    }
}
