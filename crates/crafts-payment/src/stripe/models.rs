//! Wire types returned by the provider

use std::collections::HashMap;

use serde::Deserialize;

use crafts_core::traits::{PaymentIntent, PaymentStatus};

/// `payment_intent` object as returned by `/v1/payment_intents`
#[derive(Debug, Clone, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    pub amount: i64,
    #[serde(default)]
    pub amount_received: i64,
    pub currency: String,
    pub status: PaymentStatus,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl From<StripePaymentIntent> for PaymentIntent {
    fn from(pi: StripePaymentIntent) -> Self {
        Self {
            id: pi.id,
            client_secret: pi.client_secret,
            amount: pi.amount,
            amount_received: pi.amount_received,
            currency: pi.currency,
            status: pi.status,
            metadata: pi.metadata,
        }
    }
}

/// Error envelope: `{"error": {"type": ..., "code": ..., "message": ...}}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StripeErrorBody {
    #[serde(default)]
    pub error: StripeErrorDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StripeErrorDetail {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl StripeErrorBody {
    /// Best-effort parse; the provider may answer with non-JSON on outages
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    pub fn summary(&self) -> String {
        let detail = &self.error;
        match (&detail.code, &detail.message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (None, Some(message)) => message.clone(),
            (Some(code), None) => code.clone(),
            (None, None) => detail.kind.clone().unwrap_or_else(|| "unknown error".to_string()),
        }
    }
}
