//! Stripe payment intents

mod client;
mod models;

pub use client::StripePaymentGateway;
pub use models::{StripeErrorBody, StripeErrorDetail, StripePaymentIntent};
