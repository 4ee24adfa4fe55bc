//! # crafts-payment
//!
//! Adapter for a Stripe-compatible payment provider implementing the
//! `PaymentGateway` port from `crafts-core`.
//!
//! ```rust,ignore
//! use crafts_payment::StripePaymentGateway;
//!
//! let gateway = StripePaymentGateway::from_config(&config.payment)?;
//! let intent = gateway.retrieve_intent("pi_123").await?;
//! ```

pub mod stripe;

pub use stripe::StripePaymentGateway;
