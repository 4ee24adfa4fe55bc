//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod auth;
pub mod coupons;
pub mod health;
pub mod payment;
pub mod profile;
