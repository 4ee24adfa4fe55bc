//! Integration test utilities for the crafts marketplace API
//!
//! This crate provides helpers for running end-to-end tests against
//! the REST API with a mocked payment provider.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
