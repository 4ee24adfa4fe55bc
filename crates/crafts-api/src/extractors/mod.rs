//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validation, and pagination.

mod auth;
mod pagination;
mod validated;

pub use auth::{AdminUser, AuthUser};
pub use pagination::{Pagination, PaginationParams};
pub use validated::ValidatedJson;
