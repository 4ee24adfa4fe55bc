//! Order history queries

use tracing::instrument;

use crafts_core::traits::PageRequest;
use crafts_core::{DomainError, Snowflake};

use crate::dto::{OrderResponse, PaginatedResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Order service
pub struct OrderService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> OrderService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// The caller's orders, newest first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: Snowflake,
        page: PageRequest,
    ) -> ServiceResult<PaginatedResponse<OrderResponse>> {
        let orders = self.ctx.order_repo().find_by_user(user_id, page).await?;
        Ok(orders.into())
    }

    /// A single order of the caller. Orders of other users are not found.
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: Snowflake, order_id: Snowflake) -> ServiceResult<OrderResponse> {
        let order = self
            .ctx
            .order_repo()
            .find_by_id(order_id)
            .await?
            .filter(|order| order.is_owned_by(user_id))
            .ok_or(DomainError::OrderNotFound(order_id))?;

        Ok(order.into())
    }
}
