//! PostgreSQL implementation of OrderRepository

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use crafts_core::entities::Order;
use crafts_core::error::DomainError;
use crafts_core::traits::{OrderRepository, Page, PageRequest, RepoResult};
use crafts_core::value_objects::Snowflake;

use crate::mappers::order_with_items;
use crate::models::{OrderItemModel, OrderModel};

use super::error::{map_db_error, map_unique_violation};

const ORDER_COLUMNS: &str = "id, user_id, subtotal, discount_amount, total_amount, status, \
     coupon_code, payment_reference, purchased_at";

/// PostgreSQL implementation of OrderRepository
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    /// Create a new PgOrderRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the items of every given order, grouped by order id
    async fn items_for(&self, order_ids: &[i64]) -> RepoResult<HashMap<i64, Vec<OrderItemModel>>> {
        let rows = sqlx::query_as::<_, OrderItemModel>(
            r"
            SELECT id, order_id, product_id, product_name, quantity, unit_price
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, id
            ",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut grouped: HashMap<i64, Vec<OrderItemModel>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row);
        }
        Ok(grouped)
    }

    async fn with_items(&self, model: Option<OrderModel>) -> RepoResult<Option<Order>> {
        let Some(model) = model else {
            return Ok(None);
        };
        let mut items = self.items_for(&[model.id]).await?;
        let items = items.remove(&model.id).unwrap_or_default();
        order_with_items(model, items).map(Some)
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Order>> {
        let model = sqlx::query_as::<_, OrderModel>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.with_items(model).await
    }

    #[instrument(skip(self))]
    async fn find_by_payment_reference(&self, reference: &str) -> RepoResult<Option<Order>> {
        let model = sqlx::query_as::<_, OrderModel>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE payment_reference = $1"
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.with_items(model).await
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Snowflake, page: PageRequest) -> RepoResult<Page<Order>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let models = sqlx::query_as::<_, OrderModel>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 \
             ORDER BY purchased_at DESC, id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id.into_inner())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let mut items = if ids.is_empty() {
            HashMap::new()
        } else {
            self.items_for(&ids).await?
        };

        let orders = models
            .into_iter()
            .map(|model| {
                let order_items = items.remove(&model.id).unwrap_or_default();
                order_with_items(model, order_items)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(orders, total, page))
    }

    #[instrument(skip(self, order), fields(order_id = %order.id, items = order.items.len()))]
    async fn create(&self, order: &Order) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO orders (id, user_id, subtotal, discount_amount, total_amount, status,
                                coupon_code, payment_reference, purchased_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(order.id.into_inner())
        .bind(order.user_id.into_inner())
        .bind(order.subtotal)
        .bind(order.discount_amount)
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(&order.coupon_code)
        .bind(&order.payment_reference)
        .bind(order.purchased_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, |_| DomainError::PaymentAlreadyUsed))?;

        for item in &order.items {
            sqlx::query(
                r"
                INSERT INTO order_items (id, order_id, product_id, product_name, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(item.id.into_inner())
            .bind(order.id.into_inner())
            .bind(item.product_id.into_inner())
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }
}
