//! PostgreSQL implementation of CouponRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use crafts_core::entities::Coupon;
use crafts_core::error::DomainError;
use crafts_core::traits::{CouponFilter, CouponRepository, Page, PageRequest, RepoResult};

use crate::models::CouponModel;

use super::error::{map_db_error, map_unique_violation};

const COUPON_COLUMNS: &str = "id, code, discount_type, discount_value, min_order_amount, \
     expires_at, max_uses, times_used, is_active, is_featured, created_at, updated_at";

/// PostgreSQL implementation of CouponRepository
#[derive(Clone)]
pub struct PgCouponRepository {
    pool: PgPool,
}

impl PgCouponRepository {
    /// Create a new PgCouponRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CouponRepository for PgCouponRepository {
    #[instrument(skip(self))]
    async fn find_by_code(&self, code: &str) -> RepoResult<Option<Coupon>> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE LOWER(code) = LOWER($1)");
        let result = sqlx::query_as::<_, CouponModel>(&sql)
            .bind(code.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Coupon::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: CouponFilter, page: PageRequest) -> RepoResult<Page<Coupon>> {
        const FILTER: &str = "($1::BOOLEAN IS NULL OR is_active = $1) \
             AND ($2::BOOLEAN IS NULL OR is_featured = $2) \
             AND (NOT $3 OR expires_at IS NULL OR expires_at >= NOW())";

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM coupons WHERE {FILTER}"
        ))
        .bind(filter.active)
        .bind(filter.featured)
        .bind(filter.unexpired_only)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        let rows = sqlx::query_as::<_, CouponModel>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE {FILTER} \
             ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5"
        ))
        .bind(filter.active)
        .bind(filter.featured)
        .bind(filter.unexpired_only)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let items = rows
            .into_iter()
            .map(Coupon::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, total, page))
    }

    #[instrument(skip(self, coupon), fields(code = %coupon.code))]
    async fn create(&self, coupon: &Coupon) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO coupons (id, code, discount_type, discount_value, min_order_amount,
                                 expires_at, max_uses, times_used, is_active, is_featured,
                                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(coupon.id.into_inner())
        .bind(&coupon.code)
        .bind(coupon.discount_type.as_str())
        .bind(coupon.discount_value)
        .bind(coupon.min_order_amount)
        .bind(coupon.expires_at)
        .bind(coupon.max_uses)
        .bind(coupon.times_used)
        .bind(coupon.is_active)
        .bind(coupon.is_featured)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, |_| DomainError::CouponCodeExists))?;

        Ok(())
    }

    #[instrument(skip(self, coupon), fields(code = %coupon.code))]
    async fn update(&self, coupon: &Coupon) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE coupons
            SET min_order_amount = $2, expires_at = $3, max_uses = $4,
                is_active = $5, is_featured = $6, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(coupon.id.into_inner())
        .bind(coupon.min_order_amount)
        .bind(coupon.expires_at)
        .bind(coupon.max_uses)
        .bind(coupon.is_active)
        .bind(coupon.is_featured)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // The usage cap check constraint rejects a cap below current usage
            if e.as_database_error().is_some_and(|d| d.is_check_violation()) {
                DomainError::ValidationError("max uses cannot be below times used".to_string())
            } else {
                map_db_error(e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::CouponNotFound(coupon.code.clone()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn increment_usage(&self, code: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE coupons
            SET times_used = times_used + 1, updated_at = NOW()
            WHERE LOWER(code) = LOWER($1)
              AND (max_uses IS NULL OR times_used < max_uses)
            ",
        )
        .bind(code.trim())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
