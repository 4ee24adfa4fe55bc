//! Coupon administration
//!
//! The admin surface is expressed through the capability traits in
//! `crafts_core::traits`: creation runs the staged write pipeline, and
//! deletion is a soft deactivation so coupons referenced by past orders
//! are never removed.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, instrument};
use validator::Validate;

use crafts_core::entities::{Coupon, DiscountType};
use crafts_core::traits::{
    run_pipeline, CouponFilter, Create, Delete, Page, PageRequest, ReadByKey, ReadPaged,
    RepoResult, Update, WritePipeline,
};
use crafts_core::DomainError;

use crate::dto::{
    CouponListQuery, CouponResponse, CreateCouponRequest, PaginatedResponse, UpdateCouponRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Coupon administration service
pub struct CouponAdminService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CouponAdminService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request), fields(code = %request.code))]
    pub async fn create_coupon(&self, request: CreateCouponRequest) -> ServiceResult<CouponResponse> {
        let coupon = Create::create(self, request).await?;
        Ok(coupon.into())
    }

    #[instrument(skip(self))]
    pub async fn list_coupons(
        &self,
        query: CouponListQuery,
        page: PageRequest,
    ) -> ServiceResult<PaginatedResponse<CouponResponse>> {
        let coupons = self.read_paged(query.into(), page).await?;
        Ok(coupons.into())
    }

    /// Active featured coupons, for the public storefront
    #[instrument(skip(self))]
    pub async fn featured(&self, page: PageRequest) -> ServiceResult<PaginatedResponse<CouponResponse>> {
        let filter = CouponFilter {
            active: Some(true),
            featured: Some(true),
            unexpired_only: true,
        };
        let coupons = self.read_paged(filter, page).await?;
        Ok(coupons.into())
    }

    #[instrument(skip(self))]
    pub async fn get_coupon(&self, code: &str) -> ServiceResult<CouponResponse> {
        let coupon = self.read_by_key(code).await?;
        Ok(coupon.into())
    }

    #[instrument(skip(self, patch))]
    pub async fn update_coupon(
        &self,
        code: &str,
        patch: UpdateCouponRequest,
    ) -> ServiceResult<CouponResponse> {
        let coupon = Update::update(self, code, patch).await?;
        Ok(coupon.into())
    }

    #[instrument(skip(self))]
    pub async fn deactivate_coupon(&self, code: &str) -> ServiceResult<()> {
        Delete::delete(self, code).await?;
        Ok(())
    }
}

fn validation_error(errors: &validator::ValidationErrors) -> DomainError {
    DomainError::ValidationError(errors.to_string())
}

#[async_trait]
impl WritePipeline<CreateCouponRequest, Coupon> for CouponAdminService<'_> {
    async fn pre_validate(&self, input: &CreateCouponRequest) -> RepoResult<()> {
        input.validate().map_err(|e| validation_error(&e))?;

        if input.discount_type == DiscountType::Percentage
            && input.discount_value > Decimal::ONE_HUNDRED
        {
            return Err(DomainError::ValidationError(
                "Percentage discount must not exceed 100".to_string(),
            ));
        }
        if input.discount_value <= Decimal::ZERO {
            return Err(DomainError::ValidationError(
                "Discount value must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    async fn persist(&self, input: CreateCouponRequest) -> RepoResult<Coupon> {
        let mut coupon = Coupon::new(
            self.ctx.generate_id(),
            input.code.trim().to_string(),
            input.discount_type,
            input.discount_value,
        );
        coupon.min_order_amount = input.min_order_amount;
        coupon.expires_at = input.expires_at;
        coupon.max_uses = input.max_uses;
        coupon.is_active = input.is_active;
        coupon.is_featured = input.is_featured;

        self.ctx.coupon_repo().create(&coupon).await?;
        Ok(coupon)
    }

    async fn post_process(&self, entity: Coupon) -> RepoResult<Coupon> {
        info!(
            coupon_id = %entity.id,
            code = %entity.code,
            discount_type = %entity.discount_type,
            value = %entity.discount_value,
            "Coupon created"
        );
        Ok(entity)
    }
}

#[async_trait]
impl Create<Coupon, CreateCouponRequest> for CouponAdminService<'_> {
    async fn create(&self, input: CreateCouponRequest) -> RepoResult<Coupon> {
        run_pipeline(self, input).await
    }
}

#[async_trait]
impl ReadPaged<Coupon, CouponFilter> for CouponAdminService<'_> {
    async fn read_paged(&self, filter: CouponFilter, page: PageRequest) -> RepoResult<Page<Coupon>> {
        self.ctx.coupon_repo().list(filter, page).await
    }
}

#[async_trait]
impl ReadByKey<Coupon, str> for CouponAdminService<'_> {
    async fn read_by_key(&self, key: &str) -> RepoResult<Coupon> {
        self.ctx
            .coupon_repo()
            .find_by_code(key.trim())
            .await?
            .ok_or_else(|| DomainError::CouponNotFound(key.trim().to_string()))
    }
}

#[async_trait]
impl Update<Coupon, str, UpdateCouponRequest> for CouponAdminService<'_> {
    async fn update(&self, key: &str, patch: UpdateCouponRequest) -> RepoResult<Coupon> {
        patch.validate().map_err(|e| validation_error(&e))?;

        let mut coupon = self.read_by_key(key).await?;
        if let Some(is_active) = patch.is_active {
            coupon.is_active = is_active;
        }
        if let Some(is_featured) = patch.is_featured {
            coupon.is_featured = is_featured;
        }
        if let Some(expires_at) = patch.expires_at {
            coupon.expires_at = Some(expires_at);
        }
        if let Some(max_uses) = patch.max_uses {
            coupon.max_uses = Some(max_uses);
        }
        if let Some(minimum) = patch.min_order_amount {
            coupon.min_order_amount = Some(minimum);
        }
        coupon
            .check_configuration()
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;
        coupon.updated_at = Utc::now();

        self.ctx.coupon_repo().update(&coupon).await?;
        info!(code = %coupon.code, "Coupon updated");
        Ok(coupon)
    }
}

#[async_trait]
impl Delete<str> for CouponAdminService<'_> {
    async fn delete(&self, key: &str) -> RepoResult<()> {
        let mut coupon = self.read_by_key(key).await?;
        if !coupon.is_active {
            return Ok(());
        }
        coupon.is_active = false;
        coupon.updated_at = Utc::now();

        self.ctx.coupon_repo().update(&coupon).await?;
        info!(code = %coupon.code, "Coupon deactivated");
        Ok(())
    }
}
