//! Checkout orchestration
//!
//! Prices the cart from the catalog, quotes a payment intent, and turns a
//! settled intent into an order exactly once.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crafts_core::entities::{Order, OrderItem, Product};
use crafts_core::traits::{
    to_minor_units, PaymentIntent, PaymentIntentRequest, METADATA_COUPON_CODE,
    METADATA_DISCOUNT_AMOUNT, METADATA_USER_ID,
};
use crafts_core::{DomainError, Snowflake};

use crate::dto::{
    CartItemRequest, CheckoutRequest, CreatePaymentIntentRequest, OrderResponse,
    PaymentIntentResponse,
};

use super::context::ServiceContext;
use super::coupon::{AppliedDiscount, CouponService};
use super::error::{ServiceError, ServiceResult};

/// A cart line priced from the catalog
#[derive(Debug, Clone)]
struct PricedLine {
    product: Product,
    quantity: i32,
}

/// Cart priced server-side
#[derive(Debug, Clone)]
struct PricedCart {
    lines: Vec<PricedLine>,
    subtotal: Decimal,
}

/// Result of a checkout call
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub order: OrderResponse,
    /// False when the payment reference had already been turned into this
    /// order and the call was a replay
    pub created: bool,
}

/// Checkout service
pub struct CheckoutService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CheckoutService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Quote the cart and open a payment intent for its total
    #[instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn create_payment_intent(
        &self,
        user_id: Snowflake,
        request: CreatePaymentIntentRequest,
    ) -> ServiceResult<PaymentIntentResponse> {
        let cart = self.price_cart(&request.items).await?;
        let discount = CouponService::new(self.ctx)
            .resolve_discount(request.coupon_code.as_deref(), cart.subtotal)
            .await;

        let total = cart.subtotal - discount.amount;
        if total <= Decimal::ZERO {
            return Err(DomainError::ZeroAmount.into());
        }
        let amount = minor_units(total)?;

        let currency = self.ctx.settings().currency.clone();
        let mut intent_request = PaymentIntentRequest::new(amount, currency.clone())
            .with_metadata(METADATA_USER_ID, user_id.to_string());
        if let Some(code) = &discount.coupon_code {
            intent_request = intent_request
                .with_metadata(METADATA_COUPON_CODE, code.clone())
                .with_metadata(METADATA_DISCOUNT_AMOUNT, discount.amount.to_string());
        }

        let intent = self
            .ctx
            .payment_gateway()
            .create_intent(intent_request)
            .await?;

        info!(
            user_id = %user_id,
            intent_id = %intent.id,
            %total,
            coupon_applied = discount.is_applied(),
            "Payment intent created"
        );

        Ok(PaymentIntentResponse {
            payment_intent_id: intent.id,
            client_secret: intent.client_secret,
            subtotal: cart.subtotal,
            discount: discount.amount,
            total,
            currency,
            coupon_applied: discount.is_applied(),
        })
    }

    /// Turn a settled payment into an order.
    ///
    /// Replaying the same payment reference returns the order it already
    /// produced; it never creates a second order or counts the coupon twice.
    ///
    /// A coupon that stopped validating after the intent was quoted is
    /// dropped from the order, and the payment is still accepted against
    /// the quoted total.
    #[instrument(skip(self, request), fields(payment_reference = %request.payment_reference))]
    pub async fn checkout(
        &self,
        user_id: Snowflake,
        request: CheckoutRequest,
    ) -> ServiceResult<CheckoutOutcome> {
        let reference = request.payment_reference.trim().to_string();

        if let Some(existing) = self
            .ctx
            .order_repo()
            .find_by_payment_reference(&reference)
            .await?
        {
            return replay(existing, user_id);
        }

        let cart = self.price_cart(&request.items).await?;
        let intent = self.settled_intent(&reference, user_id).await?;

        let discount = CouponService::new(self.ctx)
            .resolve_discount(request.coupon_code.as_deref(), cart.subtotal)
            .await;

        let allowance = payable_discount(
            &intent,
            request.coupon_code.as_deref(),
            &discount,
            cart.subtotal,
        );
        self.ensure_amount_covered(&intent, cart.subtotal - allowance)?;

        let order = self.build_order(user_id, &cart, &discount, reference);

        // Detached so a dropped request cannot abort between the order insert
        // and the coupon increment
        let ctx = self.ctx.clone();
        let outcome = tokio::spawn(async move { commit_order(&ctx, order).await }).await??;

        Ok(outcome)
    }

    /// Price the cart from current catalog data, merging duplicate lines
    async fn price_cart(&self, items: &[CartItemRequest]) -> ServiceResult<PricedCart> {
        if items.is_empty() {
            return Err(DomainError::EmptyCart.into());
        }

        let mut quantities: BTreeMap<Snowflake, i32> = BTreeMap::new();
        for item in items {
            if item.quantity < 1 {
                return Err(ServiceError::validation("Quantity must be at least 1"));
            }
            let quantity = quantities.entry(item.product_id).or_insert(0);
            *quantity = quantity
                .checked_add(item.quantity)
                .ok_or_else(|| ServiceError::validation("Quantity is too large"))?;
        }

        let ids: Vec<Snowflake> = quantities.keys().copied().collect();
        let mut products: HashMap<Snowflake, Product> = self
            .ctx
            .product_repo()
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut lines = Vec::with_capacity(quantities.len());
        let mut subtotal = Decimal::ZERO;
        for (product_id, quantity) in quantities {
            let product = products
                .remove(&product_id)
                .filter(Product::is_purchasable)
                .ok_or(DomainError::ProductNotFound(product_id))?;

            subtotal += product.price * Decimal::from(quantity);
            lines.push(PricedLine { product, quantity });
        }

        Ok(PricedCart { lines, subtotal })
    }

    /// Fetch the intent and check it is paid and belongs to the caller
    async fn settled_intent(&self, reference: &str, user_id: Snowflake) -> ServiceResult<PaymentIntent> {
        let intent = match self.ctx.payment_gateway().retrieve_intent(reference).await {
            Ok(intent) => intent,
            Err(DomainError::PaymentIntentNotFound(_)) => {
                warn!(user_id = %user_id, "Checkout with unknown payment intent");
                return Err(DomainError::PaymentNotSettled.into());
            }
            Err(e) => return Err(e.into()),
        };

        if !intent.status.is_settled() {
            warn!(user_id = %user_id, status = %intent.status, "Checkout with unsettled payment");
            return Err(DomainError::PaymentNotSettled.into());
        }
        if !intent.belongs_to(&user_id.to_string()) {
            warn!(user_id = %user_id, owner = ?intent.user_id(), "Checkout with another user's payment");
            return Err(DomainError::PaymentNotSettled.into());
        }

        Ok(intent)
    }

    fn ensure_amount_covered(&self, intent: &PaymentIntent, total: Decimal) -> ServiceResult<()> {
        let required = minor_units(total)?;
        let currency_matches = intent
            .currency
            .eq_ignore_ascii_case(&self.ctx.settings().currency);

        if !currency_matches || intent.settled_amount() < required {
            warn!(
                intent_id = %intent.id,
                paid = intent.settled_amount(),
                required,
                currency = %intent.currency,
                "Settled payment does not cover the order"
            );
            return Err(DomainError::PaymentAmountMismatch.into());
        }
        Ok(())
    }

    fn build_order(
        &self,
        user_id: Snowflake,
        cart: &PricedCart,
        discount: &AppliedDiscount,
        reference: String,
    ) -> Order {
        let order_id = self.ctx.generate_id();
        let items = cart
            .lines
            .iter()
            .map(|line| OrderItem {
                id: self.ctx.generate_id(),
                order_id,
                product_id: line.product.id,
                product_name: line.product.name.clone(),
                quantity: line.quantity,
                unit_price: line.product.price,
            })
            .collect();

        Order::new(
            order_id,
            user_id,
            cart.subtotal,
            discount.amount,
            discount.coupon_code.clone(),
            Some(reference),
            items,
        )
    }
}

/// Persist the order, then count the coupon use once it is committed.
///
/// Losing a race on the payment reference resolves to the order the
/// winner wrote.
async fn commit_order(ctx: &ServiceContext, order: Order) -> ServiceResult<CheckoutOutcome> {
    match ctx.order_repo().create(&order).await {
        Ok(()) => {
            if let Some(code) = &order.coupon_code {
                CouponService::new(ctx).increment_usage(code).await;
            }
            info!(
                user_id = %order.user_id,
                order_id = %order.id,
                total = %order.total_amount,
                coupon = order.coupon_code.as_deref().unwrap_or("-"),
                "Order created"
            );
            Ok(CheckoutOutcome {
                order: order.into(),
                created: true,
            })
        }
        Err(DomainError::PaymentAlreadyUsed) => {
            let reference = order.payment_reference.as_deref().unwrap_or_default();
            let existing = ctx
                .order_repo()
                .find_by_payment_reference(reference)
                .await?
                .ok_or(DomainError::PaymentAlreadyUsed)?;
            replay(existing, order.user_id)
        }
        Err(e) => Err(e.into()),
    }
}

/// Discount the settled amount is checked against.
///
/// When the requested coupon no longer applies, the discount quoted on the
/// intent still lowers what the buyer had to pay, capped at the subtotal.
fn payable_discount(
    intent: &PaymentIntent,
    requested_code: Option<&str>,
    discount: &AppliedDiscount,
    subtotal: Decimal,
) -> Decimal {
    let quoted = requested_code
        .and_then(|code| intent.quoted_discount_for(code))
        .map_or(Decimal::ZERO, |amount| amount.min(subtotal));

    if quoted > discount.amount {
        warn!(
            intent_id = %intent.id,
            %quoted,
            applied = %discount.amount,
            "Coupon no longer covers the quoted discount, accepting the quoted total"
        );
        return quoted;
    }
    discount.amount
}

fn replay(existing: Order, user_id: Snowflake) -> ServiceResult<CheckoutOutcome> {
    if !existing.is_owned_by(user_id) {
        warn!(user_id = %user_id, order_id = %existing.id, "Payment reference used by another user");
        return Err(DomainError::PaymentAlreadyUsed.into());
    }
    Ok(CheckoutOutcome {
        order: existing.into(),
        created: false,
    })
}

fn minor_units(amount: Decimal) -> ServiceResult<i64> {
    to_minor_units(amount).ok_or_else(|| ServiceError::validation("Order total is out of range"))
}
