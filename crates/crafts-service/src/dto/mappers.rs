//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use crafts_core::entities::{Coupon, Order, OrderItem, User};

use super::responses::{CouponResponse, OrderItemResponse, OrderResponse, UserResponse};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            phone: user.phone.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

// ============================================================================
// Order Mappers
// ============================================================================

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            line_total: item.line_total(),
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            status: order.status,
            subtotal: order.subtotal,
            discount_amount: order.discount_amount,
            total_amount: order.total_amount,
            coupon_code: order.coupon_code,
            payment_reference: order.payment_reference,
            purchased_at: order.purchased_at,
            items: order.items.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Coupon Mappers
// ============================================================================

impl From<Coupon> for CouponResponse {
    fn from(coupon: Coupon) -> Self {
        Self {
            id: coupon.id,
            code: coupon.code,
            discount_type: coupon.discount_type,
            discount_value: coupon.discount_value,
            min_order_amount: coupon.min_order_amount,
            expires_at: coupon.expires_at,
            max_uses: coupon.max_uses,
            times_used: coupon.times_used,
            is_active: coupon.is_active,
            is_featured: coupon.is_featured,
            created_at: coupon.created_at,
            updated_at: coupon.updated_at,
        }
    }
}
