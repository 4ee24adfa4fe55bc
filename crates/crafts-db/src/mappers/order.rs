//! Order model -> entity mapper

use crafts_core::entities::{Order, OrderItem};
use crafts_core::error::DomainError;
use crafts_core::value_objects::Snowflake;

use crate::models::{OrderItemModel, OrderModel};

impl From<OrderItemModel> for OrderItem {
    fn from(model: OrderItemModel) -> Self {
        OrderItem {
            id: Snowflake::new(model.id),
            order_id: Snowflake::new(model.order_id),
            product_id: Snowflake::new(model.product_id),
            product_name: model.product_name,
            quantity: model.quantity,
            unit_price: model.unit_price,
        }
    }
}

/// Assemble an order from its row and the rows of its items
pub fn order_with_items(
    model: OrderModel,
    items: Vec<OrderItemModel>,
) -> Result<Order, DomainError> {
    Ok(Order {
        id: Snowflake::new(model.id),
        user_id: Snowflake::new(model.user_id),
        subtotal: model.subtotal,
        discount_amount: model.discount_amount,
        total_amount: model.total_amount,
        status: model.status.parse()?,
        coupon_code: model.coupon_code,
        payment_reference: model.payment_reference,
        purchased_at: model.purchased_at,
        items: items.into_iter().map(OrderItem::from).collect(),
    })
}
