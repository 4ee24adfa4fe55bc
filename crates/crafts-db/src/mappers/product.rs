//! Product model -> entity mapper

use crafts_core::entities::Product;
use crafts_core::value_objects::Snowflake;

use crate::models::ProductModel;

impl From<ProductModel> for Product {
    fn from(model: ProductModel) -> Self {
        Product {
            id: Snowflake::new(model.id),
            name: model.name,
            price: model.price,
            is_active: model.is_active,
        }
    }
}
