//! User model -> entity mapper

use crafts_core::entities::User;
use crafts_core::error::DomainError;
use crafts_core::value_objects::Snowflake;

use crate::models::UserModel;

impl TryFrom<UserModel> for User {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        Ok(User {
            id: Snowflake::new(model.id),
            email: model.email,
            username: model.username,
            phone: model.phone,
            first_name: model.first_name,
            last_name: model.last_name,
            role: model.role.parse()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
