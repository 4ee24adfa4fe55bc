//! Refresh token model -> entity mapper

use crafts_core::entities::RefreshToken;
use crafts_core::value_objects::Snowflake;

use crate::models::RefreshTokenModel;

impl From<RefreshTokenModel> for RefreshToken {
    fn from(model: RefreshTokenModel) -> Self {
        RefreshToken {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            token_hash: model.token_hash,
            created_at: model.created_at,
            expires_at: model.expires_at,
            revoked_at: model.revoked_at,
        }
    }
}
