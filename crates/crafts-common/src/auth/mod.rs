//! Authentication utilities

mod jwt;
mod password;
mod refresh;

pub use jwt::{AccessToken, Claims, JwtService};
pub use password::{validate_password_strength, PasswordService};
pub use refresh::{generate_refresh_token, RefreshTokenHasher, REFRESH_TOKEN_BYTES};
