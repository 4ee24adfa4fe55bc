//! Authentication service
//!
//! Handles user registration, login, refresh-token rotation, and logout.

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crafts_common::{generate_refresh_token, validate_password_strength};
use crafts_core::entities::{RefreshToken, User};
use crafts_core::{DomainError, Snowflake};

use crate::dto::{
    AuthResponse, LoginRequest, LogoutRequest, RefreshTokenRequest, RegisterRequest, UserResponse,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new member account and open its first session
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<AuthResponse> {
        let email = request.email.trim().to_string();
        let username = request.username.trim().to_string();
        let phone = request.phone.trim().to_string();

        let users = self.ctx.user_repo();
        if users.email_exists(&email).await? {
            return Err(DomainError::EmailAlreadyExists.into());
        }
        if users.username_exists(&username).await? {
            return Err(DomainError::UsernameAlreadyExists.into());
        }
        if users.phone_exists(&phone).await? {
            return Err(DomainError::PhoneAlreadyExists.into());
        }

        validate_password_strength(&request.password)?;
        let password_hash = self.ctx.password_service().hash(&request.password)?;

        let user = User::new(
            self.ctx.generate_id(),
            email,
            username,
            phone,
            request.first_name.trim().to_string(),
            request.last_name.trim().to_string(),
        );

        // A concurrent registration that slipped past the checks above
        // surfaces here as the same field-specific conflict
        users.create(&user, &password_hash).await?;

        info!(user_id = %user.id, "User registered");

        self.open_session(&user).await
    }

    /// Login with email and password
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthResponse> {
        let users = self.ctx.user_repo();
        let passwords = self.ctx.password_service();

        let Some(user) = users.find_by_email(request.email.trim()).await? else {
            // Burn the same hashing time as a real verification
            passwords.verify_dummy(&request.password);
            warn!("Login failed: unknown email");
            return Err(DomainError::InvalidCredentials.into());
        };

        let Some(password_hash) = users.get_password_hash(user.id).await? else {
            passwords.verify_dummy(&request.password);
            warn!(user_id = %user.id, "Login failed: no password hash");
            return Err(DomainError::InvalidCredentials.into());
        };

        if !passwords.verify(&request.password, &password_hash)? {
            warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(DomainError::InvalidCredentials.into());
        }

        info!(user_id = %user.id, "User logged in");

        self.open_session(&user).await
    }

    /// Exchange an active refresh token for a new pair.
    ///
    /// The old token is revoked and the new one stored in one transaction;
    /// when two requests race on the same value only one rotation commits.
    #[instrument(skip(self, request))]
    pub async fn refresh(&self, request: RefreshTokenRequest) -> ServiceResult<AuthResponse> {
        let current = self
            .find_active(&request.refresh_token)
            .await?
            .ok_or(DomainError::InvalidRefreshToken)?;

        let user = self
            .ctx
            .user_repo()
            .find_by_id(current.user_id)
            .await?
            .ok_or(DomainError::InvalidRefreshToken)?;

        let access = self.ctx.jwt_service().issue_access_token(&user)?;
        let (raw, replacement) = self.new_refresh_token(user.id);

        // Detached so a dropped request cannot abort the transaction midway
        let ctx = self.ctx.clone();
        let old_id = current.id;
        let rotated = tokio::spawn(async move {
            ctx.refresh_token_repo().rotate(old_id, &replacement).await
        })
        .await??;

        if !rotated {
            warn!(user_id = %user.id, token_id = %old_id, "Refresh token already redeemed");
            return Err(DomainError::InvalidRefreshToken.into());
        }

        info!(user_id = %user.id, "Refresh token rotated");

        Ok(AuthResponse::new(
            access.token,
            raw,
            access.expires_at,
            UserResponse::from(&user),
        ))
    }

    /// Revoke one refresh token, or every token of the user when none is given
    #[instrument(skip(self, request))]
    pub async fn logout(&self, user_id: Snowflake, request: LogoutRequest) -> ServiceResult<()> {
        let ledger = self.ctx.refresh_token_repo();

        match request.refresh_token.as_deref() {
            Some(raw) => {
                // Unknown, foreign or already revoked tokens are a no-op
                if let Some(token) = self.find_active(raw).await? {
                    if token.user_id == user_id {
                        ledger.revoke(token.id).await?;
                    }
                }
                info!(user_id = %user_id, "Session logged out");
            }
            None => {
                let revoked = ledger.revoke_all_for_user(user_id).await?;
                info!(user_id = %user_id, revoked, "All sessions logged out");
            }
        }

        Ok(())
    }

    /// Profile of the authenticated user
    #[instrument(skip(self))]
    pub async fn me(&self, user_id: Snowflake) -> ServiceResult<UserResponse> {
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;

        Ok(UserResponse::from(&user))
    }

    /// Mint an access token and persist a new refresh token for `user`
    async fn open_session(&self, user: &User) -> ServiceResult<AuthResponse> {
        let access = self.ctx.jwt_service().issue_access_token(user)?;
        let (raw, token) = self.new_refresh_token(user.id);
        self.ctx.refresh_token_repo().create(&token).await?;

        Ok(AuthResponse::new(
            access.token,
            raw,
            access.expires_at,
            UserResponse::from(user),
        ))
    }

    /// A fresh raw value and the ledger entry holding only its hash
    fn new_refresh_token(&self, user_id: Snowflake) -> (String, RefreshToken) {
        let raw = generate_refresh_token();
        let token = RefreshToken::new(
            self.ctx.generate_id(),
            user_id,
            self.ctx.refresh_token_hasher().hash(&raw),
            self.ctx.settings().refresh_token_lifetime,
        );
        (raw, token)
    }

    /// Resolve a raw refresh token to its active ledger entry
    async fn find_active(&self, raw: &str) -> ServiceResult<Option<RefreshToken>> {
        let ledger = self.ctx.refresh_token_repo();
        let hash = self.ctx.refresh_token_hasher().hash(raw);

        let mut found = ledger.find_by_hash(&hash).await?;
        if found.is_none() && self.ctx.settings().legacy_lookup_open_at(Utc::now()) {
            found = ledger.find_by_hash(raw).await?;
            if found.is_some() {
                debug!("Refresh token matched by legacy raw lookup");
            }
        }

        Ok(found.filter(RefreshToken::is_active))
    }
}
