//! Account service: registration, login, and profile lookup.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use tickethub_auth::jwt::JwtEncoder;
use tickethub_auth::password::PasswordHasher;
use tickethub_core::error::AppError;
use tickethub_database::repositories::UserRepository;
use tickethub_entity::user::{CreateUser, User};

use crate::context::RequestContext;

/// Request to register a new staff account.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// E-mail address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Request to log in.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LoginRequest {
    /// E-mail address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// A successfully authenticated user with their session token.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuthenticatedUser {
    /// The account.
    pub user: User,
    /// Signed session token.
    pub token: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

/// Manages staff accounts and authentication.
#[derive(Debug, Clone)]
pub struct AccountService {
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Token encoder.
    encoder: Arc<JwtEncoder>,
    /// Minimum accepted password length.
    password_min_length: usize,
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        hasher: Arc<PasswordHasher>,
        encoder: Arc<JwtEncoder>,
        password_min_length: usize,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            encoder,
            password_min_length,
        }
    }

    /// Registers a new staff account and logs it in.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthenticatedUser, AppError> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Name must not be empty"));
        }
        if !req.email.contains('@') {
            return Err(AppError::validation("Invalid email address"));
        }
        if req.password.len() < self.password_min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                self.password_min_length
            )));
        }

        let password_hash = self.hasher.hash_password(&req.password)?;
        let user = self
            .user_repo
            .create(&CreateUser {
                name: name.to_string(),
                email: req.email.trim().to_lowercase(),
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "Registered new staff account");
        self.issue_session(user)
    }

    /// Authenticates a user by email and password.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthenticatedUser, AppError> {
        let user = self
            .user_repo
            .find_by_email(&req.email.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::authentication("Invalid email or password"))?;

        if !self.hasher.verify_password(&req.password, &user.password_hash)? {
            return Err(AppError::authentication("Invalid email or password"));
        }

        info!(user_id = %user.id, "Staff login");
        self.issue_session(user)
    }

    /// Returns the profile of the current user.
    pub async fn me(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    fn issue_session(&self, user: User) -> Result<AuthenticatedUser, AppError> {
        let (token, expires_at) = self.encoder.generate_token(user.id, &user.email)?;
        Ok(AuthenticatedUser {
            user,
            token,
            expires_at,
        })
    }
}
