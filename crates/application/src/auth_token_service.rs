//! Password reset tokens.
//!
//! Tokens are cryptographically random, stored as SHA-256 hashes, single-use,
//! and expire after one hour per the OWASP Forgot Password Cheat Sheet.

use std::sync::Arc;

use async_trait::async_trait;

use tasklane_core::AppResult;
use tasklane_domain::UserId;

use crate::{AuditRepository, PasswordHasher, UserRepository};

mod password_reset;
mod token_crypto;

/// Reset requests accepted per email within one hour.
pub const PASSWORD_RESET_MAX_REQUESTS_PER_HOUR: i64 = 3;

/// Password reset token record as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetTokenRecord {
    /// Token identifier.
    pub id: uuid::Uuid,
    /// Account the token resets.
    pub user_id: UserId,
    /// Email address the token was sent to.
    pub email: String,
    /// Expiration timestamp.
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

/// Repository port for password reset token persistence.
#[async_trait]
pub trait AuthTokenRepository: Send + Sync {
    /// Stores a new token hash.
    async fn create_token(
        &self,
        user_id: UserId,
        email: &str,
        token_hash: &str,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<uuid::Uuid>;

    /// Atomically marks an unexpired, unused token as used and returns it.
    async fn consume_valid_token(
        &self,
        token_hash: &str,
    ) -> AppResult<Option<PasswordResetTokenRecord>>;

    /// Invalidates all unused tokens for a user.
    async fn invalidate_tokens_for_user(&self, user_id: UserId) -> AppResult<()>;

    /// Counts tokens issued for an email since the given time.
    async fn count_recent_tokens(
        &self,
        email: &str,
        since: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<i64>;
}

/// Port for sending emails.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends a plain-text email.
    async fn send_email(&self, to: &str, subject: &str, text_body: &str) -> AppResult<()>;
}

/// Application service for the forgot-password flow.
#[derive(Clone)]
pub struct AuthTokenService {
    token_repository: Arc<dyn AuthTokenRepository>,
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    email_service: Arc<dyn EmailService>,
    audit_repository: Arc<dyn AuditRepository>,
    frontend_url: String,
}

impl AuthTokenService {
    /// Creates a new auth token service.
    #[must_use]
    pub fn new(
        token_repository: Arc<dyn AuthTokenRepository>,
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        email_service: Arc<dyn EmailService>,
        audit_repository: Arc<dyn AuditRepository>,
        frontend_url: String,
    ) -> Self {
        Self {
            token_repository,
            user_repository,
            password_hasher,
            email_service,
            audit_repository,
            frontend_url,
        }
    }
}

#[cfg(test)]
mod tests;
