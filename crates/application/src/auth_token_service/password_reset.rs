use tasklane_core::AppError;
use tasklane_domain::{AuditAction, EmailAddress, validate_password};

use crate::AuditEvent;

use super::token_crypto::{generate_token, hash_token};
use super::*;

impl AuthTokenService {
    /// Issues a password reset token and mails the reset link.
    ///
    /// Always returns `Ok(())` whether or not the email belongs to an
    /// account, and silently drops requests beyond the hourly limit.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let Ok(canonical_email) = EmailAddress::new(email) else {
            return Ok(());
        };

        let one_hour_ago = chrono::Utc::now() - chrono::Duration::hours(1);
        let recent_count = self
            .token_repository
            .count_recent_tokens(canonical_email.as_str(), one_hour_ago)
            .await?;
        if recent_count >= PASSWORD_RESET_MAX_REQUESTS_PER_HOUR {
            tracing::info!("password reset request rate limited");
            return Ok(());
        }

        let Some(user) = self
            .user_repository
            .find_by_email(canonical_email.as_str())
            .await?
        else {
            return Ok(());
        };
        if !user.is_active {
            return Ok(());
        }

        self.token_repository
            .invalidate_tokens_for_user(user.id)
            .await?;

        let (raw_token, token_hash) = generate_token()?;
        let expires_at = chrono::Utc::now() + chrono::Duration::hours(1);
        self.token_repository
            .create_token(user.id, canonical_email.as_str(), &token_hash, expires_at)
            .await?;

        let reset_url = format!("{}/reset-password?token={raw_token}", self.frontend_url);
        let text_body = format!(
            "You requested a password reset.\n\n\
             Open the link below to set a new password:\n{reset_url}\n\n\
             This link expires in 1 hour.\n\n\
             If you did not request this, you can safely ignore this email."
        );

        self.email_service
            .send_email(
                canonical_email.as_str(),
                "Reset your Tasklane password",
                &text_body,
            )
            .await
    }

    /// Consumes a reset token and stores the new password.
    pub async fn reset_password(&self, raw_token: &str, new_password: &str) -> AppResult<()> {
        validate_password(new_password)?;

        let record = self
            .token_repository
            .consume_valid_token(&hash_token(raw_token.trim()))
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid or expired token".to_owned()))?;

        let user = self
            .user_repository
            .find_by_email(&record.email)
            .await?
            .filter(|user| user.id == record.user_id)
            .ok_or_else(|| AppError::Unauthorized("invalid or expired token".to_owned()))?;

        let password_hash = self.password_hasher.hash_password(new_password)?;
        self.user_repository
            .update_password(user.id, &password_hash)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                tenant_id: user.tenant_id,
                subject: user.id.to_string(),
                action: AuditAction::UserPasswordChanged,
                resource_type: "user".to_owned(),
                resource_id: user.id.to_string(),
                detail: Some("password reset by email token".to_owned()),
            })
            .await
    }
}
