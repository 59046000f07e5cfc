use super::*;

#[async_trait]
impl AuthTokenRepository for InMemoryStore {
    async fn create_token(
        &self,
        user_id: UserId,
        email: &str,
        token_hash: &str,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<uuid::Uuid> {
        let mut tokens = self.tokens.write().await;
        if tokens.iter().any(|token| token.token_hash == token_hash) {
            return Err(AppError::Conflict("reset token already exists".to_owned()));
        }

        let id = uuid::Uuid::new_v4();
        tokens.push(StoredToken {
            record: PasswordResetTokenRecord {
                id,
                user_id,
                email: email.to_owned(),
                expires_at,
            },
            token_hash: token_hash.to_owned(),
            used: false,
            created_at: chrono::Utc::now(),
        });
        Ok(id)
    }

    async fn consume_valid_token(
        &self,
        token_hash: &str,
    ) -> AppResult<Option<PasswordResetTokenRecord>> {
        let now = chrono::Utc::now();
        let mut tokens = self.tokens.write().await;

        Ok(tokens
            .iter_mut()
            .find(|token| {
                token.token_hash == token_hash && !token.used && token.record.expires_at > now
            })
            .map(|token| {
                token.used = true;
                token.record.clone()
            }))
    }

    async fn invalidate_tokens_for_user(&self, user_id: UserId) -> AppResult<()> {
        for token in self
            .tokens
            .write()
            .await
            .iter_mut()
            .filter(|token| token.record.user_id == user_id)
        {
            token.used = true;
        }
        Ok(())
    }

    async fn count_recent_tokens(
        &self,
        email: &str,
        since: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<i64> {
        let count = self
            .tokens
            .read()
            .await
            .iter()
            .filter(|token| token.record.email.eq_ignore_ascii_case(email))
            .filter(|token| token.created_at >= since)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}
