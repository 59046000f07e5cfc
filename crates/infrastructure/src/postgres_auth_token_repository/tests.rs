use chrono::{Duration, Utc};
use tasklane_application::AuthTokenRepository;

use super::PostgresAuthTokenRepository;
use crate::postgres_test_support::{ensure_tenant, insert_user, test_pool};

#[tokio::test]
async fn tokens_are_single_use() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAuthTokenRepository::new(pool.clone());
    let tenant_id = ensure_tenant(&pool, "Tokens Tenant").await;
    let user_id = insert_user(&pool, tenant_id, true).await;
    let token_hash = format!("hash-{user_id}");

    let created = repository
        .create_token(
            user_id,
            "reset@example.com",
            &token_hash,
            Utc::now() + Duration::hours(1),
        )
        .await;
    assert!(created.is_ok());

    let first = repository
        .consume_valid_token(&token_hash)
        .await
        .unwrap_or_default();
    assert_eq!(first.map(|record| record.user_id), Some(user_id));

    let second = repository
        .consume_valid_token(&token_hash)
        .await
        .unwrap_or_default();
    assert!(second.is_none());
}

#[tokio::test]
async fn expired_and_invalidated_tokens_are_rejected() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAuthTokenRepository::new(pool.clone());
    let tenant_id = ensure_tenant(&pool, "Tokens Tenant").await;
    let user_id = insert_user(&pool, tenant_id, true).await;
    let expired_hash = format!("expired-{user_id}");
    let live_hash = format!("live-{user_id}");

    assert!(
        repository
            .create_token(
                user_id,
                "reset@example.com",
                &expired_hash,
                Utc::now() - Duration::minutes(1),
            )
            .await
            .is_ok()
    );
    assert!(
        repository
            .create_token(
                user_id,
                "reset@example.com",
                &live_hash,
                Utc::now() + Duration::hours(1),
            )
            .await
            .is_ok()
    );

    let expired = repository
        .consume_valid_token(&expired_hash)
        .await
        .unwrap_or_default();
    assert!(expired.is_none());

    assert!(repository.invalidate_tokens_for_user(user_id).await.is_ok());
    let invalidated = repository
        .consume_valid_token(&live_hash)
        .await
        .unwrap_or_default();
    assert!(invalidated.is_none());

    let recent = repository
        .count_recent_tokens("RESET@example.com", Utc::now() - Duration::hours(1))
        .await
        .unwrap_or_default();
    assert!(recent >= 2);
}
