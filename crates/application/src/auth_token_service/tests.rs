use std::sync::Arc;

use tasklane_core::AppError;

use super::AuthTokenService;
use super::token_crypto::hash_token;
use crate::test_support::{FakeStore, user_id_of};

fn service(store: &Arc<FakeStore>) -> AuthTokenService {
    AuthTokenService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        "http://localhost:3000".to_owned(),
    )
}

fn token_from_email(body: &str) -> String {
    body.split("token=")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or_default()
        .to_owned()
}

#[tokio::test]
async fn unknown_email_succeeds_silently() {
    let store = Arc::new(FakeStore::default());

    let result = service(&store)
        .request_password_reset("nobody@example.com")
        .await;
    assert!(result.is_ok());
    assert!(store.state().emails.is_empty());
    assert!(store.state().tokens.is_empty());
}

#[tokio::test]
async fn reset_flow_replaces_password_once() {
    let store = Arc::new(FakeStore::default());
    let member = store.seed_user_with(&[]);
    let email = member.email().unwrap_or_default().to_owned();
    let service = service(&store);

    assert!(service.request_password_reset(&email).await.is_ok());
    let body = store
        .state()
        .emails
        .first()
        .map(|(_, body)| body.clone())
        .unwrap_or_default();
    let token = token_from_email(&body);
    assert_eq!(token.len(), 64);

    let stored_hash = store
        .state()
        .tokens
        .first()
        .map(|token| token.token_hash.clone())
        .unwrap_or_default();
    assert_eq!(stored_hash, hash_token(&token));

    assert!(
        service
            .reset_password(&token, "fresh passphrase here")
            .await
            .is_ok()
    );
    let password_hash = store
        .state()
        .users
        .get(&user_id_of(&member))
        .map(|user| user.password_hash.clone())
        .unwrap_or_default();
    assert_eq!(password_hash, "hashed:fresh passphrase here");

    assert!(matches!(
        service.reset_password(&token, "another passphrase").await,
        Err(AppError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn requests_beyond_hourly_limit_are_dropped() {
    let store = Arc::new(FakeStore::default());
    let member = store.seed_user_with(&[]);
    let email = member.email().unwrap_or_default().to_owned();
    let service = service(&store);

    for _ in 0..5 {
        assert!(service.request_password_reset(&email).await.is_ok());
    }

    assert_eq!(store.state().emails.len(), 3);
}

#[tokio::test]
async fn weak_new_password_is_rejected_before_consuming_token() {
    let store = Arc::new(FakeStore::default());
    let member = store.seed_user_with(&[]);
    let email = member.email().unwrap_or_default().to_owned();
    let service = service(&store);

    assert!(service.request_password_reset(&email).await.is_ok());
    let body = store
        .state()
        .emails
        .first()
        .map(|(_, body)| body.clone())
        .unwrap_or_default();
    let token = token_from_email(&body);

    assert!(matches!(
        service.reset_password(&token, "short").await,
        Err(AppError::Validation(_))
    ));
    assert!(
        service
            .reset_password(&token, "fresh passphrase here")
            .await
            .is_ok()
    );
}
