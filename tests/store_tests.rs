use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use petling::config::Config;
use petling::db::Store;
use petling::models::account::{AccountKind, FederatedProfile, Provider};
use petling::state::SharedState;
use tower::ServiceExt;

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config
}

async fn memory_store() -> Store {
    Store::new("sqlite::memory:")
        .await
        .expect("Failed to open in-memory store")
}

fn profile(provider_id: &str, email: &str) -> FederatedProfile {
    FederatedProfile {
        provider_id: provider_id.to_string(),
        email: email.to_string(),
        display_name: Some("A B".to_string()),
        profile_picture: Some("https://example.com/pic.png".to_string()),
    }
}

#[tokio::test]
async fn test_generate_username_appends_suffix() {
    let store = memory_store().await;

    let first = store.generate_username("a.b@x.com").await.unwrap();
    assert_eq!(first, "ab");

    store
        .link_or_create_federated(Provider::Google, &profile("g-1", "a.b@x.com"))
        .await
        .unwrap();

    // Same email again under a different provider identity: "ab" is now
    // persisted, so the next candidate is "ab1".
    let second = store.generate_username("a.b@x.com").await.unwrap();
    assert_eq!(second, "ab1");
}

#[tokio::test]
async fn test_link_or_create_federated_is_idempotent() {
    let store = memory_store().await;

    let created = store
        .link_or_create_federated(Provider::Google, &profile("g-42", "jane.doe@gmail.com"))
        .await
        .unwrap();
    assert_eq!(created.username, "janedoe");
    assert!(created.is_federated());
    assert_eq!(created.provider(), Some(Provider::Google));

    let again = store
        .link_or_create_federated(Provider::Google, &profile("g-42", "jane.doe@gmail.com"))
        .await
        .unwrap();
    assert_eq!(again.id, created.id);
}

#[tokio::test]
async fn test_federated_login_links_existing_account_by_email() {
    use petling::entities::users;
    use sea_orm::{ActiveModelTrait, Set};

    let config = test_config();
    let store = memory_store().await;

    let local = store
        .create_local_account("jane", "secret1", &config.security)
        .await
        .unwrap();

    // Give the local account an email, as an account imported from the
    // previous deployment could have.
    let active = users::ActiveModel {
        id: Set(local.id),
        email: Set(Some("jane@example.com".to_string())),
        ..Default::default()
    };
    active.update(&store.conn).await.unwrap();

    // A federated login with a matching email (any casing) links onto the
    // existing account instead of creating a second one.
    let mut fed_profile = profile("fb-7", "jane@example.com");
    fed_profile.email = "Jane@Example.com".to_string();

    let linked = store
        .link_or_create_federated(Provider::Facebook, &fed_profile)
        .await
        .unwrap();

    assert_eq!(linked.id, local.id);
    assert_eq!(linked.username, "jane");
    assert!(linked.is_federated());

    match &linked.kind {
        AccountKind::Federated { provider_id, .. } => assert_eq!(provider_id, "fb-7"),
        AccountKind::Local { .. } => panic!("expected federated account"),
    }

    // Once linked, password login is no longer possible for this account.
    let refreshed = store.find_account_by_username("jane").await.unwrap().unwrap();
    assert!(refreshed.is_federated());
}

#[tokio::test]
async fn test_federated_account_rejected_by_local_login() {
    let config = test_config();
    let shared = Arc::new(SharedState::new(config).await.unwrap());
    let store = shared.store.clone();

    store
        .link_or_create_federated(Provider::Google, &profile("g-9", "a.b@x.com"))
        .await
        .unwrap();

    let state = petling::api::create_app_state(shared).await.unwrap();
    let app = petling::api::router(state).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"username": "ab", "password": "whatever"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json["message"],
        "This account uses google login. Please use OAuth to sign in."
    );
}

#[tokio::test]
async fn test_local_account_never_carries_provider_id() {
    let config = test_config();
    let store = memory_store().await;

    let account = store
        .create_local_account("plainuser", "secret1", &config.security)
        .await
        .unwrap();

    assert!(!account.is_federated());
    assert!(account.provider().is_none());
    assert!(matches!(account.kind, AccountKind::Local { .. }));
}

#[tokio::test]
async fn test_duplicate_username_is_reported() {
    let config = test_config();
    let store = memory_store().await;

    store
        .create_local_account("taken", "secret1", &config.security)
        .await
        .unwrap();

    let err = store
        .create_local_account("taken", "secret2", &config.security)
        .await
        .unwrap_err();

    assert!(matches!(err, petling::db::CreateAccountError::Duplicate));
}
