use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use time;

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod error;
mod pets;
mod types;
mod user_pets;
mod validation;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }
}

pub async fn create_app_state(shared: Arc<SharedState>) -> anyhow::Result<Arc<AppState>> {
    Ok(Arc::new(AppState { shared }))
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared).await
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, session_minutes) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_expiry_minutes,
        )
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_minutes,
        )));

    let api_router = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::current_account))
        .route("/auth/{provider}", get(auth::oauth_redirect))
        .route("/auth/{provider}/callback", get(auth::oauth_callback))
        .route("/users/{username}/pets", get(user_pets::list_user_pets))
        .route("/users/{username}/pets", post(user_pets::create_user_pet))
        .route(
            "/users/{username}/pets/{pet_id}",
            get(user_pets::get_user_pet),
        )
        .route(
            "/users/{username}/pets/{pet_id}",
            delete(user_pets::release_user_pet),
        )
        .route(
            "/users/{username}/pets/{pet_id}/stats",
            put(user_pets::update_user_pet_stats),
        )
        .route(
            "/users/{username}/pets/{pet_id}/accessory",
            put(user_pets::update_user_pet_accessory),
        )
        .route("/pets", get(pets::list_pets))
        .route("/pets", post(pets::create_pet))
        .route("/pets/by-username", post(pets::create_pet_by_username))
        .route("/pets/{id}", get(pets::get_pet))
        .route("/pets/{id}", put(pets::update_pet))
        .route("/pets/{id}", delete(pets::delete_pet))
        .route("/my/pets", get(pets::list_my_pets))
        .route("/my/pets", post(pets::create_my_pet))
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
