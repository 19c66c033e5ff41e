use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::api::types::{AccountDto, LoginRequest, RegisterRequest};
use crate::api::validation::{validate_password, validate_username};
use crate::db::CreateAccountError;
use crate::models::account::{AccountKind, Provider};

const SESSION_USER_KEY: &str = "user";

/// Identity stored in the session at registration/login time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = validate_username(&payload.username)?;
    validate_password(&payload.password)?;

    if payload.password != payload.confirm_password {
        return Err(ApiError::validation("Passwords do not match"));
    }

    let security = state.config().read().await.security.clone();

    let account = state
        .store()
        .create_local_account(username, &payload.password, &security)
        .await
        .map_err(|e| match e {
            CreateAccountError::Duplicate => {
                ApiError::Conflict("Username already exists".to_string())
            }
            CreateAccountError::Other(err) => ApiError::internal(err.to_string()),
        })?;

    establish_session(&session, account.id, &account.username).await?;

    tracing::info!("Registered user: {}", account.username);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AccountDto::from(&account))),
    ))
}

/// POST /auth/login
///
/// Failure reasons are deliberately distinct and user-visible: unknown user,
/// federated account, account without a usable password, wrong password.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let account = state
        .store()
        .find_account_by_username(&payload.username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User does not exist"))?;

    let password_hash = match &account.kind {
        AccountKind::Federated { provider, .. } => {
            return Err(ApiError::unauthorized(format!(
                "This account uses {} login. Please use OAuth to sign in.",
                provider
            )));
        }
        AccountKind::Local { password_hash } if password_hash.is_empty() => {
            return Err(ApiError::unauthorized(
                "This account does not have password login enabled.",
            ));
        }
        AccountKind::Local { password_hash } => password_hash.clone(),
    };

    let is_valid = state
        .store()
        .verify_password(&payload.password, &password_hash)
        .await
        .map_err(|e| ApiError::internal(format!("Authentication error: {e}")))?;

    if !is_valid {
        return Err(ApiError::unauthorized("Incorrect password"));
    }

    establish_session(&session, account.id, &account.username).await?;

    Ok(Json(ApiResponse::success(AccountDto::from(&account))))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    let _ = session.flush().await;
    Json(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

/// GET /auth/me
pub async fn current_account(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    let user = session_user(&session).await?;

    let account = state
        .store()
        .find_account_by_id(user.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    Ok(Json(ApiResponse::success(AccountDto::from(&account))))
}

/// GET /auth/{provider}
///
/// Provider strategies ship disabled; the redirect is only built once
/// `[oauth] enabled = true` and credentials are configured. The
/// account-linking contract lives in the store and stays testable either way.
pub async fn oauth_redirect(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let provider = parse_provider(&provider)?;
    let oauth = state.config().read().await.oauth.clone();

    if !oauth.enabled {
        return Err(ApiError::NotImplemented(format!(
            "{} login is disabled in this deployment",
            provider
        )));
    }

    let location = match provider {
        Provider::Google => format!(
            "https://accounts.google.com/o/oauth2/v2/auth?client_id={}&redirect_uri={}/api/auth/google/callback&response_type=code&scope=profile%20email",
            oauth.google_client_id, oauth.callback_base_url
        ),
        Provider::Facebook => format!(
            "https://www.facebook.com/v18.0/dialog/oauth?client_id={}&redirect_uri={}/api/auth/facebook/callback&scope=email",
            oauth.facebook_app_id, oauth.callback_base_url
        ),
    };

    Ok(axum::response::Redirect::temporary(&location))
}

/// GET /auth/{provider}/callback
///
/// Token exchange delegates to the provider library, which is not wired in
/// this deployment. The handler exists so the route shape matches the
/// eventual flow: callback -> profile -> `link_or_create_federated` -> session.
pub async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    let provider = parse_provider(&provider)?;
    let enabled = state.config().read().await.oauth.enabled;

    if !enabled {
        return Err(ApiError::NotImplemented(format!(
            "{} login is disabled in this deployment",
            provider
        )));
    }

    Err(ApiError::NotImplemented(format!(
        "{} token exchange is not wired in this deployment",
        provider
    )))
}

fn parse_provider(provider: &str) -> Result<Provider, ApiError> {
    provider
        .parse()
        .map_err(|_| ApiError::NotFound(format!("Unknown login provider '{}'", provider)))
}

async fn establish_session(session: &Session, id: i32, username: &str) -> Result<(), ApiError> {
    let user = SessionUser {
        id,
        username: username.to_string(),
    };
    session
        .insert(SESSION_USER_KEY, &user)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))
}

/// Resolve the caller's identity from the session, or reject as anonymous.
pub async fn session_user(session: &Session) -> Result<SessionUser, ApiError> {
    session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))
}
