//! Ownership-scoped pet surface under `/users/{username}/pets`.
//!
//! Every handler resolves the path username first; a pet only counts as
//! found when it belongs to that account.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::api::types::{
    AccountSummary, CreatePetRequest, PetDto, ReleasedPetDto, UpdateAccessoryRequest,
    UpdateStatsRequest, pet_dtos,
};
use crate::api::validation::{parse_or_default, parse_required, validate_pet_name};
use crate::db::{NewPet, StatPatch};
use crate::models::account::Account;
use crate::models::pet::{Accessory, CreatedVia, Species};

/// GET /users/{username}/pets
pub async fn list_user_pets(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<Vec<PetDto>>>, ApiError> {
    let account = resolve_account(&state, &username).await?;

    let pets = state.store().list_pets_by_owner(account.id).await?;
    tracing::debug!("Found {} pets for user {}", pets.len(), username);

    Ok(Json(
        ApiResponse::success(pet_dtos(&pets))
            .with_count(pets.len())
            .with_user(AccountSummary::from(&account)),
    ))
}

/// GET /users/{username}/pets/{pet_id}
pub async fn get_user_pet(
    State(state): State<Arc<AppState>>,
    Path((username, pet_id)): Path<(String, i32)>,
) -> Result<Json<ApiResponse<PetDto>>, ApiError> {
    let account = resolve_account(&state, &username).await?;

    let pet = state
        .store()
        .get_owned_pet(pet_id, account.id)
        .await?
        .ok_or_else(ApiError::pet_not_owned)?;

    Ok(Json(
        ApiResponse::success(PetDto::from(&pet)).with_user(AccountSummary::from(&account)),
    ))
}

/// POST /users/{username}/pets
pub async fn create_user_pet(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(payload): Json<CreatePetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.name.as_deref().map_or(true, |n| n.trim().is_empty())
        || payload.species.as_deref().map_or(true, str::is_empty)
    {
        return Err(ApiError::validation(
            "Pet name and species are required fields",
        ));
    }

    let name = validate_pet_name(payload.name.as_deref().unwrap_or_default())?;
    let species: Species = parse_required(payload.species.as_deref(), "species")?;

    let account = state
        .store()
        .find_account_by_username(&username)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "User '{}' not found. Please register via the web interface first.",
                username
            ))
        })?;

    let mut new_pet = NewPet::new(name.to_string(), species);
    new_pet.rarity = parse_or_default(payload.rarity.as_deref())?;
    new_pet.trait_ = parse_or_default(payload.trait_.as_deref())?;
    new_pet.owner_id = Some(account.id);
    new_pet.created_by = CreatedVia::Api;

    let pet = state.store().create_pet(new_pet).await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(PetDto::from(&pet))
                .with_message(format!(
                    "Pet '{}' created successfully for user: {}",
                    pet.name, account.username
                ))
                .with_owner(AccountSummary::from(&account)),
        ),
    ))
}

/// PUT /users/{username}/pets/{pet_id}/stats
///
/// Out-of-range stat values are silently clamped to [0, 100], not rejected.
pub async fn update_user_pet_stats(
    State(state): State<Arc<AppState>>,
    Path((username, pet_id)): Path<(String, i32)>,
    Json(payload): Json<UpdateStatsRequest>,
) -> Result<Json<ApiResponse<PetDto>>, ApiError> {
    let account = resolve_account(&state, &username).await?;

    state
        .store()
        .get_owned_pet(pet_id, account.id)
        .await?
        .ok_or_else(ApiError::pet_not_owned)?;

    let patch = StatPatch {
        hunger: payload.hunger,
        happiness: payload.happiness,
        energy: payload.energy,
    };

    let pet = state
        .store()
        .update_pet_stats(pet_id, patch)
        .await?
        .ok_or_else(ApiError::pet_not_owned)?;

    Ok(Json(
        ApiResponse::success(PetDto::from(&pet)).with_message("Pet stats updated successfully"),
    ))
}

/// PUT /users/{username}/pets/{pet_id}/accessory
pub async fn update_user_pet_accessory(
    State(state): State<Arc<AppState>>,
    Path((username, pet_id)): Path<(String, i32)>,
    Json(payload): Json<UpdateAccessoryRequest>,
) -> Result<Json<ApiResponse<PetDto>>, ApiError> {
    let accessory: Accessory = parse_required(payload.accessory.as_deref(), "Accessory")?;

    let account = resolve_account(&state, &username).await?;

    state
        .store()
        .get_owned_pet(pet_id, account.id)
        .await?
        .ok_or_else(ApiError::pet_not_owned)?;

    let pet = state
        .store()
        .update_pet_accessory(pet_id, accessory)
        .await?
        .ok_or_else(ApiError::pet_not_owned)?;

    Ok(Json(
        ApiResponse::success(PetDto::from(&pet))
            .with_message(format!("Pet accessory updated to: {}", accessory)),
    ))
}

/// DELETE /users/{username}/pets/{pet_id}
pub async fn release_user_pet(
    State(state): State<Arc<AppState>>,
    Path((username, pet_id)): Path<(String, i32)>,
) -> Result<Json<ApiResponse<ReleasedPetDto>>, ApiError> {
    let account = resolve_account(&state, &username).await?;

    let pet = state
        .store()
        .delete_owned_pet(pet_id, account.id)
        .await?
        .ok_or_else(ApiError::pet_not_owned)?;

    Ok(Json(
        ApiResponse::success(ReleasedPetDto::from(&pet))
            .with_message(format!("Pet '{}' has been released", pet.name)),
    ))
}

async fn resolve_account(state: &AppState, username: &str) -> Result<Account, ApiError> {
    state
        .store()
        .find_account_by_username(username)
        .await?
        .ok_or_else(|| ApiError::user_not_found(username))
}
