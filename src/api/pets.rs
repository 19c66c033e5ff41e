//! Unscoped pet surface under `/pets`, plus the session-backed `/my/pets`
//! flow.
//!
//! The global PUT and DELETE handlers intentionally skip ownership checks:
//! this surface mirrors the pre-existing open API, where `/users/...` is the
//! ownership-enforcing access path and `/pets/...` is trusted.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::api::auth::session_user;
use crate::api::types::{
    AccountSummary, CreatePetRequest, PetDto, PetListQuery, ReleasedPetDto, UpdatePetRequest,
    pet_dtos,
};
use crate::api::validation::{parse_optional, parse_or_default, parse_required, validate_pet_name};
use crate::db::{NewPet, PetFilter, PetPatch, StatPatch};
use crate::models::pet::{CreatedVia, PetStats, Rarity, Species, Trait, clamp_stat};

/// GET /pets
///
/// Filter values that name no known enum member simply match nothing, so the
/// result is an empty array rather than an error.
pub async fn list_pets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PetListQuery>,
) -> Result<Json<ApiResponse<Vec<PetDto>>>, ApiError> {
    let mut filter = PetFilter {
        min_happiness: query.min_happiness,
        max_happiness: query.max_happiness,
        ..PetFilter::default()
    };

    match (
        parse_optional::<Species>(query.species.as_deref()),
        parse_optional::<Rarity>(query.rarity.as_deref()),
        parse_optional::<Trait>(query.trait_.as_deref()),
    ) {
        (Ok(species), Ok(rarity), Ok(trait_)) => {
            filter.species = species;
            filter.rarity = rarity;
            filter.trait_ = trait_;
        }
        _ => {
            return Ok(Json(ApiResponse::success(Vec::new()).with_count(0)));
        }
    }

    let pets = state.store().list_pets(&filter).await?;

    Ok(Json(
        ApiResponse::success(pet_dtos(&pets)).with_count(pets.len()),
    ))
}

/// GET /pets/{id}
pub async fn get_pet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<PetDto>>, ApiError> {
    let pet = state
        .store()
        .get_pet(id)
        .await?
        .ok_or_else(ApiError::pet_not_found)?;

    Ok(Json(ApiResponse::success(PetDto::from(&pet))))
}

/// POST /pets — unattributed creation, owner stays null.
pub async fn create_pet(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new_pet = build_new_pet(&payload)?;
    let pet = state.store().create_pet(new_pet).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(PetDto::from(&pet)).with_message("Pet created successfully")),
    ))
}

/// POST /pets/by-username — owner resolved from a username in the body.
pub async fn create_pet_by_username(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut new_pet = build_new_pet(&payload)?;

    let username = payload
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::validation("Username is required"))?;

    let account = state
        .store()
        .find_account_by_username(username)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "User '{}' not found. Please register via the web interface first.",
                username
            ))
        })?;

    new_pet.owner_id = Some(account.id);

    let pet = state.store().create_pet(new_pet).await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(PetDto::from(&pet))
                .with_message(format!(
                    "Pet created successfully for user: {}",
                    account.username
                ))
                .with_owner(AccountSummary::from(&account)),
        ),
    ))
}

/// PUT /pets/{id} — partial update, no ownership check on this surface.
pub async fn update_pet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePetRequest>,
) -> Result<Json<ApiResponse<PetDto>>, ApiError> {
    let name = match payload.name.as_deref() {
        Some(name) if !name.trim().is_empty() => Some(validate_pet_name(name)?.to_string()),
        _ => None,
    };

    let patch = PetPatch {
        name,
        species: parse_optional(payload.species.as_deref())?,
        rarity: parse_optional(payload.rarity.as_deref())?,
        trait_: parse_optional(payload.trait_.as_deref())?,
        stats: payload.stats.as_ref().map_or_else(StatPatch::default, |s| {
            StatPatch {
                hunger: s.hunger,
                happiness: s.happiness,
                energy: s.energy,
            }
        }),
    };

    let pet = state
        .store()
        .update_pet(id, patch)
        .await?
        .ok_or_else(ApiError::pet_not_found)?;

    Ok(Json(
        ApiResponse::success(PetDto::from(&pet)).with_message("Pet updated successfully"),
    ))
}

/// DELETE /pets/{id} — no ownership check on this surface.
pub async fn delete_pet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ReleasedPetDto>>, ApiError> {
    let pet = state
        .store()
        .delete_pet(id)
        .await?
        .ok_or_else(ApiError::pet_not_found)?;

    Ok(Json(
        ApiResponse::success(ReleasedPetDto::from(&pet)).with_message("Pet deleted successfully"),
    ))
}

/// GET /my/pets — pets owned by the session account.
pub async fn list_my_pets(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<PetDto>>>, ApiError> {
    let user = session_user(&session).await?;

    let pets = state.store().list_pets_by_owner(user.id).await?;

    Ok(Json(
        ApiResponse::success(pet_dtos(&pets)).with_count(pets.len()),
    ))
}

/// POST /my/pets — the web flow: owner implied by the session,
/// provenance tagged `web`.
pub async fn create_my_pet(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CreatePetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = session_user(&session).await?;

    let mut new_pet = build_new_pet(&payload)?;
    new_pet.owner_id = Some(user.id);
    new_pet.created_by = CreatedVia::Web;

    let pet = state.store().create_pet(new_pet).await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(PetDto::from(&pet))
                .with_message(format!("Pet '{}' created successfully", pet.name)),
        ),
    ))
}

fn build_new_pet(payload: &CreatePetRequest) -> Result<NewPet, ApiError> {
    if payload.name.as_deref().map_or(true, |n| n.trim().is_empty())
        || payload.species.as_deref().map_or(true, str::is_empty)
    {
        return Err(ApiError::validation(
            "Pet name and species are required fields",
        ));
    }

    let name = validate_pet_name(payload.name.as_deref().unwrap_or_default())?;
    let species: Species = parse_required(payload.species.as_deref(), "species")?;

    let mut new_pet = NewPet::new(name.to_string(), species);
    new_pet.rarity = parse_or_default(payload.rarity.as_deref())?;
    new_pet.trait_ = parse_or_default(payload.trait_.as_deref())?;
    new_pet.created_by = CreatedVia::Api;

    if let Some(stats) = &payload.stats {
        let defaults = PetStats::default();
        new_pet.stats = PetStats {
            hunger: clamp_stat(stats.hunger.unwrap_or(defaults.hunger)),
            happiness: clamp_stat(stats.happiness.unwrap_or(defaults.happiness)),
            energy: clamp_stat(stats.energy.unwrap_or(defaults.energy)),
        };
    }

    Ok(new_pet)
}
