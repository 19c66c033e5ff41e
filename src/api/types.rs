use serde::{Deserialize, Serialize};

use crate::models::account::Account;
use crate::models::pet::Pet;

/// JSON envelope shared by every endpoint. Success responses carry `data`
/// plus optional context fields (`count`, `user`, `owner`); error responses
/// carry `message`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AccountSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<AccountSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data: Some(data),
            user: None,
            owner: None,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            count: None,
            data: None,
            user: None,
            owner: None,
            error: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub const fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: AccountSummary) -> Self {
        self.user = Some(user);
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: AccountSummary) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Minimal account context attached to user-scoped pet responses.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub id: i32,
    pub username: String,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub is_federated: bool,
    pub oauth_provider: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: String,
}

impl From<&Account> for AccountDto {
    fn from(account: &Account) -> Self {
        let profile_picture = match &account.kind {
            crate::models::account::AccountKind::Federated {
                profile_picture, ..
            } => profile_picture.clone(),
            crate::models::account::AccountKind::Local { .. } => None,
        };

        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            is_federated: account.is_federated(),
            oauth_provider: account.provider().map(|p| p.as_str().to_string()),
            profile_picture,
            created_at: account.created_at.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsDto {
    pub hunger: i32,
    pub happiness: i32,
    pub energy: i32,
}

/// Wire shape of a pet. camelCase matches the pre-existing JSON API; the
/// derived fields are computed here, never stored.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetDto {
    pub id: i32,
    pub name: String,
    pub species: String,
    pub rarity: String,
    #[serde(rename = "trait")]
    pub trait_: String,
    pub accessory: String,
    pub stats: StatsDto,
    pub owner: Option<i32>,
    pub created_by: String,
    pub birth_date: String,
    pub created_at: String,
    pub updated_at: String,
    pub image_url: String,
    pub rarity_color: String,
    pub description: String,
    pub needs_care: bool,
}

impl From<&Pet> for PetDto {
    fn from(pet: &Pet) -> Self {
        Self {
            id: pet.id,
            name: pet.name.clone(),
            species: pet.species.as_str().to_string(),
            rarity: pet.rarity.as_str().to_string(),
            trait_: pet.trait_.as_str().to_string(),
            accessory: pet.accessory.as_str().to_string(),
            stats: StatsDto {
                hunger: pet.stats.hunger,
                happiness: pet.stats.happiness,
                energy: pet.stats.energy,
            },
            owner: pet.owner_id,
            created_by: pet.created_by.as_str().to_string(),
            birth_date: pet.birth_date.clone(),
            created_at: pet.created_at.clone(),
            updated_at: pet.updated_at.clone(),
            image_url: pet.image_url(),
            rarity_color: pet.rarity_color().to_string(),
            description: pet.description().to_string(),
            needs_care: pet.needs_care(),
        }
    }
}

#[must_use]
pub fn pet_dtos(pets: &[Pet]) -> Vec<PetDto> {
    pets.iter().map(PetDto::from).collect()
}

/// Confirmation payload for a released pet.
#[derive(Debug, Serialize)]
pub struct ReleasedPetDto {
    pub id: i32,
    pub name: String,
    pub species: String,
}

impl From<&Pet> for ReleasedPetDto {
    fn from(pet: &Pet) -> Self {
        Self {
            id: pet.id,
            name: pet.name.clone(),
            species: pet.species.as_str().to_string(),
        }
    }
}

// Request bodies. Enum-valued fields arrive as plain strings and are parsed
// at the boundary so an invalid value is a 400, not a deserialization error.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsBody {
    pub hunger: Option<i32>,
    pub happiness: Option<i32>,
    pub energy: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePetRequest {
    pub name: Option<String>,
    pub species: Option<String>,
    pub rarity: Option<String>,
    #[serde(rename = "trait")]
    pub trait_: Option<String>,
    pub stats: Option<StatsBody>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatsRequest {
    pub hunger: Option<i32>,
    pub happiness: Option<i32>,
    pub energy: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccessoryRequest {
    pub accessory: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePetRequest {
    pub name: Option<String>,
    pub species: Option<String>,
    pub rarity: Option<String>,
    #[serde(rename = "trait")]
    pub trait_: Option<String>,
    pub stats: Option<StatsBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetListQuery {
    pub species: Option<String>,
    pub rarity: Option<String>,
    #[serde(rename = "trait")]
    pub trait_: Option<String>,
    pub min_happiness: Option<i32>,
    pub max_happiness: Option<i32>,
}
