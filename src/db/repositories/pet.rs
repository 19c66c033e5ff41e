use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::pets;
use crate::models::pet::{Accessory, CreatedVia, Pet, PetStats, Rarity, Species, Trait};

/// Input for creating a pet. Defaults cover everything the caller omits.
#[derive(Debug, Clone)]
pub struct NewPet {
    pub name: String,
    pub species: Species,
    pub rarity: Rarity,
    pub trait_: Trait,
    pub accessory: Accessory,
    pub stats: PetStats,
    pub owner_id: Option<i32>,
    pub created_by: CreatedVia,
}

impl NewPet {
    #[must_use]
    pub fn new(name: String, species: Species) -> Self {
        Self {
            name,
            species,
            rarity: Rarity::default(),
            trait_: Trait::default(),
            accessory: Accessory::default(),
            stats: PetStats::default(),
            owner_id: None,
            created_by: CreatedVia::Api,
        }
    }
}

/// Partial stat update; absent fields are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatPatch {
    pub hunger: Option<i32>,
    pub happiness: Option<i32>,
    pub energy: Option<i32>,
}

/// Partial update for the unscoped PUT surface.
#[derive(Debug, Clone, Default)]
pub struct PetPatch {
    pub name: Option<String>,
    pub species: Option<Species>,
    pub rarity: Option<Rarity>,
    pub trait_: Option<Trait>,
    pub stats: StatPatch,
}

#[derive(Debug, Clone, Default)]
pub struct PetFilter {
    pub species: Option<Species>,
    pub rarity: Option<Rarity>,
    pub trait_: Option<Trait>,
    pub min_happiness: Option<i32>,
    pub max_happiness: Option<i32>,
}

pub struct PetRepository {
    conn: DatabaseConnection,
}

impl PetRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new_pet: NewPet) -> Result<Pet> {
        let now = chrono::Utc::now().to_rfc3339();
        let stats = new_pet.stats.clamped();

        let active = pets::ActiveModel {
            name: Set(new_pet.name),
            species: Set(new_pet.species.as_str().to_string()),
            rarity: Set(new_pet.rarity.as_str().to_string()),
            pet_trait: Set(new_pet.trait_.as_str().to_string()),
            accessory: Set(new_pet.accessory.as_str().to_string()),
            hunger: Set(stats.hunger),
            happiness: Set(stats.happiness),
            energy: Set(stats.energy),
            owner_id: Set(new_pet.owner_id),
            created_by: Set(new_pet.created_by.as_str().to_string()),
            birth_date: Set(now.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert pet")?;

        Pet::try_from(model).map_err(Into::into)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Pet>> {
        let pet = pets::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query pet by ID")?;

        pet.map(Pet::try_from).transpose().map_err(Into::into)
    }

    /// A pet only counts as found when it belongs to the given owner.
    pub async fn find_owned(&self, id: i32, owner_id: i32) -> Result<Option<Pet>> {
        let pet = pets::Entity::find_by_id(id)
            .filter(pets::Column::OwnerId.eq(owner_id))
            .one(&self.conn)
            .await
            .context("Failed to query owned pet")?;

        pet.map(Pet::try_from).transpose().map_err(Into::into)
    }

    pub async fn list_by_owner(&self, owner_id: i32) -> Result<Vec<Pet>> {
        let rows = pets::Entity::find()
            .filter(pets::Column::OwnerId.eq(owner_id))
            .order_by_asc(pets::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list pets by owner")?;

        rows.into_iter()
            .map(|m| Pet::try_from(m).map_err(Into::into))
            .collect()
    }

    pub async fn list_filtered(&self, filter: &PetFilter) -> Result<Vec<Pet>> {
        let mut query = pets::Entity::find();

        if let Some(species) = filter.species {
            query = query.filter(pets::Column::Species.eq(species.as_str()));
        }
        if let Some(rarity) = filter.rarity {
            query = query.filter(pets::Column::Rarity.eq(rarity.as_str()));
        }
        if let Some(trait_) = filter.trait_ {
            query = query.filter(pets::Column::PetTrait.eq(trait_.as_str()));
        }
        if let Some(min) = filter.min_happiness {
            query = query.filter(pets::Column::Happiness.gte(min));
        }
        if let Some(max) = filter.max_happiness {
            query = query.filter(pets::Column::Happiness.lte(max));
        }

        let rows = query
            .order_by_asc(pets::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list pets")?;

        rows.into_iter()
            .map(|m| Pet::try_from(m).map_err(Into::into))
            .collect()
    }

    /// Apply a stat patch, clamping each provided value to [0, 100].
    /// Returns `None` when the pet does not exist.
    pub async fn update_stats(&self, id: i32, patch: StatPatch) -> Result<Option<Pet>> {
        let Some(model) = pets::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query pet for stat update")?
        else {
            return Ok(None);
        };

        let mut active: pets::ActiveModel = model.into();
        if let Some(hunger) = patch.hunger {
            active.hunger = Set(crate::models::pet::clamp_stat(hunger));
        }
        if let Some(happiness) = patch.happiness {
            active.happiness = Set(crate::models::pet::clamp_stat(happiness));
        }
        if let Some(energy) = patch.energy {
            active.energy = Set(crate::models::pet::clamp_stat(energy));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update pet stats")?;

        Ok(Some(Pet::try_from(model)?))
    }

    pub async fn update_accessory(&self, id: i32, accessory: Accessory) -> Result<Option<Pet>> {
        let Some(model) = pets::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query pet for accessory update")?
        else {
            return Ok(None);
        };

        let mut active: pets::ActiveModel = model.into();
        active.accessory = Set(accessory.as_str().to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update pet accessory")?;

        Ok(Some(Pet::try_from(model)?))
    }

    pub async fn update_partial(&self, id: i32, patch: PetPatch) -> Result<Option<Pet>> {
        let Some(model) = pets::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query pet for update")?
        else {
            return Ok(None);
        };

        let mut active: pets::ActiveModel = model.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(species) = patch.species {
            active.species = Set(species.as_str().to_string());
        }
        if let Some(rarity) = patch.rarity {
            active.rarity = Set(rarity.as_str().to_string());
        }
        if let Some(trait_) = patch.trait_ {
            active.pet_trait = Set(trait_.as_str().to_string());
        }
        if let Some(hunger) = patch.stats.hunger {
            active.hunger = Set(crate::models::pet::clamp_stat(hunger));
        }
        if let Some(happiness) = patch.stats.happiness {
            active.happiness = Set(crate::models::pet::clamp_stat(happiness));
        }
        if let Some(energy) = patch.stats.energy {
            active.energy = Set(crate::models::pet::clamp_stat(energy));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update pet")?;

        Ok(Some(Pet::try_from(model)?))
    }

    /// Delete a pet unconditionally. Returns the deleted pet for the
    /// confirmation payload, or `None` when absent.
    pub async fn delete(&self, id: i32) -> Result<Option<Pet>> {
        let Some(model) = pets::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query pet for deletion")?
        else {
            return Ok(None);
        };

        let pet = Pet::try_from(model.clone())?;
        model
            .delete(&self.conn)
            .await
            .context("Failed to delete pet")?;

        Ok(Some(pet))
    }

    /// Delete a pet only if it belongs to the given owner.
    pub async fn delete_owned(&self, id: i32, owner_id: i32) -> Result<Option<Pet>> {
        let Some(model) = pets::Entity::find_by_id(id)
            .filter(pets::Column::OwnerId.eq(owner_id))
            .one(&self.conn)
            .await
            .context("Failed to query owned pet for deletion")?
        else {
            return Ok(None);
        };

        let pet = Pet::try_from(model.clone())?;
        model
            .delete(&self.conn)
            .await
            .context("Failed to delete pet")?;

        Ok(Some(pet))
    }
}
