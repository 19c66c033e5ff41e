use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::models::account::{Account, FederatedProfile, Provider};
use crate::models::pet::{Accessory, Pet};

pub mod migrator;
pub mod repositories;

pub use repositories::pet::{NewPet, PetFilter, PetPatch, StatPatch};
pub use repositories::user::CreateAccountError;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn pet_repo(&self) -> repositories::pet::PetRepository {
        repositories::pet::PetRepository::new(self.conn.clone())
    }

    // Accounts

    pub async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        self.user_repo().find_by_username(username).await
    }

    pub async fn find_account_by_id(&self, id: i32) -> Result<Option<Account>> {
        self.user_repo().find_by_id(id).await
    }

    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.user_repo().find_by_email(email).await
    }

    pub async fn create_local_account(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<Account, CreateAccountError> {
        self.user_repo()
            .create_local(username, password, security)
            .await
    }

    pub async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        self.user_repo()
            .verify_password(password, password_hash)
            .await
    }

    pub async fn generate_username(&self, email: &str) -> Result<String> {
        self.user_repo().generate_username(email).await
    }

    pub async fn link_or_create_federated(
        &self,
        provider: Provider,
        profile: &FederatedProfile,
    ) -> Result<Account> {
        self.user_repo()
            .link_or_create_federated(provider, profile)
            .await
    }

    // Pets

    pub async fn create_pet(&self, new_pet: NewPet) -> Result<Pet> {
        self.pet_repo().create(new_pet).await
    }

    pub async fn get_pet(&self, id: i32) -> Result<Option<Pet>> {
        self.pet_repo().find_by_id(id).await
    }

    pub async fn get_owned_pet(&self, id: i32, owner_id: i32) -> Result<Option<Pet>> {
        self.pet_repo().find_owned(id, owner_id).await
    }

    pub async fn list_pets_by_owner(&self, owner_id: i32) -> Result<Vec<Pet>> {
        self.pet_repo().list_by_owner(owner_id).await
    }

    pub async fn list_pets(&self, filter: &PetFilter) -> Result<Vec<Pet>> {
        self.pet_repo().list_filtered(filter).await
    }

    pub async fn update_pet_stats(&self, id: i32, patch: StatPatch) -> Result<Option<Pet>> {
        self.pet_repo().update_stats(id, patch).await
    }

    pub async fn update_pet_accessory(
        &self,
        id: i32,
        accessory: Accessory,
    ) -> Result<Option<Pet>> {
        self.pet_repo().update_accessory(id, accessory).await
    }

    pub async fn update_pet(&self, id: i32, patch: PetPatch) -> Result<Option<Pet>> {
        self.pet_repo().update_partial(id, patch).await
    }

    pub async fn delete_pet(&self, id: i32) -> Result<Option<Pet>> {
        self.pet_repo().delete(id).await
    }

    pub async fn delete_owned_pet(&self, id: i32, owner_id: i32) -> Result<Option<Pet>> {
        self.pet_repo().delete_owned(id, owner_id).await
    }
}
