use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::users;
use crate::models::account::{Account, FederatedProfile, Provider, username_candidate};

/// Creating an account can fail on a uniqueness constraint, which the API
/// layer reports differently from other store failures.
#[derive(Debug, thiserror::Error)]
pub enum CreateAccountError {
    #[error("username or email already exists")]
    Duplicate,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        user.map(Account::try_from).transpose().map_err(Into::into)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Account>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        user.map(Account::try_from).transpose().map_err(Into::into)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.to_lowercase()))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        user.map(Account::try_from).transpose().map_err(Into::into)
    }

    pub async fn find_by_provider_id(
        &self,
        provider: Provider,
        provider_id: &str,
    ) -> Result<Option<Account>> {
        let column = match provider {
            Provider::Google => users::Column::GoogleId,
            Provider::Facebook => users::Column::FacebookId,
        };

        let user = users::Entity::find()
            .filter(column.eq(provider_id))
            .one(&self.conn)
            .await
            .context("Failed to query user by provider id")?;

        user.map(Account::try_from).transpose().map_err(Into::into)
    }

    /// Create a local account. The password is hashed exactly once, here.
    pub async fn create_local(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<Account, CreateAccountError> {
        let password = password.to_string();
        let security = security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            username: Set(username.to_string()),
            email: Set(None),
            password_hash: Set(Some(password_hash)),
            is_federated: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = match active.insert(&self.conn).await {
            Ok(model) => model,
            Err(err) if is_unique_violation(&err) => return Err(CreateAccountError::Duplicate),
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context("Failed to insert user")
                    .into());
            }
        };

        Account::try_from(model)
            .map_err(anyhow::Error::new)
            .map_err(Into::into)
    }

    /// Verify a candidate password against a stored hash.
    /// Runs on `spawn_blocking` because Argon2 verification is CPU-bound.
    pub async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();

        task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")?
    }

    /// Derive a free username from an email's local part, appending an
    /// incrementing numeric suffix while the candidate is taken.
    pub async fn generate_username(&self, email: &str) -> Result<String> {
        let base = username_candidate(email);
        let mut candidate = base.clone();
        let mut counter = 1u32;

        while self.username_taken(&candidate).await? {
            candidate = format!("{base}{counter}");
            counter += 1;
        }

        Ok(candidate)
    }

    async fn username_taken(&self, username: &str) -> Result<bool> {
        let existing = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to check username availability")?;
        Ok(existing.is_some())
    }

    /// Resolve a federated login to an account:
    /// an account already holding this provider id wins; otherwise the
    /// provider is linked onto an account matched by email; otherwise a new
    /// federated account is created under a generated username.
    pub async fn link_or_create_federated(
        &self,
        provider: Provider,
        profile: &FederatedProfile,
    ) -> Result<Account> {
        if let Some(account) = self
            .find_by_provider_id(provider, &profile.provider_id)
            .await?
        {
            return Ok(account);
        }

        let email = profile.email.to_lowercase();

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(&self.conn)
            .await
            .context("Failed to query user by email for linking")?;

        let now = chrono::Utc::now().to_rfc3339();

        if let Some(model) = existing {
            let mut active: users::ActiveModel = model.into();
            match provider {
                Provider::Google => active.google_id = Set(Some(profile.provider_id.clone())),
                Provider::Facebook => active.facebook_id = Set(Some(profile.provider_id.clone())),
            }
            active.password_hash = Set(None);
            active.is_federated = Set(true);
            active.oauth_provider = Set(Some(provider.as_str().to_string()));
            active.profile_picture = Set(profile.profile_picture.clone());
            active.updated_at = Set(now);

            let model = active
                .update(&self.conn)
                .await
                .context("Failed to link provider to existing account")?;
            return Account::try_from(model).map_err(Into::into);
        }

        let username = self.generate_username(&email).await?;

        let mut active = users::ActiveModel {
            username: Set(username),
            email: Set(Some(email)),
            password_hash: Set(None),
            is_federated: Set(true),
            oauth_provider: Set(Some(provider.as_str().to_string())),
            display_name: Set(profile.display_name.clone()),
            profile_picture: Set(profile.profile_picture.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };
        match provider {
            Provider::Google => active.google_id = Set(Some(profile.provider_id.clone())),
            Provider::Facebook => active.facebook_id = Set(Some(profile.provider_id.clone())),
        }

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to create federated account")?;

        Account::try_from(model).map_err(Into::into)
    }
}

fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    err.to_string().contains("UNIQUE constraint failed")
}

/// Hash a password with Argon2id using the configured cost parameters.
pub fn hash_password(password: &str, security: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        security.argon2_memory_cost_kib,
        security.argon2_time_cost,
        security.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
