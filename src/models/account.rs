use serde::{Deserialize, Serialize};

use crate::entities::users;

/// Supported federated identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Facebook,
}

impl Provider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = InvalidAccountRow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Self::Google),
            "facebook" => Ok(Self::Facebook),
            other => Err(InvalidAccountRow::UnknownProvider(other.to_string())),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account is either local (password login) or federated (provider login),
/// never both. The storage row keeps nullable columns; this sum type is the
/// only shape handler code sees.
#[derive(Debug, Clone)]
pub enum AccountKind {
    Local {
        password_hash: String,
    },
    Federated {
        provider: Provider,
        provider_id: String,
        profile_picture: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub kind: AccountKind,
    pub created_at: String,
    pub updated_at: String,
}

impl Account {
    #[must_use]
    pub const fn is_federated(&self) -> bool {
        matches!(self.kind, AccountKind::Federated { .. })
    }

    /// The provider for federated accounts, `None` for local ones.
    #[must_use]
    pub const fn provider(&self) -> Option<Provider> {
        match self.kind {
            AccountKind::Federated { provider, .. } => Some(provider),
            AccountKind::Local { .. } => None,
        }
    }
}

/// A stored row that violates the local/federated invariant.
#[derive(Debug, thiserror::Error)]
pub enum InvalidAccountRow {
    #[error("account '{0}' is flagged federated but has no provider identity")]
    FederatedWithoutProvider(String),

    #[error("account '{0}' is local but has no password hash")]
    LocalWithoutPassword(String),

    #[error("unknown oauth provider '{0}'")]
    UnknownProvider(String),
}

impl TryFrom<users::Model> for Account {
    type Error = InvalidAccountRow;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        let kind = if model.is_federated {
            let provider: Provider = model
                .oauth_provider
                .as_deref()
                .ok_or_else(|| InvalidAccountRow::FederatedWithoutProvider(model.username.clone()))?
                .parse()?;

            let provider_id = match provider {
                Provider::Google => model.google_id.clone(),
                Provider::Facebook => model.facebook_id.clone(),
            }
            .ok_or_else(|| InvalidAccountRow::FederatedWithoutProvider(model.username.clone()))?;

            AccountKind::Federated {
                provider,
                provider_id,
                profile_picture: model.profile_picture.clone(),
            }
        } else {
            let password_hash = model
                .password_hash
                .clone()
                .ok_or_else(|| InvalidAccountRow::LocalWithoutPassword(model.username.clone()))?;

            AccountKind::Local { password_hash }
        };

        Ok(Self {
            id: model.id,
            username: model.username,
            email: model.email,
            display_name: model.display_name,
            kind,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Derive a username candidate from the local part of an email address:
/// lowercased, non-alphanumeric characters stripped. The repository appends a
/// numeric suffix when the candidate is taken.
#[must_use]
pub fn username_candidate(email: &str) -> String {
    let local_part = email.split('@').next().unwrap_or(email);
    local_part
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Profile data delivered by an identity provider's callback.
#[derive(Debug, Clone, Deserialize)]
pub struct FederatedProfile {
    pub provider_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub profile_picture: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_row() -> users::Model {
        users::Model {
            id: 1,
            username: "alice".to_string(),
            email: None,
            password_hash: Some("$argon2id$stub".to_string()),
            google_id: None,
            facebook_id: None,
            is_federated: false,
            oauth_provider: None,
            display_name: None,
            profile_picture: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_local_row_maps_to_local_kind() {
        let account = Account::try_from(local_row()).unwrap();
        assert!(!account.is_federated());
        assert!(account.provider().is_none());
    }

    #[test]
    fn test_local_row_without_hash_is_rejected() {
        let mut row = local_row();
        row.password_hash = None;
        assert!(matches!(
            Account::try_from(row),
            Err(InvalidAccountRow::LocalWithoutPassword(_))
        ));
    }

    #[test]
    fn test_federated_row_maps_to_federated_kind() {
        let mut row = local_row();
        row.password_hash = None;
        row.is_federated = true;
        row.oauth_provider = Some("google".to_string());
        row.google_id = Some("g-123".to_string());
        row.email = Some("alice@example.com".to_string());

        let account = Account::try_from(row).unwrap();
        assert_eq!(account.provider(), Some(Provider::Google));
        match account.kind {
            AccountKind::Federated { provider_id, .. } => assert_eq!(provider_id, "g-123"),
            AccountKind::Local { .. } => panic!("expected federated account"),
        }
    }

    #[test]
    fn test_federated_row_without_provider_id_is_rejected() {
        let mut row = local_row();
        row.password_hash = None;
        row.is_federated = true;
        row.oauth_provider = Some("google".to_string());
        assert!(Account::try_from(row).is_err());
    }

    #[test]
    fn test_username_candidate() {
        assert_eq!(username_candidate("a.b@x.com"), "ab");
        assert_eq!(username_candidate("Jane.Doe+spam@gmail.com"), "janedoespam");
        assert_eq!(username_candidate("plain"), "plain");
    }
}
