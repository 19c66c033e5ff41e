use std::str::FromStr;

use super::ApiError;
use crate::models::pet::ParseEnumError;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 30;
pub const PASSWORD_MIN: usize = 6;
pub const PET_NAME_MAX: usize = 30;

pub fn validate_username(username: &str) -> Result<&str, ApiError> {
    let trimmed = username.trim();
    if trimmed.len() < USERNAME_MIN {
        return Err(ApiError::validation(format!(
            "Username must be at least {} characters long",
            USERNAME_MIN
        )));
    }
    if trimmed.len() > USERNAME_MAX {
        return Err(ApiError::validation(format!(
            "Username must be {} characters or less",
            USERNAME_MAX
        )));
    }
    Ok(trimmed)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.len() < PASSWORD_MIN {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters long",
            PASSWORD_MIN
        )));
    }
    Ok(password)
}

pub fn validate_pet_name(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Pet name and species are required fields"));
    }
    if trimmed.len() > PET_NAME_MAX {
        return Err(ApiError::validation(format!(
            "Pet name must be {} characters or less",
            PET_NAME_MAX
        )));
    }
    Ok(trimmed)
}

/// Parse an enum-valued field that must be present.
pub fn parse_required<T>(value: Option<&str>, field: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = ParseEnumError>,
{
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(format!("{} field is required", field)))?;
    value.parse().map_err(ApiError::from)
}

/// Parse an enum-valued field that may be absent; absent yields the default.
pub fn parse_or_default<T>(value: Option<&str>) -> Result<T, ApiError>
where
    T: FromStr<Err = ParseEnumError> + Default,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse().map_err(ApiError::from),
        None => Ok(T::default()),
    }
}

/// Parse an enum-valued field that may be absent; absent yields `None`.
pub fn parse_optional<T>(value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = ParseEnumError>,
{
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.parse().map_err(ApiError::from))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pet::{Accessory, Rarity, Species, Trait};

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username("alice").unwrap(), "alice");
        assert_eq!(validate_username("  bob  ").unwrap(), "bob");
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_pet_name() {
        assert_eq!(validate_pet_name(" Rex ").unwrap(), "Rex");
        assert!(validate_pet_name("").is_err());
        assert!(validate_pet_name("   ").is_err());
        assert!(validate_pet_name(&"x".repeat(31)).is_err());
    }

    #[test]
    fn test_parse_required_species() {
        assert_eq!(
            parse_required::<Species>(Some("dragon"), "species").unwrap(),
            Species::Dragon
        );
        assert!(parse_required::<Species>(Some("unicorn"), "species").is_err());
        assert!(parse_required::<Species>(None, "species").is_err());
        assert!(parse_required::<Species>(Some(""), "species").is_err());
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(parse_or_default::<Rarity>(None).unwrap(), Rarity::Common);
        assert_eq!(parse_or_default::<Trait>(Some("Tiny")).unwrap(), Trait::Tiny);
        assert!(parse_or_default::<Accessory>(Some("Crown")).is_err());
    }

    #[test]
    fn test_parse_optional() {
        assert_eq!(parse_optional::<Rarity>(None).unwrap(), None);
        assert_eq!(
            parse_optional::<Rarity>(Some("Epic")).unwrap(),
            Some(Rarity::Epic)
        );
        assert!(parse_optional::<Rarity>(Some("Mythic")).is_err());
    }
}
