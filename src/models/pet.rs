use serde::{Deserialize, Serialize};

use crate::entities::pets;

/// Failed to parse a pet enum field from its wire/storage string.
#[derive(Debug, thiserror::Error)]
#[error("Invalid {field}. Must be one of: {allowed}")]
pub struct ParseEnumError {
    pub field: &'static str,
    pub allowed: String,
}

macro_rules! string_enum {
    ($name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            /// Comma-separated list of accepted values, for error messages.
            #[must_use]
            pub fn allowed_values() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError {
                        field: $field,
                        allowed: Self::allowed_values(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(Species, "species", {
    Dragon => "dragon",
    Cat => "cat",
    Dog => "dog",
    Rat => "rat",
    Elf => "elf",
    Robot => "robot",
    Wolf => "wolf",
    Deer => "deer",
    Duck => "duck",
    Bear => "bear",
});

string_enum!(Rarity, "rarity", {
    Common => "Common",
    Rare => "Rare",
    Epic => "Epic",
    Legendary => "Legendary",
});

string_enum!(Trait, "trait", {
    FireBreath => "Fire Breath",
    Glowing => "Glowing",
    CanSing => "Can Sing",
    Invisible => "Invisible",
    Flying => "Flying",
    WaterBreathing => "Water Breathing",
    FastMoving => "Fast Moving",
    Giant => "Giant",
    Tiny => "Tiny",
    None => "None",
});

string_enum!(Accessory, "accessory", {
    None => "None",
    Bow => "Bow",
    Hat => "Hat",
});

string_enum!(CreatedVia, "createdBy", {
    Web => "web",
    Api => "api",
});

impl Default for Rarity {
    fn default() -> Self {
        Self::Common
    }
}

impl Default for Trait {
    fn default() -> Self {
        Self::None
    }
}

impl Default for Accessory {
    fn default() -> Self {
        Self::None
    }
}

/// Stat value below which a pet is considered in need of care.
pub const CARE_THRESHOLD: i32 = 30;

const STAT_MIN: i32 = 0;
const STAT_MAX: i32 = 100;
const STAT_DEFAULT: i32 = 50;

/// Clamp a stat to the storable [0, 100] range. Out-of-range input is
/// accepted and coerced, never rejected.
#[must_use]
pub const fn clamp_stat(value: i32) -> i32 {
    if value < STAT_MIN {
        STAT_MIN
    } else if value > STAT_MAX {
        STAT_MAX
    } else {
        value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetStats {
    pub hunger: i32,
    pub happiness: i32,
    pub energy: i32,
}

impl Default for PetStats {
    fn default() -> Self {
        Self {
            hunger: STAT_DEFAULT,
            happiness: STAT_DEFAULT,
            energy: STAT_DEFAULT,
        }
    }
}

impl PetStats {
    #[must_use]
    pub const fn clamped(self) -> Self {
        Self {
            hunger: clamp_stat(self.hunger),
            happiness: clamp_stat(self.happiness),
            energy: clamp_stat(self.energy),
        }
    }

    #[must_use]
    pub const fn needs_care(&self) -> bool {
        self.hunger < CARE_THRESHOLD
            || self.happiness < CARE_THRESHOLD
            || self.energy < CARE_THRESHOLD
    }
}

#[derive(Debug, Clone)]
pub struct Pet {
    pub id: i32,
    pub name: String,
    pub species: Species,
    pub rarity: Rarity,
    pub trait_: Trait,
    pub accessory: Accessory,
    pub stats: PetStats,
    pub owner_id: Option<i32>,
    pub created_by: CreatedVia,
    pub birth_date: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Pet {
    /// Image path derived from species and accessory.
    #[must_use]
    pub fn image_url(&self) -> String {
        match self.accessory {
            Accessory::None => format!("/images/{}.png", self.species),
            other => format!(
                "/images/{}_{}.png",
                self.species,
                other.as_str().to_lowercase()
            ),
        }
    }

    #[must_use]
    pub const fn rarity_color(&self) -> &'static str {
        match self.rarity {
            Rarity::Common => "#6c757d",
            Rarity::Rare => "#17a2b8",
            Rarity::Epic => "#6f42c1",
            Rarity::Legendary => "#e83e8c",
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self.species {
            Species::Dragon => {
                "Majestic flying creature with ancient wisdom and powerful breath attacks."
            }
            Species::Cat => "Agile and independent companion with mysterious nocturnal habits.",
            Species::Dog => "Loyal and energetic friend who loves to play and protect its owner.",
            Species::Rat => "Clever and quick creature with excellent problem-solving skills.",
            Species::Elf => "Magical forest being with connection to nature and ancient magic.",
            Species::Robot => "Futuristic tech companion programmed for assistance and friendship.",
            Species::Wolf => "Wild and free spirit with strong pack instincts and keen senses.",
            Species::Deer => "Graceful forest dweller known for its speed and gentle nature.",
            Species::Duck => "Cheerful water lover with excellent swimming and flying abilities.",
            Species::Bear => "Strong and protective creature with surprising intelligence and warmth.",
        }
    }

    #[must_use]
    pub const fn needs_care(&self) -> bool {
        self.stats.needs_care()
    }
}

impl TryFrom<pets::Model> for Pet {
    type Error = ParseEnumError;

    fn try_from(model: pets::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            species: model.species.parse()?,
            rarity: model.rarity.parse()?,
            trait_: model.pet_trait.parse()?,
            accessory: model.accessory.parse()?,
            stats: PetStats {
                hunger: model.hunger,
                happiness: model.happiness,
                energy: model.energy,
            },
            owner_id: model.owner_id,
            created_by: model.created_by.parse()?,
            birth_date: model.birth_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pet() -> Pet {
        Pet {
            id: 1,
            name: "Ember".to_string(),
            species: Species::Dragon,
            rarity: Rarity::Legendary,
            trait_: Trait::FireBreath,
            accessory: Accessory::None,
            stats: PetStats::default(),
            owner_id: None,
            created_by: CreatedVia::Api,
            birth_date: "2026-01-01T00:00:00Z".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_clamp_stat_bounds() {
        assert_eq!(clamp_stat(500), 100);
        assert_eq!(clamp_stat(-20), 0);
        assert_eq!(clamp_stat(0), 0);
        assert_eq!(clamp_stat(100), 100);
        assert_eq!(clamp_stat(42), 42);
    }

    #[test]
    fn test_stats_clamped() {
        let stats = PetStats {
            hunger: 500,
            happiness: -20,
            energy: 73,
        };
        let clamped = stats.clamped();
        assert_eq!(clamped.hunger, 100);
        assert_eq!(clamped.happiness, 0);
        assert_eq!(clamped.energy, 73);
    }

    #[test]
    fn test_needs_care_threshold() {
        let mut stats = PetStats::default();
        assert!(!stats.needs_care());

        stats.hunger = 29;
        assert!(stats.needs_care());

        stats.hunger = 30;
        assert!(!stats.needs_care());
    }

    #[test]
    fn test_species_parsing() {
        assert_eq!("dragon".parse::<Species>().unwrap(), Species::Dragon);
        assert!("Dragon".parse::<Species>().is_err());
        assert!("unicorn".parse::<Species>().is_err());
    }

    #[test]
    fn test_trait_wire_strings() {
        assert_eq!(Trait::FireBreath.as_str(), "Fire Breath");
        assert_eq!(
            "Water Breathing".parse::<Trait>().unwrap(),
            Trait::WaterBreathing
        );
    }

    #[test]
    fn test_image_url_with_accessory() {
        let mut pet = sample_pet();
        assert_eq!(pet.image_url(), "/images/dragon.png");

        pet.accessory = Accessory::Bow;
        assert_eq!(pet.image_url(), "/images/dragon_bow.png");

        pet.species = Species::Cat;
        pet.accessory = Accessory::Hat;
        assert_eq!(pet.image_url(), "/images/cat_hat.png");
    }

    #[test]
    fn test_rarity_colors() {
        let mut pet = sample_pet();
        assert_eq!(pet.rarity_color(), "#e83e8c");
        pet.rarity = Rarity::Common;
        assert_eq!(pet.rarity_color(), "#6c757d");
    }
}
