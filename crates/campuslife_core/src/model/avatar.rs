//! Avatar customizer model.
//!
//! # Invariants
//! - Each slot holds an id from its fixed option set.
//! - `none` is a valid choice for every slot and is the default.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const NO_SELECTION: &str = "none";

pub const UPPER_HAIR_OPTIONS: &[&str] = &["none", "upper1", "upper2", "upper3"];
pub const LOWER_HAIR_OPTIONS: &[&str] = &[
    "none", "lower1", "lower2", "lower3", "lower4", "lower5", "lower6",
];
pub const OUTFIT_OPTIONS: &[&str] = &["none", "default", "dress"];
pub const ACCESSORY_OPTIONS: &[&str] = &["none", "glasses"];

/// Customizable avatar layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarSlot {
    UpperHair,
    LowerHair,
    Outfit,
    Accessory,
}

impl AvatarSlot {
    pub const ALL: [AvatarSlot; 4] = [
        AvatarSlot::UpperHair,
        AvatarSlot::LowerHair,
        AvatarSlot::Outfit,
        AvatarSlot::Accessory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpperHair => "upper_hair",
            Self::LowerHair => "lower_hair",
            Self::Outfit => "outfit",
            Self::Accessory => "accessory",
        }
    }

    pub fn options(self) -> &'static [&'static str] {
        match self {
            Self::UpperHair => UPPER_HAIR_OPTIONS,
            Self::LowerHair => LOWER_HAIR_OPTIONS,
            Self::Outfit => OUTFIT_OPTIONS,
            Self::Accessory => ACCESSORY_OPTIONS,
        }
    }
}

impl FromStr for AvatarSlot {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        AvatarSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown avatar slot `{}`; expected upper_hair|lower_hair|outfit|accessory",
                    value.trim()
                )
            })
    }
}

/// Option id not offered for a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAvatarOption {
    pub slot: AvatarSlot,
    pub value: String,
}

impl Display for InvalidAvatarOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid {} option `{}`; expected one of {}",
            self.slot.as_str(),
            self.value,
            self.slot.options().join("|")
        )
    }
}

impl Error for InvalidAvatarOption {}

/// Selected option per avatar slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarConfig {
    pub upper_hair: String,
    pub lower_hair: String,
    pub outfit: String,
    pub accessory: String,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            upper_hair: NO_SELECTION.to_string(),
            lower_hair: NO_SELECTION.to_string(),
            outfit: NO_SELECTION.to_string(),
            accessory: NO_SELECTION.to_string(),
        }
    }
}

impl AvatarConfig {
    pub fn get(&self, slot: AvatarSlot) -> &str {
        match slot {
            AvatarSlot::UpperHair => &self.upper_hair,
            AvatarSlot::LowerHair => &self.lower_hair,
            AvatarSlot::Outfit => &self.outfit,
            AvatarSlot::Accessory => &self.accessory,
        }
    }

    /// Sets one slot after checking the option set.
    pub fn set(&mut self, slot: AvatarSlot, value: &str) -> Result<(), InvalidAvatarOption> {
        let value = value.trim();
        if !slot.options().contains(&value) {
            return Err(InvalidAvatarOption {
                slot,
                value: value.to_string(),
            });
        }
        let target = match slot {
            AvatarSlot::UpperHair => &mut self.upper_hair,
            AvatarSlot::LowerHair => &mut self.lower_hair,
            AvatarSlot::Outfit => &mut self.outfit,
            AvatarSlot::Accessory => &mut self.accessory,
        };
        *target = value.to_string();
        Ok(())
    }

    pub fn validate(&self) -> Result<(), InvalidAvatarOption> {
        for slot in AvatarSlot::ALL {
            let value = self.get(slot);
            if !slot.options().contains(&value) {
                return Err(InvalidAvatarOption {
                    slot,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AvatarConfig, AvatarSlot};

    #[test]
    fn slot_names_parse_loosely() {
        assert_eq!("Upper-Hair".parse::<AvatarSlot>(), Ok(AvatarSlot::UpperHair));
        assert_eq!(" outfit ".parse::<AvatarSlot>(), Ok(AvatarSlot::Outfit));
        assert!("hat".parse::<AvatarSlot>().is_err());
    }

    #[test]
    fn default_is_all_none_and_valid() {
        let config = AvatarConfig::default();
        assert_eq!(config.get(AvatarSlot::Outfit), "none");
        config.validate().unwrap();
    }

    #[test]
    fn set_rejects_option_from_another_slot() {
        let mut config = AvatarConfig::default();
        let err = config.set(AvatarSlot::UpperHair, "lower2").unwrap_err();
        assert_eq!(err.slot, AvatarSlot::UpperHair);
        assert_eq!(config.upper_hair, "none");
    }
}
