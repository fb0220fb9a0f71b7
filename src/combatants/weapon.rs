//! Weapons and their range category

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static RANGED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:(?:long|short|cross)?bows?|slings?|crossbows?)\b").unwrap()
});

/// Whether a weapon is swung or shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponRange {
    Melee,
    Ranged,
}

/// An equipped weapon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    /// Damage expression, e.g. "1d8" or "1d4+1"
    pub damage: String,
}

impl Weapon {
    pub fn new(name: &str, damage: &str) -> Self {
        Self {
            name: name.to_string(),
            damage: damage.to_string(),
        }
    }

    /// Range category, derived from the weapon's name
    pub fn range(&self) -> WeaponRange {
        if RANGED_REGEX.is_match(&self.name) {
            WeaponRange::Ranged
        } else {
            WeaponRange::Melee
        }
    }

    pub fn is_ranged(&self) -> bool {
        self.range() == WeaponRange::Ranged
    }
}
