//! Trade goods
//!
//! A trade good is the odd item a peasant carries into the dungeon: a hen,
//! a flask of oil, a coil of rope. Mighty deeds improvise with it. The item's
//! name decides which kind it is, and the kind decides what a mighty
//! critical or a mighty fumble does.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::effects::EffectSpec;

/// Broad families of trade goods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeGoodKind {
    Flammable,
    Binding,
    Livestock,
    Powder,
    Tool,
    Light,
    Curio,
}

static KIND_PATTERNS: LazyLock<Vec<(TradeGoodKind, Regex)>> = LazyLock::new(|| {
    [
        (
            TradeGoodKind::Flammable,
            r"oil|flasks?|lamps?|tar|pitch|brandy|wine|ale|spirits",
        ),
        (TradeGoodKind::Light, r"torch(?:es)?|candles?|lanterns?"),
        (
            TradeGoodKind::Binding,
            r"ropes?|nets?|chains?|twine|cords?|yarn|rugs?|cloth|cloaks?|blankets?",
        ),
        (
            TradeGoodKind::Livestock,
            r"chickens?|hens?|geese|goose|ducks?|goats?|pigs?|piglets?|sheep|mules?|pon(?:y|ies)|dogs?|cats?|rats?|ferrets?|cows?|ox(?:en)?|lambs?",
        ),
        (
            TradeGoodKind::Powder,
            r"flour|salt|sand|herbs?|spices?|pepper|chalk|ash(?:es)?|soot|powder|dust|night soil",
        ),
        (
            TradeGoodKind::Tool,
            r"hammers?|shovels?|crowbars?|picks?|chisels?|saws?|trowels?|tongs|awls?|cleavers?|pitchforks?|hoes?|scythes?|mallets?|anvils?",
        ),
    ]
    .into_iter()
    .map(|(kind, words)| (kind, Regex::new(&format!(r"(?i)\b(?:{words})\b")).unwrap()))
    .collect()
});

/// The trade good a character carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeGood {
    pub name: String,
}

/// What a trade good adds to a mighty critical
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeedBonus {
    pub narrative: &'static str,
    /// Extra damage dice on top of the critical damage
    pub extra_damage: Option<&'static str>,
    /// Effects placed on the monster
    pub on_monster: &'static [EffectSpec],
    /// Effects placed on the character
    pub on_character: &'static [EffectSpec],
}

/// What a trade good does to its owner on a mighty fumble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeedBacklash {
    pub narrative: &'static str,
    pub self_damage: Option<&'static str>,
    pub on_character: &'static [EffectSpec],
}

impl TradeGood {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Classify by name; anything unrecognized is a curio
    pub fn kind(&self) -> TradeGoodKind {
        KIND_PATTERNS
            .iter()
            .find(|(_, pattern)| pattern.is_match(&self.name))
            .map(|(kind, _)| *kind)
            .unwrap_or(TradeGoodKind::Curio)
    }

    pub fn mighty_critical(&self) -> DeedBonus {
        self.kind().mighty_critical()
    }

    pub fn mighty_fumble(&self) -> DeedBacklash {
        self.kind().mighty_fumble()
    }
}

impl TradeGoodKind {
    pub fn mighty_critical(self) -> DeedBonus {
        match self {
            TradeGoodKind::Flammable => DeedBonus {
                narrative: "splashes it across the foe and sets it ablaze",
                extra_damage: Some("1d6"),
                on_monster: &[],
                on_character: &[],
            },
            TradeGoodKind::Light => DeedBonus {
                narrative: "thrusts the flame into the foe's eyes",
                extra_damage: Some("1d4"),
                on_monster: &[EffectSpec::SkipNextAction],
                on_character: &[],
            },
            TradeGoodKind::Binding => DeedBonus {
                narrative: "wraps the foe up tight",
                extra_damage: None,
                on_monster: &[
                    EffectSpec::SkipNextAction,
                    EffectSpec::Exposed { bonus: 2, uses: 1 },
                ],
                on_character: &[],
            },
            TradeGoodKind::Livestock => DeedBonus {
                narrative: "flings the squawking beast at the foe's face",
                extra_damage: None,
                on_monster: &[EffectSpec::AttackPenalty { amount: 2, uses: 2 }],
                on_character: &[],
            },
            TradeGoodKind::Powder => DeedBonus {
                narrative: "hurls a blinding cloud into the foe's eyes",
                extra_damage: None,
                on_monster: &[EffectSpec::AttackPenalty { amount: 4, uses: 1 }],
                on_character: &[EffectSpec::AttackBonus { amount: 1, uses: 1 }],
            },
            TradeGoodKind::Tool => DeedBonus {
                narrative: "batters a dent into the foe's hide",
                extra_damage: Some("1d4"),
                on_monster: &[EffectSpec::Exposed { bonus: 2, uses: 2 }],
                on_character: &[],
            },
            TradeGoodKind::Curio => DeedBonus {
                narrative: "uses it in a way nobody expected",
                extra_damage: Some("1d4"),
                on_monster: &[],
                on_character: &[EffectSpec::AttackBonus { amount: 1, uses: 1 }],
            },
        }
    }

    pub fn mighty_fumble(self) -> DeedBacklash {
        match self {
            TradeGoodKind::Flammable => DeedBacklash {
                narrative: "douses themselves and catches fire",
                self_damage: Some("1d4"),
                on_character: &[EffectSpec::Exposed { bonus: 1, uses: 1 }],
            },
            TradeGoodKind::Light => DeedBacklash {
                narrative: "singes their own eyebrows off",
                self_damage: Some("1"),
                on_character: &[EffectSpec::AttackPenalty { amount: 1, uses: 2 }],
            },
            TradeGoodKind::Binding => DeedBacklash {
                narrative: "ties their own legs together",
                self_damage: None,
                on_character: &[
                    EffectSpec::SkipNextAction,
                    EffectSpec::Exposed { bonus: 2, uses: 1 },
                ],
            },
            TradeGoodKind::Livestock => DeedBacklash {
                narrative: "is pecked and kicked by the panicked animal",
                self_damage: Some("1d2"),
                on_character: &[EffectSpec::AttackPenalty { amount: 2, uses: 1 }],
            },
            TradeGoodKind::Powder => DeedBacklash {
                narrative: "catches the cloud full in the face",
                self_damage: None,
                on_character: &[
                    EffectSpec::SkipNextAction,
                    EffectSpec::AttackPenalty { amount: 3, uses: 1 },
                ],
            },
            TradeGoodKind::Tool => DeedBacklash {
                narrative: "smacks their own knuckles",
                self_damage: Some("1d3"),
                on_character: &[EffectSpec::AttackPenalty { amount: 1, uses: 1 }],
            },
            TradeGoodKind::Curio => DeedBacklash {
                narrative: "fumbles the thing and loses a moment hunting for it",
                self_damage: None,
                on_character: &[EffectSpec::SkipNextAction],
            },
        }
    }
}
