//! Player characters
//!
//! Ability scores come from character creation; this module only derives
//! modifiers and tracks the state an encounter mutates (hit points, Luck,
//! effects).

use serde::{Deserialize, Serialize};

use super::weapon::Weapon;
use crate::combat::{roll_3d6, ArmorCategory, DieRoller, EffectLedger, TradeGood};

/// Modifier for an ability score (3 → -3 ... 18 → +3)
pub fn ability_modifier(score: i32) -> i32 {
    match score {
        i32::MIN..=3 => -3,
        4..=5 => -2,
        6..=8 => -1,
        9..=12 => 0,
        13..=15 => 1,
        16..=17 => 2,
        _ => 3,
    }
}

/// The six ability scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abilities {
    pub strength: i32,
    pub agility: i32,
    pub stamina: i32,
    pub personality: i32,
    pub intelligence: i32,
    /// Luck score; also the baseline that burned Luck is restored to
    pub luck: i32,
}

impl Default for Abilities {
    fn default() -> Self {
        Self {
            strength: 10,
            agility: 10,
            stamina: 10,
            personality: 10,
            intelligence: 10,
            luck: 10,
        }
    }
}

impl Abilities {
    /// Roll 3d6 for each ability, in order
    pub fn roll<D: DieRoller + ?Sized>(roller: &mut D) -> Self {
        Self {
            strength: roll_3d6(roller),
            agility: roll_3d6(roller),
            stamina: roll_3d6(roller),
            personality: roll_3d6(roller),
            intelligence: roll_3d6(roller),
            luck: roll_3d6(roller),
        }
    }

    pub fn strength_modifier(&self) -> i32 {
        ability_modifier(self.strength)
    }

    pub fn agility_modifier(&self) -> i32 {
        ability_modifier(self.agility)
    }

    pub fn stamina_modifier(&self) -> i32 {
        ability_modifier(self.stamina)
    }

    pub fn personality_modifier(&self) -> i32 {
        ability_modifier(self.personality)
    }

    pub fn intelligence_modifier(&self) -> i32 {
        ability_modifier(self.intelligence)
    }

    pub fn luck_modifier(&self) -> i32 {
        ability_modifier(self.luck)
    }
}

fn default_hp() -> i32 {
    1
}

/// A player character as seen by the combat engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    #[serde(default)]
    pub occupation: Option<String>,
    pub abilities: Abilities,
    #[serde(default)]
    pub hp: i32,
    #[serde(default = "default_hp")]
    pub max_hp: i32,
    /// Current, spendable Luck (never above `abilities.luck`)
    pub luck: i32,
    #[serde(default)]
    pub weapon: Option<Weapon>,
    #[serde(default)]
    pub trade_good: Option<TradeGood>,
    #[serde(default)]
    pub armor: Option<ArmorCategory>,
    #[serde(skip)]
    pub effects: EffectLedger,
}

impl Character {
    /// Create a character at full health and full Luck
    pub fn new(name: &str, abilities: Abilities, max_hp: i32) -> Self {
        Self {
            name: name.to_string(),
            occupation: None,
            abilities,
            hp: max_hp,
            max_hp,
            luck: abilities.luck,
            weapon: None,
            trade_good: None,
            armor: None,
            effects: EffectLedger::new(),
        }
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn with_trade_good(mut self, trade_good: TradeGood) -> Self {
        self.trade_good = Some(trade_good);
        self
    }

    pub fn with_armor(mut self, armor: ArmorCategory) -> Self {
        self.armor = Some(armor);
        self
    }

    pub fn with_occupation(mut self, occupation: &str) -> Self {
        self.occupation = Some(occupation.to_string());
        self
    }

    /// The Luck score burned Luck is restored to
    pub fn original_luck(&self) -> i32 {
        self.abilities.luck
    }

    /// Modifier of the current (possibly burned) Luck
    pub fn luck_modifier(&self) -> i32 {
        ability_modifier(self.luck)
    }

    /// Agility for ranged weapons, Strength otherwise
    pub fn attack_modifier(&self) -> i32 {
        match &self.weapon {
            Some(weapon) if weapon.is_ranged() => self.abilities.agility_modifier(),
            _ => self.abilities.strength_modifier(),
        }
    }

    /// Armor class monsters must reach: 10 + Agility modifier
    pub fn armor_class(&self) -> i32 {
        10 + self.abilities.agility_modifier()
    }

    /// Check if character is dead
    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Take damage, clamping hit points at zero. Returns damage actually taken.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let taken = amount.max(0).min(self.hp.max(0));
        self.hp = (self.hp - taken).max(0);
        taken
    }

    /// Permanently spend Luck. The caller validates the amount.
    pub fn burn_luck(&mut self, amount: i32) {
        self.luck = (self.luck - amount.max(0)).max(0);
    }

    /// Restore Luck to its baseline (between encounters)
    pub fn rest(&mut self) {
        self.luck = self.original_luck();
    }

    /// Enforce hp and Luck bounds on records loaded from outside
    pub fn normalize(&mut self) {
        self.max_hp = self.max_hp.max(1);
        self.hp = self.hp.clamp(0, self.max_hp);
        self.luck = self.luck.clamp(0, self.original_luck().max(0));
    }
}
