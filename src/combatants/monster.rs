//! Monsters

use serde::{Deserialize, Serialize};

use crate::combat::{parse_modifier, EffectLedger};

fn default_hp() -> i32 {
    1
}

/// An opponent supplied by the roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub name: String,
    pub armor_class: i32,
    /// Attack bonus string, e.g. "+2"
    #[serde(default)]
    pub attack_bonus: Option<String>,
    /// Damage expression, e.g. "1d6"
    #[serde(default)]
    pub damage: Option<String>,
    #[serde(default)]
    pub hp: i32,
    #[serde(default = "default_hp")]
    pub max_hp: i32,
    /// Challenge tier the roster filed this monster under
    #[serde(default)]
    pub tier: u8,
    #[serde(default)]
    pub boss: bool,
    /// Whether the character has learned this monster's AC
    #[serde(skip)]
    pub ac_revealed: bool,
    #[serde(skip)]
    pub effects: EffectLedger,
}

impl Monster {
    /// Create a monster at full health with its AC hidden
    pub fn new(name: &str, armor_class: i32, attack_bonus: &str, damage: &str, max_hp: i32) -> Self {
        Self {
            name: name.to_string(),
            armor_class,
            attack_bonus: Some(attack_bonus.to_string()),
            damage: Some(damage.to_string()),
            hp: max_hp,
            max_hp,
            tier: 0,
            boss: false,
            ac_revealed: false,
            effects: EffectLedger::new(),
        }
    }

    pub fn with_tier(mut self, tier: u8) -> Self {
        self.tier = tier;
        self
    }

    pub fn as_boss(mut self) -> Self {
        self.boss = true;
        self
    }

    /// Parsed attack bonus; `None` when missing or malformed
    pub fn attack_modifier(&self) -> Option<i32> {
        self.attack_bonus.as_deref().and_then(parse_modifier)
    }

    /// Damage expression, if it has one worth rolling
    pub fn damage_expression(&self) -> Option<&str> {
        self.damage.as_deref().filter(|d| !d.trim().is_empty())
    }

    /// Check if monster is dead
    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Take damage, clamping hit points at zero. Returns damage actually taken.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let taken = amount.max(0).min(self.hp.max(0));
        self.hp = (self.hp - taken).max(0);
        taken
    }

    /// Latch the AC visible. Returns true the first time only.
    pub fn reveal_ac(&mut self) -> bool {
        let first = !self.ac_revealed;
        self.ac_revealed = true;
        first
    }

    /// AC as the character knows it
    pub fn visible_ac(&self) -> String {
        if self.ac_revealed {
            self.armor_class.to_string()
        } else {
            "?".to_string()
        }
    }

    /// Enforce hp bounds on records loaded from outside
    pub fn normalize(&mut self) {
        self.max_hp = self.max_hp.max(1);
        self.hp = self.hp.clamp(0, self.max_hp);
    }
}
