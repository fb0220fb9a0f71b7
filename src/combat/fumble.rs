//! Fumble tables
//!
//! A natural 1 on an attack die sends the attacker to a fumble table. Two
//! tables exist behind one [`FumbleResolver`] interface:
//! - [`WeaponFumbleTable`]: a flat d4 lookup used for ordinary weapon attacks
//! - [`ArmoredFumbleTable`]: the die scales with armor (d4/d8/d12/d16) and the
//!   result is shifted by the fumbler's Luck modifier
//!
//! Resolvers only describe the outcome. The encounter applies the effects
//! and any self-inflicted damage.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::damage::{roll_damage, DamageRoll};
use super::dice::DieRoller;
use super::effects::{Effect, EffectSpec};

/// Armor worn by a character, which sets the armored fumble die
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmorCategory {
    Unarmored,
    Light,
    Medium,
    Heavy,
}

impl ArmorCategory {
    /// Sides of the fumble die for this armor
    pub fn fumble_die(&self) -> u32 {
        match self {
            ArmorCategory::Unarmored => 4,
            ArmorCategory::Light => 8,
            ArmorCategory::Medium => 12,
            ArmorCategory::Heavy => 16,
        }
    }
}

/// Which table standard attack fumbles use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FumbleTableChoice {
    /// Always the d4 weapon table
    #[default]
    Weapon,
    /// Always the armored table (unarmored when no category is known)
    Armored,
    /// Armored table when the fumbler has an armor category
    Auto,
}

/// What a resolver needs to know about the fumbler
#[derive(Debug, Clone, Default)]
pub struct FumbleContext {
    pub armor: Option<ArmorCategory>,
    pub luck_modifier: i32,
    /// Damage expression used when the fumbler strikes themselves
    pub weapon_damage: Option<String>,
}

/// Outcome of a fumble roll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FumbleOutcome {
    /// Sides of the fumble die
    pub die: u32,
    /// Face rolled
    pub roll: u32,
    /// Table row after adjustments
    pub result: i32,
    pub description: &'static str,
    /// Effects placed on the fumbler
    pub effects: Vec<Effect>,
    /// Damage the fumbler deals to themselves
    pub self_damage: Option<DamageRoll>,
}

/// Strategy for resolving a fumble
pub trait FumbleResolver {
    /// Table name for the log
    fn name(&self) -> &'static str;

    /// Roll on the table
    fn resolve(&self, context: &FumbleContext, roller: &mut dyn DieRoller) -> FumbleOutcome;
}

/// One row of a fumble table
struct FumbleRow {
    description: &'static str,
    effects: &'static [EffectSpec],
    self_strike: bool,
}

impl FumbleRow {
    const fn new(description: &'static str, effects: &'static [EffectSpec], self_strike: bool) -> Self {
        Self {
            description,
            effects,
            self_strike,
        }
    }

    fn outcome(
        &self,
        die: u32,
        roll: u32,
        result: i32,
        context: &FumbleContext,
        roller: &mut dyn DieRoller,
    ) -> FumbleOutcome {
        let effects = self
            .effects
            .iter()
            .map(|spec| spec.instantiate("fumble"))
            .collect();
        let self_damage = self
            .self_strike
            .then(|| roll_damage(context.weapon_damage.as_deref(), &mut *roller));
        FumbleOutcome {
            die,
            roll,
            result,
            description: self.description,
            effects,
            self_damage,
        }
    }
}

const SKIP: EffectSpec = EffectSpec::SkipNextAction;

static WEAPON_ROWS: [FumbleRow; 4] = [
    FumbleRow::new("recovers without further mishap", &[], false),
    FumbleRow::new("drops their weapon and must spend the next action retrieving it", &[SKIP], false),
    FumbleRow::new("falls prone and must spend the next action getting up", &[SKIP], false),
    FumbleRow::new("strikes themselves with their own weapon", &[], true),
];

/// The d4 weapon fumble table
#[derive(Debug, Clone, Copy, Default)]
pub struct WeaponFumbleTable;

impl FumbleResolver for WeaponFumbleTable {
    fn name(&self) -> &'static str {
        "weapon"
    }

    fn resolve(&self, context: &FumbleContext, roller: &mut dyn DieRoller) -> FumbleOutcome {
        let roll = roller.roll_die(4);
        let index = (roll.clamp(1, 4) - 1) as usize;
        debug!(roll, "weapon fumble");
        WEAPON_ROWS[index].outcome(4, roll, roll as i32, context, roller)
    }
}

static ARMORED_ROWS: [FumbleRow; 22] = [
    FumbleRow::new("misses wildly but miraculously causes no other harm", &[], false),
    FumbleRow::new("swings so badly the onlookers laugh, but nothing worse happens", &[], false),
    FumbleRow::new(
        "stumbles and barely recovers",
        &[EffectSpec::AttackPenalty { amount: 1, uses: 1 }],
        false,
    ),
    FumbleRow::new(
        "loses their grip for a moment",
        &[EffectSpec::AttackPenalty { amount: 2, uses: 1 }],
        false,
    ),
    FumbleRow::new(
        "overextends and leaves a small opening",
        &[EffectSpec::Exposed { bonus: 1, uses: 1 }],
        false,
    ),
    FumbleRow::new("trips and must spend the next action standing", &[SKIP], false),
    FumbleRow::new("tangles their weapon in their armor straps", &[SKIP], false),
    FumbleRow::new("drops their weapon and must retrieve it", &[SKIP], false),
    FumbleRow::new(
        "smashes their weapon against the floor, dulling the edge",
        &[EffectSpec::HalfDamage { uses: 1 }],
        false,
    ),
    FumbleRow::new(
        "stumbles wide open",
        &[EffectSpec::Exposed { bonus: 2, uses: 1 }],
        false,
    ),
    FumbleRow::new(
        "gets sweat in their eyes",
        &[EffectSpec::AttackPenalty { amount: 2, uses: 2 }],
        false,
    ),
    FumbleRow::new(
        "chips their weapon badly",
        &[EffectSpec::HalfDamage { uses: 2 }],
        false,
    ),
    FumbleRow::new(
        "knocks their armor askew",
        &[EffectSpec::Exposed { bonus: 2, uses: 2 }],
        false,
    ),
    FumbleRow::new(
        "twists an ankle",
        &[EffectSpec::AttackPenalty { amount: 3, uses: 1 }],
        false,
    ),
    FumbleRow::new(
        "sprawls in the muck",
        &[SKIP, EffectSpec::Exposed { bonus: 1, uses: 1 }],
        false,
    ),
    FumbleRow::new("catches their own leg with the blow", &[], true),
    FumbleRow::new(
        "tumbles hard and lies exposed",
        &[SKIP, EffectSpec::Exposed { bonus: 2, uses: 1 }],
        false,
    ),
    FumbleRow::new(
        "wrenches their shoulder",
        &[EffectSpec::AttackPenalty { amount: 4, uses: 1 }],
        false,
    ),
    FumbleRow::new(
        "drives the weapon into a gap in their own armor",
        &[EffectSpec::HalfDamage { uses: 1 }],
        true,
    ),
    FumbleRow::new(
        "hurls their weapon across the room",
        &[SKIP, EffectSpec::AttackPenalty { amount: 2, uses: 1 }],
        false,
    ),
    FumbleRow::new("turns the blade back on themselves and falls", &[SKIP], true),
    FumbleRow::new(
        "suffers a catastrophic blunder, wounding themselves and sprawling helpless",
        &[SKIP, EffectSpec::Exposed { bonus: 2, uses: 1 }],
        true,
    ),
];

/// The armor-scaled, Luck-adjusted fumble table
#[derive(Debug, Clone, Copy, Default)]
pub struct ArmoredFumbleTable;

impl ArmoredFumbleTable {
    /// Table row for an adjusted result
    fn row_index(result: i32) -> usize {
        result.clamp(0, ARMORED_ROWS.len() as i32 - 1) as usize
    }
}

impl FumbleResolver for ArmoredFumbleTable {
    fn name(&self) -> &'static str {
        "armored"
    }

    fn resolve(&self, context: &FumbleContext, roller: &mut dyn DieRoller) -> FumbleOutcome {
        let die = context
            .armor
            .unwrap_or(ArmorCategory::Unarmored)
            .fumble_die();
        let roll = roller.roll_die(die);
        // Good Luck shifts the result down the table
        let result = roll as i32 - context.luck_modifier;
        debug!(die, roll, result, "armored fumble");
        ARMORED_ROWS[Self::row_index(result)].outcome(die, roll, result, context, roller)
    }
}

/// Pick the resolver for a standard attack fumble
pub fn select_fumble_resolver(
    choice: FumbleTableChoice,
    context: &FumbleContext,
) -> &'static dyn FumbleResolver {
    match choice {
        FumbleTableChoice::Weapon => &WeaponFumbleTable,
        FumbleTableChoice::Armored => &ArmoredFumbleTable,
        FumbleTableChoice::Auto if context.armor.is_some() => &ArmoredFumbleTable,
        FumbleTableChoice::Auto => &WeaponFumbleTable,
    }
}
