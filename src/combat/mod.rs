//! Combat engine
//!
//! Resolves one character against one monster:
//! - Dice and damage expressions (e.g., "1d8+2")
//! - Attack rolls with criticals, fumbles and near-misses
//! - Fumble tables (weapon d4, armor-scaled)
//! - Luck burning on a near-miss
//! - Mighty deeds with trade goods
//! - Status effects and the encounter state machine

mod attack;
mod damage;
mod deed;
mod dice;
mod effects;
mod encounter;
mod fumble;
mod luck;
mod state;
mod trade_goods;

pub use attack::{classify, evaluate_swing, hit_damage, roll_swing, Swing, SwingOutcome, SwingSetup};
pub use damage::{roll_critical_damage, roll_damage, DamageRoll};
pub use deed::{classify_deed, roll_deed, DeedOutcome, DeedRoll, DEED_DIE_SUCCESS};
pub use dice::{
    is_critical, is_fumble, parse_dice, parse_modifier, roll_3d6, roll_d20, roll_d4, roll_d6,
    DiceError, DiceRoll, DieRoller, RandomRoller, ScriptedRoller,
};
pub use effects::{Effect, EffectKind, EffectLedger, EffectSpec, Facing};
pub use encounter::{ActionOutcome, Advance, Encounter};
pub use fumble::{
    select_fumble_resolver, ArmorCategory, ArmoredFumbleTable, FumbleContext, FumbleOutcome,
    FumbleResolver, FumbleTableChoice, WeaponFumbleTable,
};
pub use luck::{evaluate_burn, BurnResult, CombatError, LuckDecision, LuckOffer, PendingAttack};
pub use state::{CombatState, CombatStatus, LogEntry, Outcome, ScheduledAction, TaggedEntry};
pub use trade_goods::{DeedBacklash, DeedBonus, TradeGood, TradeGoodKind};
