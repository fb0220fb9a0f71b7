//! Combatants
//!
//! The records an encounter fights with. Character creation and the monster
//! roster live elsewhere; they hand these records to the engine.

mod character;
mod monster;
mod weapon;

pub use character::{ability_modifier, Abilities, Character};
pub use monster::Monster;
pub use weapon::{Weapon, WeaponRange};
