//! funnel - single-encounter tabletop combat resolver
//!
//! One peasant, one monster: initiative, attacks with criticals and fumbles,
//! Luck burned on near-misses, and mighty deeds with trade goods.

pub mod combat;
pub mod combatants;
pub mod config;
pub mod driver;
pub mod tracking;

pub use combat::{ActionOutcome, Advance, Encounter};
pub use config::{EngineConfig, LuckPolicy};
pub use driver::Driver;
