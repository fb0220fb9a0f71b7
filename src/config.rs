//! Engine configuration
//!
//! Layered with figment: built-in defaults, then an optional TOML file, then
//! `FUNNEL_*` environment variables.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::{FumbleTableChoice, LuckDecision, LuckOffer};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] figment::Error),
}

/// How the driver answers a luck negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LuckPolicy {
    /// Ask the player
    #[default]
    Ask,
    /// Always accept the miss
    Never,
    /// Burn exactly the shortfall
    Minimum,
    /// Burn everything
    All,
}

impl LuckPolicy {
    /// The policy's answer, or `None` when the player must be asked
    pub fn decide(&self, offer: &LuckOffer) -> Option<LuckDecision> {
        match self {
            LuckPolicy::Ask => None,
            LuckPolicy::Never => Some(LuckDecision::Decline),
            LuckPolicy::Minimum => Some(LuckDecision::Burn(offer.shortfall.max(1))),
            LuckPolicy::All => Some(LuckDecision::Burn(offer.luck_available)),
        }
    }
}

/// Tunables for the engine and the paced driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delay before a scheduled monster turn runs (presentation only)
    pub pacing_ms: u64,
    /// Initiative tie rerolls before the character is given the first move
    pub initiative_reroll_budget: u32,
    /// Table used for ordinary attack fumbles
    pub fumble_table: FumbleTableChoice,
    pub luck_policy: LuckPolicy,
    /// Use a mighty deed instead of a plain attack whenever one is allowed
    pub prefer_mighty_deeds: bool,
    /// Character actions after which the driver gives up and flees
    pub max_rounds: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pacing_ms: 600,
            initiative_reroll_budget: 100,
            fumble_table: FumbleTableChoice::Weapon,
            luck_policy: LuckPolicy::Ask,
            prefer_mighty_deeds: false,
            max_rounds: 200,
        }
    }
}

impl EngineConfig {
    /// Defaults, then `path` (if given), then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()));
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
            figment = figment.merge(Toml::file(path));
        }
        Ok(figment.merge(Env::prefixed("FUNNEL_")).extract()?)
    }
}
