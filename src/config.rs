//! Ruleset configuration
//!
//! Numeric rule constants are configuration, not engine logic. Values are
//! layered: built-in defaults, then an optional TOML file, then
//! SKIRMISH_-prefixed environment variables.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Tunable rule constants for an encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Armor-class bonus granted by the Defend action
    pub defend_armor_bonus: i32,
    /// Damage multiplier on a natural 20
    pub critical_multiplier: i32,
    /// Round limit after which an encounter is a stalemate (None = unlimited)
    pub max_rounds: Option<u32>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            defend_armor_bonus: 2,
            critical_multiplier: 2,
            max_rounds: None,
        }
    }
}

impl RulesConfig {
    /// Load defaults, merged with `path` (if given) and SKIRMISH_* env vars.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(RulesConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("SKIRMISH_")).extract()
    }
}
