//! # Settings
//!
//! The fixed settings table: grid dimensions, room and enemy counts, every
//! combat number and the tick timings. Values default to [`crate::config`] and
//! can be overridden from a JSON file at startup. Only the seed changes at
//! runtime, and it lives on the session rather than here.

use crate::config;
use crate::{CombatConfig, DescentError, DescentResult, GenerationConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete settings table for one game session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Dungeon layout and placement parameters
    pub generation: GenerationConfig,
    /// Hit points, damage ranges and flee odds
    pub combat: CombatConfig,
    /// Tick rate and tick-counted intervals
    pub timing: TickConfig,
}

/// Tick-counted timings. Nothing in the core reads a wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Simulation steps per second driven by the presentation loop
    pub ticks_per_second: u32,
    /// Roaming enemies move once every this many ticks
    pub enemy_move_interval: u32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: config::TICKS_PER_SECOND,
            enemy_move_interval: config::ENEMY_MOVE_INTERVAL,
        }
    }
}

impl TickConfig {
    /// Length of one tick in seconds.
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.ticks_per_second as f32
    }

    fn validate(&self) -> DescentResult<()> {
        if self.ticks_per_second == 0 {
            return Err(DescentError::InvalidConfig(
                "ticks_per_second must be positive".to_string(),
            ));
        }
        if self.enemy_move_interval == 0 {
            return Err(DescentError::InvalidConfig(
                "enemy_move_interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl GameSettings {
    /// Loads settings from a JSON file. Missing fields fall back to defaults.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use descent::GameSettings;
    ///
    /// let settings = GameSettings::from_json_file("settings.json").unwrap();
    /// assert!(settings.validate().is_ok());
    /// ```
    pub fn from_json_file(path: impl AsRef<Path>) -> DescentResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Parses settings from a JSON string and validates them.
    pub fn from_json(json: &str) -> DescentResult<Self> {
        let settings: GameSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes the table, e.g. to write out a template file.
    pub fn to_json_pretty(&self) -> DescentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that every section is internally consistent.
    pub fn validate(&self) -> DescentResult<()> {
        self.generation.validate()?;
        self.combat.validate()?;
        self.timing.validate()
    }
}
