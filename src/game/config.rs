//! Round Configuration
//!
//! Read once at round start. Every field has a default matching the
//! stock game, so an empty JSON object is a valid config.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize, Deserializer, Serializer};
use serde::de::Error as _;

use crate::game::input::{Action, default_keymap};

/// Default tick interval for automaton movement (milliseconds).
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 60;

/// Arena geometry and boundary policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Arena width
    pub width: i32,
    /// Arena height
    pub height: i32,
    /// Movement wraps across arena bounds instead of stopping at them
    pub wrap: bool,
    /// Grid every position snaps to; `false` in JSON disables snapping
    #[serde(
        alias = "snapTo",
        alias = "snapToGrid",
        deserialize_with = "deserialize_snap",
        serialize_with = "serialize_snap"
    )]
    pub snap_to_grid: Option<i32>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            wrap: false,
            snap_to_grid: None,
        }
    }
}

/// How many of each entity kind a round starts with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Obstacles
    pub obstacles: u32,
    /// Speed pickups
    pub speed_pickups: u32,
    /// Health pickups
    pub health_pickups: u32,
    /// Hazards
    pub hazards: u32,
    /// AI combatants
    pub automata: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            obstacles: 10,
            speed_pickups: 4,
            health_pickups: 10,
            hazards: 10,
            automata: 10,
        }
    }
}

/// Entity extents, all square.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeConfig {
    /// Side of a combatant
    pub combatant: i32,
    /// Side of a speed or health pickup
    pub pickup: i32,
    /// Side of a hazard
    pub hazard: i32,
    /// Obstacle sides, one drawn at random per obstacle
    pub obstacles: Vec<i32>,
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            combatant: 20,
            pickup: 10,
            hazard: 10,
            obstacles: vec![20, 40, 60, 80],
        }
    }
}

/// Complete round configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Arena geometry
    #[serde(alias = "map")]
    pub arena: ArenaConfig,
    /// Input code to action
    pub actions: BTreeMap<String, Action>,
    /// Starting population
    pub population: PopulationConfig,
    /// Entity extents
    pub sizes: SizeConfig,
    /// Speed level a combatant starts (and respawns) with
    pub min_speed_level: i32,
    /// Health a combatant starts (and respawns) with
    pub max_health: i32,
    /// Speed level carried by each speed pickup
    pub speed_pickup_bonus: i32,
    /// Health carried by each health pickup
    pub health_pickup_amount: i32,
    /// Hazard damage is drawn from `[1, hazard_max_damage]`
    pub hazard_max_damage: i32,
    /// Grid used by entities that force snapping
    pub entity_snap_grid: i32,
    /// Automaton tick interval
    pub tick_interval_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            actions: default_keymap(),
            population: PopulationConfig::default(),
            sizes: SizeConfig::default(),
            min_speed_level: 4,
            max_health: 10,
            speed_pickup_bonus: 1,
            health_pickup_amount: 1,
            hazard_max_damage: 9,
            entity_snap_grid: 10,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg)) };

        if self.arena.width <= 0 || self.arena.height <= 0 {
            return invalid(format!(
                "arena must have positive size, got {}x{}",
                self.arena.width, self.arena.height
            ));
        }
        if let Some(grid) = self.arena.snap_to_grid {
            if grid <= 0 {
                return invalid(format!("snap_to_grid must be positive, got {grid}"));
            }
        }
        if self.entity_snap_grid <= 0 {
            return invalid(format!("entity_snap_grid must be positive, got {}", self.entity_snap_grid));
        }
        if self.min_speed_level <= 0 {
            return invalid(format!("min_speed_level must be positive, got {}", self.min_speed_level));
        }
        if self.max_health <= 0 {
            return invalid(format!("max_health must be positive, got {}", self.max_health));
        }
        if self.hazard_max_damage < 1 {
            return invalid(format!("hazard_max_damage must be at least 1, got {}", self.hazard_max_damage));
        }
        if self.sizes.obstacles.is_empty() {
            return invalid("sizes.obstacles must list at least one size".to_string());
        }

        let max_side = self.arena.width.min(self.arena.height);
        let sides = [self.sizes.combatant, self.sizes.pickup, self.sizes.hazard]
            .into_iter()
            .chain(self.sizes.obstacles.iter().copied());
        for side in sides {
            if side <= 0 || side > max_side {
                return invalid(format!("entity size {side} does not fit a {max_side} arena"));
            }
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Malformed JSON or wrong field types.
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Well-formed but out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// `false | positive integer` on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapSetting {
    Toggle(bool),
    Grid(i64),
}

fn deserialize_snap<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match SnapSetting::deserialize(deserializer)? {
        SnapSetting::Toggle(false) => Ok(None),
        SnapSetting::Toggle(true) => Err(D::Error::custom(
            "snap_to_grid must be false or a positive integer",
        )),
        SnapSetting::Grid(grid) if grid > 0 && grid <= i32::MAX as i64 => Ok(Some(grid as i32)),
        SnapSetting::Grid(grid) => Err(D::Error::custom(format!(
            "snap_to_grid must be a positive integer, got {grid}"
        ))),
    }
}

fn serialize_snap<S>(value: &Option<i32>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(grid) => serializer.serialize_i32(*grid),
        None => serializer.serialize_bool(false),
    }
}
