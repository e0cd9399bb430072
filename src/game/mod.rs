//! Game Logic Module
//!
//! All arena simulation code. Deterministic given a config, a seed and
//! the sequence of key events.
//!
//! ## Module Structure
//!
//! - `config`: Round configuration (serde JSON)
//! - `entity`: Entity kinds, ids and geometry
//! - `registry`: Live entities and automaton schedules
//! - `state`: The explicit game context
//! - `movement`: Candidate positions, snap and boundary policy
//! - `collision`: Corner-in-polygon blocker search
//! - `interaction`: Combat, pickup and hazard effects
//! - `spawn`: Bounded random placement
//! - `round`: Winner, level-up, level-down, re-population
//! - `automaton`: AI decision loop
//! - `input`: Keymap and held-key tracking
//! - `tick`: One game-loop step
//! - `events`: Render and scoreboard events

pub mod config;
pub mod entity;
pub mod error;
pub mod registry;
pub mod state;
pub mod movement;
pub mod collision;
pub mod interaction;
pub mod spawn;
pub mod round;
pub mod automaton;
pub mod input;
pub mod tick;
pub mod events;

// Re-export key types
pub use config::{GameConfig, ConfigError};
pub use entity::{Entity, EntityId, EntityKind, Position, Size};
pub use error::{GameError, PlacementFailed};
pub use state::{Arena, GameState};
pub use movement::{Direction, MoveOutcome};
pub use tick::{TickResult, KeyEvent};
pub use events::{GameEvent, GameEventData, ScoreboardUpdate, CombatantStats};
