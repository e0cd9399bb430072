//! # Arena Survival
//!
//! Deterministic simulation core for a real-time 2D arena survival game:
//! one keyboard-driven combatant and a pack of automata move over a
//! bounded arena, collide with obstacles, pickups and hazards, and fight
//! until one is left standing.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       ARENA SURVIVAL                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  core/             - Deterministic primitives                 │
//! │  ├── geometry.rs   - Integer point-in-polygon                 │
//! │  ├── rng.rs        - Deterministic Xorshift128+ PRNG          │
//! │  └── hash.rs       - State hashing for verification           │
//! │                                                               │
//! │  game/             - Simulation (deterministic)               │
//! │  ├── movement.rs   - Step, snap, wrap / clamp-reject          │
//! │  ├── collision.rs  - Blocker search                           │
//! │  ├── interaction.rs- Combat, pickups, hazards                 │
//! │  ├── spawn.rs      - Bounded random placement                 │
//! │  ├── round.rs      - Winner, levels, re-population            │
//! │  ├── automaton.rs  - AI decision loop                         │
//! │  └── tick.rs       - Game-loop step                           │
//! │                                                               │
//! │  session/          - Async (non-deterministic timing)         │
//! │  └── coordinator.rs- Single-writer command loop               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are deterministic:
//! - Integer coordinates only
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - All randomness from seeded Xorshift128+
//!
//! Given the same config, seed and key events, a run produces the same
//! state hash.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod session;

// Re-export commonly used types
pub use core::geometry::{Point, Rect};
pub use core::rng::DeterministicRng;
pub use game::config::{GameConfig, ConfigError};
pub use game::entity::{Entity, EntityId, EntityKind, Position, Size};
pub use game::error::{GameError, PlacementFailed};
pub use game::state::GameState;
pub use game::movement::{Direction, MoveOutcome};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
