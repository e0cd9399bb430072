//! Core deterministic primitives.
//!
//! Integer geometry, seeded randomness and state hashing. Nothing in this
//! module knows about entities or rounds.

pub mod geometry;
pub mod rng;
pub mod hash;

// Re-export core types
pub use geometry::{Point, Rect, polygon_from_rect, is_inside};
pub use rng::DeterministicRng;
pub use hash::{StateHash, StateHasher, compute_state_hash};
