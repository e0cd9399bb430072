//! Simulation Errors
//!
//! Fallible core operations return these instead of panicking.

use crate::game::entity::{EntityId, EntityKind};

/// The spawn placer ran out of attempts without finding a free cell.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No free cell for {kind:?} after {attempts} attempts")]
pub struct PlacementFailed {
    /// Kind of entity that could not be placed.
    pub kind: EntityKind,
    /// Number of candidate cells drawn.
    pub attempts: u32,
}

/// Errors from operations on the live arena.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// No live entity has this id.
    #[error("Unknown entity {0}")]
    UnknownEntity(EntityId),

    /// The entity has expired and must not be mutated.
    #[error("Entity {0} has expired")]
    EntityExpired(EntityId),

    /// Spawn placement failed.
    #[error(transparent)]
    Placement(#[from] PlacementFailed),
}
