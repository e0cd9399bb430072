//! Collision Detection
//!
//! A candidate rectangle is blocked when any of its four corners lies
//! inside another live entity's corner polygon. Only the mover's corners
//! are tested, so a mover that would fully enclose a smaller entity is not
//! blocked by it.

use crate::core::geometry::{Rect, is_inside, polygon_from_rect};
use crate::game::entity::EntityId;
use crate::game::registry::Registry;

/// First entity (in insertion order) blocking `candidate`.
///
/// The moving entity itself is skipped. Expired entities still occupy
/// their cell until the round controller removes or respawns them.
pub fn find_blocker(registry: &Registry, moving_id: EntityId, candidate: &Rect) -> Option<EntityId> {
    let corners = polygon_from_rect(candidate);

    for other in registry.iter() {
        if other.id == moving_id {
            continue;
        }

        let polygon = polygon_from_rect(&other.rect());
        if corners.iter().any(|&corner| is_inside(&polygon, corner)) {
            #[cfg(feature = "debug-tracing")]
            tracing::trace!(mover = %moving_id, blocker = %other.id, "Candidate blocked");
            return Some(other.id);
        }
    }

    None
}

/// Is `candidate` free of every entity except `moving_id`?
#[inline]
pub fn is_free(registry: &Registry, moving_id: EntityId, candidate: &Rect) -> bool {
    find_blocker(registry, moving_id, candidate).is_none()
}
