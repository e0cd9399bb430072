//! Movement Engine
//!
//! Computes a candidate position from a direction and speed mode, applies
//! the snap and boundary policy, then hands the candidate rectangle to the
//! collision resolver. A blocked move never advances the mover; it may
//! trigger an interaction instead.
//!
//! Coordinates are integer arena units with y growing downward.

use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::game::collision::find_blocker;
use crate::game::config::GameConfig;
use crate::game::entity::{Entity, EntityId, Position};
use crate::game::error::GameError;
use crate::game::events::GameEvent;
use crate::game::interaction;
use crate::game::state::{Arena, GameState};

// =============================================================================
// DIRECTION
// =============================================================================

/// One of the eight movement directions, or the zero-offset move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// No offset; used to test a cell in place
    #[default]
    None = 0,
    /// -y
    Up = 1,
    /// +y
    Down = 2,
    /// -x
    Left = 3,
    /// +x
    Right = 4,
    /// -x, -y
    UpLeft = 5,
    /// +x, -y
    UpRight = 6,
    /// -x, +y
    DownLeft = 7,
    /// +x, +y
    DownRight = 8,
}

impl Direction {
    /// The eight real movement directions.
    pub const MOVES: [Direction; 8] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    /// Unit offset `(dx, dy)`.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::UpLeft => (-1, -1),
            Direction::UpRight => (1, -1),
            Direction::DownLeft => (-1, 1),
            Direction::DownRight => (1, 1),
        }
    }

    /// Direction whose delta has the signs of `(dx, dy)`.
    pub fn from_components(dx: i32, dy: i32) -> Self {
        match (dx.signum(), dy.signum()) {
            (0, -1) => Direction::Up,
            (0, 1) => Direction::Down,
            (-1, 0) => Direction::Left,
            (1, 0) => Direction::Right,
            (-1, -1) => Direction::UpLeft,
            (1, -1) => Direction::UpRight,
            (-1, 1) => Direction::DownLeft,
            (1, 1) => Direction::DownRight,
            _ => Direction::None,
        }
    }

    /// Cardinal direction by lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Result of a move attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Committed; the mover now stands here.
    Moved(Position),
    /// Another entity is in the way. The mover did not advance.
    Blocked(EntityId),
    /// The candidate left the arena without wrap.
    Rejected,
}

// =============================================================================
// POLICY HELPERS
// =============================================================================

/// Grid this entity snaps to, if any.
///
/// A forced entity override wins over the arena default.
pub fn effective_grid(entity: &Entity, arena: &Arena, config: &GameConfig) -> Option<i32> {
    if entity.snap_override == Some(true) {
        return Some(config.entity_snap_grid);
    }
    arena.snap_to_grid
}

/// Distance covered by one step.
///
/// Snapping entities always step one grid cell and ignore the fast
/// modifier. Otherwise the fast step is the entity's speed level, or the
/// configured minimum when that is not positive.
pub fn step_size(entity: &Entity, grid: Option<i32>, fast: bool, min_speed_level: i32) -> i32 {
    match grid {
        Some(grid) => grid,
        None if fast && entity.speed_level > 0 => entity.speed_level,
        None if fast => min_speed_level,
        None => 1,
    }
}

/// Round to the nearest multiple of `grid`, halves away from zero.
pub fn snap(value: i32, grid: i32) -> i32 {
    if grid <= 1 {
        return value;
    }
    let (v, g) = (value as i64, grid as i64);
    let half = g / 2;
    let rounded = if v >= 0 {
        (v + half) / g * g
    } else {
        -((-v + half) / g * g)
    };
    rounded.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Renormalize one coordinate into `[0, bound)`.
///
/// Leaving through the upper edge lands on 0. Leaving through the lower
/// edge lands on the last grid-aligned coordinate below `bound`.
pub fn wrap_axis(value: i32, bound: i32, grid: Option<i32>) -> i32 {
    if value >= bound {
        0
    } else if value < 0 {
        let g = grid.unwrap_or(1).max(1);
        ((bound - 1) / g) * g
    } else {
        value
    }
}

/// Clamp one coordinate so `[value, value + size)` stays inside `[0, bound)`.
pub fn clamp_axis(value: i32, bound: i32, size: i32) -> i32 {
    value.clamp(0, (bound - size).max(0))
}

/// Candidate position for `entity` stepping in `direction`.
///
/// Returns `None` when the candidate leaves a non-wrapping arena.
/// `Direction::None` yields the snapped, bounded form of the current
/// position, which is how the spawn placer tests a cell.
pub fn plan_move(
    arena: &Arena,
    config: &GameConfig,
    entity: &Entity,
    direction: Direction,
    fast: bool,
) -> Option<Position> {
    let grid = effective_grid(entity, arena, config);
    let step = step_size(entity, grid, fast, config.min_speed_level);
    let (dx, dy) = direction.delta();

    let mut left = entity.position.left.saturating_add(dx.saturating_mul(step));
    let mut top = entity.position.top.saturating_add(dy.saturating_mul(step));

    if let Some(grid) = grid {
        left = snap(left, grid);
        top = snap(top, grid);
    }

    if arena.wrap_enabled {
        left = wrap_axis(left, arena.width, grid);
        top = wrap_axis(top, arena.height, grid);
    } else {
        let clamped_left = clamp_axis(left, arena.width, entity.size.width);
        let clamped_top = clamp_axis(top, arena.height, entity.size.height);
        if clamped_left != left || clamped_top != top {
            return None;
        }
    }

    Some(Position::new(left, top))
}

// =============================================================================
// MOVE
// =============================================================================

/// Try to move an entity one step.
///
/// On success the new position is committed and a moved event is queued.
/// When a blocker is found and both sides can interact, the interaction is
/// resolved before returning; the outcome is `Blocked` either way.
pub fn attempt_move(
    state: &mut GameState,
    id: EntityId,
    direction: Direction,
    fast: bool,
) -> Result<MoveOutcome, GameError> {
    let entity = state.registry.get(id).ok_or(GameError::UnknownEntity(id))?;
    if entity.expired {
        warn!(entity = %id, label = %entity.label, "Move requested for expired entity");
        return Err(GameError::EntityExpired(id));
    }

    let Some(candidate) = plan_move(&state.arena, &state.config, entity, direction, fast) else {
        return Ok(MoveOutcome::Rejected);
    };

    let rect = entity.rect_at(candidate);
    let actor_is_combatant = entity.is_combatant();
    let previous = entity.position;

    match find_blocker(&state.registry, id, &rect) {
        None => {
            if candidate != previous {
                if let Some(entity) = state.registry.get_mut(id) {
                    entity.position = candidate;
                }
                state.push_event(GameEvent::entity_moved(state.tick, id, candidate));
            }
            Ok(MoveOutcome::Moved(candidate))
        }
        Some(blocker) => {
            let target_interacts = state
                .registry
                .get(blocker)
                .is_some_and(|target| target.kind.is_interactive());
            if actor_is_combatant && target_interacts {
                interaction::resolve(state, id, blocker);
            }
            Ok(MoveOutcome::Blocked(blocker))
        }
    }
}
