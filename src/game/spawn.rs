//! Spawn Placement
//!
//! Draws uniform random cells until one passes the movement engine's
//! zero-offset move (snap and boundary policy) and the collision
//! resolver. The search is bounded; a crowded arena yields
//! [`PlacementFailed`] instead of looping forever.

use tracing::{debug, info};

use crate::game::automaton;
use crate::game::collision::is_free;
use crate::game::entity::{Entity, EntityId, EntityKind, Position, Size};
use crate::game::error::{GameError, PlacementFailed};
use crate::game::events::GameEvent;
use crate::game::movement::{plan_move, Direction};
use crate::game::state::{Arena, GameState};

/// Fewest cells drawn before giving up.
pub const MIN_PLACEMENT_ATTEMPTS: u32 = 16;

/// Most cells drawn before giving up.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 10_000;

/// Attempt budget for an entity of `size`: four draws per entity-sized
/// cell of arena, clamped.
pub fn attempt_budget(arena: &Arena, size: Size) -> u32 {
    let entity_area = size.area().max(1);
    let budget = 4 * arena.area() / entity_area;
    budget.clamp(MIN_PLACEMENT_ATTEMPTS as i64, MAX_PLACEMENT_ATTEMPTS as i64) as u32
}

/// Build an unplaced entity of `kind` with its starting stats.
///
/// Allocates an id and a label; random stats (obstacle size, hazard
/// damage) are drawn here.
pub fn draft(state: &mut GameState, kind: EntityKind) -> Entity {
    let id = state.registry.allocate_id();
    let label = state.next_label(kind);
    let config = &state.config;

    match kind {
        EntityKind::HumanCombatant | EntityKind::AiCombatant => {
            Entity::new(id, kind, label, Size::square(config.sizes.combatant))
                .with_health(config.max_health)
                .with_speed_level(config.min_speed_level)
                .with_snap_override(false)
        }
        EntityKind::Obstacle => {
            let fallback = config.sizes.combatant;
            let side = state.rng.choose(&config.sizes.obstacles).copied().unwrap_or(fallback);
            Entity::new(id, kind, label, Size::square(side)).with_snap_override(true)
        }
        EntityKind::SpeedPickup => Entity::new(id, kind, label, Size::square(config.sizes.pickup))
            .with_speed_level(config.speed_pickup_bonus)
            .with_snap_override(true),
        EntityKind::HealthPickup => Entity::new(id, kind, label, Size::square(config.sizes.pickup))
            .with_health(config.health_pickup_amount),
        EntityKind::Hazard => {
            let damage = state.rng.next_int_range(1, config.hazard_max_damage);
            Entity::new(id, kind, label, Size::square(config.sizes.hazard)).with_health(damage)
        }
    }
}

/// Find a free cell for `entity`.
///
/// The entity itself is ignored by the collision test, so this also
/// works for re-placing a registered entity.
pub fn place(state: &mut GameState, entity: &Entity) -> Result<Position, PlacementFailed> {
    let attempts = attempt_budget(&state.arena, entity.size);
    let mut candidate = entity.clone();

    for _ in 0..attempts {
        let point = state.rng.random_point(state.arena.width, state.arena.height);
        candidate.position = Position::new(point.x, point.y);

        let Some(cell) = plan_move(&state.arena, &state.config, &candidate, Direction::None, false) else {
            continue;
        };
        if is_free(&state.registry, candidate.id, &candidate.rect_at(cell)) {
            return Ok(cell);
        }
    }

    Err(PlacementFailed { kind: entity.kind, attempts })
}

/// Create, place and register a new entity of `kind`.
///
/// AI combatants get their first commitment immediately.
pub fn spawn(state: &mut GameState, kind: EntityKind) -> Result<EntityId, GameError> {
    let mut entity = draft(state, kind);
    entity.position = place(state, &entity)?;

    let id = entity.id;
    debug!(entity = %id, label = %entity.label, left = entity.position.left, top = entity.position.top, "Spawned");
    state.insert_entity(entity);

    if kind == EntityKind::AiCombatant {
        automaton::decide(state, id, false);
    }
    Ok(id)
}

/// Move a registered entity to a fresh free cell.
pub fn respawn(state: &mut GameState, id: EntityId) -> Result<Position, GameError> {
    let entity = state.registry.get(id).ok_or(GameError::UnknownEntity(id))?.clone();
    let position = place(state, &entity)?;

    if let Some(entity) = state.registry.get_mut(id) {
        entity.position = position;
    }
    state.push_event(GameEvent::entity_moved(state.tick, id, position));
    info!(entity = %id, left = position.left, top = position.top, "Respawned");
    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{is_inside, polygon_from_rect};
    use crate::game::config::GameConfig;

    fn state(width: i32, height: i32) -> GameState {
        let mut config = GameConfig::default();
        config.arena.width = width;
        config.arena.height = height;
        GameState::new(config, 33)
    }

    #[test]
    fn test_attempt_budget_bounds() {
        let small = Arena { width: 20, height: 20, wrap_enabled: false, snap_to_grid: None };
        assert_eq!(attempt_budget(&small, Size::square(20)), MIN_PLACEMENT_ATTEMPTS);

        let huge = Arena { width: 10_000, height: 10_000, wrap_enabled: false, snap_to_grid: None };
        assert_eq!(attempt_budget(&huge, Size::square(1)), MAX_PLACEMENT_ATTEMPTS);

        let mid = Arena { width: 100, height: 100, wrap_enabled: false, snap_to_grid: None };
        assert_eq!(attempt_budget(&mid, Size::square(20)), 100);
    }

    #[test]
    fn test_draft_stats_per_kind() {
        let mut state = state(800, 600);

        let player = draft(&mut state, EntityKind::HumanCombatant);
        assert_eq!(player.label, "player 1");
        assert_eq!(player.health, 10);
        assert_eq!(player.speed_level, 4);
        assert_eq!(player.snap_override, Some(false));

        let block = draft(&mut state, EntityKind::Obstacle);
        assert!([20, 40, 60, 80].contains(&block.size.width));
        assert_eq!(block.snap_override, Some(true));

        for _ in 0..30 {
            let hazard = draft(&mut state, EntityKind::Hazard);
            assert!((1..=9).contains(&hazard.health));
            assert_eq!(hazard.snap_override, None);
        }

        let speed = draft(&mut state, EntityKind::SpeedPickup);
        assert_eq!(speed.speed_level, 1);
        assert_eq!(speed.snap_override, Some(true));

        let health = draft(&mut state, EntityKind::HealthPickup);
        assert_eq!(health.health, 1);
        assert_eq!(health.snap_override, None);
    }

    #[test]
    fn test_spawned_entities_do_not_overlap() {
        let mut state = state(400, 300);
        let mut ids = Vec::new();
        for kind in [EntityKind::Obstacle, EntityKind::Hazard, EntityKind::HealthPickup, EntityKind::AiCombatant] {
            for _ in 0..5 {
                ids.push(spawn(&mut state, kind).unwrap());
            }
        }

        // Each placement is checked against everything placed before it.
        for (i, &a) in ids.iter().enumerate() {
            let rect = state.registry.get(a).unwrap().rect();
            assert!(rect.left >= 0 && rect.right() <= 400);
            assert!(rect.top >= 0 && rect.bottom() <= 300);
            for &b in &ids[..i] {
                let other = polygon_from_rect(&state.registry.get(b).unwrap().rect());
                assert!(rect.corners().iter().all(|&c| !is_inside(&other, c)));
            }
        }
    }

    #[test]
    fn test_forced_snap_lands_on_entity_grid() {
        let mut state = state(400, 300);
        for _ in 0..10 {
            let id = spawn(&mut state, EntityKind::SpeedPickup).unwrap();
            let pos = state.registry.get(id).unwrap().position;
            assert_eq!(pos.left % 10, 0);
            assert_eq!(pos.top % 10, 0);
        }
    }

    #[test]
    fn test_full_arena_fails_placement() {
        // With wrap every drawn cell is in bounds, so only collisions reject.
        let mut state = state(20, 20);
        state.arena.wrap_enabled = true;
        spawn(&mut state, EntityKind::HumanCombatant).unwrap();

        let err = spawn(&mut state, EntityKind::AiCombatant).unwrap_err();
        assert_eq!(
            err,
            GameError::Placement(PlacementFailed { kind: EntityKind::AiCombatant, attempts: MIN_PLACEMENT_ATTEMPTS })
        );
    }

    #[test]
    fn test_respawn_moves_and_announces() {
        let mut state = state(400, 300);
        let id = spawn(&mut state, EntityKind::HumanCombatant).unwrap();
        state.take_events();

        let pos = respawn(&mut state, id).unwrap();
        assert_eq!(state.registry.get(id).unwrap().position, pos);
        assert_eq!(state.take_events(), vec![GameEvent::entity_moved(0, id, pos)]);
        assert_eq!(respawn(&mut state, EntityId::new(77)), Err(GameError::UnknownEntity(EntityId::new(77))));
    }
}
