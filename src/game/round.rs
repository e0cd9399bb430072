//! Round Controller
//!
//! Decides when a round is over and what happens to combatants that run
//! out of health.
//!
//! ## Lifecycle
//!
//! - A combatant at 0 health on level 1 is removed.
//! - Above level 1 it drops a level, is restored to full health and
//!   minimum speed, and respawns on a free cell.
//! - When exactly one combatant is left standing it wins: it levels up,
//!   the arena's non-combatants are regenerated, a fresh set of automata
//!   joins, and the winner is re-placed.

use tracing::{info, warn};

use crate::game::entity::{EntityId, EntityKind};
use crate::game::error::GameError;
use crate::game::events::GameEvent;
use crate::game::spawn::{respawn, spawn};
use crate::game::state::GameState;

/// Standing combatants in registry order.
pub fn combatants(state: &GameState) -> Vec<EntityId> {
    state
        .registry
        .iter()
        .filter(|e| e.is_standing())
        .map(|e| e.id)
        .collect()
}

/// The sole standing combatant, if exactly one is left.
pub fn winner(state: &GameState) -> Option<EntityId> {
    let mut standing = state.registry.iter().filter(|e| e.is_standing());
    match (standing.next(), standing.next()) {
        (Some(only), None) => Some(only.id),
        _ => None,
    }
}

/// Remove or demote everything that expired.
///
/// Returns `true` if a combatant left the arena, which is the only event
/// that can produce a new winner.
pub fn settle_expired(state: &mut GameState) -> bool {
    let expired: Vec<(EntityId, EntityKind, u32)> = state
        .registry
        .iter()
        .filter(|e| e.expired || (e.is_combatant() && e.health <= 0))
        .map(|e| (e.id, e.kind, e.level))
        .collect();

    let mut combatant_removed = false;
    for (id, kind, level) in expired {
        if kind.is_combatant() && level > 1 {
            level_down(state, id);
        } else {
            state.remove_entity(id);
            combatant_removed |= kind.is_combatant();
        }
    }
    combatant_removed
}

/// Promote a combatant. Returns the new level.
pub fn level_up(state: &mut GameState, id: EntityId) -> Option<u32> {
    let entity = state.registry.get_mut(id)?;
    entity.level += 1;
    Some(entity.level)
}

/// Demote a defeated combatant and bring it back.
pub fn level_down(state: &mut GameState, id: EntityId) {
    let max_health = state.config.max_health;
    let min_speed = state.config.min_speed_level;

    let Some(entity) = state.registry.get_mut(id) else {
        return;
    };
    entity.level = entity.level.saturating_sub(1).max(1);
    entity.health = max_health;
    entity.speed_level = min_speed;
    entity.expired = false;

    let title = entity.label.clone();
    let level = entity.level;
    let is_automaton = entity.kind == EntityKind::AiCombatant;

    if let Err(err) = respawn(state, id) {
        warn!(entity = %id, %err, "Resurrected in place");
    }
    if is_automaton {
        crate::game::automaton::decide(state, id, false);
    }

    state.announce(format!("{title} resurrected at level {level}!"));
}

/// End the round if a winner exists. Returns the winner.
pub fn evaluate(state: &mut GameState) -> Option<EntityId> {
    let winner = winner(state)?;
    complete_round(state, winner);
    Some(winner)
}

/// Reward the winner and reset the arena around it.
pub fn complete_round(state: &mut GameState, winner: EntityId) {
    let title = match state.registry.get(winner) {
        Some(entity) => entity.label.clone(),
        None => return,
    };

    state.announce(format!("{title} has won!"));

    let new_level = level_up(state, winner).unwrap_or(1);
    state.round += 1;
    state.push_event(GameEvent::round_won(state.tick, winner, new_level, state.round));
    info!(winner = %winner, %title, level = new_level, round = state.round, "Round won");

    for kind in EntityKind::NON_COMBATANTS {
        for id in state.registry.ids_of_kind(kind) {
            state.remove_entity(id);
        }
    }

    if let Err(err) = populate_non_combatants(state) {
        warn!(%err, "Arena regenerated partially");
    }
    if let Err(err) = respawn(state, winner) {
        warn!(entity = %winner, %err, "Winner kept its cell");
    }
    if let Err(err) = populate_automata(state) {
        warn!(%err, "Automata regenerated partially");
    }
}

/// Spawn the configured obstacles, pickups and hazards.
pub fn populate_non_combatants(state: &mut GameState) -> Result<(), GameError> {
    let population = state.config.population.clone();
    let counts = [
        (EntityKind::Obstacle, population.obstacles),
        (EntityKind::SpeedPickup, population.speed_pickups),
        (EntityKind::HealthPickup, population.health_pickups),
        (EntityKind::Hazard, population.hazards),
    ];

    for (kind, count) in counts {
        for _ in 0..count {
            spawn(state, kind)?;
        }
    }
    Ok(())
}

/// Spawn the configured number of AI combatants.
pub fn populate_automata(state: &mut GameState) -> Result<(), GameError> {
    let count = state.config.population.automata;
    let mut spawned = Vec::with_capacity(count as usize);
    for _ in 0..count {
        spawned.push(spawn(state, EntityKind::AiCombatant)?);
    }

    // The first automaton may have been spawned while it stood alone.
    for id in spawned {
        if state.registry.schedule(id).is_none() {
            crate::game::automaton::decide(state, id, false);
        }
    }
    Ok(())
}

/// Populate an empty arena: the player, the non-combatants, then the
/// automata.
pub fn start_round(state: &mut GameState) -> Result<(), GameError> {
    let human = spawn(state, EntityKind::HumanCombatant)?;
    state.human = Some(human);

    populate_non_combatants(state)?;
    populate_automata(state)?;

    info!(
        round = state.round,
        entities = state.registry.len(),
        combatants = combatants(state).len(),
        "Round started"
    );
    Ok(())
}
