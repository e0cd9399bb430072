//! Automaton Controller
//!
//! Each AI combatant commits to a direction for a random number of ticks,
//! then decides again. A blocked or rejected step ends the commitment
//! early. Being attacked forces an immediate fast decision (a flee).
//!
//! Schedules live in the registry, so removing an entity drops its
//! schedule in the same step.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::game::entity::{EntityId, EntityKind};
use crate::game::movement::{attempt_move, Direction, MoveOutcome};
use crate::game::round;
use crate::game::state::GameState;

/// Longest commitment to one direction, in ticks.
pub const MAX_DECISION_TICKS: u32 = 100;

/// Committed movement of one AI combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonState {
    /// Direction held for the rest of the commitment
    pub direction: Direction,
    /// Move attempts left before deciding again
    pub remaining_ticks: u32,
    /// Fast modifier held
    pub fast: bool,
}

/// Draw a new commitment for `id`.
///
/// Idle (and any pending schedule is cancelled) when the entity is not a
/// live AI combatant or when a winner already exists. Returns whether a
/// schedule was committed.
pub fn decide(state: &mut GameState, id: EntityId, forced_fast: bool) -> bool {
    let eligible = state
        .registry
        .get(id)
        .is_some_and(|e| e.kind == EntityKind::AiCombatant && !e.expired);
    if !eligible || round::winner(state).is_some() {
        state.registry.cancel_schedule(id);
        return false;
    }

    let budget = state.rng.next_int_range(1, MAX_DECISION_TICKS as i32) as u32;
    let direction = Direction::MOVES[state.rng.next_int(Direction::MOVES.len() as u32) as usize];
    let fast = forced_fast || budget % 2 == 0;

    debug!(entity = %id, ?direction, budget, fast, "Automaton decided");

    state.registry.set_schedule(
        id,
        AutomatonState {
            direction,
            remaining_ticks: budget,
            fast,
        },
    )
}

/// Make an attacked automaton run.
#[inline]
pub fn force_flee(state: &mut GameState, id: EntityId) -> bool {
    decide(state, id, true)
}

/// Advance one automaton by a single tick.
///
/// Returns the move outcome, or `None` if it had no schedule.
pub fn step(state: &mut GameState, id: EntityId) -> Option<MoveOutcome> {
    let schedule = *state.registry.schedule(id)?;

    let outcome = match attempt_move(state, id, schedule.direction, schedule.fast) {
        Ok(outcome) => outcome,
        Err(err) => {
            debug!(entity = %id, %err, "Automaton step dropped");
            state.registry.cancel_schedule(id);
            return None;
        }
    };

    let redecide = match outcome {
        MoveOutcome::Moved(_) => match state.registry.schedule_mut(id) {
            Some(pending) => {
                pending.remaining_ticks = pending.remaining_ticks.saturating_sub(1);
                pending.remaining_ticks == 0
            }
            None => false,
        },
        MoveOutcome::Blocked(_) | MoveOutcome::Rejected => true,
    };

    if redecide {
        decide(state, id, false);
    }

    Some(outcome)
}

/// Step every scheduled automaton once, in id order.
///
/// Automata spawned during this pass wait for the next tick; automata
/// removed during it are skipped.
pub fn run_automata(state: &mut GameState) -> usize {
    let mut stepped = 0;
    for id in state.registry.scheduled_ids() {
        if step(state, id).is_some() {
            stepped += 1;
        }
    }
    stepped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::GameConfig;
    use crate::game::entity::{Entity, Size};

    fn state_with_zombies(count: usize) -> (GameState, Vec<EntityId>) {
        let mut config = GameConfig::default();
        config.arena.width = 200;
        config.arena.height = 200;
        let mut state = GameState::new(config, 21);
        let mut ids = Vec::new();
        for i in 0..count {
            let id = state.registry.allocate_id();
            state.insert_entity(
                Entity::new(id, EntityKind::AiCombatant, format!("zombie {}", i + 1), Size::square(20))
                    .with_health(10)
                    .with_speed_level(4)
                    .at(10 + 60 * i as i32, 90),
            );
            ids.push(id);
        }
        (state, ids)
    }

    #[test]
    fn test_decide_draws_valid_schedule() {
        let (mut state, ids) = state_with_zombies(2);
        for _ in 0..50 {
            assert!(decide(&mut state, ids[0], false));
            let schedule = *state.registry.schedule(ids[0]).unwrap();
            assert!((1..=MAX_DECISION_TICKS).contains(&schedule.remaining_ticks));
            assert_ne!(schedule.direction, Direction::None);
            assert_eq!(schedule.fast, schedule.remaining_ticks % 2 == 0);
        }
    }

    #[test]
    fn test_forced_flee_is_fast() {
        let (mut state, ids) = state_with_zombies(2);
        for _ in 0..20 {
            assert!(force_flee(&mut state, ids[1]));
            assert!(state.registry.schedule(ids[1]).unwrap().fast);
        }
    }

    #[test]
    fn test_idle_when_winner_exists() {
        let (mut state, ids) = state_with_zombies(1);
        assert!(!decide(&mut state, ids[0], false));
        assert!(state.registry.schedule(ids[0]).is_none());
    }

    #[test]
    fn test_idle_when_expired_or_not_automaton() {
        let (mut state, ids) = state_with_zombies(3);
        state.registry.get_mut(ids[0]).unwrap().expired = true;
        assert!(!decide(&mut state, ids[0], false));

        let id = state.registry.allocate_id();
        state.insert_entity(Entity::new(id, EntityKind::Hazard, "hazard 1", Size::square(10)));
        assert!(!decide(&mut state, id, false));
        assert!(!decide(&mut state, EntityId::new(999), false));
    }

    #[test]
    fn test_step_counts_down_and_redecides() {
        let (mut state, ids) = state_with_zombies(2);
        state.registry.set_schedule(
            ids[0],
            AutomatonState { direction: Direction::Down, remaining_ticks: 2, fast: false },
        );

        assert_eq!(step(&mut state, ids[0]), Some(MoveOutcome::Moved(crate::game::entity::Position::new(10, 91))));
        assert_eq!(state.registry.schedule(ids[0]).unwrap().remaining_ticks, 1);

        step(&mut state, ids[0]);
        // Budget exhausted: a fresh commitment was drawn.
        let fresh = *state.registry.schedule(ids[0]).unwrap();
        assert!(fresh.remaining_ticks >= 1);
    }

    #[test]
    fn test_rejected_step_redecides() {
        let (mut state, ids) = state_with_zombies(2);
        state.registry.get_mut(ids[0]).unwrap().position.left = 0;
        state.registry.set_schedule(
            ids[0],
            AutomatonState { direction: Direction::Left, remaining_ticks: 50, fast: false },
        );

        assert_eq!(step(&mut state, ids[0]), Some(MoveOutcome::Rejected));
        let next = *state.registry.schedule(ids[0]).unwrap();
        assert_ne!(next, AutomatonState { direction: Direction::Left, remaining_ticks: 50, fast: false });
    }

    #[test]
    fn test_run_automata_steps_each_schedule() {
        let (mut state, ids) = state_with_zombies(3);
        for &id in &ids {
            decide(&mut state, id, false);
        }
        assert_eq!(run_automata(&mut state), 3);

        state.remove_entity(ids[1]);
        assert_eq!(run_automata(&mut state), 2);
    }
}
