//! Simulation Tick
//!
//! One step of the game loop. Key events are applied as they arrive;
//! automata advance once per tick. Both paths are run-to-completion on
//! `&mut GameState`, so a tick and a key event never interleave.

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::game::automaton::run_automata;
use crate::game::entity::EntityId;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::movement::{attempt_move, MoveOutcome};
use crate::game::state::GameState;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated since the previous drain
    pub events: Vec<GameEvent>,
    /// Winner, if a round ended during this tick
    pub round_won: Option<EntityId>,
    /// Rounds completed after this tick
    pub round: u32,
}

/// A recorded press or release of an input code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Input code ("ArrowLeft", "Shift")
    pub code: String,
    /// Press (`true`) or release (`false`)
    pub pressed: bool,
}

impl KeyEvent {
    /// A press of `code`.
    pub fn down(code: impl Into<String>) -> Self {
        Self { code: code.into(), pressed: true }
    }

    /// A release of `code`.
    pub fn up(code: impl Into<String>) -> Self {
        Self { code: code.into(), pressed: false }
    }
}

/// Run one simulation tick: every scheduled automaton steps once.
pub fn tick(state: &mut GameState) -> TickResult {
    state.tick += 1;

    let stepped = run_automata(state);

    let events = state.take_events();
    let round_won = events.iter().find_map(|event| match event.data {
        GameEventData::RoundWon { winner_id, .. } => Some(winner_id),
        _ => None,
    });

    if stepped > 0 {
        debug!(tick = state.tick, stepped, events = events.len(), "Tick");
    }

    TickResult {
        events,
        round_won,
        round: state.round,
    }
}

/// Apply a key press or release for the human player.
///
/// Returns the outcome when the press produced a move attempt. Releases
/// only update the held-key set.
pub fn apply_key(state: &mut GameState, code: &str, pressed: bool) -> Option<MoveOutcome> {
    if !pressed {
        state.input.key_up(code, &state.config.actions);
        return None;
    }

    let (direction, fast) = state.input.key_down(code, &state.config.actions)?;
    let human = state.human?;

    match attempt_move(state, human, direction, fast) {
        Ok(outcome) => Some(outcome),
        Err(err) => {
            debug!(%err, code, "Key ignored");
            None
        }
    }
}

/// Replay recorded key events over `tick_count` ticks.
///
/// Keys recorded for tick `t` are applied just before tick `t` runs.
/// Returns every event produced, in order.
pub fn run_scripted(
    state: &mut GameState,
    script: &BTreeMap<u32, Vec<KeyEvent>>,
    tick_count: u32,
) -> Vec<GameEvent> {
    let mut all_events = Vec::new();

    for _ in 0..tick_count {
        if let Some(keys) = script.get(&(state.tick + 1)) {
            for key in keys {
                apply_key(state, &key.code, key.pressed);
            }
        }

        let result = tick(state);
        all_events.extend(result.events);
    }

    all_events
}
