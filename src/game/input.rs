//! Input Mapping
//!
//! Turns press/release events for input codes into movement requests.
//! Codes are looked up in the configured action keymap; unmapped codes
//! and moves that cancel out are silently ignored.

use std::collections::{BTreeMap, BTreeSet};
use serde::{Serialize, Deserialize};

use crate::game::movement::Direction;

/// What an input code does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Cardinal movement; the direction comes from the code name
    Move,
    /// Held modifier selecting the fast step
    Fast,
    /// Recognised but not handled by the core
    #[serde(other)]
    Other,
}

/// The stock keymap: arrow keys move, Shift is the fast modifier.
pub fn default_keymap() -> BTreeMap<String, Action> {
    [
        ("ArrowLeft", Action::Move),
        ("ArrowRight", Action::Move),
        ("ArrowUp", Action::Move),
        ("ArrowDown", Action::Move),
        ("Shift", Action::Fast),
    ]
    .into_iter()
    .map(|(code, action)| (code.to_string(), action))
    .collect()
}

/// Cardinal direction named by an input code.
///
/// `ArrowLeft` → left and so on; any code without a direction suffix
/// yields `None`.
pub fn direction_of_code(code: &str) -> Option<Direction> {
    let name = code.strip_prefix("Arrow")?;
    Direction::from_name(&name.to_ascii_lowercase())
}

/// Keys currently held by the human player.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputState {
    held_moves: BTreeSet<String>,
    fast_held: u32,
}

impl InputState {
    /// Create an empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a press.
    ///
    /// Returns the movement to attempt, if the press was a move key and
    /// the held keys resolve to a direction.
    pub fn key_down(&mut self, code: &str, keymap: &BTreeMap<String, Action>) -> Option<(Direction, bool)> {
        match keymap.get(code)? {
            Action::Move => {
                direction_of_code(code)?;
                self.held_moves.insert(code.to_string());
                let direction = self.resolved_direction();
                if direction == Direction::None {
                    return None;
                }
                Some((direction, self.is_fast()))
            }
            Action::Fast => {
                self.fast_held = self.fast_held.saturating_add(1);
                None
            }
            Action::Other => None,
        }
    }

    /// Register a release.
    pub fn key_up(&mut self, code: &str, keymap: &BTreeMap<String, Action>) {
        match keymap.get(code) {
            Some(Action::Move) => {
                self.held_moves.remove(code);
            }
            Some(Action::Fast) => {
                self.fast_held = self.fast_held.saturating_sub(1);
            }
            _ => {}
        }
    }

    /// Combined direction of all held move keys.
    ///
    /// Two perpendicular keys give a diagonal; opposite keys cancel.
    pub fn resolved_direction(&self) -> Direction {
        let (mut dx, mut dy) = (0, 0);
        for code in &self.held_moves {
            if let Some(direction) = direction_of_code(code) {
                let (x, y) = direction.delta();
                dx += x;
                dy += y;
            }
        }
        Direction::from_components(dx, dy)
    }

    /// Is a fast modifier held?
    pub fn is_fast(&self) -> bool {
        self.fast_held > 0
    }

    /// Drop every held key.
    pub fn clear(&mut self) {
        self.held_moves.clear();
        self.fast_held = 0;
    }
}
