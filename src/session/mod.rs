//! Session Module
//!
//! Runs a [`GameState`](crate::game::GameState) behind a single-writer
//! task. Everything outside the task talks to it through a command queue
//! and listens on an event broadcast.
//!
//! - `coordinator`: Command loop, periodic tick, event fan-out

pub mod coordinator;

pub use coordinator::{
    Command, Coordinator, CoordinatorConfig, CoordinatorHandle, RoundSnapshot, SessionError,
};
