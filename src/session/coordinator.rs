//! Session Coordinator
//!
//! One task owns the game state. Key events, manual ticks, snapshots and
//! shutdown arrive as [`Command`]s on an `mpsc` queue; periodic ticks come
//! from a `tokio::time::interval` polled in the same `select!`. Events
//! produced by each step are fanned out on a `broadcast` channel to render
//! and scoreboard subscribers.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::core::hash::StateHash;
use crate::game::config::GameConfig;
use crate::game::entity::Entity;
use crate::game::events::{CombatantStats, GameEvent};
use crate::game::state::GameState;
use crate::game::tick::{apply_key, tick};

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The coordinator task has stopped.
    #[error("Session closed")]
    Closed,
}

/// Point-in-time copy of the arena.
#[derive(Debug, Clone)]
pub struct RoundSnapshot {
    /// Ticks elapsed
    pub tick: u32,
    /// Rounds completed
    pub round: u32,
    /// Live entities in registry order
    pub entities: Vec<Entity>,
    /// Scoreboard standings
    pub stats: Vec<CombatantStats>,
    /// State hash at this point
    pub state_hash: StateHash,
}

/// Work for the coordinator task.
#[derive(Debug)]
pub enum Command {
    /// Input code pressed
    KeyDown(String),
    /// Input code released
    KeyUp(String),
    /// Run one tick now
    Tick,
    /// Reply with a snapshot
    Snapshot(oneshot::Sender<RoundSnapshot>),
    /// Stop the task and hand back the state
    Shutdown,
}

/// Coordinator settings.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Periodic tick interval; `None` ticks only on [`Command::Tick`].
    pub tick_interval: Option<Duration>,
    /// Command queue capacity
    pub command_buffer: usize,
    /// Event broadcast capacity
    pub event_buffer: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Some(Duration::from_millis(crate::game::config::DEFAULT_TICK_INTERVAL_MS)),
            command_buffer: 64,
            event_buffer: 256,
        }
    }
}

impl CoordinatorConfig {
    /// Settings using the game config's tick interval.
    pub fn from_game_config(config: &GameConfig) -> Self {
        Self {
            tick_interval: Some(Duration::from_millis(config.tick_interval_ms.max(1))),
            ..Default::default()
        }
    }

    /// Settings with ticks driven only by commands.
    pub fn manual() -> Self {
        Self {
            tick_interval: None,
            ..Default::default()
        }
    }
}

/// Cloneable handle for talking to a running coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<GameEvent>,
}

impl CoordinatorHandle {
    /// Listen to game events.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Queue a command.
    pub async fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands.send(command).await.map_err(|_| SessionError::Closed)
    }

    /// Press an input code.
    pub async fn key_down(&self, code: impl Into<String>) -> Result<(), SessionError> {
        self.send(Command::KeyDown(code.into())).await
    }

    /// Release an input code.
    pub async fn key_up(&self, code: impl Into<String>) -> Result<(), SessionError> {
        self.send(Command::KeyUp(code.into())).await
    }

    /// Run one tick now.
    pub async fn tick(&self) -> Result<(), SessionError> {
        self.send(Command::Tick).await
    }

    /// Copy of the current arena.
    pub async fn snapshot(&self) -> Result<RoundSnapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx)).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Stop the coordinator.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(Command::Shutdown).await
    }
}

/// Single writer for one arena.
pub struct Coordinator {
    state: GameState,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<GameEvent>,
    tick_interval: Option<Duration>,
}

impl Coordinator {
    /// Wrap a state. Subscribe through the handle before spawning to see
    /// events that are already pending (such as round start).
    pub fn new(state: GameState, config: CoordinatorConfig) -> (Self, CoordinatorHandle) {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));
        let (event_tx, _) = broadcast::channel(config.event_buffer.max(1));

        let coordinator = Self {
            state,
            commands: command_rx,
            events: event_tx.clone(),
            tick_interval: config.tick_interval,
        };
        let handle = CoordinatorHandle {
            commands: command_tx,
            events: event_tx,
        };
        (coordinator, handle)
    }

    /// Run on a new task.
    pub fn spawn(self) -> JoinHandle<GameState> {
        tokio::spawn(self.run())
    }

    /// Process commands and ticks until shutdown or until every handle is
    /// dropped. Returns the final state.
    pub async fn run(mut self) -> GameState {
        info!(
            tick = self.state.tick,
            entities = self.state.registry.len(),
            "Coordinator started"
        );

        self.publish();

        let mut ticker = self.tick_interval.map(|period| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(Command::Shutdown) | None => break,
                        Some(command) => self.handle(command),
                    }
                }
                _ = next_tick(ticker.as_mut()) => {
                    self.run_tick();
                }
            }
        }

        info!(tick = self.state.tick, round = self.state.round, "Coordinator stopped");
        self.state
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::KeyDown(code) => {
                let outcome = apply_key(&mut self.state, &code, true);
                debug!(%code, ?outcome, "Key down");
                self.publish();
            }
            Command::KeyUp(code) => {
                apply_key(&mut self.state, &code, false);
            }
            Command::Tick => self.run_tick(),
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Command::Shutdown => {}
        }
    }

    fn run_tick(&mut self) {
        let result = tick(&mut self.state);
        if let Some(winner) = result.round_won {
            info!(winner = %winner, round = result.round, "Round complete");
        }
        self.broadcast(result.events);
    }

    fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            tick: self.state.tick,
            round: self.state.round,
            entities: self.state.registry.iter().cloned().collect(),
            stats: self.state.combatant_stats(),
            state_hash: self.state.compute_hash(),
        }
    }

    fn publish(&mut self) {
        let events = self.state.take_events();
        self.broadcast(events);
    }

    fn broadcast(&self, events: Vec<GameEvent>) {
        for event in events {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }
}

async fn next_tick(ticker: Option<&mut tokio::time::Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::{EntityKind, Position, Size};
    use crate::game::events::GameEventData;
    use crate::game::round::start_round;

    fn lone_player_state() -> GameState {
        let mut config = GameConfig::default();
        config.population.obstacles = 0;
        config.population.speed_pickups = 0;
        config.population.health_pickups = 0;
        config.population.hazards = 0;
        config.population.automata = 0;
        let mut state = GameState::new(config, 4);

        let id = state.registry.allocate_id();
        state.insert_entity(
            Entity::new(id, EntityKind::HumanCombatant, "player 1", Size::square(20))
                .with_health(10)
                .with_speed_level(4)
                .at(100, 100),
        );
        state.human = Some(id);
        state
    }

    #[tokio::test]
    async fn test_manual_ticks_and_snapshot() {
        let mut state = GameState::new(GameConfig::default(), 42);
        start_round(&mut state).unwrap();

        let (coordinator, handle) = Coordinator::new(state, CoordinatorConfig::manual());
        let task = coordinator.spawn();

        for _ in 0..5 {
            handle.tick().await.unwrap();
        }
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.tick, 5);
        assert!(!snapshot.stats.is_empty());
        assert_eq!(snapshot.entities.len(), snapshot.entities.iter().map(|e| e.id).collect::<std::collections::BTreeSet<_>>().len());

        handle.shutdown().await.unwrap();
        let state = task.await.unwrap();
        assert_eq!(state.tick, 5);
        assert_eq!(state.compute_hash(), snapshot.state_hash);
    }

    #[tokio::test]
    async fn test_key_events_move_player_and_broadcast() {
        let (coordinator, handle) = Coordinator::new(lone_player_state(), CoordinatorConfig::manual());
        let mut events = handle.subscribe();
        let task = coordinator.spawn();

        // Pending creation event goes out first.
        let created = events.recv().await.unwrap();
        assert!(matches!(created.data, GameEventData::EntityCreated { .. }));

        handle.key_down("ArrowRight").await.unwrap();
        handle.key_up("ArrowRight").await.unwrap();
        handle.key_down("ArrowDown").await.unwrap();

        let first = events.recv().await.unwrap();
        assert!(matches!(first.data, GameEventData::EntityMoved { position, .. } if position == Position::new(101, 100)));
        let second = events.recv().await.unwrap();
        assert!(matches!(second.data, GameEventData::EntityMoved { position, .. } if position == Position::new(101, 101)));

        handle.shutdown().await.unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_after_shutdown() {
        let (coordinator, handle) = Coordinator::new(lone_player_state(), CoordinatorConfig::manual());
        let task = coordinator.spawn();

        handle.shutdown().await.unwrap();
        task.await.unwrap();

        assert_eq!(handle.tick().await, Err(SessionError::Closed));
        assert!(matches!(handle.snapshot().await, Err(SessionError::Closed)));
    }

    #[tokio::test]
    async fn test_interval_drives_ticks() {
        let config = CoordinatorConfig {
            tick_interval: Some(Duration::from_millis(1)),
            ..Default::default()
        };
        let (coordinator, handle) = Coordinator::new(lone_player_state(), config);
        let task = coordinator.spawn();

        tokio::time::sleep(Duration::from_millis(30)).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.tick >= 1);

        handle.shutdown().await.unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropping_handles_stops_task() {
        let (coordinator, handle) = Coordinator::new(lone_player_state(), CoordinatorConfig::manual());
        let task = coordinator.spawn();
        drop(handle);

        let state = task.await.unwrap();
        assert_eq!(state.tick, 0);
    }
}
