//! Game State
//!
//! [`GameState`] is the one context object every component works on:
//! arena geometry, configuration, registry, RNG and the outgoing event
//! queue. There is no global "current game"; callers own the state and
//! pass it by `&mut`.

use std::collections::BTreeMap;

use crate::core::hash::{StateHash, compute_state_hash};
use crate::core::rng::DeterministicRng;
use crate::game::config::GameConfig;
use crate::game::entity::{Entity, EntityId, EntityKind};
use crate::game::events::{CombatantStats, GameEvent};
use crate::game::input::InputState;
use crate::game::registry::Registry;

/// Arena geometry, fixed for the lifetime of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arena {
    /// Arena width
    pub width: i32,
    /// Arena height
    pub height: i32,
    /// Movement wraps across bounds
    pub wrap_enabled: bool,
    /// Global snap grid
    pub snap_to_grid: Option<i32>,
}

impl Arena {
    /// Arena described by a config.
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            width: config.arena.width,
            height: config.arena.height,
            wrap_enabled: config.arena.wrap,
            snap_to_grid: config.arena.snap_to_grid,
        }
    }

    /// Area in square units.
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

/// Complete state of a running simulation.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Configuration read at round start
    pub config: GameConfig,

    /// Arena geometry
    pub arena: Arena,

    /// Live entities and automaton schedules
    pub registry: Registry,

    /// RNG seed (for verification)
    pub rng_seed: u64,

    /// Deterministic RNG state
    pub rng: DeterministicRng,

    /// Game-loop ticks elapsed
    pub tick: u32,

    /// Rounds completed so far
    pub round: u32,

    /// The keyboard-driven combatant, while it is registered
    pub human: Option<EntityId>,

    /// Keys held by the human player
    pub input: InputState,

    /// Per-kind counters for entity labels
    label_counters: BTreeMap<EntityKind, u32>,

    /// Events generated since the last drain
    pending_events: Vec<GameEvent>,
}

impl GameState {
    /// Create an empty arena. Use [`crate::game::round::start_round`] to
    /// populate it.
    pub fn new(config: GameConfig, rng_seed: u64) -> Self {
        Self {
            arena: Arena::from_config(&config),
            config,
            registry: Registry::new(),
            rng_seed,
            rng: DeterministicRng::new(rng_seed),
            tick: 0,
            round: 0,
            human: None,
            input: InputState::new(),
            label_counters: BTreeMap::new(),
            pending_events: Vec::new(),
        }
    }

    /// Get an entity by id.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.registry.get(id)
    }

    /// Next display label for a kind ("zombie 3").
    pub fn next_label(&mut self, kind: EntityKind) -> String {
        let counter = self.label_counters.entry(kind).or_insert(0);
        *counter += 1;
        format!("{} {}", kind.noun(), counter)
    }

    /// Register an entity and announce it to the render side.
    pub fn insert_entity(&mut self, entity: Entity) -> bool {
        let event = GameEvent::entity_created(self.tick, &entity);
        if !self.registry.insert(entity) {
            return false;
        }
        self.push_event(event);
        true
    }

    /// Unregister an entity (cancelling its schedule) and announce it.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let removed = self.registry.remove(id)?;
        if self.human == Some(id) {
            self.human = None;
            self.input.clear();
        }
        self.push_event(GameEvent::entity_removed(self.tick, id));
        Some(removed)
    }

    /// Scoreboard lines for every standing combatant.
    pub fn combatant_stats(&self) -> Vec<CombatantStats> {
        self.registry
            .iter()
            .filter(|e| e.is_standing())
            .map(|e| CombatantStats {
                title: e.label.clone(),
                health: e.health,
                bonus_speed: e.speed_level - self.config.min_speed_level,
            })
            .collect()
    }

    /// Send a message to the scoreboard along with current standings.
    pub fn announce(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(tick = self.tick, "{}", message);
        let stats = self.combatant_stats();
        self.push_event(GameEvent::scoreboard(self.tick, message, stats));
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            hasher.update_u32(self.round);

            for entity in self.registry.iter() {
                hasher.update_u32(entity.id.raw());
                hasher.update_u8(entity.kind as u8);
                hasher.update_str(&entity.label);
                hasher.update_rect(&entity.rect());
                hasher.update_i32(entity.health);
                hasher.update_i32(entity.speed_level);
                hasher.update_u32(entity.level);
                hasher.update_bool(entity.expired);

                if let Some(schedule) = self.registry.schedule(entity.id) {
                    hasher.update_u8(schedule.direction as u8);
                    hasher.update_u32(schedule.remaining_ticks);
                    hasher.update_bool(schedule.fast);
                }
            }

            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);
        })
    }
}
