//! Game Events
//!
//! Everything the core tells the outside world. Render collaborators
//! consume the entity lifecycle events; scoreboards consume
//! [`ScoreboardUpdate`]s.

use serde::{Serialize, Deserialize};

use crate::game::entity::{Entity, EntityId, EntityKind, Position, Size};

/// One combatant's line on the scoreboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantStats {
    /// Display title
    pub title: String,
    /// Current health
    pub health: i32,
    /// Speed level above the configured minimum
    pub bonus_speed: i32,
}

/// Message plus current standings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardUpdate {
    /// Latest announcement
    pub message: String,
    /// Standing combatants in registry order
    pub stats: Vec<CombatantStats>,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Entity placed on the arena
    EntityCreated {
        /// New entity
        id: EntityId,
        /// Its kind
        kind: EntityKind,
        /// Scoreboard title
        label: String,
        /// Top-left corner
        position: Position,
        /// Extent
        size: Size,
    },

    /// Entity position changed (move or re-placement)
    EntityMoved {
        /// Moved entity
        id: EntityId,
        /// New top-left corner
        position: Position,
    },

    /// Entity left the arena
    EntityRemoved {
        /// Removed entity
        id: EntityId,
    },

    /// Announcement for the scoreboard
    Scoreboard(ScoreboardUpdate),

    /// A round finished with a single combatant standing
    RoundWon {
        /// Last combatant standing
        winner_id: EntityId,
        /// Winner's level after the level-up
        new_level: u32,
        /// Rounds completed, including this one
        round: u32,
    },
}

/// A game event stamped with the tick it happened on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, data: GameEventData) -> Self {
        Self { tick, data }
    }

    /// Create entity created event.
    pub fn entity_created(tick: u32, entity: &Entity) -> Self {
        Self::new(
            tick,
            GameEventData::EntityCreated {
                id: entity.id,
                kind: entity.kind,
                label: entity.label.clone(),
                position: entity.position,
                size: entity.size,
            },
        )
    }

    /// Create entity moved event.
    pub fn entity_moved(tick: u32, id: EntityId, position: Position) -> Self {
        Self::new(tick, GameEventData::EntityMoved { id, position })
    }

    /// Create entity removed event.
    pub fn entity_removed(tick: u32, id: EntityId) -> Self {
        Self::new(tick, GameEventData::EntityRemoved { id })
    }

    /// Create scoreboard event.
    pub fn scoreboard(tick: u32, message: String, stats: Vec<CombatantStats>) -> Self {
        Self::new(tick, GameEventData::Scoreboard(ScoreboardUpdate { message, stats }))
    }

    /// Create round won event.
    pub fn round_won(tick: u32, winner_id: EntityId, new_level: u32, round: u32) -> Self {
        Self::new(tick, GameEventData::RoundWon { winner_id, new_level, round })
    }

    /// Scoreboard message, if this is an announcement.
    pub fn message(&self) -> Option<&str> {
        match &self.data {
            GameEventData::Scoreboard(update) => Some(update.message.as_str()),
            _ => None,
        }
    }
}
