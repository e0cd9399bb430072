//! Entity Definitions
//!
//! Everything that occupies space on the arena is an [`Entity`]. What it
//! does when touched is decided by its [`EntityKind`], fixed at creation.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::geometry::Rect;

// =============================================================================
// ENTITY ID
// =============================================================================

/// Unique entity identifier.
///
/// Ids are allocated from a monotonic counter, so ordering by id is
/// ordering by first insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create from a raw counter value.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw counter value.
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// ENTITY KIND
// =============================================================================

/// Closed set of entity kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EntityKind {
    /// Keyboard-driven combatant
    HumanCombatant = 0,
    /// Automaton-driven combatant
    AiCombatant = 1,
    /// Always blocks, never interacts
    Obstacle = 2,
    /// Adds its speed level to the combatant that touches it
    SpeedPickup = 3,
    /// Adds its health to the combatant that touches it
    HealthPickup = 4,
    /// Subtracts its health from the combatant that touches it
    Hazard = 5,
}

impl EntityKind {
    /// Kinds regenerated by the round controller between rounds.
    pub const NON_COMBATANTS: [EntityKind; 4] = [
        EntityKind::Obstacle,
        EntityKind::SpeedPickup,
        EntityKind::HealthPickup,
        EntityKind::Hazard,
    ];

    /// Can this kind win a round?
    #[inline]
    pub fn is_combatant(self) -> bool {
        matches!(self, EntityKind::HumanCombatant | EntityKind::AiCombatant)
    }

    /// Can this kind be the passive side of an interaction?
    #[inline]
    pub fn is_interactive(self) -> bool {
        !matches!(self, EntityKind::Obstacle)
    }

    /// Noun used when labelling entities of this kind.
    pub fn noun(self) -> &'static str {
        match self {
            EntityKind::HumanCombatant => "player",
            EntityKind::AiCombatant => "zombie",
            EntityKind::Obstacle => "obstacle",
            EntityKind::SpeedPickup => "speed",
            EntityKind::HealthPickup => "health",
            EntityKind::Hazard => "hazard",
        }
    }
}

// =============================================================================
// POSITION / SIZE
// =============================================================================

/// Top-left corner of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Distance from the arena's left edge
    pub left: i32,
    /// Distance from the arena's top edge
    pub top: i32,
}

impl Position {
    /// Create a new position.
    #[inline]
    pub const fn new(left: i32, top: i32) -> Self {
        Self { left, top }
    }
}

/// Extent of an entity. Fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent
    pub width: i32,
    /// Vertical extent
    pub height: i32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Square of the given side.
    #[inline]
    pub const fn square(side: i32) -> Self {
        Self { width: side, height: side }
    }

    /// Area in square units.
    #[inline]
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

// =============================================================================
// ENTITY
// =============================================================================

/// A live object on the arena.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    /// Unique id
    pub id: EntityId,

    /// What this entity is
    pub kind: EntityKind,

    /// Display title ("player 1", "zombie 3")
    pub label: String,

    /// Top-left corner
    pub position: Position,

    /// Extent
    pub size: Size,

    /// Hit points for combatants; effect magnitude for health pickups
    /// and hazards.
    pub health: i32,

    /// Step size under the fast modifier (combatants); bonus granted
    /// (speed pickups).
    pub speed_level: i32,

    /// Progression counter, starts at 1.
    pub level: u32,

    /// Set once the entity has been consumed or killed.
    pub expired: bool,

    /// `Some(true)` forces the fixed entity grid regardless of arena
    /// settings.
    pub snap_override: Option<bool>,
}

impl Entity {
    /// Create an entity at the origin with neutral stats.
    pub fn new(id: EntityId, kind: EntityKind, label: impl Into<String>, size: Size) -> Self {
        Self {
            id,
            kind,
            label: label.into(),
            position: Position::default(),
            size,
            health: 1,
            speed_level: 0,
            level: 1,
            expired: false,
            snap_override: None,
        }
    }

    /// Builder: set health.
    pub fn with_health(mut self, health: i32) -> Self {
        self.health = health;
        self
    }

    /// Builder: set speed level.
    pub fn with_speed_level(mut self, speed_level: i32) -> Self {
        self.speed_level = speed_level;
        self
    }

    /// Builder: set snap preference.
    pub fn with_snap_override(mut self, snap: bool) -> Self {
        self.snap_override = Some(snap);
        self
    }

    /// Builder: set position.
    pub fn at(mut self, left: i32, top: i32) -> Self {
        self.position = Position::new(left, top);
        self
    }

    /// Current bounding rectangle.
    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect_at(self.position)
    }

    /// Bounding rectangle if this entity stood at `position`.
    #[inline]
    pub fn rect_at(&self, position: Position) -> Rect {
        Rect::new(position.left, position.top, self.size.width, self.size.height)
    }

    /// Is this a combatant?
    #[inline]
    pub fn is_combatant(&self) -> bool {
        self.kind.is_combatant()
    }

    /// Combatant still in the fight: not expired and health above zero.
    #[inline]
    pub fn is_standing(&self) -> bool {
        self.is_combatant() && !self.expired && self.health > 0
    }
}
