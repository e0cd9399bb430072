//! Entity Registry
//!
//! Single owner of every live entity and of each automaton's pending
//! schedule. Both maps are keyed by [`EntityId`]; because ids come from a
//! monotonic counter, `BTreeMap` iteration is insertion order.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::game::automaton::AutomatonState;
use crate::game::entity::{Entity, EntityId, EntityKind};

/// All live entities on the arena.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Registry {
    entities: BTreeMap<EntityId, Entity>,
    schedules: BTreeMap<EntityId, AutomatonState>,
    next_id: u32,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id. Ids are never reused.
    pub fn allocate_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert a live entity.
    ///
    /// Returns `false` (and leaves the registry untouched) when the id is
    /// already taken.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.entities.contains_key(&entity.id) {
            return false;
        }
        self.next_id = self.next_id.max(entity.id.raw() + 1);
        self.entities.insert(entity.id, entity);
        true
    }

    /// Remove an entity together with its automaton schedule.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.schedules.remove(&id);
        self.entities.remove(&id)
    }

    /// Get an entity by id.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get an entity mutably by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Is this id live?
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// No live entities?
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Ids of all entities of the given kind, in insertion order.
    pub fn ids_of_kind(&self, kind: EntityKind) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.kind == kind)
            .map(|e| e.id)
            .collect()
    }

    /// Count entities of the given kind.
    pub fn count_of_kind(&self, kind: EntityKind) -> usize {
        self.entities.values().filter(|e| e.kind == kind).count()
    }

    // =========================================================================
    // Automaton schedules
    // =========================================================================

    /// Pending schedule for an automaton.
    pub fn schedule(&self, id: EntityId) -> Option<&AutomatonState> {
        self.schedules.get(&id)
    }

    /// Pending schedule for an automaton, mutably.
    pub fn schedule_mut(&mut self, id: EntityId) -> Option<&mut AutomatonState> {
        self.schedules.get_mut(&id)
    }

    /// Commit a schedule. Ignored for ids that are not live.
    pub fn set_schedule(&mut self, id: EntityId, schedule: AutomatonState) -> bool {
        if !self.entities.contains_key(&id) {
            return false;
        }
        self.schedules.insert(id, schedule);
        true
    }

    /// Cancel a pending schedule. Idempotent.
    pub fn cancel_schedule(&mut self, id: EntityId) -> bool {
        self.schedules.remove(&id).is_some()
    }

    /// Ids with a pending schedule, in insertion order.
    pub fn scheduled_ids(&self) -> Vec<EntityId> {
        self.schedules.keys().copied().collect()
    }
}
