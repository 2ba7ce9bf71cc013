//! Generational slab storage for entities (spec §4.1, §9).
//!
//! `EntityId` halves are validated against the slot's current generation, so
//! a handle captured before a `remove` can never silently resolve to the
//! entity that later reused the slot.

use super::component::Entity;
use super::id::EntityId;

/// Generational arena of entities, indexed by [`EntityId`].
///
/// `remove` tombstones the slot rather than compacting the vector: indices
/// must stay stable across a tick because other entities may be holding
/// `EntityId`s that reference them by slot.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityPool {
    slots: Vec<Option<Entity>>,
    generations: Vec<u32>,
    free: Vec<u32>,
}

impl EntityPool {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Inserts a new entity, returning its handle.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        if let Some(slot) = self.free.pop() {
            let generation = self.generations[slot as usize];
            self.slots[slot as usize] = Some(entity);
            EntityId::pack(slot, generation)
        } else {
            let slot = self.slots.len() as u32;
            self.slots.push(Some(entity));
            self.generations.push(0);
            EntityId::pack(slot, 0)
        }
    }

    /// Removes the entity behind `id`, if `id` is still valid. The slot's
    /// generation is bumped so stale handles to it become invalid.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        if !self.is_valid(id) {
            return None;
        }
        let slot = id.slot() as usize;
        let removed = self.slots[slot].take();
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free.push(slot as u32);
        removed
    }

    pub fn is_valid(&self, id: EntityId) -> bool {
        if id.is_none() {
            return false;
        }
        let slot = id.slot() as usize;
        slot < self.slots.len()
            && self.generations[slot] == id.generation()
            && self.slots[slot].is_some()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        if !self.is_valid(id) {
            return None;
        }
        self.slots[id.slot() as usize].as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        if !self.is_valid(id) {
            return None;
        }
        self.slots[id.slot() as usize].as_mut()
    }

    /// Borrows two distinct entities mutably at once, for operations like
    /// boarding/disembarking that touch a carrier and a passenger together.
    /// Returns `None` if either id is invalid or they name the same slot.
    pub fn get_two_mut(&mut self, a: EntityId, b: EntityId) -> Option<(&mut Entity, &mut Entity)> {
        if a.slot() == b.slot() || !self.is_valid(a) || !self.is_valid(b) {
            return None;
        }
        let (slot_a, slot_b) = (a.slot() as usize, b.slot() as usize);
        let (left, right) = if slot_a < slot_b {
            let (left, right) = self.slots.split_at_mut(slot_b);
            (left[slot_a].as_mut(), right[0].as_mut())
        } else {
            let (left, right) = self.slots.split_at_mut(slot_a);
            (right[0].as_mut(), left[slot_b].as_mut())
        };
        match (slot_a < slot_b, left, right) {
            (true, Some(entity_a), Some(entity_b)) => Some((entity_a, entity_b)),
            (false, Some(entity_b), Some(entity_a)) => Some((entity_a, entity_b)),
            _ => None,
        }
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates live entities in ascending slot order, which is the order
    /// the checksum and per-tick update dispatch both require.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots.iter().enumerate().filter_map(|(slot, entry)| {
            entry.as_ref().map(|entity| {
                let id = EntityId::pack(slot as u32, self.generations[slot]);
                (id, entity)
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut Entity)> {
        let generations = &self.generations;
        self.slots.iter_mut().enumerate().filter_map(move |(slot, entry)| {
            entry.as_mut().map(|entity| {
                let id = EntityId::pack(slot as u32, generations[slot]);
                (id, entity)
            })
        })
    }

    /// All live ids, in ascending slot order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|(id, _)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::component::Entity;
    use crate::entity::target::UnitType;

    fn sample() -> Entity {
        Entity::new_unit(UnitType::Miner, 0, crate::map::Cell::new(0, 0))
    }

    #[test]
    fn insert_then_get_roundtrips() {
        let mut pool = EntityPool::new();
        let id = pool.insert(sample());
        assert!(pool.get(id).is_some());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn remove_invalidates_stale_handle() {
        let mut pool = EntityPool::new();
        let id = pool.insert(sample());
        assert!(pool.remove(id).is_some());
        assert!(pool.get(id).is_none());
        assert!(pool.remove(id).is_none());
    }

    #[test]
    fn reused_slot_gets_fresh_generation() {
        let mut pool = EntityPool::new();
        let first = pool.insert(sample());
        pool.remove(first).unwrap();
        let second = pool.insert(sample());
        assert_eq!(first.slot(), second.slot());
        assert_ne!(first.generation(), second.generation());
        assert!(pool.get(first).is_none());
        assert!(pool.get(second).is_some());
    }

    #[test]
    fn iter_is_ascending_slot_order() {
        let mut pool = EntityPool::new();
        let a = pool.insert(sample());
        let b = pool.insert(sample());
        pool.remove(a).unwrap();
        let c = pool.insert(sample());
        let ids: Vec<EntityId> = pool.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![c, b]);
    }
}
