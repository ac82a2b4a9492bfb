//! Entity registry
//!
//! Per-category live collection with mark-then-compact removal. Entities are
//! flagged during an update pass and only dropped by `compact`, so indices stay
//! valid while a pass is iterating.

use serde::{Deserialize, Serialize};

/// Entity identifier, unique within a run
pub type EntityId = u32;

/// Something the registry can flag for removal
pub trait Tracked {
    fn id(&self) -> EntityId;
    fn is_removed(&self) -> bool;
    fn flag_removed(&mut self);
}

/// Ordered collection of one entity category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registry<T> {
    items: Vec<T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Tracked> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: T) {
        self.items.push(item);
    }

    /// Flag an entity for removal. Returns true only the first time.
    pub fn mark_removed(&mut self, id: EntityId) -> bool {
        match self.items.iter_mut().find(|e| e.id() == id) {
            Some(e) if !e.is_removed() => {
                e.flag_removed();
                true
            }
            _ => false,
        }
    }

    /// Drop every flagged entity, keeping survivors in order. Returns how many went.
    pub fn compact(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|e| !e.is_removed());
        before - self.items.len()
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.items.iter_mut().find(|e| e.id() == id)
    }

    /// Entities not yet flagged
    pub fn live(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter(|e| !e.is_removed())
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
