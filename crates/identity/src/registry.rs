//! Bidirectional mint-once identifier registry.

use crate::ElementId;
use std::collections::HashMap;
use std::hash::Hash;

/// Registry mapping live-element keys to stable [`ElementId`]s and back.
///
/// Identifiers are minted monotonically on first encounter and reused on
/// every later one. Nothing is ever removed: a detached element's identifier
/// stays orphaned rather than being reassigned, so two distinct elements can
/// never share an identifier within one session.
///
/// # Example
///
/// ```
/// use identity::IdRegistry;
///
/// let mut registry: IdRegistry<u32> = IdRegistry::new();
/// let id = registry.assign(7);
///
/// assert_eq!(registry.assign(7), id);
/// assert_eq!(registry.get(7), Some(id));
/// assert_eq!(registry.element_of(id), Some(7));
/// ```
#[derive(Clone, Debug)]
pub struct IdRegistry<K> {
    next: u64,
    ids: HashMap<K, ElementId>,
    elements: HashMap<ElementId, K>,
}

impl<K: Copy + Eq + Hash> IdRegistry<K> {
    pub fn new() -> Self {
        Self {
            next: 1,
            ids: HashMap::new(),
            elements: HashMap::new(),
        }
    }

    /// Existing identifier for this key, if one was ever assigned.
    pub fn get(&self, key: K) -> Option<ElementId> {
        self.ids.get(&key).copied()
    }

    /// Identifier for this key, minting a fresh one on first encounter.
    pub fn assign(&mut self, key: K) -> ElementId {
        if let Some(id) = self.ids.get(&key) {
            return *id;
        }
        let id = ElementId::from_raw(self.next);
        self.next += 1;
        self.ids.insert(key, id);
        self.elements.insert(id, key);
        id
    }

    /// The key this identifier was minted for, or `None` if never registered.
    pub fn element_of(&self, id: ElementId) -> Option<K> {
        self.elements.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<K: Copy + Eq + Hash> Default for IdRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_is_stable_across_calls() {
        let mut registry: IdRegistry<u32> = IdRegistry::new();
        let first = registry.assign(10);
        let second = registry.assign(10);
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn distinct_keys_get_distinct_ids() {
        let mut registry: IdRegistry<u32> = IdRegistry::new();
        let a = registry.assign(1);
        let b = registry.assign(2);
        assert_ne!(a, b);
        assert_eq!(registry.element_of(a), Some(1));
        assert_eq!(registry.element_of(b), Some(2));
    }

    #[test]
    fn ids_are_monotonic() {
        let mut registry: IdRegistry<u32> = IdRegistry::new();
        let a = registry.assign(1);
        let b = registry.assign(2);
        let c = registry.assign(3);
        assert!(a.as_raw() < b.as_raw());
        assert!(b.as_raw() < c.as_raw());
    }

    #[test]
    fn unknown_lookups_return_none() {
        let registry: IdRegistry<u32> = IdRegistry::new();
        assert_eq!(registry.get(99), None);
        assert_eq!(registry.element_of(crate::ElementId::from_raw(99)), None);
    }
}
