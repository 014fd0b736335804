//! In-memory model store.
//!
//! Records are keyed by id and held up to a fixed capacity; inserting past it
//! evicts the oldest record.

use std::collections::{HashMap, VecDeque};

use parking_lot::RwLock;
use shared::{ModelId, ModelRecord};

pub struct ModelStore {
    capacity: usize,
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<ModelId, ModelRecord>,
    order: VecDeque<ModelId>,
}

impl ModelStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn insert(&self, record: ModelRecord) {
        let mut inner = self.inner.write();
        let id = record.id.clone();
        if inner.records.insert(id.clone(), record).is_none() {
            inner.order.push_back(id);
        }
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.records.remove(&oldest);
                tracing::debug!(id = %oldest, "evicted model from store");
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<ModelRecord> {
        self.inner.read().records.get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<ModelRecord> {
        let mut inner = self.inner.write();
        let record = inner.records.remove(id)?;
        inner.order.retain(|existing| existing != id);
        Some(record)
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometry::fixtures::fuselage_params;
    use geometry::mesh::Mesh;
    use geometry::model::assemble_component;
    use shared::{ComponentCategory, Provenance};

    fn record() -> ModelRecord {
        assemble_component(
            Mesh::unit_cube(),
            ComponentCategory::Fuselage,
            fuselage_params(10.0, 2.0),
            Provenance::Text,
            None,
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_insert_get_remove() {
        let store = ModelStore::new(4);
        let r = record();
        let id = r.id.clone();
        store.insert(r.clone());

        assert_eq!(store.get(&id), Some(r.clone()));
        assert_eq!(store.remove(&id), Some(r));
        assert!(store.get(&id).is_none());
        assert!(store.remove(&id).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_oldest_evicted() {
        let store = ModelStore::new(2);
        let (a, b, c) = (record(), record(), record());
        store.insert(a.clone());
        store.insert(b.clone());
        store.insert(c.clone());

        assert_eq!(store.len(), 2);
        assert!(store.get(&a.id).is_none());
        assert!(store.get(&b.id).is_some());
        assert!(store.get(&c.id).is_some());
    }

    #[test]
    fn test_reinsert_does_not_duplicate_order() {
        let store = ModelStore::new(2);
        let a = record();
        store.insert(a.clone());
        store.insert(a.clone());
        store.insert(record());
        assert!(store.get(&a.id).is_some());
        assert_eq!(store.len(), 2);
    }
}
