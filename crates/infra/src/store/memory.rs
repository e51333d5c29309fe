use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use learnhub_core::Entity;

/// Keyed record store. Writes are last-write-wins.
pub trait Store<V: Entity>: Send + Sync {
    fn get(&self, id: &V::Id) -> Option<V>;

    /// Insert or replace the record with the same id.
    fn insert(&self, value: V);

    /// Insert only if no existing record `conflicts` with it; the check and
    /// the insert happen under one write lock. Returns the value back on conflict.
    fn insert_unless(&self, value: V, conflicts: &dyn Fn(&V) -> bool) -> Result<(), V>;

    /// All records ordered by id.
    fn list(&self) -> Vec<V>;

    fn find(&self, pred: &dyn Fn(&V) -> bool) -> Option<V>;

    /// Matching records ordered by id.
    fn filter(&self, pred: &dyn Fn(&V) -> bool) -> Vec<V>;

    /// Mutate a record in place. `None` if it does not exist.
    fn update<R>(&self, id: &V::Id, f: impl FnOnce(&mut V) -> R) -> Option<R>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V, S> Store<V> for Arc<S>
where
    V: Entity,
    S: Store<V> + ?Sized,
{
    fn get(&self, id: &V::Id) -> Option<V> {
        (**self).get(id)
    }

    fn insert(&self, value: V) {
        (**self).insert(value)
    }

    fn insert_unless(&self, value: V, conflicts: &dyn Fn(&V) -> bool) -> Result<(), V> {
        (**self).insert_unless(value, conflicts)
    }

    fn list(&self) -> Vec<V> {
        (**self).list()
    }

    fn find(&self, pred: &dyn Fn(&V) -> bool) -> Option<V> {
        (**self).find(pred)
    }

    fn filter(&self, pred: &dyn Fn(&V) -> bool) -> Vec<V> {
        (**self).filter(pred)
    }

    fn update<R>(&self, id: &V::Id, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        (**self).update(id, f)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

/// Process-memory store. Contents are lost on restart.
#[derive(Debug)]
pub struct InMemoryStore<V: Entity> {
    inner: RwLock<HashMap<V::Id, V>>,
}

impl<V: Entity> InMemoryStore<V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<V: Entity> Default for InMemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted<V: Entity>(mut values: Vec<V>) -> Vec<V> {
    values.sort_by(|a, b| a.id().cmp(b.id()));
    values
}

impl<V> Store<V> for InMemoryStore<V>
where
    V: Entity + Clone + Send + Sync + 'static,
    V::Id: Send + Sync,
{
    fn get(&self, id: &V::Id) -> Option<V> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(id).cloned()
    }

    fn insert(&self, value: V) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(value.id().clone(), value);
    }

    fn insert_unless(&self, value: V, conflicts: &dyn Fn(&V) -> bool) -> Result<(), V> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if map.values().any(conflicts) {
            return Err(value);
        }
        map.insert(value.id().clone(), value);
        Ok(())
    }

    fn list(&self) -> Vec<V> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        sorted(map.values().cloned().collect())
    }

    fn find(&self, pred: &dyn Fn(&V) -> bool) -> Option<V> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.values().find(|v| pred(v)).cloned()
    }

    fn filter(&self, pred: &dyn Fn(&V) -> bool) -> Vec<V> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        sorted(map.values().filter(|v| pred(v)).cloned().collect())
    }

    fn update<R>(&self, id: &V::Id, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.get_mut(id).map(f)
    }

    fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Note {
        id: u32,
        text: &'static str,
    }

    impl Entity for Note {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    fn note(id: u32, text: &'static str) -> Note {
        Note { id, text }
    }

    #[test]
    fn insert_replaces_and_list_is_ordered() {
        let store = InMemoryStore::new();
        store.insert(note(3, "c"));
        store.insert(note(1, "a"));
        store.insert(note(1, "a2"));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&1).unwrap().text, "a2");
        assert_eq!(store.list().iter().map(|n| n.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn insert_unless_rejects_conflicts() {
        let store = InMemoryStore::new();
        store.insert(note(1, "dup"));

        let rejected = store.insert_unless(note(2, "dup"), &|n: &Note| n.text == "dup");
        assert_eq!(rejected, Err(note(2, "dup")));
        assert!(store.insert_unless(note(2, "fresh"), &|n: &Note| n.text == "fresh").is_ok());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn update_find_filter() {
        let store: Arc<InMemoryStore<Note>> = Arc::new(InMemoryStore::new());
        store.insert(note(1, "a"));
        store.insert(note(2, "b"));

        assert_eq!(store.update(&1, |n| { n.text = "z"; n.id }), Some(1));
        assert_eq!(store.update(&9, |n| n.id), None);
        assert_eq!(store.find(&|n: &Note| n.text == "z").map(|n| n.id), Some(1));
        assert_eq!(store.filter(&|n: &Note| n.id > 1).len(), 1);
        assert!(store.get(&9).is_none());
        assert!(!store.is_empty());
    }
}
