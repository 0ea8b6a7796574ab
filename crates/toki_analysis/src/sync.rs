//! Mutex-synchronized containers shared between analysis tasks.
//!
//! `access` hands the callback an exclusive reference to the underlying
//! container; the reference must not escape the callback.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, RwLock};

/// A mutex-synchronized growable slice.
#[derive(Debug, Default)]
pub struct Slice<T> {
    items: Mutex<Vec<T>>,
}

impl<T> Slice<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    pub fn push(&self, item: T) -> usize {
        let mut items = self.items.lock().unwrap();
        let index = items.len();
        items.push(item);
        index
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Executes `fn` exclusively on the underlying vector.
    pub fn access<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let mut items = self.items.lock().unwrap();
        f(&mut items)
    }
}

impl<T: Clone> Slice<T> {
    pub fn at(&self, index: usize) -> T {
        self.items.lock().unwrap()[index].clone()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.lock().unwrap().clone()
    }
}

/// An rwlock-synchronized map.
#[derive(Debug, Default)]
pub struct Map<K, V> {
    items: RwLock<HashMap<K, V>>,
}

impl<K: Eq + Hash, V> Map<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set(&self, key: K, value: V) {
        self.items.write().unwrap().insert(key, value);
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.items.read().unwrap().contains_key(key)
    }

    /// Executes `fn` exclusively on the underlying map.
    pub fn access<R>(&self, f: impl FnOnce(&mut HashMap<K, V>) -> R) -> R {
        let mut items = self.items.write().unwrap();
        f(&mut items)
    }
}

impl<K: Eq + Hash, V: Clone> Map<K, V> {
    pub fn get(&self, key: &K) -> Option<V> {
        self.items.read().unwrap().get(key).cloned()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_slice_push_at_len() {
        let s = Slice::new(0);
        assert_eq!(0, s.push("a"));
        assert_eq!(1, s.push("b"));
        assert_eq!(2, s.len());
        assert_eq!("a", s.at(0));
        assert_eq!(vec!["a", "b"], s.to_vec());
    }

    #[test]
    fn test_slice_access() {
        let s = Slice::new(0);
        s.push(1);
        s.push(2);
        let sum: i32 = s.access(|items| items.iter().sum());
        assert_eq!(3, sum);
        s.access(|items| items.retain(|&i| i > 1));
        assert_eq!(1, s.len());
    }

    #[test]
    fn test_map() {
        let m = Map::new(0);
        m.set("a", 1);
        m.set("b", 2);
        assert_eq!(2, m.len());
        assert_eq!(Some(1), m.get(&"a"));
        assert_eq!(None, m.get(&"c"));
        assert!(m.contains_key(&"b"));
        m.access(|items| items.remove("a"));
        assert!(!m.contains_key(&"a"));
    }

    #[test]
    fn test_slice_concurrent_push() {
        let s = std::sync::Arc::new(Slice::new(0));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let s = s.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    s.push(i);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(400, s.len());
    }
}
