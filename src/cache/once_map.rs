//! Write-once memo table

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Append-only map: a key is computed at most once and never replaced.
///
/// Mutation goes through `&mut self`, so a table has exactly one writer. The
/// provider owning these tables is single-caller by construction.
#[derive(Debug)]
pub struct OnceMap<K, V> {
    entries: HashMap<K, V>,
}

impl<K, V> Default for OnceMap<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> OnceMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.get(key)
    }

    /// Return the existing value for `key`, or insert the result of `init`
    pub fn get_or_insert_with(&mut self, key: K, init: impl FnOnce() -> V) -> &V {
        self.entries.entry(key).or_insert_with(init)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_runs_once_per_key() {
        let mut map = OnceMap::new();
        let mut calls = 0;

        assert_eq!(
            *map.get_or_insert_with("a", || {
                calls += 1;
                1
            }),
            1
        );
        assert_eq!(
            *map.get_or_insert_with("a", || {
                calls += 1;
                2
            }),
            1
        );

        assert_eq!(calls, 1);
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn lookup_by_borrowed_key() {
        let mut map: OnceMap<String, u32> = OnceMap::new();
        map.get_or_insert_with("key".to_string(), || 7);
        assert_eq!(map.get("key"), Some(&7));
        assert_eq!(map.get("other"), None);
    }
}
