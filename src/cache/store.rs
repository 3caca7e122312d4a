//! In-memory cache partitions with insertion-order trimming.

use std::collections::{HashMap, VecDeque};

use super::Response;

/// A named bucket of request/response pairs.
///
/// Keys are kept in insertion order. Overwriting a key moves it to the
/// newest position; reads never reorder.
#[derive(Debug, Clone, Default)]
pub struct CachePartition {
    name: String,
    entries: HashMap<String, Response>,
    order: VecDeque<String>,
}

impl CachePartition {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Response> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or overwrites `key`, making it the newest entry.
    pub fn put(&mut self, key: impl Into<String>, response: Response) {
        let key = key.into();
        if self.entries.insert(key.clone(), response).is_some() {
            self.order.retain(|k| *k != key);
        }
        self.order.push_back(key);
    }

    /// Removes `key`, returning whether it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.retain(|k| k != key);
            true
        } else {
            false
        }
    }

    /// Keys from oldest to newest.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Evicts oldest entries until at most `max` remain; returns the evicted keys.
    pub fn trim(&mut self, max: usize) -> Vec<String> {
        let excess = self.order.len().saturating_sub(max);
        let evicted: Vec<String> = self.order.drain(..excess).collect();
        for key in &evicted {
            self.entries.remove(key);
        }
        evicted
    }
}

/// All partitions, searched in creation order.
#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    partitions: Vec<CachePartition>,
}

impl CacheStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the partition named `name`, creating it if needed.
    pub fn open(&mut self, name: &str) -> &mut CachePartition {
        let index = match self.partitions.iter().position(|p| p.name == name) {
            Some(index) => index,
            None => {
                self.partitions.push(CachePartition::new(name));
                self.partitions.len() - 1
            }
        };
        &mut self.partitions[index]
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CachePartition> {
        self.partitions.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Drops a whole partition, returning whether it existed.
    pub fn delete(&mut self, name: &str) -> bool {
        let before = self.partitions.len();
        self.partitions.retain(|p| p.name != name);
        self.partitions.len() != before
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.partitions.iter().map(|p| p.name.clone()).collect()
    }

    /// First entry for `key` across all partitions.
    #[must_use]
    pub fn match_any(&self, key: &str) -> Option<&Response> {
        self.partitions.iter().find_map(|p| p.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(n: usize) -> Response {
        Response::ok(format!("entry {n}"))
    }

    #[test]
    fn sixty_inserts_trim_to_fifty() {
        let mut images = CachePartition::new("images-cache");
        for i in 0..60 {
            images.put(format!("https://dh-doom.com/images/{i}.png"), body(i));
            images.trim(50);
        }
        assert_eq!(images.len(), 50);
        for i in 0..10 {
            assert!(!images.contains(&format!("https://dh-doom.com/images/{i}.png")));
        }
        for i in 10..60 {
            assert!(images.contains(&format!("https://dh-doom.com/images/{i}.png")));
        }
    }

    #[test]
    fn trim_returns_oldest_first() {
        let mut partition = CachePartition::new("p");
        for i in 0..5 {
            partition.put(i.to_string(), body(i));
        }
        assert_eq!(partition.trim(3), vec!["0", "1"]);
        assert_eq!(partition.keys().collect::<Vec<_>>(), vec!["2", "3", "4"]);
        assert!(partition.trim(3).is_empty());
    }

    #[test]
    fn overwrite_moves_to_newest() {
        let mut partition = CachePartition::new("p");
        partition.put("a", body(1));
        partition.put("b", body(2));
        partition.put("a", body(3));
        assert_eq!(partition.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(partition.len(), 2);
        assert_eq!(partition.get("a"), Some(&body(3)));

        partition.trim(1);
        assert!(partition.contains("a"));
        assert!(!partition.contains("b"));
    }

    #[test]
    fn reads_do_not_reorder() {
        let mut partition = CachePartition::new("p");
        partition.put("a", body(1));
        partition.put("b", body(2));
        let _ = partition.get("a");
        partition.trim(1);
        assert!(partition.contains("b"));
    }

    #[test]
    fn delete_entry() {
        let mut partition = CachePartition::new("p");
        partition.put("a", body(1));
        assert!(partition.delete("a"));
        assert!(!partition.delete("a"));
        assert!(partition.is_empty());
        assert_eq!(partition.keys().count(), 0);
    }

    #[test]
    fn match_any_searches_in_creation_order() {
        let mut storage = CacheStorage::new();
        storage.open("static-v1").put("k", body(1));
        storage.open("dynamic-v1").put("k", body(2));
        storage.open("dynamic-v1").put("only-dynamic", body(3));
        assert_eq!(storage.match_any("k"), Some(&body(1)));
        assert_eq!(storage.match_any("only-dynamic"), Some(&body(3)));
        assert_eq!(storage.match_any("missing"), None);
    }

    #[test]
    fn open_is_idempotent_and_delete_drops() {
        let mut storage = CacheStorage::new();
        storage.open("a").put("k", body(1));
        storage.open("a");
        assert_eq!(storage.names(), vec!["a"]);
        assert_eq!(storage.get("a").map(CachePartition::len), Some(1));
        assert!(storage.delete("a"));
        assert!(!storage.has("a"));
        assert!(!storage.delete("a"));
    }
}
