use std::collections::{BTreeMap, BTreeSet};

use foundation::handles::TextureHandle;

/// Resolved panorama path (after extension probing).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey {
    pub path: String,
}

impl CacheKey {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Insert {
    Stored,
    /// The path was already cached; the caller still owns the handle it offered.
    AlreadyCached(TextureHandle),
}

/// Session-wide texture pool keyed by resolved path.
///
/// Entries are never evicted during navigation, so revisiting an area reuses
/// its texture. Everything is handed back at once by [`TextureCache::release_all`]
/// on teardown.
///
/// Notes on determinism:
/// - Entries are keyed in a `BTreeMap`, so teardown releases in path order.
#[derive(Debug, Default)]
pub struct TextureCache {
    entries: BTreeMap<CacheKey, TextureHandle>,
    handles: BTreeSet<TextureHandle>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Whether `handle` is owned by the cache (and must not be disposed elsewhere).
    pub fn holds(&self, handle: TextureHandle) -> bool {
        self.handles.contains(&handle)
    }

    pub fn peek(&self, key: &CacheKey) -> Option<TextureHandle> {
        self.entries.get(key).copied()
    }

    pub fn insert(&mut self, key: CacheKey, handle: TextureHandle) -> Insert {
        if let Some(existing) = self.entries.get(&key) {
            return Insert::AlreadyCached(*existing);
        }

        self.handles.insert(handle);
        self.entries.insert(key, handle);
        Insert::Stored
    }

    /// Empty the pool, returning every handle exactly once, in path order.
    pub fn release_all(&mut self) -> Vec<TextureHandle> {
        self.handles.clear();
        std::mem::take(&mut self.entries).into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheKey, Insert, TextureCache};
    use foundation::handles::TextureHandle;
    use pretty_assertions::assert_eq;

    #[test]
    fn stores_by_path() {
        let mut cache = TextureCache::new();
        let key = CacheKey::new("/panos/a.jpg");
        assert_eq!(cache.peek(&key), None);

        assert_eq!(cache.insert(key.clone(), TextureHandle(1)), Insert::Stored);
        assert_eq!(cache.peek(&key), Some(TextureHandle(1)));
        assert!(cache.contains(&key));
        assert!(cache.holds(TextureHandle(1)));
    }

    #[test]
    fn duplicate_insert_keeps_first_handle() {
        let mut cache = TextureCache::new();
        let key = CacheKey::new("/panos/a.jpg");
        cache.insert(key.clone(), TextureHandle(1));
        assert_eq!(
            cache.insert(key.clone(), TextureHandle(2)),
            Insert::AlreadyCached(TextureHandle(1))
        );
        assert_eq!(cache.peek(&key), Some(TextureHandle(1)));
        assert!(!cache.holds(TextureHandle(2)));
    }

    #[test]
    fn release_all_empties_pool_in_path_order() {
        let mut cache = TextureCache::new();
        cache.insert(CacheKey::new("/b.jpg"), TextureHandle(2));
        cache.insert(CacheKey::new("/a.jpg"), TextureHandle(1));

        assert_eq!(cache.release_all(), vec![TextureHandle(1), TextureHandle(2)]);
        assert!(cache.is_empty());
        assert!(!cache.holds(TextureHandle(1)));
    }
}
