//! ChainedHashSet: key-only adapter over [`HashEngine`]. Duplicates are
//! always rejected.

use crate::config::HashConfig;
use crate::engine::{self, Handle, HashEngine, InsertPolicy};
use crate::error::{or_panic, Result};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// A hash set resolving collisions by chaining.
///
/// ```
/// use chained_hashmap::ChainedHashSet;
///
/// let mut s = ChainedHashSet::new();
/// assert!(s.insert(3));
/// assert!(!s.insert(3));
/// assert!(s.contains(&3));
/// assert!(s.erase(&3));
/// assert!(s.is_empty());
/// ```
pub struct ChainedHashSet<K, S = DefaultHashBuilder> {
    engine: HashEngine<K, (), S>,
}

impl<K> ChainedHashSet<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            engine: HashEngine::new(),
        }
    }

    pub fn with_buckets(n: usize) -> Result<Self> {
        Ok(Self {
            engine: HashEngine::with_buckets(n)?,
        })
    }

    pub fn with_config(config: HashConfig) -> Result<Self> {
        Ok(Self {
            engine: HashEngine::with_config(config)?,
        })
    }
}

impl<K> Default for ChainedHashSet<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, S> ChainedHashSet<K, S> {
    pub fn len(&self) -> usize {
        self.engine.len()
    }
    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }
    pub fn bucket_count(&self) -> usize {
        self.engine.bucket_count()
    }
    pub fn load_factor(&self) -> f32 {
        self.engine.load_factor()
    }
    pub fn max_load_factor(&self) -> f32 {
        self.engine.max_load_factor()
    }
    pub fn clear(&mut self) {
        self.engine.clear()
    }

    pub fn engine(&self) -> &HashEngine<K, (), S> {
        &self.engine
    }

    pub fn key(&self, h: Handle) -> Option<&K> {
        h.key(&self.engine)
    }

    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            it: self.engine.iter(),
        }
    }
}

impl<K, S> ChainedHashSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            engine: HashEngine::with_hasher(hasher),
        }
    }

    pub fn with_config_and_hasher(config: HashConfig, hasher: S) -> Result<Self> {
        Ok(Self {
            engine: HashEngine::with_config_and_hasher(config, hasher)?,
        })
    }

    /// Add `key` unless an equal key is present. Returns whether it was added.
    ///
    /// # Panics
    ///
    /// Panics if the table cannot grow; see [`try_insert`](Self::try_insert).
    pub fn insert(&mut self, key: K) -> bool {
        or_panic(self.try_insert(key))
    }

    pub fn try_insert(&mut self, key: K) -> Result<bool> {
        let (inserted, _) = self.engine.insert(key, (), InsertPolicy::Reject)?;
        Ok(inserted)
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.contains_key(q)
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.find(q)
    }

    /// The stored key equal to `q`.
    pub fn get<Q>(&self, q: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.get_key_value(q).map(|(k, _)| k)
    }

    pub fn erase<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.erase(q)
    }

    /// Remove the key equal to `q` and hand it back.
    pub fn take<Q>(&mut self, q: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.remove_entry(q).map(|(k, ())| k)
    }

    pub fn set_max_load_factor(&mut self, f: f32) -> Result<()> {
        self.engine.set_max_load_factor(f)
    }

    pub fn rehash(&mut self, n: usize) -> Result<()> {
        self.engine.rehash(n)
    }
}

impl<K, S> Clone for ChainedHashSet<K, S>
where
    K: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

impl<K, S> fmt::Debug for ChainedHashSet<K, S>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, S> PartialEq for ChainedHashSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|k| other.contains(k))
    }
}

impl<K, S> Eq for ChainedHashSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
}

impl<K, S> Extend<K> for ChainedHashSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = K>>(&mut self, iter: T) {
        for k in iter {
            self.insert(k);
        }
    }
}

impl<K, S> FromIterator<K> for ChainedHashSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        let mut set = Self::with_hasher(S::default());
        set.extend(iter);
        set
    }
}

/// Iterator over `&K`.
pub struct Iter<'a, K> {
    it: engine::Iter<'a, K, ()>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;
    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.it.next().map(|(_, k, _)| k)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Owning iterator over the keys of a [`ChainedHashSet`].
pub struct IntoIter<K> {
    it: engine::IntoIter<K, ()>,
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;
    #[inline]
    fn next(&mut self) -> Option<K> {
        self.it.next().map(|(k, ())| k)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, S> IntoIterator for ChainedHashSet<K, S> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> IntoIter<K> {
        IntoIter {
            it: self.engine.into_iter(),
        }
    }
}

impl<'a, K, S> IntoIterator for &'a ChainedHashSet<K, S> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_rejects_duplicates() {
        let mut s = ChainedHashSet::new();
        assert!(s.insert("a".to_string()));
        assert!(!s.insert("a".to_string()));
        assert_eq!(s.len(), 1);
        assert!(s.contains("a"));
        assert!(!s.contains("b"));
    }

    #[test]
    fn get_take_and_find() {
        let mut s: ChainedHashSet<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
        assert_eq!(s.get("x").map(String::as_str), Some("x"));
        let h = s.find("y").unwrap();
        assert_eq!(s.key(h).map(String::as_str), Some("y"));
        assert_eq!(s.take("y"), Some("y".to_string()));
        assert!(s.key(h).is_none());
        assert_eq!(s.take("y"), None);
        assert_eq!(s.len(), 1);
    }

    /// Invariant: set growth follows the engine's doubling rule.
    #[test]
    fn grows_by_doubling() {
        let mut s = ChainedHashSet::with_buckets(4).unwrap();
        for i in 0..5u32 {
            s.insert(i);
        }
        assert_eq!(s.bucket_count(), 8);
        assert!(s.load_factor() <= s.max_load_factor());
    }

    #[test]
    fn eq_ignores_order_and_buckets() {
        let a: ChainedHashSet<u32> = (0..30).collect();
        let mut b = ChainedHashSet::with_buckets(1).unwrap();
        b.extend((0..30).rev());
        assert_eq!(a, b);
        b.erase(&0);
        assert_ne!(a, b);
    }

    #[test]
    fn into_iter_yields_every_key() {
        let s: ChainedHashSet<u32> = (0..10).collect();
        assert_eq!((&s).into_iter().count(), 10);
        let mut keys: Vec<u32> = s.into_iter().collect();
        keys.sort();
        assert_eq!(keys, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn debug_formats_as_set() {
        let mut s = ChainedHashSet::new();
        s.insert(1u8);
        assert_eq!(format!("{s:?}"), "{1}");
    }
}
