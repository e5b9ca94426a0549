//! ChainedHashMap: key-value adapter over [`HashEngine`].
//!
//! Each operation forwards to the engine with a fixed [`InsertPolicy`]:
//! `insert` rejects duplicates, `insert_or_assign` and `Extend` replace them.

use crate::config::HashConfig;
use crate::engine::{self, Handle, HashEngine, InsertPolicy};
use crate::error::{or_panic, Result};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use hashbrown::hash_map::DefaultHashBuilder;

/// A hash map resolving collisions by chaining.
///
/// ```
/// use chained_hashmap::ChainedHashMap;
///
/// let mut m = ChainedHashMap::new();
/// m.insert_or_assign("one", 1);
/// assert!(!m.insert("one", 10));
/// *m.access("two") += 2;
/// assert_eq!(m.get("one"), Some(&1));
/// assert_eq!(m.get("two"), Some(&2));
/// ```
pub struct ChainedHashMap<K, V, S = DefaultHashBuilder> {
    engine: HashEngine<K, V, S>,
}

impl<K, V> ChainedHashMap<K, V>
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

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainedHashMap<K, V, S> {
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

    /// Underlying engine, for bucket-level introspection.
    pub fn engine(&self) -> &HashEngine<K, V, S> {
        &self.engine
    }

    pub fn key(&self, h: Handle) -> Option<&K> {
        h.key(&self.engine)
    }
    pub fn value(&self, h: Handle) -> Option<&V> {
        h.value(&self.engine)
    }
    pub fn value_mut(&mut self, h: Handle) -> Option<&mut V> {
        h.value_mut(&mut self.engine)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.engine.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.engine.iter_mut(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.iter_mut().map(|(_, v)| v)
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
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

    /// Insert `key -> value`, overwriting the value of an existing key.
    ///
    /// # Panics
    ///
    /// Panics if the table cannot grow; see [`try_insert_or_assign`](Self::try_insert_or_assign).
    pub fn insert_or_assign(&mut self, key: K, value: V) {
        or_panic(self.try_insert_or_assign(key, value))
    }

    pub fn try_insert_or_assign(&mut self, key: K, value: V) -> Result<()> {
        self.engine.insert(key, value, InsertPolicy::Replace)?;
        Ok(())
    }

    /// Insert `key -> value` unless `key` is present. Returns whether the
    /// insertion happened; an existing value is never touched.
    ///
    /// # Panics
    ///
    /// Panics if the table cannot grow; see [`try_insert`](Self::try_insert).
    pub fn insert(&mut self, key: K, value: V) -> bool {
        or_panic(self.try_insert(key, value))
    }

    pub fn try_insert(&mut self, key: K, value: V) -> Result<bool> {
        let (inserted, _) = self.engine.insert(key, value, InsertPolicy::Reject)?;
        Ok(inserted)
    }

    /// Mutable access to the value of `key`, inserting `V::default()` first
    /// when the key is absent. Use [`get`](Self::get) or
    /// [`contains_key`](Self::contains_key) to test presence without inserting.
    ///
    /// # Panics
    ///
    /// Panics if the table cannot grow; see [`try_access`](Self::try_access).
    pub fn access(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        or_panic(self.try_access(key))
    }

    pub fn try_access(&mut self, key: K) -> Result<&mut V>
    where
        V: Default,
    {
        let h = self.engine.get_or_insert_with(key, V::default)?;
        Ok(h
            .value_mut(&mut self.engine)
            .expect("handle resolves right after get_or_insert_with"))
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.find(q)
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.get_key_value(q).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.get_key_value(q)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.engine.find(q)?;
        h.value_mut(&mut self.engine)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.contains_key(q)
    }

    /// Remove `q`; returns whether it was present.
    pub fn erase<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.erase(q)
    }

    /// Remove `q` and return its value.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.remove_entry(q).map(|(_, v)| v)
    }

    pub fn set_max_load_factor(&mut self, f: f32) -> Result<()> {
        self.engine.set_max_load_factor(f)
    }

    pub fn rehash(&mut self, n: usize) -> Result<()> {
        self.engine.rehash(n)
    }
}

impl<K, V, S> Clone for ChainedHashMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

impl<K, V, S> fmt::Debug for ChainedHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.engine, f)
    }
}

impl<K, V, S> PartialEq for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Eq + Hash,
    S: BuildHasher,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not present in ChainedHashMap")
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert_or_assign(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

/// Iterator over `(&K, &V)`.
pub struct Iter<'a, K, V> {
    it: engine::Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, k, v)| (k, v))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Iterator over `(&K, &mut V)`.
pub struct IterMut<'a, K, V> {
    it: engine::IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, k, v)| (k, v))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V, S> IntoIterator for ChainedHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = engine::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.engine.into_iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
