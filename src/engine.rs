//! HashEngine: separate-chaining table shared by the map and set adapters.
//!
//! Entries live in a generational arena; each bucket is a small `Vec` of
//! arena keys. A rehash therefore moves keys between buckets and never
//! moves entries, so a [`Handle`] stays valid across growth and shrink and
//! is invalidated only by removing its own entry.

use crate::config::{check_load_factor, HashConfig};
use crate::error::{Failure, Result};
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use hashbrown::hash_map::DefaultHashBuilder;
use slotmap::{DefaultKey, SlotMap};

/// Stable reference to one entry of a [`HashEngine`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub(crate) fn new(k: DefaultKey) -> Self {
        Handle(k)
    }
    pub(crate) fn raw_handle(&self) -> DefaultKey {
        self.0
    }

    /// Key of the entry, or `None` once the entry has been removed.
    pub fn key<'a, K, V, S>(&self, engine: &'a HashEngine<K, V, S>) -> Option<&'a K> {
        engine.handle_key(*self)
    }

    /// Value of the entry, or `None` once the entry has been removed.
    pub fn value<'a, K, V, S>(&self, engine: &'a HashEngine<K, V, S>) -> Option<&'a V> {
        engine.handle_value(*self)
    }

    /// Mutable value of the entry, or `None` once the entry has been removed.
    pub fn value_mut<'a, K, V, S>(&self, engine: &'a mut HashEngine<K, V, S>) -> Option<&'a mut V> {
        engine.handle_value_mut(*self)
    }
}

/// What `insert` does when the key is already present.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InsertPolicy {
    /// Leave the stored value untouched.
    Reject,
    /// Overwrite the stored value.
    Replace,
}

#[derive(Clone, Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

type Bucket = Vec<DefaultKey>;

#[inline]
fn bucket_for(hash: u64, bucket_count: usize) -> usize {
    (hash % bucket_count as u64) as usize
}

/// Bucket array plus entry arena. Split from the engine so that methods can
/// borrow it mutably while the reentrancy guard borrows the engine.
#[derive(Clone)]
struct Table<K, V> {
    buckets: Vec<Bucket>,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
}

impl<K, V> Table<K, V> {
    fn with_buckets(n: usize) -> Result<Self> {
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(n)?;
        buckets.resize_with(n, Vec::new);
        Ok(Self {
            buckets,
            slots: SlotMap::with_key(),
        })
    }

    fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn scan<Q>(&self, hash: u64, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let index = bucket_for(hash, self.bucket_count());
        self.buckets[index].iter().copied().find(|&k| {
            let e = &self.slots[k];
            e.hash == hash && e.key.borrow() == q
        })
    }

    /// Make room for one more key in the chain of `hash`.
    fn reserve_chain(&mut self, hash: u64) -> Result<()> {
        let index = bucket_for(hash, self.bucket_count());
        self.buckets[index].try_reserve(1)?;
        Ok(())
    }

    /// Append a new entry to its chain. Call `reserve_chain` first.
    fn link(&mut self, entry: Entry<K, V>) -> DefaultKey {
        let index = bucket_for(entry.hash, self.bucket_count());
        let k = self.slots.insert(entry);
        self.buckets[index].push(k);
        k
    }

    fn unlink(&mut self, k: DefaultKey) -> Option<Entry<K, V>> {
        let entry = self.slots.remove(k)?;
        let index = bucket_for(entry.hash, self.bucket_count());
        let bucket = &mut self.buckets[index];
        let pos = bucket.iter().position(|&kk| kk == k);
        debug_assert!(pos.is_some(), "entry missing from its bucket");
        if let Some(pos) = pos {
            // Preserve insertion order within the chain.
            bucket.remove(pos);
        }
        Some(entry)
    }

    /// Grow if the last link pushed the load past `max_load_factor`. On
    /// failure the caller unlinks the new entry.
    fn grow_after_link(&mut self, max_load_factor: f32) -> Result<()> {
        let len = self.slots.len();
        let count = self.bucket_count();
        if !exceeds(len, count, max_load_factor) {
            return Ok(());
        }
        let target = growth_target(len, count, max_load_factor)?;
        self.relocate(target)
    }

    /// Rebuild the bucket array at `target` buckets. All storage for the new
    /// array is reserved before anything moves, so on failure the current
    /// array stays authoritative.
    fn relocate(&mut self, target: usize) -> Result<()> {
        debug_assert!(target > 0);
        let mut counts: Vec<usize> = Vec::new();
        counts.try_reserve_exact(target)?;
        counts.resize(target, 0);
        for e in self.slots.values() {
            counts[bucket_for(e.hash, target)] += 1;
        }

        let mut fresh: Vec<Bucket> = Vec::new();
        fresh.try_reserve_exact(target)?;
        for &n in &counts {
            let mut bucket = Vec::new();
            bucket.try_reserve_exact(n)?;
            fresh.push(bucket);
        }

        for &k in self.buckets.iter().flatten() {
            fresh[bucket_for(self.slots[k].hash, target)].push(k);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(from = self.buckets.len(), to = target, len = self.slots.len(), "rehash");

        self.buckets = fresh;
        Ok(())
    }
}

// Load arithmetic stays in f32, the type of the stored factor and of
// `load_factor()`.

/// Fewest buckets keeping `len / buckets <= max_load_factor`.
fn min_buckets_for(len: usize, max_load_factor: f32) -> Result<usize> {
    let n = (len as f32 / max_load_factor).ceil();
    if !(n < usize::MAX as f32) {
        return Err(Failure::BucketsOverflow);
    }
    Ok(n as usize)
}

fn exceeds(len: usize, bucket_count: usize, max_load_factor: f32) -> bool {
    len as f32 / bucket_count as f32 > max_load_factor
}

pub struct HashEngine<K, V, S = DefaultHashBuilder> {
    hasher: S,
    table: Table<K, V>,
    max_load_factor: f32,
    reentrancy: DebugReentrancy,
}

impl<K, V> HashEngine<K, V>
where
    K: Eq + Hash,
{
    /// Empty engine with 10 buckets and a max load factor of 1.0.
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    /// Empty engine with `n` buckets. `n == 0` is rejected.
    pub fn with_buckets(n: usize) -> Result<Self> {
        Self::with_config(HashConfig::new().bucket_count(n))
    }

    /// Empty engine built from `config`; rejects an invalid config unchanged.
    pub fn with_config(config: HashConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, Default::default())
    }
}

impl<K, V> Default for HashEngine<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> HashEngine<K, V, S> {
    pub fn len(&self) -> usize {
        self.table.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.slots.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    pub fn load_factor(&self) -> f32 {
        self.len() as f32 / self.bucket_count() as f32
    }

    pub fn max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    /// Number of entries chained in bucket `index`, or `None` past the end.
    pub fn bucket_len(&self, index: usize) -> Option<usize> {
        self.table.buckets.get(index).map(Vec::len)
    }

    /// Remove every entry. The bucket count is kept, and every outstanding
    /// handle goes stale.
    pub fn clear(&mut self) {
        let dropped: Vec<_> = {
            let _g = self.reentrancy.enter();
            for bucket in &mut self.table.buckets {
                bucket.clear();
            }
            // Draining keeps the arena, so freed slots get a new version.
            self.table.slots.drain().collect()
        };
        // Key and value destructors run with the engine already consistent.
        drop(dropped);
        self.debug_check_config();
    }

    /// Unlink the entry behind `handle` and return it. Only this handle is
    /// invalidated.
    pub fn remove(&mut self, handle: Handle) -> Option<(K, V)> {
        let entry = {
            let _g = self.reentrancy.enter();
            self.table.unlink(handle.raw_handle())
        }?;
        Some((entry.key, entry.value))
    }

    pub(crate) fn handle_key(&self, h: Handle) -> Option<&K> {
        let _g = self.reentrancy.enter();
        self.table.slots.get(h.raw_handle()).map(|e| &e.key)
    }

    pub(crate) fn handle_value(&self, h: Handle) -> Option<&V> {
        let _g = self.reentrancy.enter();
        self.table.slots.get(h.raw_handle()).map(|e| &e.value)
    }

    pub(crate) fn handle_value_mut(&mut self, h: Handle) -> Option<&mut V> {
        let _g = self.reentrancy.enter();
        self.table
            .slots
            .get_mut(h.raw_handle())
            .map(|e| &mut e.value)
    }

    /// Entries in arena order. Unaffected by rehashing.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.table.slots.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.table.slots.iter_mut(),
        }
    }

    #[inline]
    fn debug_check_config(&self) {
        debug_assert!(self.bucket_count() >= 1);
        debug_assert!(check_load_factor(self.max_load_factor).is_ok());
    }
}

impl<K, V, S> HashEngine<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Empty engine with the default config (10 buckets, max load factor
    /// 1.0) and the given hasher. Cannot fail.
    pub fn with_hasher(hasher: S) -> Self {
        let config = HashConfig::new();
        Self {
            hasher,
            table: Table {
                buckets: (0..config.bucket_count).map(|_| Vec::new()).collect(),
                slots: SlotMap::with_key(),
            },
            max_load_factor: config.max_load_factor,
            reentrancy: DebugReentrancy::new(),
        }
    }

    /// Empty engine built from `config` and `hasher`. Fails on an invalid
    /// config or when the bucket array cannot be allocated.
    pub fn with_config_and_hasher(config: HashConfig, hasher: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            hasher,
            table: Table::with_buckets(config.bucket_count)?,
            max_load_factor: config.max_load_factor,
            reentrancy: DebugReentrancy::new(),
        })
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Index of the bucket `q` hashes to under the current bucket count.
    pub fn bucket<Q>(&self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        bucket_for(self.make_hash(q), self.bucket_count())
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        self.table.scan(hash, q).map(Handle::new)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).is_some()
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        let k = self.table.scan(hash, q)?;
        let e = &self.table.slots[k];
        Some((&e.key, &e.value))
    }

    /// Insert `key -> value`.
    ///
    /// Returns `(true, new)` when the key was absent and `(false, existing)`
    /// otherwise; `policy` decides whether `existing` receives `value`.
    /// An insert that pushes the load factor past the maximum doubles the
    /// bucket count. If that rehash cannot allocate, the new entry is taken
    /// back out and the table is left as it was.
    pub fn insert(&mut self, key: K, value: V, policy: InsertPolicy) -> Result<(bool, Handle)> {
        let (res, displaced, rolled_back) = {
            let _g = self.reentrancy.enter();
            let hash = self.make_hash(&key);
            match self.table.scan(hash, &key) {
                Some(k) => {
                    let displaced = match policy {
                        InsertPolicy::Replace => {
                            mem::replace(&mut self.table.slots[k].value, value)
                        }
                        InsertPolicy::Reject => value,
                    };
                    (Ok((false, Handle::new(k))), Some(displaced), None)
                }
                None => {
                    self.table.reserve_chain(hash)?;
                    let k = self.table.link(Entry { key, value, hash });
                    match self.table.grow_after_link(self.max_load_factor) {
                        Ok(()) => (Ok((true, Handle::new(k))), None, None),
                        Err(failure) => (Err(failure), None, self.table.unlink(k)),
                    }
                }
            }
        };
        // User destructors run outside the guarded section.
        drop(displaced);
        drop(rolled_back);
        res
    }

    /// Return the handle for `key`, inserting `default()` first when absent.
    /// `default` runs only when an insertion happens.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> Result<Handle>
    where
        F: FnOnce() -> V,
    {
        let (failure, rolled_back) = {
            let _g = self.reentrancy.enter();
            let hash = self.make_hash(&key);
            if let Some(k) = self.table.scan(hash, &key) {
                return Ok(Handle::new(k));
            }
            self.table.reserve_chain(hash)?;
            let value = default();
            let k = self.table.link(Entry { key, value, hash });
            match self.table.grow_after_link(self.max_load_factor) {
                Ok(()) => return Ok(Handle::new(k)),
                Err(failure) => (failure, self.table.unlink(k)),
            }
        };
        drop(rolled_back);
        Err(failure)
    }

    /// Remove `q` if present. Never shrinks the table.
    pub fn erase<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).is_some()
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let entry = {
            let _g = self.reentrancy.enter();
            let hash = self.make_hash(q);
            let k = self.table.scan(hash, q)?;
            self.table.unlink(k)
        }?;
        Some((entry.key, entry.value))
    }

    /// Store a new max load factor. If the current load exceeds it, rehash
    /// right away to `ceil(len / f) + 1` buckets; on failure the previous
    /// factor is restored.
    pub fn set_max_load_factor(&mut self, f: f32) -> Result<()> {
        check_load_factor(f)?;
        let _g = self.reentrancy.enter();
        let previous = mem::replace(&mut self.max_load_factor, f);
        if self.load_factor() > f {
            let res = min_buckets_for(self.len(), f)
                .and_then(|n| n.checked_add(1).ok_or(Failure::BucketsOverflow))
                .and_then(|target| self.table.relocate(target));
            if let Err(failure) = res {
                self.max_load_factor = previous;
                return Err(failure);
            }
        }
        self.debug_check_config();
        Ok(())
    }

    /// Rebuild the table with at least `n` buckets, and never fewer than the
    /// current max load factor requires.
    pub fn rehash(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Err(Failure::ZeroBuckets);
        }
        let _g = self.reentrancy.enter();
        let target = n.max(min_buckets_for(self.len(), self.max_load_factor)?);
        self.table.relocate(target)?;
        self.debug_check_config();
        Ok(())
    }
}

/// Double `count` until `len` fits under `max_load_factor`. A single doubling
/// suffices unless `count * max_load_factor < 1`.
fn growth_target(len: usize, count: usize, max_load_factor: f32) -> Result<usize> {
    let mut target = count.checked_mul(2).ok_or(Failure::BucketsOverflow)?;
    while exceeds(len, target, max_load_factor) {
        target = target.checked_mul(2).ok_or(Failure::BucketsOverflow)?;
    }
    Ok(target)
}

impl<K, V, S> Clone for HashEngine<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            table: self.table.clone(),
            max_load_factor: self.max_load_factor,
            reentrancy: DebugReentrancy::new(),
        }
    }
}

impl<K, V, S> fmt::Debug for HashEngine<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(_, k, v)| (k, v)))
            .finish()
    }
}

/// Iterator over immutable entries of a [`HashEngine`].
pub struct Iter<'a, K, V> {
    it: slotmap::basic::Iter<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (Handle, &'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it
            .next()
            .map(|(k, e)| (Handle::new(k), &e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over mutable entries of a [`HashEngine`].
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (Handle, &'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it
            .next()
            .map(|(k, e)| (Handle::new(k), &e.key, &mut e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// Owning iterator over the entries of a [`HashEngine`].
pub struct IntoIter<K, V> {
    it: slotmap::basic::IntoIter<DefaultKey, Entry<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V, S> IntoIterator for HashEngine<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            it: self.table.slots.into_iter(),
        }
    }
}

#[cfg(test)]
impl<K, V, S> HashEngine<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Full structural check: placement, chain membership and size.
    pub(crate) fn assert_consistent(&self) {
        let count = self.bucket_count();
        assert!(count >= 1);
        let mut chained = 0;
        for (i, bucket) in self.table.buckets.iter().enumerate() {
            for &k in bucket {
                let e = self.table.slots.get(k).expect("chained key is live");
                assert_eq!(e.hash, self.make_hash(&e.key), "cached hash is stale");
                assert_eq!(bucket_for(e.hash, count), i, "entry in wrong bucket");
            }
            chained += bucket.len();
        }
        assert_eq!(chained, self.len(), "size disagrees with chains");
    }
}
