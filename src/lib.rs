//! chained-hashmap: a separate-chaining hash table engine and two thin
//! adapters over it, a key-value map and a key set.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep all hashing, chaining and resizing in one engine so the
//!   map and the set differ only in entry shape and duplicate policy.
//! - Layers:
//!   - HashEngine<K, V, S>: owns the bucket array and the entries;
//!     insert with an explicit `InsertPolicy` (Reject or Replace), find,
//!     erase, clear, rehash. Returns stable `Handle`s.
//!   - ChainedHashMap<K, V, S>: fixes the policy per operation
//!     (`insert` rejects, `insert_or_assign` replaces) and adds `access`,
//!     which inserts `V::default()` for a missing key.
//!   - ChainedHashSet<K, S>: stores `()` values and always rejects.
//!
//! Storage
//! - Entries live in a `slotmap` arena; a bucket is a `Vec` of arena keys
//!   in insertion order. `size` is the arena length.
//! - Each entry caches its `u64` hash. Bucket index is
//!   `hash % bucket_count`; a rehash recomputes it against the new count
//!   from the cached hash, so `K: Hash` never runs during a rehash.
//!
//! Resize policy
//! - After an insert that adds an entry, if
//!   `len > bucket_count * max_load_factor` the bucket count doubles
//!   (repeatedly, in one rehash, when `bucket_count * max_load_factor < 1`).
//! - `set_max_load_factor(f)` rehashes right away to `ceil(len / f) + 1`
//!   buckets when the current load exceeds `f`.
//! - Erase and clear never shrink.
//! - A rehash reserves every allocation it needs before moving anything.
//!   On failure the old buckets stay authoritative; a failed insert takes
//!   its new entry back out.
//!
//! Handles
//! - A `Handle` is a generational arena key. Rehashing moves keys between
//!   buckets, not entries, so handles survive growth and shrink. Removing
//!   an entry invalidates only its own handle; a stale handle never
//!   resolves to a later entry.
//! - References returned by `access`, `get` and friends borrow the
//!   container, so the borrow checker rules out using them across a call
//!   that may rehash.
//!
//! Errors
//! - `Failure` covers precondition violations (zero buckets, unusable
//!   load factor) and resource exhaustion (bucket count overflow, out of
//!   memory). A missing key is a `bool`/`Option`, never an error.
//! - Fallible operations have a `try_` form returning `Result` and a plain
//!   form that panics on failure.
//!
//! Notes and non-goals
//! - Single-threaded. No internal locking; share behind an external lock.
//! - The engine calls into user code only through `K: Hash`, `K: Eq`,
//!   destructors and the `access` default constructor. A debug-only guard
//!   panics if such code re-enters the engine.
//! - With the `tracing` feature a trace-level event is emitted per rehash.
//!   Failures are returned, never logged.

mod config;
pub mod engine;
mod engine_proptest;
mod error;
pub mod map;
mod reentrancy;
pub mod set;

// Public surface
pub use config::HashConfig;
pub use engine::{Handle, HashEngine, InsertPolicy};
pub use error::{Failure, Result};
pub use map::ChainedHashMap;
pub use set::ChainedHashSet;
