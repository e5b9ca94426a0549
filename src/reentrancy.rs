//! Debug-only reentrancy detection for the engine.
//!
//! The engine calls user code (`K: Hash`, `K: Eq`, the `access` default
//! constructor) while a bucket is half-scanned or an entry half-linked. Safe
//! code cannot reach the engine again from there, but aliasing through raw
//! pointers can. In debug builds the second entry panics; in release builds
//! `enter` is a no-op.

use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug, Default)]
pub struct DebugReentrancy {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    // Cell-free in release; keep the auto traits of the debug layout.
    _unsync: PhantomData<Cell<()>>,
}

impl DebugReentrancy {
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _unsync: PhantomData,
        }
    }

    /// Mark the owner busy until the returned guard is dropped.
    #[inline]
    pub fn enter(&self) -> Entered<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "reentrancy detected: hash engine entered from user code"
            );
            Entered { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            Entered { _owner: PhantomData }
        }
    }
}

/// Guard returned by [`DebugReentrancy::enter`].
pub struct Entered<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a DebugReentrancy>,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.busy.set(false);
    }
}
