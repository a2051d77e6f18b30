// Modified in 2025 from the original version
// Original source licensed under the Apache License 2.0

//! Process-wide engine pools.
//!
//! One pool per role hands out reusable engine state under a mutex; the
//! RAII guard resets the item on release so every acquisition observes a
//! clean state. Entry points hold a guard for exactly one operation.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

use crate::decoder::DecoderState;
use crate::encoder::EncoderState;
use crate::hasher::Hasher;

/// State that can live in a [`Pool`]: constructible fresh and resettable
/// for the next acquisition.
pub(crate) trait Reusable: Default {
    /// Clear all per-operation state, retaining capacity.
    fn reset(&mut self);
}

/// A mutex-guarded free list of reusable engine state.
#[derive(Debug)]
pub(crate) struct Pool<T> {
    free: Mutex<Vec<T>>,
}

impl<T: Reusable> Pool<T> {
    const fn new() -> Self {
        Self {
            free: Mutex::new(Vec::new()),
        }
    }

    /// Pop a pooled item, or construct one if the free list is empty.
    fn acquire(&'static self) -> PoolGuard<T> {
        let item = self
            .free
            .lock()
            .expect("pool lock poisoned")
            .pop()
            .unwrap_or_default();
        PoolGuard {
            item: Some(item),
            pool: self,
        }
    }

    /// Number of idle items currently in the pool.
    #[cfg(test)]
    fn idle(&self) -> usize {
        self.free.lock().expect("pool lock poisoned").len()
    }
}

/// Exclusive handle on a pooled item; releases on drop, on every exit
/// path.
#[derive(Debug)]
pub(crate) struct PoolGuard<T: Reusable + 'static> {
    item: Option<T>,
    pool: &'static Pool<T>,
}

impl<T: Reusable> Deref for PoolGuard<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.item.as_ref().expect("pool item taken")
    }
}

impl<T: Reusable> DerefMut for PoolGuard<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().expect("pool item taken")
    }
}

impl<T: Reusable> Drop for PoolGuard<T> {
    fn drop(&mut self) {
        if let Some(mut item) = self.item.take() {
            item.reset();
            self.pool.free.lock().expect("pool lock poisoned").push(item);
        }
    }
}

static ENCODER_STATES: Pool<EncoderState> = Pool::new();
static DECODER_STATES: Pool<DecoderState> = Pool::new();
static HASHERS: Pool<Hasher> = Pool::new();
static CHILD_HASHERS: Pool<Hasher> = Pool::new();

/// Acquire pooled encoder state.
pub(crate) fn encoder_state() -> PoolGuard<EncoderState> {
    ENCODER_STATES.acquire()
}

/// Acquire pooled decoder state.
pub(crate) fn decoder_state() -> PoolGuard<DecoderState> {
    DECODER_STATES.acquire()
}

/// Acquire a pooled hasher for a top-level hash operation.
pub(crate) fn hasher() -> PoolGuard<Hasher> {
    HASHERS.acquire()
}

/// Acquire a pooled hasher for a concurrent worker. Child hashers live in
/// their own pool so workers never contend with top-level operations.
pub(crate) fn child_hasher() -> PoolGuard<Hasher> {
    CHILD_HASHERS.acquire()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_release_reset() {
        static POOL: Pool<Probe> = Pool::new();

        #[derive(Debug, Default)]
        struct Probe {
            runs: usize,
        }

        impl Reusable for Probe {
            fn reset(&mut self) {
                self.runs = 0;
            }
        }

        {
            let mut guard = POOL.acquire();
            guard.runs += 1;
            assert_eq!(guard.runs, 1);
        }

        // Released item comes back reset.
        assert_eq!(POOL.idle(), 1);
        let guard = POOL.acquire();
        assert_eq!(guard.runs, 0);
        assert_eq!(POOL.idle(), 0);
        drop(guard);
        assert_eq!(POOL.idle(), 1);
    }
}
