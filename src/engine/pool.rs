//! Per-kind wrapper pools.
//!
//! # Responsibilities
//! - Hand out a reusable instance, constructing one only when none is idle
//! - Clear every instance before it goes back on the free list
//! - Track leases so leaks and foreign releases can be detected
//!
//! # Design Decisions
//! - One typed pool per wrapper kind; no type recovery, no mixing of kinds
//! - The free list is a `parking_lot::Mutex<Vec<Box<T>>>`, held only for a
//!   push or a pop
//! - The idle list is bounded; surplus instances are dropped on release
//! - In debug builds every leased box is recorded by address, and releasing a
//!   box the pool never handed out panics

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

#[cfg(debug_assertions)]
use std::collections::HashSet;

use parking_lot::Mutex;

/// State a pooled wrapper must be able to drop between occupants.
pub trait Recycle: Default + Send {
    /// Clear every field so no data from the previous occupant remains.
    fn recycle(&mut self);
}

/// Snapshot of pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Instances constructed because the free list was empty.
    pub created: u64,
    /// Leases served from the free list.
    pub reused: u64,
    /// Instances currently on the free list.
    pub idle: usize,
    /// Instances currently leased out.
    pub in_use: usize,
}

/// A free list of boxed wrappers of one kind.
pub struct Pool<T: Recycle> {
    kind: &'static str,
    free: Mutex<Vec<Box<T>>>,
    max_idle: usize,
    created: AtomicU64,
    reused: AtomicU64,
    in_use: AtomicUsize,
    #[cfg(debug_assertions)]
    leased: Mutex<HashSet<usize>>,
}

impl<T: Recycle> Pool<T> {
    /// Create an empty pool that keeps at most `max_idle` idle instances.
    pub fn new(kind: &'static str, max_idle: usize) -> Self {
        Self {
            kind,
            free: Mutex::new(Vec::new()),
            max_idle,
            created: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            in_use: AtomicUsize::new(0),
            #[cfg(debug_assertions)]
            leased: Mutex::new(HashSet::new()),
        }
    }

    /// Construct up to `count` instances ahead of traffic.
    pub fn prewarm(&self, count: usize) {
        let count = count.min(self.max_idle);
        let mut free = self.free.lock();
        while free.len() < count {
            free.push(Box::default());
            self.created.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Take an instance, building a new one if the free list is empty.
    pub fn acquire(&self) -> Box<T> {
        let reused = self.free.lock().pop();
        let item = match reused {
            Some(item) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                item
            }
            None => {
                self.created.fetch_add(1, Ordering::Relaxed);
                crate::observability::metrics::record_pool_miss(self.kind);
                Box::default()
            }
        };
        self.in_use.fetch_add(1, Ordering::AcqRel);

        #[cfg(debug_assertions)]
        {
            let addr = &*item as *const T as usize;
            let fresh = self.leased.lock().insert(addr);
            debug_assert!(fresh, "{} pool leased the same instance twice", self.kind);
        }

        item
    }

    /// Clear an instance and return it to the free list.
    pub fn release(&self, mut item: Box<T>) {
        #[cfg(debug_assertions)]
        {
            let addr = &*item as *const T as usize;
            if !self.leased.lock().remove(&addr) {
                panic!("{} pool received an instance it did not lease", self.kind);
            }
        }

        item.recycle();
        self.in_use.fetch_sub(1, Ordering::AcqRel);

        let mut free = self.free.lock();
        if free.len() < self.max_idle {
            free.push(item);
        }
    }

    /// Number of instances leased and not yet released.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            idle: self.free.lock().len(),
            in_use: self.in_use(),
        }
    }
}

impl<T: Recycle> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("kind", &self.kind)
            .field("max_idle", &self.max_idle)
            .field("stats", &self.stats())
            .finish()
    }
}
