//! Bounded memo of resolved conversion keys.
//!
//! Resolution walks two hierarchies; the cache remembers the winning rule per
//! concrete key so repeat conversions skip the walk. It is a pure
//! optimization: clearing it never changes a conversion's result.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::ConvertiblePair;

/// Coarse-grained memory pressure levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

/// Thread-safe LRU of resolved rules.
///
/// Every lookup carries the caller's *epoch*: a counter the owner advances
/// whenever rules or descriptors change. Entries belong to the epoch they were
/// resolved in; a newer epoch empties the cache, and a resolution from an
/// older epoch is not stored.
///
/// A capacity of zero disables caching: every `get` misses and `put` is a no-op.
pub struct ConverterCache<R: ?Sized> {
    slots: Option<Mutex<Slots<R>>>,
}

struct Slots<R: ?Sized> {
    epoch: u64,
    lru: LruCache<ConvertiblePair, Arc<R>>,
}

impl<R: ?Sized> Slots<R> {
    /// Move to `epoch` if it is newer. Returns false for a stale epoch.
    fn advance(&mut self, epoch: u64) -> bool {
        if epoch > self.epoch {
            self.lru.clear();
            self.epoch = epoch;
        }
        epoch == self.epoch
    }
}

impl<R: ?Sized> ConverterCache<R> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: NonZeroUsize::new(capacity).map(|cap| {
                Mutex::new(Slots {
                    epoch: 0,
                    lru: LruCache::new(cap),
                })
            }),
        }
    }

    /// Look up a key resolved in `epoch`, marking it most recently used.
    pub fn get(&self, pair: &ConvertiblePair, epoch: u64) -> Option<Arc<R>> {
        let mut slots = self.slots.as_ref()?.lock();
        if !slots.advance(epoch) {
            return None;
        }
        slots.lru.get(pair).cloned()
    }

    /// Remember the rule resolved for `pair` in `epoch`, evicting the least
    /// recently used entry when full.
    pub fn put(&self, pair: ConvertiblePair, rule: Arc<R>, epoch: u64) {
        if let Some(slots) = &self.slots {
            let mut slots = slots.lock();
            if slots.advance(epoch) {
                slots.lru.put(pair, rule);
            }
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        if let Some(slots) = &self.slots {
            slots.lock().lru.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.slots.as_ref().map_or(0, |slots| slots.lock().lru.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.as_ref().map_or(0, |slots| slots.lock().lru.cap().get())
    }

    /// Shed entries in response to memory pressure.
    ///
    /// `Low` keeps everything, `Medium` evicts the least recently used half,
    /// `High` and `Critical` empty the cache. Returns the number evicted.
    pub fn relieve(&self, pressure: MemoryPressure) -> usize {
        let Some(slots) = &self.slots else {
            return 0;
        };
        let mut slots = slots.lock();
        let lru = &mut slots.lru;
        let before = lru.len();
        match pressure {
            MemoryPressure::Low => {}
            MemoryPressure::Medium => {
                let target = before / 2;
                while lru.len() > target {
                    if lru.pop_lru().is_none() {
                        break;
                    }
                }
            }
            MemoryPressure::High | MemoryPressure::Critical => lru.clear(),
        }
        let evicted = before - lru.len();
        if evicted > 0 {
            tracing::warn!(?pressure, evicted, "relieved converter cache");
        }
        evicted
    }
}

impl<R: ?Sized> fmt::Debug for ConverterCache<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
