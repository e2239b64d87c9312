//! ConverterRegistry - rule storage and hierarchy-driven lookup.
//!
//! Rules are stored in a single map keyed by [`ConvertiblePair`]. Lookup for a
//! concrete request walks both descriptor hierarchies, most specific first,
//! and returns the first registered rule.
//!
//! # Lookup Order
//!
//! Given the source hierarchy `S0, S1, ...` and target hierarchy `T0, T1, ...`:
//!
//! 1. If a qualifier `q` is present, try `(Si, Tj, q)` with `i` in the outer
//!    loop and `j` in the inner loop.
//! 2. Try `(Si, Tj)` unqualified, in the same order.
//!
//! Source specificity therefore wins over target specificity, and a
//! formatting rule anywhere in the hierarchy beats a generic one.
//!
//! # Thread Safety
//!
//! The map sits behind a `parking_lot` RwLock; registrations may race with
//! lookups from other threads.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use typeconv_core::TypeHash;

use crate::ConvertiblePair;

/// Map from conversion key to rule.
///
/// Generic over the rule type so the facade crate can store trait objects
/// without this crate knowing their signature.
pub struct ConverterRegistry<R: ?Sized> {
    converters: RwLock<FxHashMap<ConvertiblePair, Arc<R>>>,
}

impl<R: ?Sized> ConverterRegistry<R> {
    pub fn new() -> Self {
        Self {
            converters: RwLock::new(FxHashMap::default()),
        }
    }

    /// Store `rule` under `pair`, replacing any previous rule for that key.
    ///
    /// Returns the replaced rule.
    pub fn insert(&self, pair: ConvertiblePair, rule: Arc<R>) -> Option<Arc<R>> {
        self.converters.write().insert(pair, rule)
    }

    /// Exact-key lookup with no hierarchy walk.
    pub fn get(&self, pair: &ConvertiblePair) -> Option<Arc<R>> {
        self.converters.read().get(pair).cloned()
    }

    pub fn len(&self) -> usize {
        self.converters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.read().is_empty()
    }

    /// Find the most specific rule for the given hierarchies.
    ///
    /// `sources` and `targets` must already be ordered most specific first.
    /// Returns the rule and the key it was registered under.
    pub fn find(
        &self,
        sources: &[TypeHash],
        targets: &[TypeHash],
        qualifier: Option<TypeHash>,
    ) -> Option<(ConvertiblePair, Arc<R>)> {
        let converters = self.converters.read();

        let search = |qualifier: Option<TypeHash>| {
            sources.iter().find_map(|&source| {
                targets.iter().find_map(|&target| {
                    let pair = ConvertiblePair::with_qualifier(source, target, qualifier);
                    converters.get(&pair).map(|rule| (pair, Arc::clone(rule)))
                })
            })
        };

        match qualifier {
            Some(q) => search(Some(q)).or_else(|| search(None)),
            None => search(None),
        }
    }
}

impl<R: ?Sized> Default for ConverterRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ?Sized> fmt::Debug for ConverterRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("converters", &self.converters.read().len())
            .finish()
    }
}
