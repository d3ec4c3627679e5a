//! Memoized table of shared delegate instances
//!
//! Structurally identical fields must share one delegate: rebuilding a
//! composite adapter per field wastes work, and a delegate may itself
//! hold internal caches keyed by identity. The [`AdapterRegistry`]
//! deduplicates adapters by `(value type, qualifier set)` — resolving
//! the same key twice hands back `Arc`s to the *same* instance, which
//! callers can observe through [`Arc::ptr_eq`].
//!
//! The registry is populated lazily, on first reference, and is shared
//! read-mostly thereafter: resolution takes a read lock for the hit
//! path and falls back to a write lock only when the key is absent, so
//! the factory for a key runs at most once even under concurrent
//! first-use.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::adapter::Adapter;
use crate::error::InternalError;

/// Sorted, deduplicated set of qualifier tags refining a value type.
///
/// Two fields of the same Rust type may still demand distinct
/// delegates — a string serialized as-is versus one serialized
/// lowercased, say. Qualifiers carry that distinction into the
/// registry key. Construction sorts and deduplicates, so the same set
/// spelled in any order compares (and hashes) equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Qualifiers(Box<[&'static str]>);

impl Qualifiers {
    /// The empty qualifier set, shared by most fields.
    #[must_use]
    pub fn none() -> Self {
        Self(Box::new([]))
    }

    /// Constructs a qualifier set from arbitrary tags.
    #[must_use]
    pub fn new(tags: impl IntoIterator<Item = &'static str>) -> Self {
        let mut tags: Vec<&'static str> = tags.into_iter().collect();
        tags.sort_unstable();
        tags.dedup();
        Self(tags.into_boxed_slice())
    }

    /// Returns `true` when `tag` is a member of the set.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|&t| t == tag)
    }

    /// Returns `true` for the empty set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Full registry key: value-type identity plus qualifier set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AdapterKey {
    value_type: TypeId,
    qualifiers: Qualifiers,
}

/// Entries are `Arc<dyn Adapter<Value = F>>` for a per-key `F`, stored
/// behind `Any` since one table holds every value type.
type Entry = Arc<dyn Any + Send + Sync>;

/// Memoized `(value type, qualifiers) → delegate` table.
#[derive(Default)]
pub struct AdapterRegistry {
    table: RwLock<HashMap<AdapterKey, Entry>>,
}

impl AdapterRegistry {
    /// Constructs an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the delegate for value type `F` under `qualifiers`,
    /// invoking `make` only if no entry exists yet.
    ///
    /// Two calls with the same key return reference-identical
    /// delegates, regardless of which call populated the entry or from
    /// which thread.
    ///
    /// # Errors
    ///
    /// Both failure cases are of the implementation-bug class: a
    /// poisoned table lock, or an existing entry whose stored adapter
    /// is not for `F` (possible only if `TypeId` hygiene were violated
    /// by hand-written resolution code).
    pub fn resolve<F: 'static>(
        &self,
        qualifiers: Qualifiers,
        make: impl FnOnce() -> Arc<dyn Adapter<Value = F>>,
    ) -> Result<Arc<dyn Adapter<Value = F>>, InternalError> {
        let key = AdapterKey {
            value_type: TypeId::of::<F>(),
            qualifiers,
        };

        {
            let table = self.table.read().map_err(|_| InternalError::PoisonedRegistry)?;
            if let Some(entry) = table.get(&key) {
                return downcast_entry::<F>(entry);
            }
        }

        let mut table = self
            .table
            .write()
            .map_err(|_| InternalError::PoisonedRegistry)?;
        // Re-check under the write lock: another thread may have won
        // the race between our read and write acquisitions.
        let entry = table
            .entry(key)
            .or_insert_with(|| Arc::new(make()) as Entry);
        downcast_entry::<F>(entry)
    }

    /// Number of distinct delegates resolved so far.
    ///
    /// # Errors
    ///
    /// Fails only on a poisoned table lock.
    pub fn len(&self) -> Result<usize, InternalError> {
        Ok(self
            .table
            .read()
            .map_err(|_| InternalError::PoisonedRegistry)?
            .len())
    }

    /// Returns `true` when nothing has been resolved yet.
    ///
    /// # Errors
    ///
    /// Fails only on a poisoned table lock.
    pub fn is_empty(&self) -> Result<bool, InternalError> {
        Ok(self.len()? == 0)
    }
}

fn downcast_entry<F: 'static>(entry: &Entry) -> Result<Arc<dyn Adapter<Value = F>>, InternalError> {
    entry
        .downcast_ref::<Arc<dyn Adapter<Value = F>>>()
        .cloned()
        .ok_or(InternalError::RegistryTypeConflict {
            value_type: std::any::type_name::<F>(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prim::{I64Adapter, StringAdapter, SHARED_STRING};

    #[test]
    fn identical_keys_share_one_instance() {
        let registry = AdapterRegistry::new();
        let a = registry
            .resolve::<String>(Qualifiers::none(), || SHARED_STRING.clone())
            .unwrap();
        let b = registry
            .resolve::<String>(Qualifiers::none(), || Arc::new(StringAdapter))
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len().unwrap(), 1);
    }

    #[test]
    fn qualifiers_split_entries() {
        let registry = AdapterRegistry::new();
        let plain = registry
            .resolve::<String>(Qualifiers::none(), || Arc::new(StringAdapter))
            .unwrap();
        let tagged = registry
            .resolve::<String>(Qualifiers::new(["lowercase"]), || Arc::new(StringAdapter))
            .unwrap();
        assert!(!Arc::ptr_eq(&plain, &tagged));
        assert_eq!(registry.len().unwrap(), 2);
    }

    #[test]
    fn qualifier_order_and_repeats_do_not_matter() {
        assert_eq!(
            Qualifiers::new(["b", "a", "b"]),
            Qualifiers::new(["a", "b"])
        );
    }

    #[test]
    fn distinct_value_types_do_not_collide() {
        let registry = AdapterRegistry::new();
        registry
            .resolve::<String>(Qualifiers::none(), || Arc::new(StringAdapter))
            .unwrap();
        registry
            .resolve::<i64>(Qualifiers::none(), || Arc::new(I64Adapter))
            .unwrap();
        assert_eq!(registry.len().unwrap(), 2);
    }

    #[test]
    fn concurrent_first_use_is_safe() {
        let registry = Arc::new(AdapterRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry
                        .resolve::<String>(Qualifiers::none(), || Arc::new(StringAdapter))
                        .unwrap()
                })
            })
            .collect();
        let adapters: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for pair in adapters.windows(2) {
            assert!(Arc::ptr_eq(&pair[0], &pair[1]));
        }
        assert_eq!(registry.len().unwrap(), 1);
    }
}
