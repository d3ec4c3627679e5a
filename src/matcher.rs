//! Ordinal lookup of wire keys against a fixed key table
//!
//! A [`KeyMatcher`] is built once per schema from the declaration-ordered
//! list of wire keys, and is then queried for every key of every record
//! an adapter decodes. Matching returns the key's declaration index;
//! unknown keys return `None` and are *not* an error condition — the
//! caller's obligation is to skip the associated value.
//!
//! Ties are impossible by construction: duplicate wire keys are
//! rejected when the table is built, which makes them a
//! schema-construction failure rather than a decode-time one.

use cfg_if::cfg_if;

use crate::error::SchemaError;

/// Immutable key table supporting repeated ordinal lookups.
///
/// The default build keeps a side index of declaration positions sorted
/// by key and resolves candidates by binary search; the
/// `linear_keytable` feature swaps lookup for a linear scan of
/// declaration order, which can win for the very small schemas typical
/// of hand-written tests.
#[derive(Debug, Clone)]
pub struct KeyMatcher {
    keys: Box<[&'static str]>,
    sorted: Box<[usize]>,
}

impl KeyMatcher {
    /// Builds a matcher over `keys` in declaration order.
    ///
    /// # Errors
    ///
    /// Fails with [`SchemaError::DuplicateWireKey`] if any two keys are
    /// equal.
    pub fn new(keys: impl IntoIterator<Item = &'static str>) -> Result<Self, SchemaError> {
        let keys: Box<[&'static str]> = keys.into_iter().collect();
        let mut sorted: Box<[usize]> = (0..keys.len()).collect();
        sorted.sort_by_key(|&i| keys[i]);
        for pair in sorted.windows(2) {
            if keys[pair[0]] == keys[pair[1]] {
                return Err(SchemaError::DuplicateWireKey { key: keys[pair[0]] });
            }
        }
        Ok(Self { keys, sorted })
    }

    /// Resolves `candidate` to its declaration index, or `None` for a
    /// key that is not part of the schema.
    #[must_use]
    pub fn find(&self, candidate: &str) -> Option<usize> {
        cfg_if! {
            if #[cfg(feature = "linear_keytable")] {
                self.keys.iter().position(|&k| k == candidate)
            } else {
                self.sorted
                    .binary_search_by(|&i| self.keys[i].cmp(candidate))
                    .ok()
                    .map(|rank| self.sorted[rank])
            }
        }
    }

    /// Number of keys in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` for a table over an empty schema.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The wire key at declaration index `index`, if in range.
    #[must_use]
    pub fn key_at(&self, index: usize) -> Option<&'static str> {
        self.keys.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> KeyMatcher {
        KeyMatcher::new(["name", "nickname", "age"]).unwrap()
    }

    #[test]
    fn finds_declaration_indices() {
        let m = matcher();
        assert_eq!(m.find("name"), Some(0));
        assert_eq!(m.find("nickname"), Some(1));
        assert_eq!(m.find("age"), Some(2));
    }

    #[test]
    fn unknown_keys_yield_none() {
        let m = matcher();
        assert_eq!(m.find("extra"), None);
        assert_eq!(m.find(""), None);
        assert_eq!(m.find("nam"), None);
        assert_eq!(m.find("namex"), None);
    }

    #[test]
    fn duplicate_keys_are_a_schema_error() {
        match KeyMatcher::new(["a", "b", "a"]) {
            Err(SchemaError::DuplicateWireKey { key: "a" }) => {}
            other => panic!("expected duplicate-key error, got {:?}", other),
        }
    }

    #[test]
    fn empty_table_matches_nothing() {
        let m = KeyMatcher::new([]).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.find("anything"), None);
    }
}
