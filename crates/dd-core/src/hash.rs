//! Fast hash map type aliases.
//!
//! The pending maps are keyed by short base-name strings, which is the case
//! the Fx hash algorithm from `rustc-hash` is tuned for. Keys are derived from
//! local file names, so denial-of-service resistance is not a concern.
//!
//! # Examples
//!
//! ```
//! use dd_core::{FxHashMap, fx_hash_map};
//!
//! let mut map: FxHashMap<String, u32> = fx_hash_map();
//! map.insert("report".to_owned(), 1);
//! assert_eq!(map.get("report"), Some(&1));
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// Creates a new empty [`FxHashMap`].
///
/// Equivalent to `FxHashMap::default()`, but reads better where the key and
/// value types are inferred from a struct field.
#[inline]
#[must_use]
pub fn fx_hash_map<K, V>() -> FxHashMap<K, V> {
    FxHashMap::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_hash_map_overwrites_key() {
        let mut map: FxHashMap<&str, i32> = fx_hash_map();
        map.insert("quarterly", 1);
        map.insert("quarterly", 2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("quarterly"), Some(&2));
    }
}
