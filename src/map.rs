//! small insertion-ordered association map with an optional default value
//!
//! Used for evaluator binds and element-to-evaluator maps. Deliberately a
//! vector of pairs with linear find: entry counts are small, enumeration
//! order matters, and hashing would buy nothing here.

/// Insertion-ordered map with unique keys and an optional default value.
///
/// Setting a key to `None`, or to a value equal to the configured default,
/// removes the entry. The default and an explicitly-stored default value are
/// indistinguishable through [`get`](SimpleMap::get): callers must not rely
/// on telling the two apart.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleMap<K, V> {
    entries: Vec<(K, V)>,
    default: Option<V>,
}

impl<K, V> Default for SimpleMap<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            default: None,
        }
    }
}

impl<K, V> SimpleMap<K, V>
where
    K: Copy + PartialEq,
    V: Copy + PartialEq,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(default: V) -> Self {
        Self {
            entries: Vec::new(),
            default: Some(default),
        }
    }

    /// Stored value for `key`, else the default when `allow_default` is set
    /// and one is configured, else `None`.
    pub fn get(&self, key: K, allow_default: bool) -> Option<V> {
        let found = self
            .entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v);
        match found {
            Some(v) => Some(v),
            None if allow_default => self.default,
            None => None,
        }
    }

    /// Store `value` under `key`, returning the previous value if any.
    ///
    /// `None` removes the entry, as does a value equal to the configured
    /// default (default-equal entries are elided to save space).
    pub fn set(&mut self, key: K, value: Option<V>) -> Option<V> {
        let position = self.entries.iter().position(|(k, _)| *k == key);
        let previous = position.map(|i| self.entries[i].1);

        let store = match value {
            Some(v) if Some(v) != self.default => Some(v),
            _ => None,
        };

        match (position, store) {
            (Some(i), Some(v)) => self.entries[i].1 = v,
            (Some(i), None) => {
                self.entries.remove(i);
            }
            (None, Some(v)) => self.entries.push((key, v)),
            (None, None) => {}
        }

        previous
    }

    /// Number of explicitly stored entries. Entries elided as default-equal
    /// are not counted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn key_at(&self, i: usize) -> Option<K> {
        self.entries.get(i).map(|(k, _)| *k)
    }

    pub fn value_at(&self, i: usize) -> Option<V> {
        self.entries.get(i).map(|(_, v)| *v)
    }

    /// Present entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (K, V)> + '_ {
        self.entries.iter().copied()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn default_value(&self) -> Option<V> {
        self.default
    }

    pub fn set_default(&mut self, default: Option<V>) {
        self.default = default;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_returns_previous_value() {
        let mut map = SimpleMap::new();
        assert_eq!(map.set(1, Some(10)), None);
        assert_eq!(map.set(1, Some(20)), Some(10));
        assert_eq!(map.get(1, false), Some(20));
    }

    #[test]
    fn set_none_removes() {
        let mut map = SimpleMap::new();
        map.set(1, Some(10));
        assert_eq!(map.set(1, None), Some(10));
        assert_eq!(map.get(1, false), None);
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn default_equal_entries_are_elided() {
        let mut map = SimpleMap::with_default(7);
        map.set(1, Some(7));

        // reads back as the default either way
        assert_eq!(map.get(1, true), Some(7));
        assert_eq!(map.get(1, false), None);

        // but enumeration never shows the key
        assert_eq!(map.len(), 0);
        assert_eq!(map.key_at(0), None);
        assert_eq!(map.value_at(0), None);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut map = SimpleMap::new();
        map.set(3, Some(30));
        map.set(1, Some(10));
        map.set(2, Some(20));

        let keys: Vec<i32> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![3, 1, 2]);
    }

    #[test]
    fn default_lookup_is_opt_in() {
        let mut map = SimpleMap::with_default(7);
        assert_eq!(map.get(9, false), None);
        assert_eq!(map.get(9, true), Some(7));

        map.set_default(None);
        assert!(!map.has_default());
        assert_eq!(map.get(9, true), None);
    }
}
