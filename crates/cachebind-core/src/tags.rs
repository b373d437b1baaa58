//! Dimensional tags for meters.
//!
//! A [`Tags`] set is part of a meter's registry identity: two meters with the
//! same name but different tag sets are independent series. Tag sets are kept
//! sorted by key so that identity comparison and exposition output are stable
//! regardless of insertion order.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A single key/value tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    key: String,
    value: String,
}

impl Tag {
    /// Create a tag from a key and a value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Tag key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Tag value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// An ordered set of tags, sorted by key.
///
/// Adding a tag whose key is already present replaces the previous value.
/// All combining operations are non-destructive and return a new set, so a
/// caller-supplied base set can be shared across many meters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Tags {
    sorted: Vec<Tag>,
}

impl Tags {
    /// The empty tag set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a tag set from key/value pairs. Later duplicates win.
    pub fn of<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut tags = Self::empty();
        for (key, value) in pairs {
            tags.push(Tag::new(key, value));
        }
        tags
    }

    /// Return a new set with `key=value` added (replacing any previous value
    /// for `key`).
    pub fn and(&self, key: impl Into<String>, value: impl Into<String>) -> Tags {
        let mut out = self.clone();
        out.push(Tag::new(key, value));
        out
    }

    /// Return a new set containing both sets' tags. On key conflicts,
    /// `other` wins.
    pub fn merge(&self, other: &Tags) -> Tags {
        let mut out = self.clone();
        for tag in &other.sorted {
            out.push(tag.clone());
        }
        out
    }

    /// Look up the value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.sorted
            .binary_search_by(|tag| tag.key.as_str().cmp(key))
            .ok()
            .map(|i| self.sorted[i].value())
    }

    /// Iterate over the tags in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.sorted.iter()
    }

    /// Number of tags in the set.
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    fn push(&mut self, tag: Tag) {
        match self
            .sorted
            .binary_search_by(|existing| existing.key.as_str().cmp(&tag.key))
        {
            Ok(i) => self.sorted[i] = tag,
            Err(i) => self.sorted.insert(i, tag),
        }
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.sorted.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{tag}")?;
        }
        Ok(())
    }
}

// Deserialization goes through `push` so the sorted-by-key invariant holds
// even for hand-written input.
impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<Tag>::deserialize(deserializer)?;
        let mut tags = Tags::empty();
        for tag in raw {
            tags.push(tag);
        }
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_sorted_by_key() {
        let tags = Tags::of([("zone", "a"), ("cache", "users"), ("result", "hit")]);

        let keys: Vec<&str> = tags.iter().map(|t| t.key()).collect();
        assert_eq!(keys, vec!["cache", "result", "zone"]);
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let tags = Tags::of([("cache", "users"), ("cache", "orders")]);

        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("cache"), Some("orders"));
    }

    #[test]
    fn test_and_is_non_destructive() {
        let base = Tags::of([("cache", "users")]);
        let extended = base.and("ownership", "owned");

        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
        assert_eq!(extended.get("ownership"), Some("owned"));
    }

    #[test]
    fn test_merge_other_wins() {
        let base = Tags::of([("cache", "users"), ("zone", "a")]);
        let overrides = Tags::of([("zone", "b"), ("result", "hit")]);

        let merged = base.merge(&overrides);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get("zone"), Some("b"));
        assert_eq!(merged.get("cache"), Some("users"));
    }

    #[test]
    fn test_identity_ignores_insertion_order() {
        let a = Tags::of([("cache", "users"), ("result", "hit")]);
        let b = Tags::of([("result", "hit"), ("cache", "users")]);

        assert_eq!(a, b);
    }

    #[test]
    fn test_display() {
        let tags = Tags::of([("result", "hit"), ("cache", "users")]);

        assert_eq!(tags.to_string(), "cache=users,result=hit");
    }

    #[test]
    fn test_serde_round_trip_restores_order() {
        let tags = Tags::of([("zone", "a"), ("cache", "users")]);

        let json = serde_json::to_string(&tags).unwrap();
        let back: Tags = serde_json::from_str(&json).unwrap();

        assert_eq!(back, tags);

        // Unsorted hand-written input is normalized on the way in.
        let hand_written: Tags = serde_json::from_str(
            r#"[{"key":"zone","value":"a"},{"key":"cache","value":"users"}]"#,
        )
        .unwrap();
        assert_eq!(hand_written, tags);
    }
}
