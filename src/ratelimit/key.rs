//! Storage key derivation.

use std::fmt;

const PREFIX: &str = "ratelimit:";

/// A key that uniquely identifies the record of one qualifier under one
/// limiter.
///
/// Format: `ratelimit:{name length}:{name}:{qualifier}`. The byte length of
/// the name fixes where the name ends, so names and qualifiers may contain
/// `:` without two pairs ever encoding to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    encoded: String,
    name_len: usize,
}

impl StorageKey {
    /// Derive the key for `qualifier` under the limiter called `name`.
    pub fn new(name: &str, qualifier: &str) -> Self {
        Self {
            encoded: format!("{}{}:{}:{}", PREFIX, name.len(), name, qualifier),
            name_len: name.len(),
        }
    }

    /// Parse a key produced by [`StorageKey::new`].
    pub fn parse(key: &str) -> Option<Self> {
        let rest = key.strip_prefix(PREFIX)?;
        let (len, rest) = rest.split_once(':')?;
        let name_len: usize = len.parse().ok()?;
        if digits(name_len) != len.len() {
            return None;
        }

        // The name must be followed by the separator
        if rest.len() <= name_len || !rest.is_char_boundary(name_len) {
            return None;
        }
        if rest.as_bytes()[name_len] != b':' {
            return None;
        }

        Some(Self {
            encoded: key.to_string(),
            name_len,
        })
    }

    /// The limiter name this key belongs to.
    pub fn name(&self) -> &str {
        let start = self.name_start();
        &self.encoded[start..start + self.name_len]
    }

    /// The qualifier this key belongs to.
    pub fn qualifier(&self) -> &str {
        &self.encoded[self.name_start() + self.name_len + 1..]
    }

    /// The encoded key as handed to the store.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    fn name_start(&self) -> usize {
        // "ratelimit:" + digits + ":"
        PREFIX.len() + digits(self.name_len) + 1
    }
}

fn digits(mut n: usize) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.encoded
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_format() {
        let key = StorageKey::new("login", "user-42");
        assert_eq!(key.as_str(), "ratelimit:5:login:user-42");
        assert_eq!(key.name(), "login");
        assert_eq!(key.qualifier(), "user-42");
    }

    #[test]
    fn test_storage_key_is_stable() {
        assert_eq!(StorageKey::new("api", "10.0.0.1"), StorageKey::new("api", "10.0.0.1"));
    }

    #[test]
    fn test_storage_key_separators_do_not_collide() {
        let a = StorageKey::new("a:b", "c");
        let b = StorageKey::new("a", "b:c");
        assert_ne!(a, b);
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_storage_key_distinguishes_names_and_qualifiers() {
        assert_ne!(StorageKey::new("api", "x"), StorageKey::new("login", "x"));
        assert_ne!(StorageKey::new("api", "x"), StorageKey::new("api", "y"));
        assert_ne!(StorageKey::new("api", ""), StorageKey::new("ap", "i"));
    }

    #[test]
    fn test_storage_key_long_name() {
        let name = "n".repeat(123);
        let key = StorageKey::new(&name, "q:1");
        assert_eq!(key.name(), name);
        assert_eq!(key.qualifier(), "q:1");
    }

    #[test]
    fn test_storage_key_parse() {
        let key = StorageKey::new("a:b", "c:d");
        let parsed = StorageKey::parse(key.as_str()).unwrap();
        assert_eq!(parsed, key);
        assert_eq!(parsed.name(), "a:b");
        assert_eq!(parsed.qualifier(), "c:d");

        let empty = StorageKey::parse("ratelimit:3:api:").unwrap();
        assert_eq!(empty.qualifier(), "");
    }

    #[test]
    fn test_storage_key_parse_rejects_malformed() {
        assert!(StorageKey::parse("counter|a|b").is_none());
        assert!(StorageKey::parse("ratelimit:x:api:q").is_none());
        assert!(StorageKey::parse("ratelimit:10:api:q").is_none());
        assert!(StorageKey::parse("ratelimit:2:api:q").is_none());
        assert!(StorageKey::parse("ratelimit:03:api:q").is_none());
    }
}
