//! Composite key encoding
//!
//! A composite key packs a namespace and an ordered list of components into
//! one flat, sortable string:
//!
//! ```text
//! U+0000 namespace U+0000 component_1 U+0000 ... component_n U+0000
//! ```
//!
//! The leading U+0000 keeps composite keys apart from plain record keys.
//! U+0000 and U+10FFFF are reserved (separator and range end), so neither
//! may appear inside a namespace or component. All keys sharing a component
//! prefix fall in the half-open range `[prefix, prefix + U+10FFFF)`.
//!
//! Pure functions only; no storage backend is involved.

use super::errors::{HostError, HostResult};

/// Separator and composite key marker
pub const COMPOSITE_KEY_SEPARATOR: char = '\u{0}';

/// Upper bound appended to a prefix to form an exclusive range end
pub const MAX_UNICODE_RUNE: char = '\u{10FFFF}';

fn validate_part(kind: &str, part: &str) -> HostResult<()> {
    if part.contains(COMPOSITE_KEY_SEPARATOR) || part.contains(MAX_UNICODE_RUNE) {
        return Err(HostError::invalid_composite_key(format!(
            "{} {:?} contains a reserved character (U+0000 or U+10FFFF)",
            kind, part
        )));
    }
    Ok(())
}

/// Build a composite key from a namespace and components.
///
/// # Errors
///
/// Returns `HostError::InvalidCompositeKey` if the namespace is empty or if
/// any part contains a reserved character.
pub fn create_composite_key(namespace: &str, components: &[&str]) -> HostResult<String> {
    if namespace.is_empty() {
        return Err(HostError::invalid_composite_key("namespace must not be empty"));
    }
    validate_part("namespace", namespace)?;

    let capacity = 2 + namespace.len() + components.iter().map(|c| c.len() + 1).sum::<usize>();
    let mut key = String::with_capacity(capacity);
    key.push(COMPOSITE_KEY_SEPARATOR);
    key.push_str(namespace);
    key.push(COMPOSITE_KEY_SEPARATOR);

    for component in components {
        validate_part("component", component)?;
        key.push_str(component);
        key.push(COMPOSITE_KEY_SEPARATOR);
    }

    Ok(key)
}

/// Split a composite key back into its namespace and components.
///
/// # Errors
///
/// Returns `HostError::InvalidCompositeKey` if `key` was not produced by
/// `create_composite_key`.
pub fn split_composite_key(key: &str) -> HostResult<(String, Vec<String>)> {
    let body = key
        .strip_prefix(COMPOSITE_KEY_SEPARATOR)
        .and_then(|rest| rest.strip_suffix(COMPOSITE_KEY_SEPARATOR))
        .ok_or_else(|| {
            HostError::invalid_composite_key(format!("{:?} is not a composite key", key))
        })?;

    let mut parts = body.split(COMPOSITE_KEY_SEPARATOR).map(str::to_string);
    let namespace = parts.next().unwrap_or_default();
    if namespace.is_empty() {
        return Err(HostError::invalid_composite_key(format!(
            "{:?} has an empty namespace",
            key
        )));
    }

    Ok((namespace, parts.collect()))
}

/// Half-open key range `[start, end)` covering every composite key that
/// begins with the given namespace and component prefix.
pub fn partial_key_range(namespace: &str, prefix: &[&str]) -> HostResult<(String, String)> {
    let start = create_composite_key(namespace, prefix)?;
    let mut end = start.clone();
    end.push(MAX_UNICODE_RUNE);
    Ok((start, end))
}

/// Returns true if `key` is in the composite key space.
pub fn is_composite_key(key: &str) -> bool {
    key.starts_with(COMPOSITE_KEY_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let key = create_composite_key("hash~id", &["abc", "d1"]).unwrap();
        assert_eq!(key, "\u{0}hash~id\u{0}abc\u{0}d1\u{0}");
        assert!(is_composite_key(&key));
    }

    #[test]
    fn test_split_inverts_create() {
        let key = create_composite_key("hash~id", &["abc", "d1"]).unwrap();
        let (ns, parts) = split_composite_key(&key).unwrap();
        assert_eq!(ns, "hash~id");
        assert_eq!(parts, vec!["abc".to_string(), "d1".to_string()]);
    }

    #[test]
    fn test_no_components() {
        let key = create_composite_key("ns", &[]).unwrap();
        let (ns, parts) = split_composite_key(&key).unwrap();
        assert_eq!(ns, "ns");
        assert!(parts.is_empty());
    }

    #[test]
    fn test_empty_component_round_trips() {
        let key = create_composite_key("ns", &["", "x"]).unwrap();
        let (_, parts) = split_composite_key(&key).unwrap();
        assert_eq!(parts, vec!["".to_string(), "x".to_string()]);
    }

    #[test]
    fn test_reserved_characters_rejected() {
        assert!(create_composite_key("ns", &["a\u{0}b"]).is_err());
        assert!(create_composite_key("ns", &["a\u{10FFFF}"]).is_err());
        assert!(create_composite_key("n\u{0}s", &["a"]).is_err());
        assert!(create_composite_key("", &["a"]).is_err());
    }

    #[test]
    fn test_split_rejects_plain_keys() {
        assert!(split_composite_key("d1").is_err());
        assert!(split_composite_key("").is_err());
        assert!(split_composite_key("\u{0}").is_err());
        assert!(split_composite_key("\u{0}ns").is_err());
    }

    #[test]
    fn test_range_covers_prefix_only() {
        let (start, end) = partial_key_range("hash~id", &["abc"]).unwrap();
        let inside = create_composite_key("hash~id", &["abc", "zzz"]).unwrap();
        let longer_hash = create_composite_key("hash~id", &["abcd", "a"]).unwrap();
        let other = create_composite_key("hash~id", &["abd", "a"]).unwrap();

        assert!(start <= inside && inside < end);
        assert!(!(start <= longer_hash && longer_hash < end));
        assert!(!(start <= other && other < end));
    }

    #[test]
    fn test_ordering_within_prefix_follows_components() {
        let a = create_composite_key("hash~id", &["h", "a"]).unwrap();
        let b = create_composite_key("hash~id", &["h", "b"]).unwrap();
        let ab = create_composite_key("hash~id", &["h", "ab"]).unwrap();
        assert!(a < ab);
        assert!(ab < b);
    }
}
