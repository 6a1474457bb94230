//! Value normalization for fingerprinting
//!
//! Context values arrive as free-form JSON from user input and AI output.
//! Hashing only works if structurally-equal inputs normalize to identical
//! strings, so every value passes through these functions before it reaches
//! a hasher. The contract is normalize-then-hash, not validate-schema.

use serde_json::Value;

/// Normalize a free-form string: trimmed and lower-cased
#[must_use]
pub fn normalize_str(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Normalize an arbitrary JSON value into a deterministic string
///
/// Strings are trimmed and lower-cased, scalars stringified, arrays
/// normalized element-wise then sorted and joined, and nested objects
/// rendered as compact JSON. `serde_json`'s default `Map` is backed by a
/// `BTreeMap`, so object rendering is key-sorted and deterministic.
#[must_use]
pub fn normalize_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => normalize_str(s),
        Value::Array(items) => {
            let mut parts: Vec<String> = items.iter().map(normalize_value).collect();
            parts.sort();
            parts.join(",")
        },
        Value::Object(_) => value.to_string(),
    }
}

/// Normalize a list of strings: each trimmed and lower-cased, sorted, joined
///
/// Order-independence of array inputs is part of the determinism guarantee.
#[must_use]
pub fn normalize_list(items: &[String]) -> String {
    let mut parts: Vec<String> = items.iter().map(|s| normalize_str(s)).collect();
    parts.sort();
    parts.join(",")
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn list_normalization_ignores_order(
            mut items in proptest::collection::vec("[a-zA-Z ]{0,12}", 0..8)
        ) {
            let forward = normalize_list(&items);
            items.reverse();
            let reversed = normalize_list(&items);
            prop_assert_eq!(forward, reversed);
        }

        #[test]
        fn normalization_is_idempotent(s in "\\PC{0,24}") {
            let once = normalize_str(&s);
            let twice = normalize_str(&once);
            prop_assert_eq!(once, twice);
        }
    }
}
