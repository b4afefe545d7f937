//! Request body key normalization.
//!
//! Callers send camelCase bodies; the billing API expects snake_case. Two
//! kinds of exemption exist:
//!
//! - `exclude_keys`: the key is renamed but its value is copied as-is.
//! - `exclude_children_of`: the key is renamed, nothing beneath it is.

use std::collections::HashSet;

use serde_json::{Map, Value};

/// Keys exempted from recursive renaming.
#[derive(Debug, Clone, Default)]
pub struct KeyExclusions {
    /// Keys whose values are copied unchanged.
    pub exclude_keys: HashSet<String>,
    /// Keys whose descendants are never renamed.
    pub exclude_children_of: HashSet<String>,
}

impl KeyExclusions {
    /// Exclusions applied to every dispatched request body.
    ///
    /// `checkoutSessionParams` is shaped by the payment provider and
    /// `properties` is an arbitrary event property bag.
    #[must_use]
    pub fn dispatcher_defaults() -> Self {
        Self::new(["errorOnNotFound"], ["checkoutSessionParams", "properties"])
    }

    /// Build exclusions from two key lists.
    pub fn new<K, C>(exclude_keys: K, exclude_children_of: C) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            exclude_keys: exclude_keys.into_iter().map(Into::into).collect(),
            exclude_children_of: exclude_children_of.into_iter().map(Into::into).collect(),
        }
    }

    /// Normalize `value` with these exclusions.
    #[must_use]
    pub fn apply(&self, value: &Value) -> Value {
        normalize(value, &self.exclude_keys, &self.exclude_children_of)
    }
}

/// Convert a camelCase identifier to snake_case.
///
/// Already-snake_case input is returned unchanged.
#[must_use]
pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;

    for c in key.chars() {
        if c.is_ascii_uppercase() {
            if prev.is_some_and(|p| p != '_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }

    out
}

/// Recursively rename object keys from camelCase to snake_case.
#[must_use]
pub fn normalize(
    value: &Value,
    exclude_keys: &HashSet<String>,
    exclude_children_of: &HashSet<String>,
) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, child) in map {
                let renamed = camel_to_snake(key);
                // Both exemptions stop the walk here; only the key itself is renamed.
                let child = if exclude_keys.contains(key) || exclude_children_of.contains(key) {
                    child.clone()
                } else {
                    normalize(child, exclude_keys, exclude_children_of)
                };
                out.insert(renamed, child);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| normalize(item, exclude_keys, exclude_children_of))
                .collect(),
        ),
        other => other.clone(),
    }
}
