//! Typed lookups of annotation values with fallback to defaults
//!
//! Every lookup yields a [`Resolved`] so callers (and tests) can tell a valid
//! value apart from a present-but-unusable one and from a missing key.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::warn;

/// Outcome of looking up a single tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<T> {
    /// Key present and the value parsed
    Valid(T),
    /// Key present but the value could not be used
    Invalid { raw: String },
    /// Key missing, or present with a value that counts as missing
    Absent,
}

impl<T> Resolved<T> {
    pub fn or_default(self, default: T) -> T {
        match self {
            Resolved::Valid(value) => value,
            Resolved::Invalid { .. } | Resolved::Absent => default,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Resolved::Valid(_))
    }
}

/// Read-only view over a merged label/annotation map
#[derive(Debug, Clone, Copy)]
pub struct Tags<'a> {
    map: &'a HashMap<String, String>,
}

impl<'a> Tags<'a> {
    pub fn new(map: &'a HashMap<String, String>) -> Self {
        Self { map }
    }

    /// An empty string counts as absent.
    pub fn string(&self, key: &str) -> Resolved<String> {
        match self.map.get(key) {
            Some(value) if !value.is_empty() => Resolved::Valid(value.clone()),
            _ => Resolved::Absent,
        }
    }

    pub fn bool(&self, key: &str) -> Resolved<bool> {
        match self.map.get(key) {
            Some(value) => match parse_bool(value) {
                Some(parsed) => Resolved::Valid(parsed),
                None => Resolved::Invalid { raw: value.clone() },
            },
            None => Resolved::Absent,
        }
    }

    pub fn int64(&self, key: &str) -> Resolved<i64> {
        match self.map.get(key) {
            Some(value) => match value.parse::<i64>() {
                Ok(parsed) => Resolved::Valid(parsed),
                Err(_) => Resolved::Invalid { raw: value.clone() },
            },
            None => Resolved::Absent,
        }
    }

    /// Comma separated, without trimming. `""` yields a single empty entry.
    pub fn string_list(&self, key: &str) -> Resolved<Vec<String>> {
        match self.map.get(key) {
            Some(value) => Resolved::Valid(value.split(',').map(str::to_string).collect()),
            None => Resolved::Absent,
        }
    }

    /// JSON document stored in a single tag. A literal `null` decodes to the
    /// empty value; decode failures are logged and reported as
    /// [`Resolved::Invalid`].
    pub fn json<T: DeserializeOwned + Default>(&self, key: &str) -> Resolved<T> {
        let value = match self.map.get(key) {
            Some(value) if !value.is_empty() => value,
            _ => return Resolved::Absent,
        };

        match serde_json::from_str::<Option<T>>(value) {
            Ok(parsed) => Resolved::Valid(parsed.unwrap_or_default()),
            Err(err) => {
                warn!(tag = key, error = %err, "Could not parse JSON value of tag, using default");
                Resolved::Invalid { raw: value.clone() }
            }
        }
    }
}

/// Boolean tokens in the canonical set `1 t T TRUE true True` and their negatives.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
