//! Front-matter model.
//!
//! Note metadata arrives from the host as loosely shaped YAML/JSON. This module
//! folds every shape into a closed [`FrontmatterValue`] union so the resolver can
//! match exhaustively instead of probing dynamic fields.
//!
//! Key order is preserved: writing a mapping back produces the keys in the order
//! they were read, with new keys appended.

pub mod link;

use serde::Serialize;

pub use link::{extract_link_path, is_remote, is_suppression, to_canonical_link};

/// A single front-matter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FrontmatterValue {
    /// Explicit `null` or an empty value.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Numeric scalar, kept as parsed so integers stay exact.
    Number(serde_yaml::Number),
    /// String scalar.
    String(String),
    /// Sequence; nested sequences cover the `[[link]]` widget shape.
    List(Vec<Self>),
    /// Nested mapping.
    Map(Vec<(String, Self)>),
}

impl FrontmatterValue {
    /// Returns the string payload, if this is a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a numeric value as a finite float.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Renders a scalar as display text.
    ///
    /// Strings, numbers and booleans stringify directly; everything else has no
    /// scalar rendering.
    #[must_use]
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Number(n) => Some(number_text(n)),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null | Self::List(_) | Self::Map(_) => None,
        }
    }

    /// Returns `true` for values that carry no usable content (`null`, `""`, `false`, `0`).
    #[must_use]
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Number(n) => n.as_f64().is_none_or(|n| n == 0.0 || n.is_nan()),
            Self::String(s) => s.is_empty(),
            Self::List(_) | Self::Map(_) => false,
        }
    }

    /// Converts this value into a YAML value for persistence.
    #[must_use]
    pub fn to_yaml(&self) -> serde_yaml::Value {
        match self {
            Self::Null => serde_yaml::Value::Null,
            Self::Bool(b) => serde_yaml::Value::Bool(*b),
            Self::Number(n) => serde_yaml::Value::Number(n.clone()),
            Self::String(s) => serde_yaml::Value::String(s.clone()),
            Self::List(items) => {
                serde_yaml::Value::Sequence(items.iter().map(Self::to_yaml).collect())
            }
            Self::Map(entries) => serde_yaml::Value::Mapping(
                entries
                    .iter()
                    .map(|(k, v)| (serde_yaml::Value::String(k.clone()), v.to_yaml()))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for FrontmatterValue {
    fn from(value: &str) -> Self { Self::String(value.to_string()) }
}

impl From<String> for FrontmatterValue {
    fn from(value: String) -> Self { Self::String(value) }
}

impl From<bool> for FrontmatterValue {
    fn from(value: bool) -> Self { Self::Bool(value) }
}

impl From<f64> for FrontmatterValue {
    fn from(value: f64) -> Self { Self::Number(value.into()) }
}

impl From<i64> for FrontmatterValue {
    fn from(value: i64) -> Self { Self::Number(value.into()) }
}

impl From<u64> for FrontmatterValue {
    fn from(value: u64) -> Self { Self::Number(value.into()) }
}

impl From<serde_yaml::Value> for FrontmatterValue {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Self::Null,
            serde_yaml::Value::Bool(b) => Self::Bool(b),
            serde_yaml::Value::Number(n) => Self::Number(n),
            serde_yaml::Value::String(s) => Self::String(s),
            serde_yaml::Value::Sequence(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_yaml::Value::Mapping(map) => Self::Map(
                map.into_iter().filter_map(|(k, v)| Some((yaml_key(k)?, Self::from(v)))).collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}

impl From<serde_json::Value> for FrontmatterValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => json_number(&n).map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// Stringifies a mapping key; non-scalar keys are dropped.
fn yaml_key(key: serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Formats a number the way it was most likely written (`3` rather than `3.0`).
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Display text of a number: integers verbatim, whole floats without `.0`.
fn number_text(n: &serde_yaml::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => format_number(f),
        _ => n.to_string(),
    }
}

fn json_number(n: &serde_json::Number) -> Option<serde_yaml::Number> {
    n.as_u64()
        .map(serde_yaml::Number::from)
        .or_else(|| n.as_i64().map(serde_yaml::Number::from))
        .or_else(|| n.as_f64().map(serde_yaml::Number::from))
}

/// Ordered front-matter mapping of a single note.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Frontmatter {
    entries: Vec<(String, FrontmatterValue)>,
}

impl Frontmatter {
    /// Creates an empty mapping.
    #[must_use]
    pub const fn new() -> Self { Self { entries: Vec::new() } }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the string value stored under `key`.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> { self.get(key).and_then(FrontmatterValue::as_str) }

    /// Returns `true` if `key` is present, whatever its value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool { self.entries.iter().any(|(k, _)| k == key) }

    /// Inserts or replaces a value, keeping the original key position.
    ///
    /// Returns the previous value, if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FrontmatterValue>,
    ) -> Option<FrontmatterValue> {
        let key = key.into();
        let value = value.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<FrontmatterValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterates over entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrontmatterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of keys.
    #[must_use]
    pub const fn len(&self) -> usize { self.entries.len() }

    /// Returns `true` if there are no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Returns the note's tags as plain strings.
    ///
    /// Accepts a list of strings or a single string; a leading `#` is dropped and
    /// anything that is not a string is ignored.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        let normalize = |tag: &str| {
            let tag = tag.trim();
            tag.strip_prefix('#').unwrap_or(tag).to_string()
        };
        match self.get("tags") {
            Some(FrontmatterValue::List(items)) => items
                .iter()
                .filter_map(FrontmatterValue::as_str)
                .map(normalize)
                .filter(|t| !t.is_empty())
                .collect(),
            Some(FrontmatterValue::String(s)) if !s.trim().is_empty() => vec![normalize(s)],
            _ => Vec::new(),
        }
    }

    /// Builds a mapping from a parsed YAML document.
    ///
    /// Anything other than a mapping at the top level yields an empty mapping.
    #[must_use]
    pub fn from_yaml(value: serde_yaml::Value) -> Self {
        match FrontmatterValue::from(value) {
            FrontmatterValue::Map(entries) => Self { entries },
            _ => Self::new(),
        }
    }

    /// Converts the mapping into a YAML mapping, preserving key order.
    #[must_use]
    pub fn to_yaml(&self) -> serde_yaml::Mapping {
        self.entries
            .iter()
            .map(|(k, v)| (serde_yaml::Value::String(k.clone()), v.to_yaml()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<FrontmatterValue>> FromIterator<(K, V)> for Frontmatter {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut fm = Self::new();
        for (k, v) in iter {
            fm.insert(k, v);
        }
        fm
    }
}
