//! The dynamically-shaped configuration tree exchanged with the framework.
//!
//! A [`TreeValue`] holds one resource's desired or observed configuration:
//! scalars, ordered sequences, sets of scalars and mappings. Absent optional
//! data is always [`TreeValue::Null`], never an omitted key with ambiguous
//! meaning.
//!
//! Reads go through get-with-default accessors ([`TreeValue::get_str`],
//! [`TreeValue::get_list`], ...) so a missing or ill-typed field yields the
//! zero value of the requested type instead of an error.
//!
//! # Singleton blocks
//!
//! An optional nested object is encoded as a one-element sequence wrapping a
//! mapping. [`TreeValue::block`] builds that shape and
//! [`TreeValue::get_block`] unwraps it.
//!
//! ```
//! use dynatrace_provider::tree::TreeValue;
//!
//! let key = TreeValue::mapping([
//!     ("attribute", TreeValue::from("SERVICE_TAGS")),
//!     ("type", TreeValue::Null),
//! ]);
//! let condition = TreeValue::mapping([("key", TreeValue::block(key))]);
//!
//! let key = condition.get_block("key").unwrap();
//! assert_eq!(key.get_str("attribute"), "SERVICE_TAGS");
//! assert_eq!(key.get_opt_str("type"), None);
//! assert_eq!(key.get_int("missing"), 0);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::Value;

/// Mapping from field name to value. Keys are unique by construction.
pub type Mapping = BTreeMap<String, TreeValue>;

pub(crate) static NULL: TreeValue = TreeValue::Null;

/// A scalar member of a [`TreeValue::Set`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scalar {
    /// A boolean.
    Bool(bool),
    /// A 64-bit integer.
    Int(i64),
    /// A string.
    String(String),
}

impl Scalar {
    fn into_value(self) -> TreeValue {
        match self {
            Scalar::Bool(b) => TreeValue::Bool(b),
            Scalar::Int(i) => TreeValue::Int(i),
            Scalar::String(s) => TreeValue::String(s),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

/// A node of the configuration tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TreeValue {
    /// The empty sentinel for absent optional data.
    #[default]
    Null,
    /// A boolean scalar.
    Bool(bool),
    /// An integer scalar.
    Int(i64),
    /// A string scalar.
    String(String),
    /// An ordered sequence.
    List(Vec<TreeValue>),
    /// An unordered, deduplicated set of scalars.
    Set(BTreeSet<Scalar>),
    /// A mapping from field name to value.
    Map(Mapping),
}

impl TreeValue {
    /// Build a mapping from `(field, value)` pairs.
    pub fn mapping<'a>(fields: impl IntoIterator<Item = (&'a str, TreeValue)>) -> Self {
        TreeValue::Map(
            fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    /// Wrap a value in a one-element sequence (the singleton block shape).
    pub fn block(value: TreeValue) -> Self {
        TreeValue::List(vec![value])
    }

    /// Build a set of strings.
    pub fn string_set<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        TreeValue::Set(
            items
                .into_iter()
                .map(|s| Scalar::String(s.into()))
                .collect(),
        )
    }

    /// Build a sequence.
    pub fn list(items: impl IntoIterator<Item = TreeValue>) -> Self {
        TreeValue::List(items.into_iter().collect())
    }

    /// Returns `true` for the empty sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, TreeValue::Null)
    }

    /// A short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TreeValue::Null => "null",
            TreeValue::Bool(_) => "bool",
            TreeValue::Int(_) => "int",
            TreeValue::String(_) => "string",
            TreeValue::List(_) => "list",
            TreeValue::Set(_) => "set",
            TreeValue::Map(_) => "map",
        }
    }

    /// The mapping behind this value, if it is one.
    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            TreeValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The string behind this value, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TreeValue::String(s) => Some(s),
            _ => None,
        }
    }

    // =========================================================================
    // Get-with-default accessors
    // =========================================================================

    /// Look up a field of a mapping. Missing fields, and lookups on
    /// anything that is not a mapping, return [`TreeValue::Null`].
    pub fn get(&self, field: &str) -> &TreeValue {
        match self {
            TreeValue::Map(map) => map.get(field).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// String field, or `""`.
    pub fn get_str(&self, field: &str) -> String {
        self.get_opt_str(field).unwrap_or_default()
    }

    /// String field, or `None` when absent or not a string.
    pub fn get_opt_str(&self, field: &str) -> Option<String> {
        match self.get(field) {
            TreeValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Boolean field, or `false`.
    pub fn get_bool(&self, field: &str) -> bool {
        self.get_opt_bool(field).unwrap_or_default()
    }

    /// Boolean field, or `None` when absent or not a boolean.
    pub fn get_opt_bool(&self, field: &str) -> Option<bool> {
        match self.get(field) {
            TreeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer field, or `0`.
    pub fn get_int(&self, field: &str) -> i64 {
        self.get_opt_int(field).unwrap_or_default()
    }

    /// Integer field, or `None` when absent or not an integer.
    pub fn get_opt_int(&self, field: &str) -> Option<i64> {
        match self.get(field) {
            TreeValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Sequence field, or an empty slice.
    pub fn get_list(&self, field: &str) -> &[TreeValue] {
        match self.get(field) {
            TreeValue::List(items) => items,
            _ => &[],
        }
    }

    /// Set-of-strings field as a sorted, deduplicated vector.
    ///
    /// Sequences are accepted too, since sets arrive as JSON arrays.
    /// Non-string members are skipped.
    pub fn get_set(&self, field: &str) -> Vec<String> {
        let strings: BTreeSet<String> = match self.get(field) {
            TreeValue::Set(items) => items
                .iter()
                .filter_map(|item| match item {
                    Scalar::String(s) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
            TreeValue::List(items) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => BTreeSet::new(),
        };
        strings.into_iter().collect()
    }

    /// The mapping inside a singleton block, or `None` if the block is
    /// absent, empty, or its first element is not a mapping.
    pub fn get_block(&self, field: &str) -> Option<&TreeValue> {
        self.get_list(field)
            .first()
            .filter(|inner| matches!(inner, TreeValue::Map(_)))
    }
}

impl From<&str> for TreeValue {
    fn from(s: &str) -> Self {
        TreeValue::String(s.to_string())
    }
}

impl From<String> for TreeValue {
    fn from(s: String) -> Self {
        TreeValue::String(s)
    }
}

impl From<&String> for TreeValue {
    fn from(s: &String) -> Self {
        TreeValue::String(s.clone())
    }
}

impl From<bool> for TreeValue {
    fn from(b: bool) -> Self {
        TreeValue::Bool(b)
    }
}

impl From<i64> for TreeValue {
    fn from(i: i64) -> Self {
        TreeValue::Int(i)
    }
}

impl<T: Into<TreeValue>> From<Option<T>> for TreeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(TreeValue::Null, Into::into)
    }
}

impl From<Mapping> for TreeValue {
    fn from(map: Mapping) -> Self {
        TreeValue::Map(map)
    }
}

/// JSON arrays become sequences. Numbers without a fractional part become
/// integers; any other number is kept as its decimal text.
impl From<Value> for TreeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => TreeValue::Null,
            Value::Bool(b) => TreeValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => TreeValue::Int(i),
                None => match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                        TreeValue::Int(f as i64)
                    },
                    _ => TreeValue::String(n.to_string()),
                },
            },
            Value::String(s) => TreeValue::String(s),
            Value::Array(items) => TreeValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                TreeValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            },
        }
    }
}

/// Sets become arrays in their sorted order.
impl From<TreeValue> for Value {
    fn from(value: TreeValue) -> Self {
        match value {
            TreeValue::Null => Value::Null,
            TreeValue::Bool(b) => Value::Bool(b),
            TreeValue::Int(i) => Value::from(i),
            TreeValue::String(s) => Value::String(s),
            TreeValue::List(items) => Value::Array(items.into_iter().map(Into::into).collect()),
            TreeValue::Set(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| item.into_value().into())
                    .collect(),
            ),
            TreeValue::Map(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_with_default_on_missing_fields() {
        let tree = TreeValue::mapping([("name", TreeValue::from("zone"))]);

        assert_eq!(tree.get_str("name"), "zone");
        assert_eq!(tree.get_str("missing"), "");
        assert_eq!(tree.get_opt_str("missing"), None);
        assert!(!tree.get_bool("missing"));
        assert_eq!(tree.get_int("missing"), 0);
        assert!(tree.get_list("missing").is_empty());
        assert!(tree.get_set("missing").is_empty());
        assert!(tree.get_block("missing").is_none());
        assert!(tree.get("missing").is_null());
    }

    #[test]
    fn test_ill_typed_fields_yield_defaults() {
        let tree = TreeValue::mapping([
            ("name", TreeValue::Int(3)),
            ("rules", TreeValue::from("not a list")),
            ("enabled", TreeValue::from("true")),
        ]);

        assert_eq!(tree.get_str("name"), "");
        assert!(tree.get_list("rules").is_empty());
        assert!(!tree.get_bool("enabled"));
        assert!(TreeValue::from("scalar").get("field").is_null());
    }

    #[test]
    fn test_get_block() {
        let inner = TreeValue::mapping([("id", TreeValue::from("mz-1"))]);
        let tree = TreeValue::mapping([
            ("present", TreeValue::block(inner.clone())),
            ("empty", TreeValue::List(vec![])),
            ("nil", TreeValue::block(TreeValue::Null)),
        ]);

        assert_eq!(tree.get_block("present"), Some(&inner));
        assert!(tree.get_block("empty").is_none());
        assert!(tree.get_block("nil").is_none());
    }

    #[test]
    fn test_get_set_accepts_lists_and_sets() {
        let tree = TreeValue::mapping([
            ("set", TreeValue::string_set(["b", "a", "b"])),
            (
                "list",
                TreeValue::list([TreeValue::from("z"), TreeValue::from("y"), TreeValue::Int(1)]),
            ),
        ]);

        assert_eq!(tree.get_set("set"), vec!["a", "b"]);
        assert_eq!(tree.get_set("list"), vec!["y", "z"]);
    }

    #[test]
    fn test_option_conversion_uses_sentinel() {
        assert_eq!(TreeValue::from(None::<String>), TreeValue::Null);
        assert_eq!(TreeValue::from(Some(5_i64)), TreeValue::Int(5));
    }

    #[test]
    fn test_json_conversion() {
        let tree: TreeValue = json!({
            "name": "prod",
            "count": 2,
            "ratio": 1.5,
            "whole": 4.0,
            "items": [true, null],
        })
        .into();

        assert_eq!(tree.get_str("name"), "prod");
        assert_eq!(tree.get_int("count"), 2);
        assert_eq!(tree.get_str("ratio"), "1.5");
        assert_eq!(tree.get_int("whole"), 4);
        assert_eq!(tree.get_list("items").len(), 2);

        let back: Value = TreeValue::mapping([
            ("tags", TreeValue::string_set(["b", "a"])),
            ("id", TreeValue::Null),
        ])
        .into();
        assert_eq!(back, json!({"tags": ["a", "b"], "id": null}));
    }
}
