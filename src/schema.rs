//! Declared shape of the provider block and of every resource.
//!
//! A [`Schema`] lists the top-level attributes and nested blocks of one
//! configuration tree. Nested blocks come in two shapes, both carried as
//! sequences in the tree:
//!
//! - [`Nesting::Single`]: an optional (or required) sub-object wrapped in a
//!   one-element sequence
//! - [`Nesting::List`]: zero or more sub-objects in order
//!
//! Schemas drive [`validate`](crate::validation::validate) and change
//! detection ([`Schema::field_changed`]). Resource kinds derive their
//! tracked fields from [`Schema::field_names`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::Value;

use crate::tree::{Scalar, TreeValue};

/// Value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Int64,
    Bool,
    /// Unordered, deduplicated strings.
    StringSet,
}

impl AttributeType {
    pub(crate) fn name(self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Int64 => "int64",
            AttributeType::Bool => "bool",
            AttributeType::StringSet => "set of strings",
        }
    }
}

/// One scalar or set-valued field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub attr_type: AttributeType,
    /// Must be present and non-null.
    pub required: bool,
    /// Hidden from plans and logs.
    pub sensitive: bool,
    /// A string holding free-form JSON text.
    pub json_text: bool,
    pub description: Option<String>,
}

impl Attribute {
    fn of(attr_type: AttributeType, required: bool) -> Self {
        Self {
            attr_type,
            required,
            sensitive: false,
            json_text: false,
            description: None,
        }
    }

    pub fn required_string() -> Self {
        Self::of(AttributeType::String, true)
    }

    pub fn optional_string() -> Self {
        Self::of(AttributeType::String, false)
    }

    /// An optional string whose content must parse as JSON.
    pub fn optional_json() -> Self {
        Self {
            json_text: true,
            ..Self::optional_string()
        }
    }

    pub fn required_int64() -> Self {
        Self::of(AttributeType::Int64, true)
    }

    pub fn optional_int64() -> Self {
        Self::of(AttributeType::Int64, false)
    }

    pub fn required_bool() -> Self {
        Self::of(AttributeType::Bool, true)
    }

    pub fn optional_bool() -> Self {
        Self::of(AttributeType::Bool, false)
    }

    pub fn optional_string_set() -> Self {
        Self::of(AttributeType::StringSet, false)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the attribute as a credential.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// Attributes and nested blocks of one mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub attributes: BTreeMap<String, Attribute>,
    pub blocks: BTreeMap<String, NestedBlock>,
    pub description: Option<String>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.blocks.insert(name.into(), block);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether two mappings hold the same configuration.
    ///
    /// JSON-text attributes compare by decoded value, so `{"a": 1}` and
    /// `{"a":1}` are the same. String sets ignore order and duplicates.
    /// Everything else compares structurally.
    pub fn equivalent(&self, a: &TreeValue, b: &TreeValue) -> bool {
        match (a.as_map(), b.as_map()) {
            (Some(left), Some(right)) => left
                .keys()
                .chain(right.keys())
                .all(|field| self.field_equivalent(field, a.get(field), b.get(field))),
            _ => a == b,
        }
    }

    fn field_equivalent(&self, field: &str, a: &TreeValue, b: &TreeValue) -> bool {
        if let Some(attr) = self.attributes.get(field) {
            if attr.json_text {
                return json_text_equivalent(a, b);
            }
            if attr.attr_type == AttributeType::StringSet {
                return string_set_equivalent(a, b);
            }
        }
        if let (Some(nested), TreeValue::List(left), TreeValue::List(right)) =
            (self.blocks.get(field), a, b)
        {
            return left.len() == right.len()
                && left
                    .iter()
                    .zip(right)
                    .all(|(l, r)| nested.block.equivalent(l, r));
        }
        a == b
    }
}

fn json_text_equivalent(a: &TreeValue, b: &TreeValue) -> bool {
    // `None` for text that does not decode; `Some(None)` for no text at all.
    fn decode(value: &TreeValue) -> Option<Option<Value>> {
        match value {
            TreeValue::Null => Some(None),
            TreeValue::String(text) if text.is_empty() => Some(None),
            TreeValue::String(text) => serde_json::from_str(text).ok().map(Some),
            _ => None,
        }
    }

    a == b || matches!((decode(a), decode(b)), (Some(left), Some(right)) if left == right)
}

fn string_set_equivalent(a: &TreeValue, b: &TreeValue) -> bool {
    fn members(value: &TreeValue) -> Option<BTreeSet<&str>> {
        match value {
            TreeValue::Null => Some(BTreeSet::new()),
            TreeValue::Set(items) => items
                .iter()
                .map(|item| match item {
                    Scalar::String(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect(),
            TreeValue::List(items) => items.iter().map(TreeValue::as_str).collect(),
            _ => None,
        }
    }

    a == b || matches!((members(a), members(b)), (Some(left), Some(right)) if left == right)
}

/// How a nested block is carried in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    /// At most one element.
    Single,
    /// Any number of elements, ordered.
    List,
}

/// A block nested under a field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedBlock {
    pub block: Block,
    pub nesting: Nesting,
    pub min_items: usize,
}

impl NestedBlock {
    /// An optional singleton block.
    pub fn single(block: Block) -> Self {
        Self {
            block,
            nesting: Nesting::Single,
            min_items: 0,
        }
    }

    /// A singleton block that must be present.
    pub fn required_single(block: Block) -> Self {
        Self {
            min_items: 1,
            ..Self::single(block)
        }
    }

    pub fn list(block: Block) -> Self {
        Self {
            block,
            nesting: Nesting::List,
            min_items: 0,
        }
    }

    pub fn with_min_items(mut self, min_items: usize) -> Self {
        self.min_items = min_items;
        self
    }

    /// Upper bound on the element count, if any.
    pub fn max_items(&self) -> Option<usize> {
        match self.nesting {
            Nesting::Single => Some(1),
            Nesting::List => None,
        }
    }
}

/// The schema of the provider block or of one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    pub block: Block,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.block = self.block.with_attribute(name, attr);
        self
    }

    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.block = self.block.with_block(name, block);
        self
    }

    /// Top-level field names: attributes in name order, then blocks in name
    /// order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.block
            .attributes
            .keys()
            .chain(self.block.blocks.keys())
            .map(String::as_str)
    }

    /// Whether top-level `field` differs between two trees, ignoring
    /// formatting differences in JSON text.
    pub fn field_changed(&self, field: &str, a: &TreeValue, b: &TreeValue) -> bool {
        !self.block.field_equivalent(field, a, b)
    }
}

/// The provider block schema plus one schema per resource type name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderSchema {
    pub provider: Schema,
    pub resources: BTreeMap<String, Schema>,
}

impl ProviderSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider_config(mut self, schema: Schema) -> Self {
        self.provider = schema;
        self
    }

    pub fn with_resource(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.resources.insert(name.into(), schema);
        self
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// The operation did not complete.
    Error,
    /// The operation completed but something should be addressed.
    Warning,
}

/// A message reported back to the framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    /// A short summary, e.g. `Unable to create dynatrace_dashboard`.
    pub summary: String,
    /// The underlying error text.
    pub detail: Option<String>,
    /// Dotted path of the offending field, e.g. `rule.0.condition.0.key`.
    pub attribute: Option<String>,
}

impl Diagnostic {
    fn new(severity: DiagnosticSeverity, summary: impl Into<String>) -> Self {
        Self {
            severity,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    pub fn error(summary: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, summary)
    }

    pub fn warning(summary: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, summary)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.severity, self.summary)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        if let Some(attribute) = &self.attribute {
            write!(f, " (at {})", attribute)?;
        }
        Ok(())
    }
}
