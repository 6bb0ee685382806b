//! Schema validation helpers.
//!
//! Validates a [`TreeValue`] against a [`Schema`] before it reaches the
//! converters. Converters never fail, so anything a resource wants rejected
//! (missing required fields, wrong scalar types, non-JSON text in a JSON
//! field) must be caught here.
//!
//! # Example
//!
//! ```
//! use dynatrace_provider::schema::{Attribute, Schema};
//! use dynatrace_provider::tree::TreeValue;
//! use dynatrace_provider::validation::validate;
//!
//! let schema = Schema::new()
//!     .with_attribute("name", Attribute::required_string())
//!     .with_attribute("value", Attribute::optional_json());
//!
//! let input = TreeValue::mapping([("name", TreeValue::from("prod"))]);
//! assert!(validate(&schema, &input).is_empty());
//!
//! let input = TreeValue::mapping([
//!     ("name", TreeValue::from("prod")),
//!     ("value", TreeValue::from("{not json")),
//! ]);
//! let diagnostics = validate(&schema, &input);
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("value".to_string()));
//! ```

use crate::schema::{Attribute, AttributeType, Block, Diagnostic, NestedBlock, Nesting, Schema};
use crate::tree::{Scalar, TreeValue};

/// Validate a configuration tree against a schema.
///
/// Returns one diagnostic per problem; an empty list means the tree is
/// valid. Checks, recursively through nested blocks:
///
/// - required attributes are present and non-null
/// - attribute values have the declared type (sets may arrive as sequences)
/// - JSON-text attributes parse as JSON
/// - nested blocks are sequences within their item bounds
pub fn validate(schema: &Schema, value: &TreeValue) -> Vec<Diagnostic> {
    let mut walker = Walker::default();
    walker.block(&schema.block, value, "");
    walker.diagnostics
}

/// Like [`validate`], as a `Result`.
pub fn validate_result(schema: &Schema, value: &TreeValue) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

pub fn is_valid(schema: &Schema, value: &TreeValue) -> bool {
    validate(schema, value).is_empty()
}

#[derive(Default)]
struct Walker {
    diagnostics: Vec<Diagnostic>,
}

impl Walker {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn block(&mut self, block: &Block, value: &TreeValue, path: &str) {
        match value {
            TreeValue::Null => return,
            TreeValue::Map(_) => {},
            other => {
                let diagnostic =
                    Diagnostic::error("Expected object").with_detail(format!("Got {}", other.kind()));
                self.report(if path.is_empty() {
                    diagnostic
                } else {
                    diagnostic.with_attribute(path)
                });
                return;
            },
        }

        for (name, attr) in &block.attributes {
            self.attribute(attr, value.get(name), &join_path(path, name));
        }
        for (name, nested) in &block.blocks {
            self.nested(nested, value.get(name), &join_path(path, name));
        }
    }

    fn attribute(&mut self, attr: &Attribute, value: &TreeValue, path: &str) {
        if value.is_null() {
            if attr.required {
                self.report(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
            return;
        }

        if !has_type(attr.attr_type, value) {
            self.report(
                Diagnostic::error(format!("Invalid type for attribute '{}'", path))
                    .with_detail(format!(
                        "Expected {}, got {}",
                        attr.attr_type.name(),
                        value.kind()
                    ))
                    .with_attribute(path),
            );
            return;
        }

        if let (true, TreeValue::String(text)) = (attr.json_text, value) {
            if let Err(e) = serde_json::from_str::<serde_json::Value>(text) {
                self.report(
                    Diagnostic::error(format!("Attribute '{}' must contain valid JSON", path))
                        .with_detail(e.to_string())
                        .with_attribute(path),
                );
            }
        }
    }

    fn nested(&mut self, nested: &NestedBlock, value: &TreeValue, path: &str) {
        let items: &[TreeValue] = match value {
            TreeValue::Null => &[],
            TreeValue::List(items) => items,
            other => {
                let expected = match nested.nesting {
                    Nesting::Single => "single-element list",
                    Nesting::List => "list",
                };
                self.report(
                    Diagnostic::error(format!("Expected {} for block '{}'", expected, path))
                        .with_detail(format!("Got {}", other.kind()))
                        .with_attribute(path),
                );
                return;
            },
        };

        let count = items.len();
        if count < nested.min_items {
            let summary = match count {
                0 => format!("Block '{}' requires at least {} item(s)", path, nested.min_items),
                n => format!(
                    "Block '{}' requires at least {} item(s), got {}",
                    path, nested.min_items, n
                ),
            };
            self.report(Diagnostic::error(summary).with_attribute(path));
        }
        if let Some(max) = nested.max_items().filter(|max| count > *max) {
            self.report(
                Diagnostic::error(format!(
                    "Block '{}' allows at most {} item(s), got {}",
                    path, max, count
                ))
                .with_attribute(path),
            );
        }

        for (i, item) in items.iter().enumerate() {
            self.block(&nested.block, item, &format!("{}.{}", path, i));
        }
    }
}

fn has_type(attr_type: AttributeType, value: &TreeValue) -> bool {
    match (attr_type, value) {
        (AttributeType::String, TreeValue::String(_))
        | (AttributeType::Int64, TreeValue::Int(_))
        | (AttributeType::Bool, TreeValue::Bool(_)) => true,
        (AttributeType::StringSet, TreeValue::Set(items)) => {
            items.iter().all(|item| matches!(item, Scalar::String(_)))
        },
        (AttributeType::StringSet, TreeValue::List(items)) => {
            items.iter().all(|item| matches!(item, TreeValue::String(_)))
        },
        _ => false,
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}
