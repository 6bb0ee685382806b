//! Expand/flatten pairs between [`TreeValue`] and the typed models.
//!
//! *Expand* reads a configuration tree into a typed record and never fails:
//! absent or ill-typed fields become the zero value of their type.
//! *Flatten* writes a typed record back into the tree shape the framework
//! expects: absent optional data becomes [`TreeValue::Null`] and nested
//! records become singleton blocks.
//!
//! Expand functions for nested records take the unwrapped mapping; callers
//! unwrap singleton blocks with [`TreeValue::get_block`]. Flatten functions
//! for nested records take `Option<&T>` and return the wrapped block, or
//! [`TreeValue::Null`] for `None`.
//!
//! Free-form JSON fields travel through the tree as JSON text. A field whose
//! text fails to decode is logged and expanded to `None`; the rest of the
//! record is still converted.

pub mod alerting_profile;
pub mod dashboard;
pub mod maintenance_window;
pub mod management_zone;

pub use alerting_profile::{expand_alerting_profile, flatten_alerting_profile};
pub use dashboard::{expand_dashboard, flatten_dashboard};
pub use maintenance_window::{expand_maintenance_window, flatten_maintenance_window};
pub use management_zone::{expand_management_zone, flatten_management_zone};

use serde_json::Value;
use tracing::error;

use crate::models::{EntityShortRepresentation, TagInfo};
use crate::tree::TreeValue;

/// Expand every mapping of a list field. Non-mapping elements are skipped.
pub(crate) fn expand_list<T>(items: &[TreeValue], expand: impl Fn(&TreeValue) -> T) -> Vec<T> {
    items
        .iter()
        .filter(|item| item.as_map().is_some())
        .map(expand)
        .collect()
}

/// Flatten a typed list into a list field.
pub(crate) fn flatten_list<T>(items: &[T], flatten: impl Fn(&T) -> TreeValue) -> TreeValue {
    TreeValue::list(items.iter().map(flatten))
}

/// Wrap a flattened record as a singleton block, or the sentinel for `None`.
pub(crate) fn flatten_block<T>(value: Option<&T>, flatten: impl Fn(&T) -> TreeValue) -> TreeValue {
    value.map_or(TreeValue::Null, |inner| TreeValue::block(flatten(inner)))
}

/// Decode the JSON text held in `field`.
///
/// Returns `None` for an absent or empty field. Malformed text is logged
/// and also yields `None`.
pub fn decode_json_text(tree: &TreeValue, field: &str) -> Option<Value> {
    let text = tree.get_opt_str(field).filter(|text| !text.is_empty())?;
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            error!(field = %field, error = %e, "Failed to decode JSON text, leaving field empty");
            None
        },
    }
}

/// Encode a free-form JSON value as text for `field`.
///
/// `None` yields the sentinel. An encoding failure is logged and also yields
/// the sentinel.
pub fn encode_json_text(field: &str, value: Option<&Value>) -> TreeValue {
    let Some(value) = value else {
        return TreeValue::Null;
    };
    match serde_json::to_string(value) {
        Ok(text) => TreeValue::String(text),
        Err(e) => {
            error!(field = %field, error = %e, "Failed to encode JSON text, leaving field empty");
            TreeValue::Null
        },
    }
}

pub(crate) fn expand_tag(tree: &TreeValue) -> TagInfo {
    TagInfo {
        context: tree.get_str("context"),
        key: tree.get_str("key"),
        value: tree.get_opt_str("value"),
    }
}

pub(crate) fn flatten_tag(tag: &TagInfo) -> TreeValue {
    TreeValue::mapping([
        ("context", TreeValue::from(&tag.context)),
        ("key", TreeValue::from(&tag.key)),
        ("value", TreeValue::from(tag.value.clone())),
    ])
}

pub(crate) fn expand_tags(items: &[TreeValue]) -> Vec<TagInfo> {
    expand_list(items, expand_tag)
}

pub(crate) fn flatten_tags(tags: &[TagInfo]) -> TreeValue {
    flatten_list(tags, flatten_tag)
}

/// A reference to another configuration object (`id` plus display name).
pub(crate) fn expand_entity_ref(tree: &TreeValue) -> EntityShortRepresentation {
    EntityShortRepresentation {
        id: tree.get_str("id"),
        name: tree.get_opt_str("name"),
        description: None,
    }
}

pub(crate) fn flatten_entity_ref(entity: &EntityShortRepresentation) -> TreeValue {
    TreeValue::mapping([
        ("id", TreeValue::from(&entity.id)),
        ("name", TreeValue::from(entity.name.clone())),
    ])
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Captures log output emitted while converting.

    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Run `f` with a subscriber that records every event, returning the
    /// result and the formatted log lines.
    pub fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, logs.contents())
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::with_captured_logs;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_json_text() {
        let tree = TreeValue::mapping([
            ("value", TreeValue::from(r#"{"a":[1,2]}"#)),
            ("empty", TreeValue::from("")),
        ]);

        assert_eq!(decode_json_text(&tree, "value"), Some(json!({"a": [1, 2]})));
        assert_eq!(decode_json_text(&tree, "empty"), None);
        assert_eq!(decode_json_text(&tree, "missing"), None);
    }

    #[test]
    fn test_decode_invalid_json_text_is_logged() {
        let tree = TreeValue::mapping([("axis_limits", TreeValue::from("{not json"))]);

        let (value, logs) = with_captured_logs(|| decode_json_text(&tree, "axis_limits"));

        assert_eq!(value, None);
        assert!(logs.contains("ERROR"));
        assert!(logs.contains("axis_limits"));
        assert!(logs.contains("Failed to decode JSON text"));
    }

    #[test]
    fn test_encode_json_text() {
        assert_eq!(encode_json_text("value", None), TreeValue::Null);
        assert_eq!(
            encode_json_text("value", Some(&json!(["a", "b"]))),
            TreeValue::from(r#"["a","b"]"#)
        );
    }

    #[test]
    fn test_expand_list_skips_non_mappings() {
        let items = vec![
            TreeValue::mapping([("key", TreeValue::from("env"))]),
            TreeValue::Null,
            TreeValue::from("stray"),
        ];

        let tags = expand_tags(&items);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].key, "env");
        assert_eq!(tags[0].context, "");
        assert_eq!(tags[0].value, None);
    }

    #[test]
    fn test_flatten_block_absent_is_sentinel() {
        assert_eq!(flatten_block(None::<&TagInfo>, flatten_tag), TreeValue::Null);

        let tag = TagInfo {
            context: "CONTEXTLESS".to_string(),
            key: "team".to_string(),
            value: Some("core".to_string()),
        };
        match &flatten_block(Some(&tag), flatten_tag) {
            TreeValue::List(items) => assert_eq!(expand_tag(&items[0]), tag),
            other => panic!("expected singleton block, got {}", other.kind()),
        }
    }

    #[test]
    fn test_entity_ref_round_trip() {
        let entity = EntityShortRepresentation {
            id: "mz-1".to_string(),
            name: Some("Production".to_string()),
            description: None,
        };
        assert_eq!(expand_entity_ref(&flatten_entity_ref(&entity)), entity);
    }
}
