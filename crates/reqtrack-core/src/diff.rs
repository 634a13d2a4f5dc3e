//! Shallow structural diff between two API response snapshots.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level key changes between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiChanges {
  pub has_breaking_changes: bool,
  /// Keys of `previous` missing from `current`, in `previous`'s order.
  pub removed_fields:       Vec<String>,
  /// Keys of `current` missing from `previous`, in `current`'s order.
  pub added_fields:         Vec<String>,
}

/// Compare the top-level keys of `previous` and `current`.
///
/// Only two JSON objects are compared; any other pairing reports no change.
/// Removing a field is breaking, adding one never is.
pub fn detect_api_changes(previous: &Value, current: &Value) -> ApiChanges {
  let (Value::Object(prev), Value::Object(curr)) = (previous, current) else {
    return ApiChanges::default();
  };

  let removed_fields: Vec<String> =
    prev.keys().filter(|k| !curr.contains_key(*k)).cloned().collect();
  let added_fields: Vec<String> =
    curr.keys().filter(|k| !prev.contains_key(*k)).cloned().collect();

  ApiChanges {
    has_breaking_changes: !removed_fields.is_empty(),
    removed_fields,
    added_fields,
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn removed_and_added_keys() {
    let changes = detect_api_changes(&json!({"a": 1, "b": 2}), &json!({"a": 1, "c": 3}));
    assert_eq!(changes, ApiChanges {
      has_breaking_changes: true,
      removed_fields:       vec!["b".into()],
      added_fields:         vec!["c".into()],
    });
  }

  #[test]
  fn identical_objects_have_no_changes() {
    let shape = json!({"id": 0, "name": "", "tags": []});
    assert_eq!(detect_api_changes(&shape, &shape), ApiChanges::default());
  }

  #[test]
  fn additions_are_not_breaking() {
    let changes = detect_api_changes(&json!({"a": 1}), &json!({"a": 1, "z": 0, "b": 0}));
    assert!(!changes.has_breaking_changes);
    assert_eq!(changes.added_fields, ["z", "b"]);
  }

  #[test]
  fn only_top_level_keys_compared() {
    let changes = detect_api_changes(
      &json!({"user": {"id": 1, "email": ""}}),
      &json!({"user": {"id": 1}}),
    );
    assert_eq!(changes, ApiChanges::default());
  }

  #[test]
  fn removed_order_follows_previous() {
    let changes =
      detect_api_changes(&json!({"z": 1, "m": 2, "a": 3, "keep": 4}), &json!({"keep": 4}));
    assert_eq!(changes.removed_fields, ["z", "m", "a"]);
  }

  #[test]
  fn non_objects_report_nothing() {
    assert_eq!(detect_api_changes(&json!([1, 2]), &json!({"a": 1})), ApiChanges::default());
    assert_eq!(detect_api_changes(&json!({"a": 1}), &json!("text")), ApiChanges::default());
    assert_eq!(detect_api_changes(&Value::Null, &Value::Null), ApiChanges::default());
  }
}
