//! Test cases linked to requirements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scenario::ScenarioDraft;

/// Status assigned to every newly created test.
pub const DEFAULT_TEST_STATUS: &str = "pending";

/// A named test case, optionally synthesized from its requirement's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
  pub test_id:        Uuid,
  /// Owning requirement; tests may exist unattached.
  pub requirement_id: Option<Uuid>,
  pub title:          String,
  pub description:    Option<String>,
  /// Free-form tag such as `"functional"`, `"negative"` or `"acceptance"`.
  #[serde(rename = "type")]
  pub test_type:      String,
  pub status:         String,
  /// `true` when the row was produced by [`crate::scenario::synthesize`].
  pub ai_generated:   bool,
  pub created_at:     DateTime<Utc>,
}

/// Input to [`crate::store::TrackerStore::create_test`].
#[derive(Debug, Clone)]
pub struct NewTestCase {
  pub requirement_id: Option<Uuid>,
  pub title:          String,
  pub description:    Option<String>,
  pub test_type:      String,
  pub ai_generated:   bool,
}

impl NewTestCase {
  /// A manually authored test.
  pub fn manual(
    requirement_id: Option<Uuid>,
    title: impl Into<String>,
    test_type: impl Into<String>,
  ) -> Self {
    Self {
      requirement_id,
      title: title.into(),
      description: None,
      test_type: test_type.into(),
      ai_generated: false,
    }
  }
}

impl ScenarioDraft {
  /// Turn a synthesized scenario into a generated test for `requirement_id`.
  pub fn into_new_test(self, requirement_id: Uuid) -> NewTestCase {
    NewTestCase {
      requirement_id: Some(requirement_id),
      title:          self.title,
      description:    Some(self.description),
      test_type:      self.kind.as_ref().to_owned(),
      ai_generated:   true,
    }
  }
}
