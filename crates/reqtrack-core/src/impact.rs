//! Change impact analysis.
//!
//! Only the response shape exists so far: every changed file is reported as
//! a risk area and no tests are singled out.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::test_case::TestCase;

pub const REVIEW_RELATED_TESTS: &str = "Review related tests";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactReport {
  pub affected_tests: Vec<TestCase>,
  pub risk_areas:     Vec<String>,
  pub recommendation: String,
}

// TODO: map `file_path` to tests once code changes record the touched symbols.
pub fn analyze(_requirement_id: Uuid, file_path: &str, _change_type: &str) -> ImpactReport {
  ImpactReport {
    affected_tests: Vec::new(),
    risk_areas:     vec![file_path.to_owned()],
    recommendation: REVIEW_RELATED_TESTS.to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reports_changed_file_as_risk_area() {
    let report = analyze(Uuid::nil(), "src/auth.rs", "modified");
    assert!(report.affected_tests.is_empty());
    assert_eq!(report.risk_areas, ["src/auth.rs"]);
    assert_eq!(report.recommendation, "Review related tests");
  }
}
