//! Release checklist: failed tests, recent changes and feature maturity.

use serde::{Deserialize, Serialize};

use crate::risk::RiskLevel;

/// Requirement statuses that mark an unreleased feature.
pub const NEW_FEATURE_STATUSES: [&str; 2] = ["new", "draft"];

pub const ACCEPTABLE: &str = "This release is acceptable";
pub const RISKY: &str = "This release is risky";

/// Each item is `true` when the check passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
  pub no_failed_tests:   bool,
  pub no_recent_changes: bool,
  pub not_new_feature:   bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseChecklist {
  pub checklist:      Checklist,
  pub risk_level:     RiskLevel,
  pub recommendation: String,
}

/// Evaluate release readiness for one requirement.
///
/// `recent_changes` is the number of code changes inside the trailing
/// window. The feature-maturity item does not affect the tier, and the
/// advisory only distinguishes `low` from everything else.
pub fn evaluate(failed_tests: u32, recent_changes: u32, status: &str) -> ReleaseChecklist {
  let has_failed_tests = failed_tests > 0;
  let has_recent_changes = recent_changes > 0;
  let is_new_feature = NEW_FEATURE_STATUSES.contains(&status);

  let risk_level = if !has_failed_tests && !has_recent_changes {
    RiskLevel::Low
  } else if has_failed_tests {
    RiskLevel::High
  } else {
    RiskLevel::Medium
  };

  let recommendation = if risk_level == RiskLevel::Low { ACCEPTABLE } else { RISKY };

  ReleaseChecklist {
    checklist: Checklist {
      no_failed_tests:   !has_failed_tests,
      no_recent_changes: !has_recent_changes,
      not_new_feature:   !is_new_feature,
    },
    risk_level,
    recommendation: recommendation.to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clean_approved_requirement_is_low() {
    let result = evaluate(0, 0, "approved");
    assert_eq!(result.risk_level, RiskLevel::Low);
    assert_eq!(result.checklist, Checklist {
      no_failed_tests:   true,
      no_recent_changes: true,
      not_new_feature:   true,
    });
    assert_eq!(result.recommendation, "This release is acceptable");
  }

  #[test]
  fn recent_changes_only_is_medium_but_risky() {
    let result = evaluate(0, 3, "approved");
    assert_eq!(result.risk_level, RiskLevel::Medium);
    assert!(!result.checklist.no_recent_changes);
    assert_eq!(result.recommendation, "This release is risky");
  }

  #[test]
  fn failed_tests_are_high() {
    assert_eq!(evaluate(1, 0, "approved").risk_level, RiskLevel::High);
    assert_eq!(evaluate(2, 5, "approved").risk_level, RiskLevel::High);
  }

  #[test]
  fn new_and_draft_are_new_features() {
    assert!(!evaluate(0, 0, "draft").checklist.not_new_feature);
    assert!(!evaluate(0, 0, "new").checklist.not_new_feature);
    assert!(evaluate(0, 0, "released").checklist.not_new_feature);
    // Maturity never moves the tier.
    assert_eq!(evaluate(0, 0, "draft").risk_level, RiskLevel::Low);
  }
}
