//! Flakiness heuristic over a test's most recent results.

use serde::{Deserialize, Serialize};

use crate::run::RunOutcome;

/// How many of the newest results are considered.
pub const FLAKY_WINDOW: usize = 5;

/// Fewer results than this cannot be classified at all.
const MIN_RUNS: usize = 2;

/// Mixed outcomes only count as flaky from this many runs on.
const MIN_RUNS_FOR_FLAKY: usize = 3;

pub const NOT_ENOUGH_RUNS: &str = "Not enough test runs";

/// Result of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlakinessReport {
  Assessed {
    is_flaky:   bool,
    pass_count: usize,
    fail_count: usize,
    total_runs: usize,
  },
  Insufficient {
    is_flaky: bool,
    reason:   String,
  },
}

impl FlakinessReport {
  pub fn is_flaky(&self) -> bool {
    match self {
      Self::Assessed { is_flaky, .. } | Self::Insufficient { is_flaky, .. } => {
        *is_flaky
      }
    }
  }
}

/// Classify a test from its result statuses, newest first.
///
/// A test is flaky when at least three runs were considered and they include
/// both a pass and a failure, regardless of the ratio.
pub fn classify(recent: &[RunOutcome]) -> FlakinessReport {
  let window = &recent[..recent.len().min(FLAKY_WINDOW)];

  if window.len() < MIN_RUNS {
    return FlakinessReport::Insufficient {
      is_flaky: false,
      reason:   NOT_ENOUGH_RUNS.to_owned(),
    };
  }

  let pass_count = window.iter().filter(|o| **o == RunOutcome::Passed).count();
  let fail_count = window.iter().filter(|o| **o == RunOutcome::Failed).count();

  FlakinessReport::Assessed {
    is_flaky: window.len() >= MIN_RUNS_FOR_FLAKY && pass_count > 0 && fail_count > 0,
    pass_count,
    fail_count,
    total_runs: window.len(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn outcomes(statuses: &[&str]) -> Vec<RunOutcome> {
    statuses.iter().copied().map(RunOutcome::from).collect()
  }

  #[test]
  fn fewer_than_two_runs_is_not_enough() {
    for statuses in [&[][..], &["failed"][..], &["passed"][..]] {
      let report = classify(&outcomes(statuses));
      assert_eq!(report, FlakinessReport::Insufficient {
        is_flaky: false,
        reason:   "Not enough test runs".into(),
      });
    }
  }

  #[test]
  fn mixed_three_runs_is_flaky() {
    let report = classify(&outcomes(&["passed", "failed", "passed"]));
    assert_eq!(report, FlakinessReport::Assessed {
      is_flaky:   true,
      pass_count: 2,
      fail_count: 1,
      total_runs: 3,
    });
  }

  #[test]
  fn two_mixed_runs_are_not_flaky() {
    let report = classify(&outcomes(&["passed", "failed"]));
    assert!(!report.is_flaky());
  }

  #[test]
  fn uniform_runs_are_not_flaky() {
    assert!(!classify(&outcomes(&["failed"; 5])).is_flaky());
    assert!(!classify(&outcomes(&["passed", "passed", "skipped"])).is_flaky());
  }

  #[test]
  fn only_newest_five_are_considered() {
    let report =
      classify(&outcomes(&["passed", "passed", "passed", "passed", "passed", "failed"]));
    assert_eq!(report, FlakinessReport::Assessed {
      is_flaky:   false,
      pass_count: 5,
      fail_count: 0,
      total_runs: 5,
    });
  }

  #[test]
  fn insufficient_serializes_with_reason() {
    let json = serde_json::to_value(classify(&[])).unwrap();
    assert_eq!(json, serde_json::json!({
      "is_flaky": false,
      "reason": "Not enough test runs",
    }));
  }
}
