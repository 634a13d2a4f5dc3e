//! Risk tiering from pass/fail counts.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Failure rates strictly above this are [`RiskLevel::High`].
pub const HIGH_FAILURE_RATE: f64 = 0.3;
/// Failure rates strictly above this (and not high) are [`RiskLevel::Medium`].
pub const MEDIUM_FAILURE_RATE: f64 = 0.1;

/// Release risk tier.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskLevel {
  High,
  Medium,
  Low,
}

impl RiskLevel {
  /// Fixed advisory sentence for the tier.
  pub fn recommendation(self) -> &'static str {
    match self {
      Self::High => {
        "Do not release. High risk of failure. Review and fix failing tests."
      }
      Self::Medium => {
        "Release with caution. Some tests are failing. Monitor closely after \
         release."
      }
      Self::Low => {
        "Safe to release. Test coverage is good and failure rate is low."
      }
    }
  }
}

/// Map `(total, failed)` test counts to a tier.
///
/// A requirement without tests is high risk. Thresholds are exclusive: a
/// rate of exactly 0.3 is medium and exactly 0.1 is low.
pub fn score(total: u32, failed: u32) -> RiskLevel {
  if total == 0 {
    return RiskLevel::High;
  }
  let failure_rate = f64::from(failed) / f64::from(total);
  if failure_rate > HIGH_FAILURE_RATE {
    RiskLevel::High
  } else if failure_rate > MEDIUM_FAILURE_RATE {
    RiskLevel::Medium
  } else {
    RiskLevel::Low
  }
}

/// The risk report returned for a requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
  pub risk_level:     RiskLevel,
  /// Number of tests attached to the requirement.
  pub test_coverage:  u32,
  pub failed_tests:   u32,
  pub recommendation: String,
}

/// Score the counts and attach the tier's advisory.
pub fn assess(total: u32, failed: u32) -> RiskReport {
  let risk_level = score(total, failed);
  RiskReport {
    risk_level,
    test_coverage: total,
    failed_tests: failed,
    recommendation: risk_level.recommendation().to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn no_tests_is_high() {
    assert_eq!(score(0, 0), RiskLevel::High);
  }

  #[test]
  fn tiers_by_failure_rate() {
    assert_eq!(score(10, 0), RiskLevel::Low);
    assert_eq!(score(10, 4), RiskLevel::High);
    assert_eq!(score(10, 2), RiskLevel::Medium);
  }

  #[test]
  fn thresholds_are_exclusive() {
    assert_eq!(score(10, 1), RiskLevel::Low);
    assert_eq!(score(10, 3), RiskLevel::Medium);
  }

  #[test]
  fn report_carries_counts_and_advisory() {
    let report = assess(4, 2);
    assert_eq!(report.risk_level, RiskLevel::High);
    assert_eq!(report.test_coverage, 4);
    assert_eq!(report.failed_tests, 2);
    assert!(report.recommendation.starts_with("Do not release."));
  }

  #[test]
  fn string_forms_match_serde() {
    assert_eq!(RiskLevel::Medium.to_string(), "medium");
    assert_eq!(RiskLevel::from_str("low").unwrap(), RiskLevel::Low);
    assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"high\"");
  }
}
