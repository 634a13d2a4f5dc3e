//! Recorded test runs. Results are append-only and never updated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The outcome of a single test run.
///
/// Only `passed` and `failed` carry meaning for the analysis rules; any other
/// string is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunOutcome {
  Passed,
  Failed,
  Other(String),
}

impl RunOutcome {
  pub fn as_str(&self) -> &str {
    match self {
      Self::Passed => "passed",
      Self::Failed => "failed",
      Self::Other(s) => s,
    }
  }
}

impl From<String> for RunOutcome {
  fn from(s: String) -> Self {
    match s.as_str() {
      "passed" => Self::Passed,
      "failed" => Self::Failed,
      _ => Self::Other(s),
    }
  }
}

impl From<&str> for RunOutcome {
  fn from(s: &str) -> Self { Self::from(s.to_owned()) }
}

impl From<RunOutcome> for String {
  fn from(o: RunOutcome) -> Self {
    match o {
      RunOutcome::Other(s) => s,
      known => known.as_str().to_owned(),
    }
  }
}

/// One recorded outcome of executing a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
  pub result_id:      Uuid,
  pub test_id:        Uuid,
  pub status:         RunOutcome,
  pub log_output:     Option<String>,
  pub error_message:  Option<String>,
  /// Wall-clock duration in milliseconds.
  pub execution_time: Option<i64>,
  pub created_at:     DateTime<Utc>,
}

/// Input to [`crate::store::TrackerStore::record_result`].
#[derive(Debug, Clone)]
pub struct NewTestResult {
  pub test_id:        Uuid,
  pub status:         RunOutcome,
  pub log_output:     Option<String>,
  pub error_message:  Option<String>,
  pub execution_time: Option<i64>,
}

impl NewTestResult {
  pub fn new(test_id: Uuid, status: impl Into<RunOutcome>) -> Self {
    Self {
      test_id,
      status: status.into(),
      log_output: None,
      error_message: None,
      execution_time: None,
    }
  }
}
