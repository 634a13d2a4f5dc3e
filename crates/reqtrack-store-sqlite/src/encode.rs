//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that string comparison matches chronological order. UUIDs are
//! stored as hyphenated lowercase strings. Snapshot shapes are compact JSON.

use std::str::FromStr as _;

use chrono::{DateTime, SecondsFormat, Utc};
use reqtrack_core::{
  assessment::ReleaseAssessment,
  change::CodeChange,
  requirement::Requirement,
  risk::RiskLevel,
  run::{RunOutcome, TestResult},
  snapshot::ApiSnapshot,
  test_case::TestCase,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── RiskLevel ───────────────────────────────────────────────────────────────

pub fn decode_risk_level(s: &str) -> Result<RiskLevel> {
  RiskLevel::from_str(s).map_err(|_| Error::Decode(format!("unknown risk level: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const REQUIREMENT_COLUMNS: &str = "requirement_id, title, description, \
   user_story, acceptance_criteria, status, created_at, updated_at";

/// Raw strings read directly from a `requirements` row.
pub struct RawRequirement {
  pub requirement_id:      String,
  pub title:               String,
  pub description:         Option<String>,
  pub user_story:          Option<String>,
  pub acceptance_criteria: Option<String>,
  pub status:              String,
  pub created_at:          String,
  pub updated_at:          String,
}

impl RawRequirement {
  /// Read a row selected with [`REQUIREMENT_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      requirement_id:      row.get(0)?,
      title:               row.get(1)?,
      description:         row.get(2)?,
      user_story:          row.get(3)?,
      acceptance_criteria: row.get(4)?,
      status:              row.get(5)?,
      created_at:          row.get(6)?,
      updated_at:          row.get(7)?,
    })
  }

  pub fn into_requirement(self) -> Result<Requirement> {
    Ok(Requirement {
      requirement_id:      decode_uuid(&self.requirement_id)?,
      title:               self.title,
      description:         self.description,
      user_story:          self.user_story,
      acceptance_criteria: self.acceptance_criteria,
      status:              self.status,
      created_at:          decode_dt(&self.created_at)?,
      updated_at:          decode_dt(&self.updated_at)?,
    })
  }
}

pub const TEST_COLUMNS: &str = "test_id, requirement_id, title, description, \
   type, status, ai_generated, created_at";

/// Raw values read directly from a `tests` row.
pub struct RawTestCase {
  pub test_id:        String,
  pub requirement_id: Option<String>,
  pub title:          String,
  pub description:    Option<String>,
  pub test_type:      String,
  pub status:         String,
  pub ai_generated:   bool,
  pub created_at:     String,
}

impl RawTestCase {
  /// Read a row selected with [`TEST_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      test_id:        row.get(0)?,
      requirement_id: row.get(1)?,
      title:          row.get(2)?,
      description:    row.get(3)?,
      test_type:      row.get(4)?,
      status:         row.get(5)?,
      ai_generated:   row.get(6)?,
      created_at:     row.get(7)?,
    })
  }

  pub fn into_test_case(self) -> Result<TestCase> {
    Ok(TestCase {
      test_id:        decode_uuid(&self.test_id)?,
      requirement_id: self.requirement_id.as_deref().map(decode_uuid).transpose()?,
      title:          self.title,
      description:    self.description,
      test_type:      self.test_type,
      status:         self.status,
      ai_generated:   self.ai_generated,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

pub const RESULT_COLUMNS: &str = "result_id, test_id, status, log_output, \
   error_message, execution_time, created_at";

/// Raw values read directly from a `test_results` row.
pub struct RawTestResult {
  pub result_id:      String,
  pub test_id:        String,
  pub status:         String,
  pub log_output:     Option<String>,
  pub error_message:  Option<String>,
  pub execution_time: Option<i64>,
  pub created_at:     String,
}

impl RawTestResult {
  /// Read a row selected with [`RESULT_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      result_id:      row.get(0)?,
      test_id:        row.get(1)?,
      status:         row.get(2)?,
      log_output:     row.get(3)?,
      error_message:  row.get(4)?,
      execution_time: row.get(5)?,
      created_at:     row.get(6)?,
    })
  }

  pub fn into_result(self) -> Result<TestResult> {
    Ok(TestResult {
      result_id:      decode_uuid(&self.result_id)?,
      test_id:        decode_uuid(&self.test_id)?,
      status:         RunOutcome::from(self.status),
      log_output:     self.log_output,
      error_message:  self.error_message,
      execution_time: self.execution_time,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

pub const CHANGE_COLUMNS: &str = "change_id, requirement_id, file_path, \
   change_type, description, commit_hash, created_at";

/// Raw strings read directly from a `code_changes` row.
pub struct RawCodeChange {
  pub change_id:      String,
  pub requirement_id: String,
  pub file_path:      String,
  pub change_type:    String,
  pub description:    Option<String>,
  pub commit_hash:    Option<String>,
  pub created_at:     String,
}

impl RawCodeChange {
  /// Read a row selected with [`CHANGE_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      change_id:      row.get(0)?,
      requirement_id: row.get(1)?,
      file_path:      row.get(2)?,
      change_type:    row.get(3)?,
      description:    row.get(4)?,
      commit_hash:    row.get(5)?,
      created_at:     row.get(6)?,
    })
  }

  pub fn into_code_change(self) -> Result<CodeChange> {
    Ok(CodeChange {
      change_id:      decode_uuid(&self.change_id)?,
      requirement_id: decode_uuid(&self.requirement_id)?,
      file_path:      self.file_path,
      change_type:    self.change_type,
      description:    self.description,
      commit_hash:    self.commit_hash,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

pub const ASSESSMENT_COLUMNS: &str = "assessment_id, requirement_id, \
   risk_level, test_count, failed_tests, business_impact, recommendation, \
   created_at";

/// Raw values read directly from a `release_assessments` row.
pub struct RawAssessment {
  pub assessment_id:   String,
  pub requirement_id:  String,
  pub risk_level:      String,
  pub test_count:      u32,
  pub failed_tests:    u32,
  pub business_impact: Option<String>,
  pub recommendation:  String,
  pub created_at:      String,
}

impl RawAssessment {
  /// Read a row selected with [`ASSESSMENT_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      assessment_id:   row.get(0)?,
      requirement_id:  row.get(1)?,
      risk_level:      row.get(2)?,
      test_count:      row.get(3)?,
      failed_tests:    row.get(4)?,
      business_impact: row.get(5)?,
      recommendation:  row.get(6)?,
      created_at:      row.get(7)?,
    })
  }

  pub fn into_assessment(self) -> Result<ReleaseAssessment> {
    Ok(ReleaseAssessment {
      assessment_id:   decode_uuid(&self.assessment_id)?,
      requirement_id:  decode_uuid(&self.requirement_id)?,
      risk_level:      decode_risk_level(&self.risk_level)?,
      test_count:      self.test_count,
      failed_tests:    self.failed_tests,
      business_impact: self.business_impact,
      recommendation:  self.recommendation,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

pub const SNAPSHOT_COLUMNS: &str =
  "snapshot_id, endpoint, response_structure, created_at";

/// Raw strings read directly from an `api_snapshots` row.
pub struct RawSnapshot {
  pub snapshot_id:        String,
  pub endpoint:           String,
  pub response_structure: String,
  pub created_at:         String,
}

impl RawSnapshot {
  /// Read a row selected with [`SNAPSHOT_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      snapshot_id:        row.get(0)?,
      endpoint:           row.get(1)?,
      response_structure: row.get(2)?,
      created_at:         row.get(3)?,
    })
  }

  pub fn into_snapshot(self) -> Result<ApiSnapshot> {
    Ok(ApiSnapshot {
      snapshot_id:        decode_uuid(&self.snapshot_id)?,
      endpoint:           self.endpoint,
      response_structure: serde_json::from_str(&self.response_structure)?,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let late = early + chrono::Duration::microseconds(1500);
    let (a, b) = (encode_dt(early), encode_dt(late));
    assert_eq!(a.len(), b.len());
    assert!(a < b);
    assert_eq!(decode_dt(&b).unwrap(), late);
  }

  #[test]
  fn unknown_risk_level_is_rejected() {
    assert_eq!(decode_risk_level("medium").unwrap(), RiskLevel::Medium);
    assert!(matches!(decode_risk_level("extreme"), Err(Error::Decode(_))));
  }
}
