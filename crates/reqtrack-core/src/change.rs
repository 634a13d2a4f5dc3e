//! Code-change log entries, used only for recency windowing.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trailing window in which a code change counts as "recent".
pub const RECENT_CHANGE_DAYS: i64 = 7;

/// Start of the recent-change window relative to `now`.
pub fn recent_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
  now - Duration::days(RECENT_CHANGE_DAYS)
}

/// A logged source modification associated with a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeChange {
  pub change_id:      Uuid,
  pub requirement_id: Uuid,
  pub file_path:      String,
  pub change_type:    String,
  pub description:    Option<String>,
  pub commit_hash:    Option<String>,
  pub created_at:     DateTime<Utc>,
}

/// Input to [`crate::store::TrackerStore::record_code_change`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewCodeChange {
  pub requirement_id: Uuid,
  pub file_path:      String,
  pub change_type:    String,
  pub description:    Option<String>,
  pub commit_hash:    Option<String>,
}
