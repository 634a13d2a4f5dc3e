//! Requirements: tracked features with their user story and criteria.
//!
//! A requirement owns tests, code-change records and release assessments.
//! Its free-text fields feed [`crate::scenario::synthesize`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Status assigned to requirements created without one.
pub const DEFAULT_STATUS: &str = "draft";

/// A tracked feature with its user story and acceptance criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
  pub requirement_id:      Uuid,
  pub title:               String,
  pub description:         Option<String>,
  pub user_story:          Option<String>,
  /// Newline-delimited clauses; each non-blank line is one criterion.
  pub acceptance_criteria: Option<String>,
  /// Open string set, e.g. `"draft"`, `"new"`, `"approved"`.
  pub status:              String,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
}

// ─── NewRequirement ──────────────────────────────────────────────────────────

/// Input to [`crate::store::TrackerStore::create_requirement`].
/// Timestamps and the id are always assigned by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewRequirement {
  pub title:               String,
  pub description:         Option<String>,
  pub user_story:          Option<String>,
  pub acceptance_criteria: Option<String>,
  pub status:              Option<String>,
}

impl NewRequirement {
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: title.into(), ..Self::default() }
  }

  /// Reject input the store must never persist.
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::BlankTitle);
    }
    Ok(())
  }

  /// The status to persist, falling back to [`DEFAULT_STATUS`].
  pub fn status_or_default(&self) -> String {
    self
      .status
      .as_deref()
      .filter(|s| !s.trim().is_empty())
      .unwrap_or(DEFAULT_STATUS)
      .to_owned()
  }
}

// ─── RequirementUpdate ───────────────────────────────────────────────────────

/// Full replacement of a requirement's editable text fields.
///
/// `status` is only changed when supplied; the text fields are overwritten
/// as given (a missing field clears the column).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementUpdate {
  pub title:               String,
  pub description:         Option<String>,
  pub user_story:          Option<String>,
  pub acceptance_criteria: Option<String>,
  pub status:              Option<String>,
}

impl RequirementUpdate {
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::BlankTitle);
    }
    Ok(())
  }
}
