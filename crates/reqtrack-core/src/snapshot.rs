//! Stored API response shapes used for breaking-change detection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{Error, Result};

/// A structural shape of an endpoint's response at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSnapshot {
  pub snapshot_id:        Uuid,
  pub endpoint:           String,
  pub response_structure: Value,
  pub created_at:         DateTime<Utc>,
}

/// Input to [`crate::store::TrackerStore::record_snapshot`].
#[derive(Debug, Clone)]
pub struct NewApiSnapshot {
  pub endpoint:           String,
  pub response_structure: Value,
}

impl NewApiSnapshot {
  /// Build a snapshot input, rejecting a blank endpoint name.
  pub fn new(endpoint: impl Into<String>, response_structure: Value) -> Result<Self> {
    let endpoint = endpoint.into();
    if endpoint.trim().is_empty() {
      return Err(Error::InvalidSnapshot("endpoint must not be blank".into()));
    }
    Ok(Self { endpoint, response_structure })
  }
}
