//! API response snapshots and breaking-change detection.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api-snapshots` | Body: [`SnapshotBody`]; diffs against the previous snapshot |
//! | `GET`  | `/api-snapshots/:endpoint/compare` | Diffs the two newest snapshots |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use reqtrack_core::{
  diff::{self, ApiChanges},
  snapshot::NewApiSnapshot,
  store::TrackerStore,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ApiError, JsonBody};

pub const BREAKING_WARNING: &str = "Breaking changes detected";
pub const SNAPSHOT_SAVED: &str = "API snapshot saved";
pub const NOT_ENOUGH_SNAPSHOTS: &str = "Not enough snapshots to compare";

/// JSON body accepted by `POST /api-snapshots`.
#[derive(Debug, Deserialize)]
pub struct SnapshotBody {
  #[serde(default)]
  pub endpoint:           String,
  pub response_structure: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotSaved {
  Breaking { id: Uuid, warning: String, changes: ApiChanges },
  Saved { id: Uuid, message: String },
}

/// `POST /api-snapshots`
///
/// The previous snapshot is read before the new one is stored, so the diff
/// is always against what existed at the time of the call.
pub async fn record<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<SnapshotBody>,
) -> Result<Json<SnapshotSaved>, ApiError>
where
  S: TrackerStore,
{
  let structure = body
    .response_structure
    .ok_or_else(|| ApiError::BadRequest("response_structure is required".into()))?;
  let input = NewApiSnapshot::new(body.endpoint, structure)?;

  let previous = store
    .latest_snapshots(&input.endpoint, 1)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .next();

  let snapshot = store.record_snapshot(input).await.map_err(ApiError::store)?;

  let changes = previous
    .map(|prev| diff::detect_api_changes(&prev.response_structure, &snapshot.response_structure))
    .unwrap_or_default();

  let response = if changes.has_breaking_changes {
    tracing::warn!(
      endpoint = %snapshot.endpoint,
      removed = ?changes.removed_fields,
      "breaking api change"
    );
    SnapshotSaved::Breaking {
      id: snapshot.snapshot_id,
      warning: BREAKING_WARNING.to_owned(),
      changes,
    }
  } else {
    SnapshotSaved::Saved { id: snapshot.snapshot_id, message: SNAPSHOT_SAVED.to_owned() }
  };
  Ok(Json(response))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Comparison {
  Compared { has_changes: bool, changes: ApiChanges },
  Insufficient { message: String },
}

/// `GET /api-snapshots/:endpoint/compare`
pub async fn compare<S>(
  State(store): State<Arc<S>>,
  Path(endpoint): Path<String>,
) -> Result<Json<Comparison>, ApiError>
where
  S: TrackerStore,
{
  let snapshots = store
    .latest_snapshots(&endpoint, 2)
    .await
    .map_err(ApiError::store)?;

  let [newest, previous] = snapshots.as_slice() else {
    return Ok(Json(Comparison::Insufficient { message: NOT_ENOUGH_SNAPSHOTS.to_owned() }));
  };

  let changes = diff::detect_api_changes(&previous.response_structure, &newest.response_structure);
  Ok(Json(Comparison::Compared { has_changes: changes.has_breaking_changes, changes }))
}
