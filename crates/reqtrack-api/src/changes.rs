//! Code-change log.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/code-changes` | Body: [`NewCodeChange`]; returns the id + impact |
//! | `GET`  | `/requirements/:id/code-changes` | Newest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use reqtrack_core::{
  change::{CodeChange, NewCodeChange},
  impact::{self, ImpactReport},
  store::TrackerStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::{ApiError, JsonBody},
  requirements::find_requirement,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordedChange {
  pub id:     Uuid,
  pub impact: ImpactReport,
}

/// `POST /code-changes`
pub async fn record<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<NewCodeChange>,
) -> Result<Json<RecordedChange>, ApiError>
where
  S: TrackerStore,
{
  if body.file_path.trim().is_empty() {
    return Err(ApiError::BadRequest("file_path must not be blank".into()));
  }
  find_requirement(store.as_ref(), body.requirement_id).await?;

  let change = store.record_code_change(body).await.map_err(ApiError::store)?;
  tracing::debug!(
    requirement_id = %change.requirement_id,
    file = %change.file_path,
    "code change recorded"
  );

  let impact = impact::analyze(change.requirement_id, &change.file_path, &change.change_type);
  Ok(Json(RecordedChange { id: change.change_id, impact }))
}

/// `GET /requirements/:id/code-changes`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(requirement_id): Path<Uuid>,
) -> Result<Json<Vec<CodeChange>>, ApiError>
where
  S: TrackerStore,
{
  let changes = store
    .list_code_changes(requirement_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(changes))
}
