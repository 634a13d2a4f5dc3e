//! Handlers for `/requirements` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/requirements` | Newest first |
//! | `POST`   | `/requirements` | Body: [`NewRequirement`]; returns 201 |
//! | `GET`    | `/requirements/:id` | 404 if not found |
//! | `PUT`    | `/requirements/:id` | Body: [`RequirementUpdate`] |
//! | `DELETE` | `/requirements/:id` | Removes tests, results, changes, assessments |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use reqtrack_core::{
  requirement::{NewRequirement, Requirement, RequirementUpdate},
  store::TrackerStore,
};
use uuid::Uuid;

use crate::{
  Message,
  error::{ApiError, JsonBody},
};

/// Load a requirement or fail with 404.
pub(crate) async fn find_requirement<S>(store: &S, id: Uuid) -> Result<Requirement, ApiError>
where
  S: TrackerStore,
{
  store
    .get_requirement(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("requirement {id} not found")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /requirements`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Requirement>>, ApiError>
where
  S: TrackerStore,
{
  let requirements = store.list_requirements().await.map_err(ApiError::store)?;
  Ok(Json(requirements))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /requirements`: returns 201 with the stored [`Requirement`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<NewRequirement>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TrackerStore,
{
  body.validate()?;
  let requirement = store.create_requirement(body).await.map_err(ApiError::store)?;
  tracing::info!(id = %requirement.requirement_id, "requirement created");
  Ok((StatusCode::CREATED, Json(requirement)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /requirements/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Requirement>, ApiError>
where
  S: TrackerStore,
{
  Ok(Json(find_requirement(store.as_ref(), id).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /requirements/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  JsonBody(body): JsonBody<RequirementUpdate>,
) -> Result<Json<Requirement>, ApiError>
where
  S: TrackerStore,
{
  body.validate()?;
  let requirement = store
    .update_requirement(id, body)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("requirement {id} not found")))?;
  Ok(Json(requirement))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /requirements/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Message>, ApiError>
where
  S: TrackerStore,
{
  if !store.delete_requirement(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("requirement {id} not found")));
  }
  tracing::info!(%id, "requirement deleted with dependents");
  Ok(Json(Message::new("Requirement deleted successfully")))
}
