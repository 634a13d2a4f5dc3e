//! Handlers for test cases.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/requirements/:id/tests` | Newest first |
//! | `POST`   | `/requirements/:id/tests` | Body: [`NewTestBody`]; manual test, returns 201 |
//! | `POST`   | `/requirements/:id/generate-tests` | Replaces previously generated tests |
//! | `GET`    | `/tests/:id` | 404 if not found |
//! | `DELETE` | `/tests/:id` | Removes the test's results too |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use reqtrack_core::{
  scenario,
  store::TrackerStore,
  test_case::{NewTestCase, TestCase},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::{ApiError, JsonBody},
  requirements::find_requirement,
};

/// Load a test or fail with 404.
pub(crate) async fn find_test<S>(store: &S, id: Uuid) -> Result<TestCase, ApiError>
where
  S: TrackerStore,
{
  store
    .get_test(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("test {id} not found")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /requirements/:id/tests`
pub async fn list_for_requirement<S>(
  State(store): State<Arc<S>>,
  Path(requirement_id): Path<Uuid>,
) -> Result<Json<Vec<TestCase>>, ApiError>
where
  S: TrackerStore,
{
  let tests = store.list_tests(requirement_id).await.map_err(ApiError::store)?;
  Ok(Json(tests))
}

// ─── Create ───────────────────────────────────────────────────────────────────

fn default_test_type() -> String { "functional".to_owned() }

/// JSON body accepted by `POST /requirements/:id/tests`.
#[derive(Debug, Deserialize)]
pub struct NewTestBody {
  pub title:       String,
  pub description: Option<String>,
  #[serde(rename = "type", default = "default_test_type")]
  pub test_type:   String,
}

/// `POST /requirements/:id/tests`: returns 201 with the stored [`TestCase`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(requirement_id): Path<Uuid>,
  JsonBody(body): JsonBody<NewTestBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TrackerStore,
{
  if body.title.trim().is_empty() {
    return Err(ApiError::BadRequest("test title must not be blank".into()));
  }
  find_requirement(store.as_ref(), requirement_id).await?;

  let input = NewTestCase {
    description: body.description,
    ..NewTestCase::manual(Some(requirement_id), body.title, body.test_type)
  };
  let test = store.create_test(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(test)))
}

// ─── Generate ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
  pub message: String,
  pub count:   usize,
}

/// `POST /requirements/:id/generate-tests`
///
/// Synthesizes scenarios from the requirement's text and stores them as
/// generated tests, replacing any generated earlier.
pub async fn generate<S>(
  State(store): State<Arc<S>>,
  Path(requirement_id): Path<Uuid>,
) -> Result<Json<GenerateResponse>, ApiError>
where
  S: TrackerStore,
{
  let requirement = find_requirement(store.as_ref(), requirement_id).await?;

  let drafts: Vec<NewTestCase> = scenario::synthesize(&requirement)
    .into_iter()
    .map(|d| d.into_new_test(requirement_id))
    .collect();

  let created = store
    .replace_generated_tests(requirement_id, drafts)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(%requirement_id, count = created.len(), "generated tests");

  let message = if created.is_empty() { "No tests generated" } else { "Tests generated" };
  Ok(Json(GenerateResponse { message: message.to_owned(), count: created.len() }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /tests/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<TestCase>, ApiError>
where
  S: TrackerStore,
{
  Ok(Json(find_test(store.as_ref(), id).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedTest {
  pub message: String,
  pub id:      Uuid,
}

/// `DELETE /tests/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<DeletedTest>, ApiError>
where
  S: TrackerStore,
{
  if !store.delete_test(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("test {id} not found")));
  }
  Ok(Json(DeletedTest { message: "Test deleted successfully".to_owned(), id }))
}
