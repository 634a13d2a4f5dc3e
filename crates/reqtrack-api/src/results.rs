//! Handlers for test results and flakiness.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tests/:id/results` | 10 newest, newest first |
//! | `POST` | `/tests/:id/results` | Body: [`NewResultBody`]; returns 201 |
//! | `GET`  | `/tests/:id/flaky-status` | Over the 5 newest results |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use reqtrack_core::{
  flaky::{self, FLAKY_WINDOW, FlakinessReport},
  run::{NewTestResult, RunOutcome, TestResult},
  store::TrackerStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::{ApiError, JsonBody},
  test_cases::find_test,
};

/// How many results the history endpoint returns.
const HISTORY_LIMIT: usize = 10;

/// `GET /tests/:id/results`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(test_id): Path<Uuid>,
) -> Result<Json<Vec<TestResult>>, ApiError>
where
  S: TrackerStore,
{
  let results = store
    .list_results(test_id, HISTORY_LIMIT)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(results))
}

/// JSON body accepted by `POST /tests/:id/results`.
#[derive(Debug, Deserialize)]
pub struct NewResultBody {
  pub status:         RunOutcome,
  pub log_output:     Option<String>,
  pub error_message:  Option<String>,
  pub execution_time: Option<i64>,
}

/// `POST /tests/:id/results`: returns 201 with the recorded [`TestResult`].
pub async fn record<S>(
  State(store): State<Arc<S>>,
  Path(test_id): Path<Uuid>,
  JsonBody(body): JsonBody<NewResultBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TrackerStore,
{
  find_test(store.as_ref(), test_id).await?;

  let result = store
    .record_result(NewTestResult {
      test_id,
      status: body.status,
      log_output: body.log_output,
      error_message: body.error_message,
      execution_time: body.execution_time,
    })
    .await
    .map_err(ApiError::store)?;
  tracing::debug!(%test_id, status = result.status.as_str(), "result recorded");
  Ok((StatusCode::CREATED, Json(result)))
}

/// `GET /tests/:id/flaky-status`
pub async fn flaky_status<S>(
  State(store): State<Arc<S>>,
  Path(test_id): Path<Uuid>,
) -> Result<Json<FlakinessReport>, ApiError>
where
  S: TrackerStore,
{
  let statuses: Vec<RunOutcome> = store
    .list_results(test_id, FLAKY_WINDOW)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|r| r.status)
    .collect();
  Ok(Json(flaky::classify(&statuses)))
}
