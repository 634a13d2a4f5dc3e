//! Derived metrics for a requirement.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/requirements/:id/risk-assessment` | Tier from test pass/fail counts |
//! | `GET`  | `/requirements/:id/release-checklist` | Failed tests, recent changes, maturity |
//! | `GET`  | `/requirements/:id/affected-tests` | Tests touched by recent changes |
//! | `GET`  | `/requirements/:id/assessments` | Stored assessments, newest first |
//! | `POST` | `/requirements/:id/assessments` | Score now and store; returns 201 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use reqtrack_core::{
  assessment::{NewAssessment, ReleaseAssessment},
  change::recent_window_start,
  release::{self, ReleaseChecklist},
  risk::{self, RiskReport},
  store::TrackerStore,
  test_case::TestCase,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, requirements::find_requirement};

async fn risk_report<S>(store: &S, requirement_id: Uuid) -> Result<RiskReport, ApiError>
where
  S: TrackerStore,
{
  let total = store.count_tests(requirement_id).await.map_err(ApiError::store)?;
  let failed = store
    .count_failed_tests(requirement_id)
    .await
    .map_err(ApiError::store)?;
  Ok(risk::assess(total, failed))
}

/// `GET /requirements/:id/risk-assessment`
pub async fn risk<S>(
  State(store): State<Arc<S>>,
  Path(requirement_id): Path<Uuid>,
) -> Result<Json<RiskReport>, ApiError>
where
  S: TrackerStore,
{
  find_requirement(store.as_ref(), requirement_id).await?;
  Ok(Json(risk_report(store.as_ref(), requirement_id).await?))
}

/// `GET /requirements/:id/release-checklist`
pub async fn release_checklist<S>(
  State(store): State<Arc<S>>,
  Path(requirement_id): Path<Uuid>,
) -> Result<Json<ReleaseChecklist>, ApiError>
where
  S: TrackerStore,
{
  let requirement = find_requirement(store.as_ref(), requirement_id).await?;
  let failed = store
    .count_failed_tests(requirement_id)
    .await
    .map_err(ApiError::store)?;
  let recent = store
    .count_changes_since(requirement_id, recent_window_start(Utc::now()))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(release::evaluate(failed, recent, &requirement.status)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AffectedTests {
  pub affected_tests: Vec<TestCase>,
}

/// `GET /requirements/:id/affected-tests`
pub async fn affected_tests<S>(
  State(store): State<Arc<S>>,
  Path(requirement_id): Path<Uuid>,
) -> Result<Json<AffectedTests>, ApiError>
where
  S: TrackerStore,
{
  let affected_tests = store
    .affected_tests(requirement_id, recent_window_start(Utc::now()))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(AffectedTests { affected_tests }))
}

/// `GET /requirements/:id/assessments`
pub async fn list_assessments<S>(
  State(store): State<Arc<S>>,
  Path(requirement_id): Path<Uuid>,
) -> Result<Json<Vec<ReleaseAssessment>>, ApiError>
where
  S: TrackerStore,
{
  let assessments = store
    .list_assessments(requirement_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(assessments))
}

/// Optional JSON body for `POST /requirements/:id/assessments`.
#[derive(Debug, Default, Deserialize)]
pub struct AssessmentBody {
  pub business_impact: Option<String>,
}

/// `POST /requirements/:id/assessments`: returns 201 with the stored assessment.
pub async fn create_assessment<S>(
  State(store): State<Arc<S>>,
  Path(requirement_id): Path<Uuid>,
  body: Option<Json<AssessmentBody>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TrackerStore,
{
  find_requirement(store.as_ref(), requirement_id).await?;
  let report = risk_report(store.as_ref(), requirement_id).await?;
  let Json(body) = body.unwrap_or_default();

  let assessment = store
    .record_assessment(NewAssessment {
      requirement_id,
      report,
      business_impact: body.business_impact,
    })
    .await
    .map_err(ApiError::store)?;
  tracing::info!(%requirement_id, risk_level = %assessment.risk_level, "assessment recorded");
  Ok((StatusCode::CREATED, Json(assessment)))
}
