//! Async HTTP client wrapping the reqtrack JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqtrack_core::{
  flaky::FlakinessReport,
  release::ReleaseChecklist,
  requirement::{NewRequirement, Requirement},
  risk::RiskReport,
  run::{RunOutcome, TestResult},
  test_case::TestCase,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// `{"message": ..}` acknowledgement, with the count for generation.
#[derive(Debug, Deserialize)]
pub struct Ack {
  pub message: String,
  #[serde(default)]
  pub count:   Option<usize>,
}

/// Body of `POST /tests/:id/results`.
#[derive(Debug, Serialize)]
pub struct ResultInput {
  pub status:         RunOutcome,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error_message:  Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub execution_time: Option<i64>,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// Async HTTP client for the reqtrack JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  /// Send `req` and decode a successful body, surfacing the server's
  /// `{"error": ..}` message otherwise.
  async fn send<T>(&self, what: &str, req: RequestBuilder) -> Result<T>
  where
    T: DeserializeOwned,
  {
    tracing::debug!(request = what, "sending");
    let resp: Response = req.send().await.with_context(|| format!("{what} failed"))?;
    let status = resp.status();
    if !status.is_success() {
      let detail = resp
        .json::<ErrorBody>()
        .await
        .map(|b| b.error)
        .unwrap_or_default();
      return Err(anyhow!("{what} → {status} {detail}"));
    }
    resp.json().await.with_context(|| format!("deserialising {what}"))
  }

  // ── Requirements ──────────────────────────────────────────────────────────

  /// `GET /api/requirements`
  pub async fn list_requirements(&self) -> Result<Vec<Requirement>> {
    self
      .send("GET /requirements", self.client.get(self.url("/requirements")))
      .await
  }

  /// `GET /api/requirements/:id`
  pub async fn get_requirement(&self, id: Uuid) -> Result<Requirement> {
    self
      .send(
        "GET /requirements/:id",
        self.client.get(self.url(&format!("/requirements/{id}"))),
      )
      .await
  }

  /// `POST /api/requirements`
  pub async fn create_requirement(&self, input: &NewRequirement) -> Result<Requirement> {
    self
      .send(
        "POST /requirements",
        self.client.post(self.url("/requirements")).json(input),
      )
      .await
  }

  /// `DELETE /api/requirements/:id`
  pub async fn delete_requirement(&self, id: Uuid) -> Result<Ack> {
    self
      .send(
        "DELETE /requirements/:id",
        self.client.delete(self.url(&format!("/requirements/{id}"))),
      )
      .await
  }

  // ── Tests ─────────────────────────────────────────────────────────────────

  /// `POST /api/requirements/:id/generate-tests`
  pub async fn generate_tests(&self, id: Uuid) -> Result<Ack> {
    self
      .send(
        "POST /requirements/:id/generate-tests",
        self.client.post(self.url(&format!("/requirements/{id}/generate-tests"))),
      )
      .await
  }

  /// `GET /api/requirements/:id/tests`
  pub async fn list_tests(&self, id: Uuid) -> Result<Vec<TestCase>> {
    self
      .send(
        "GET /requirements/:id/tests",
        self.client.get(self.url(&format!("/requirements/{id}/tests"))),
      )
      .await
  }

  /// `POST /api/tests/:id/results`
  pub async fn record_result(&self, test_id: Uuid, input: &ResultInput) -> Result<TestResult> {
    self
      .send(
        "POST /tests/:id/results",
        self.client.post(self.url(&format!("/tests/{test_id}/results"))).json(input),
      )
      .await
  }

  /// `GET /api/tests/:id/flaky-status`
  pub async fn flaky_status(&self, test_id: Uuid) -> Result<FlakinessReport> {
    self
      .send(
        "GET /tests/:id/flaky-status",
        self.client.get(self.url(&format!("/tests/{test_id}/flaky-status"))),
      )
      .await
  }

  // ── Analysis ──────────────────────────────────────────────────────────────

  /// `GET /api/requirements/:id/risk-assessment`
  pub async fn risk(&self, id: Uuid) -> Result<RiskReport> {
    self
      .send(
        "GET /requirements/:id/risk-assessment",
        self.client.get(self.url(&format!("/requirements/{id}/risk-assessment"))),
      )
      .await
  }

  /// `GET /api/requirements/:id/release-checklist`
  pub async fn release_checklist(&self, id: Uuid) -> Result<ReleaseChecklist> {
    self
      .send(
        "GET /requirements/:id/release-checklist",
        self.client.get(self.url(&format!("/requirements/{id}/release-checklist"))),
      )
      .await
  }
}
