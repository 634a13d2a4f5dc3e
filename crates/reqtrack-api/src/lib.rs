//! JSON REST API for reqtrack.
//!
//! Exposes an axum [`Router`] backed by any
//! [`reqtrack_core::store::TrackerStore`]. Transport concerns (binding,
//! request tracing) are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", reqtrack_api::api_router(store.clone()))
//! ```

pub mod analysis;
pub mod changes;
pub mod error;
pub mod requirements;
pub mod results;
pub mod snapshots;
pub mod test_cases;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use reqtrack_core::store::TrackerStore;
use serde::{Deserialize, Serialize};

pub use error::ApiError;

/// A bare `{"message": ...}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
  pub message: String,
}

impl Message {
  pub fn new(message: impl Into<String>) -> Self { Self { message: message.into() } }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: TrackerStore + Send + Sync + 'static,
{
  Router::new()
    // Requirements
    .route(
      "/requirements",
      get(requirements::list::<S>).post(requirements::create::<S>),
    )
    .route(
      "/requirements/{id}",
      get(requirements::get_one::<S>)
        .put(requirements::update::<S>)
        .delete(requirements::delete_one::<S>),
    )
    // Tests
    .route(
      "/requirements/{id}/tests",
      get(test_cases::list_for_requirement::<S>).post(test_cases::create::<S>),
    )
    .route("/requirements/{id}/generate-tests", post(test_cases::generate::<S>))
    .route(
      "/tests/{id}",
      get(test_cases::get_one::<S>).delete(test_cases::delete_one::<S>),
    )
    .route("/tests/{id}/results", get(results::list::<S>).post(results::record::<S>))
    .route("/tests/{id}/flaky-status", get(results::flaky_status::<S>))
    // Analysis
    .route("/requirements/{id}/risk-assessment", get(analysis::risk::<S>))
    .route(
      "/requirements/{id}/release-checklist",
      get(analysis::release_checklist::<S>),
    )
    .route("/requirements/{id}/affected-tests", get(analysis::affected_tests::<S>))
    .route(
      "/requirements/{id}/assessments",
      get(analysis::list_assessments::<S>).post(analysis::create_assessment::<S>),
    )
    // Code changes
    .route("/code-changes", post(changes::record::<S>))
    .route("/requirements/{id}/code-changes", get(changes::list::<S>))
    // Snapshots
    .route("/api-snapshots", post(snapshots::record::<S>))
    .route("/api-snapshots/{endpoint}/compare", get(snapshots::compare::<S>))
    .with_state(store)
}
