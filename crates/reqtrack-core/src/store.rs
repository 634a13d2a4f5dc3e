//! The `TrackerStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `reqtrack-store-sqlite`).
//! Higher layers (`reqtrack-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  assessment::{NewAssessment, ReleaseAssessment},
  change::{CodeChange, NewCodeChange},
  requirement::{NewRequirement, Requirement, RequirementUpdate},
  run::{NewTestResult, TestResult},
  snapshot::{ApiSnapshot, NewApiSnapshot},
  test_case::{NewTestCase, TestCase},
};

/// Abstraction over a reqtrack persistence backend.
///
/// Results, code changes, assessments and snapshots are append-only.
/// Requirements and tests are mutable and deletable; deleting a parent
/// removes its children first.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait TrackerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Requirements ──────────────────────────────────────────────────────

  /// Persist a new requirement. The caller validates the input first.
  fn create_requirement(
    &self,
    input: NewRequirement,
  ) -> impl Future<Output = Result<Requirement, Self::Error>> + Send + '_;

  fn get_requirement(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Requirement>, Self::Error>> + Send + '_;

  /// All requirements, newest first.
  fn list_requirements(
    &self,
  ) -> impl Future<Output = Result<Vec<Requirement>, Self::Error>> + Send + '_;

  /// Overwrite the editable fields and refresh `updated_at`.
  /// Returns `None` if the requirement does not exist.
  fn update_requirement(
    &self,
    id: Uuid,
    update: RequirementUpdate,
  ) -> impl Future<Output = Result<Option<Requirement>, Self::Error>> + Send + '_;

  /// Delete a requirement and everything it owns, in the order
  /// results, tests, code changes, assessments, requirement.
  /// Returns `false` if the requirement did not exist.
  fn delete_requirement(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Tests ─────────────────────────────────────────────────────────────

  fn create_test(
    &self,
    input: NewTestCase,
  ) -> impl Future<Output = Result<TestCase, Self::Error>> + Send + '_;

  fn get_test(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<TestCase>, Self::Error>> + Send + '_;

  /// Tests of a requirement, newest first.
  fn list_tests(
    &self,
    requirement_id: Uuid,
  ) -> impl Future<Output = Result<Vec<TestCase>, Self::Error>> + Send + '_;

  /// Delete a test and its results. Returns `false` if it did not exist.
  fn delete_test(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Drop the requirement's generated tests (and their results) and insert
  /// `tests` in their place. Manually created tests are untouched.
  fn replace_generated_tests(
    &self,
    requirement_id: Uuid,
    tests: Vec<NewTestCase>,
  ) -> impl Future<Output = Result<Vec<TestCase>, Self::Error>> + Send + '_;

  fn count_tests(
    &self,
    requirement_id: Uuid,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  /// Number of the requirement's tests with at least one failed result.
  fn count_failed_tests(
    &self,
    requirement_id: Uuid,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  /// The requirement's tests if it has a code change recorded after `since`;
  /// otherwise empty.
  fn affected_tests(
    &self,
    requirement_id: Uuid,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<TestCase>, Self::Error>> + Send + '_;

  // ── Results ───────────────────────────────────────────────────────────

  fn record_result(
    &self,
    input: NewTestResult,
  ) -> impl Future<Output = Result<TestResult, Self::Error>> + Send + '_;

  /// The `limit` newest results of a test, newest first.
  fn list_results(
    &self,
    test_id: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<TestResult>, Self::Error>> + Send + '_;

  // ── Code changes ──────────────────────────────────────────────────────

  fn record_code_change(
    &self,
    input: NewCodeChange,
  ) -> impl Future<Output = Result<CodeChange, Self::Error>> + Send + '_;

  /// Code changes of a requirement, newest first.
  fn list_code_changes(
    &self,
    requirement_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CodeChange>, Self::Error>> + Send + '_;

  fn count_changes_since(
    &self,
    requirement_id: Uuid,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  // ── Assessments ───────────────────────────────────────────────────────

  fn record_assessment(
    &self,
    input: NewAssessment,
  ) -> impl Future<Output = Result<ReleaseAssessment, Self::Error>> + Send + '_;

  /// Assessments of a requirement, newest first.
  fn list_assessments(
    &self,
    requirement_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ReleaseAssessment>, Self::Error>> + Send + '_;

  // ── Snapshots ─────────────────────────────────────────────────────────

  fn record_snapshot(
    &self,
    input: NewApiSnapshot,
  ) -> impl Future<Output = Result<ApiSnapshot, Self::Error>> + Send + '_;

  /// The `limit` newest snapshots of `endpoint`, newest first.
  fn latest_snapshots<'a>(
    &'a self,
    endpoint: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ApiSnapshot>, Self::Error>> + Send + 'a;
}
