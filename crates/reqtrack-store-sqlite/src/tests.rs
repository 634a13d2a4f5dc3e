//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use reqtrack_core::{
  assessment::NewAssessment,
  change::NewCodeChange,
  requirement::{NewRequirement, RequirementUpdate},
  risk,
  run::{NewTestResult, RunOutcome},
  scenario::{self, ScenarioSource},
  snapshot::NewApiSnapshot,
  store::TrackerStore,
  test_case::NewTestCase,
};
use serde_json::json;
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn login_requirement() -> NewRequirement {
  NewRequirement {
    title:               "Login".into(),
    description:         Some("Users authenticate with email".into()),
    user_story:          Some("as a user I can log in".into()),
    acceptance_criteria: Some("valid password accepted\ninvalid password rejected".into()),
    status:              None,
  }
}

fn change(requirement_id: Uuid, file_path: &str) -> NewCodeChange {
  NewCodeChange {
    requirement_id,
    file_path: file_path.into(),
    change_type: "modified".into(),
    description: None,
    commit_hash: Some("abc123".into()),
  }
}

// ─── Requirements ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_requirement() {
  let s = store().await;

  let created = s.create_requirement(login_requirement()).await.unwrap();
  assert_eq!(created.status, "draft");
  assert_eq!(created.created_at, created.updated_at);

  let fetched = s.get_requirement(created.requirement_id).await.unwrap();
  assert_eq!(fetched, Some(created));
}

#[tokio::test]
async fn create_rejects_blank_title() {
  let s = store().await;
  let err = s.create_requirement(NewRequirement::new(" ")).await.unwrap_err();
  assert!(matches!(err, crate::Error::Core(reqtrack_core::Error::BlankTitle)));
  assert!(s.list_requirements().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_requirement_missing_returns_none() {
  let s = store().await;
  assert!(s.get_requirement(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_requirements_newest_first() {
  let s = store().await;
  let first = s.create_requirement(NewRequirement::new("first")).await.unwrap();
  let second = s.create_requirement(NewRequirement::new("second")).await.unwrap();

  let all = s.list_requirements().await.unwrap();
  let ids: Vec<_> = all.iter().map(|r| r.requirement_id).collect();
  assert_eq!(ids, [second.requirement_id, first.requirement_id]);
}

#[tokio::test]
async fn update_requirement_overwrites_fields() {
  let s = store().await;
  let created = s.create_requirement(login_requirement()).await.unwrap();

  let updated = s
    .update_requirement(created.requirement_id, RequirementUpdate {
      title:               "Login v2".into(),
      description:         None,
      user_story:          Some("as a user I can log in with SSO".into()),
      acceptance_criteria: None,
      status:              Some("approved".into()),
    })
    .await
    .unwrap()
    .unwrap();

  assert_eq!(updated.title, "Login v2");
  assert_eq!(updated.description, None);
  assert_eq!(updated.status, "approved");
  assert_eq!(updated.created_at, created.created_at);
  assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn update_without_status_keeps_it() {
  let s = store().await;
  let mut input = login_requirement();
  input.status = Some("new".into());
  let created = s.create_requirement(input).await.unwrap();

  let updated = s
    .update_requirement(created.requirement_id, RequirementUpdate {
      title: "Login".into(),
      ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.status, "new");
}

#[tokio::test]
async fn update_missing_requirement_returns_none() {
  let s = store().await;
  let result = s
    .update_requirement(Uuid::new_v4(), RequirementUpdate {
      title: "x".into(),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(result.is_none());
}

// ─── Cascading delete ────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_requirement_removes_all_children() {
  let s = store().await;
  let req = s.create_requirement(login_requirement()).await.unwrap();
  let other = s.create_requirement(NewRequirement::new("Other")).await.unwrap();
  let id = req.requirement_id;

  let test = s
    .create_test(NewTestCase::manual(Some(id), "manual", "functional"))
    .await
    .unwrap();
  s.record_result(NewTestResult::new(test.test_id, "failed")).await.unwrap();
  s.record_code_change(change(id, "src/login.rs")).await.unwrap();
  s.record_assessment(NewAssessment {
    requirement_id:  id,
    report:          risk::assess(1, 1),
    business_impact: None,
  })
  .await
  .unwrap();

  let kept = s
    .create_test(NewTestCase::manual(Some(other.requirement_id), "kept", "functional"))
    .await
    .unwrap();
  s.record_result(NewTestResult::new(kept.test_id, "passed")).await.unwrap();

  assert!(s.delete_requirement(id).await.unwrap());

  assert!(s.get_requirement(id).await.unwrap().is_none());
  assert!(s.get_test(test.test_id).await.unwrap().is_none());
  assert!(s.list_results(test.test_id, 10).await.unwrap().is_empty());
  assert!(s.list_code_changes(id).await.unwrap().is_empty());
  assert!(s.list_assessments(id).await.unwrap().is_empty());

  // Unrelated rows survive.
  assert_eq!(s.list_tests(other.requirement_id).await.unwrap().len(), 1);
  assert_eq!(s.list_results(kept.test_id, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn delete_missing_requirement_returns_false() {
  let s = store().await;
  assert!(!s.delete_requirement(Uuid::new_v4()).await.unwrap());
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_test_defaults_to_pending() {
  let s = store().await;
  let req = s.create_requirement(login_requirement()).await.unwrap();

  let test = s
    .create_test(NewTestCase::manual(Some(req.requirement_id), "smoke", "functional"))
    .await
    .unwrap();
  assert_eq!(test.status, "pending");
  assert!(!test.ai_generated);
  assert_eq!(s.get_test(test.test_id).await.unwrap(), Some(test));
}

#[tokio::test]
async fn unattached_test_round_trips_null_requirement() {
  let s = store().await;
  let test = s
    .create_test(NewTestCase::manual(None, "orphan", "exploratory"))
    .await
    .unwrap();
  let fetched = s.get_test(test.test_id).await.unwrap().unwrap();
  assert_eq!(fetched.requirement_id, None);
  assert_eq!(fetched.test_type, "exploratory");
}

#[tokio::test]
async fn delete_test_removes_its_results() {
  let s = store().await;
  let req = s.create_requirement(login_requirement()).await.unwrap();
  let test = s
    .create_test(NewTestCase::manual(Some(req.requirement_id), "t", "functional"))
    .await
    .unwrap();
  s.record_result(NewTestResult::new(test.test_id, "passed")).await.unwrap();

  assert!(s.delete_test(test.test_id).await.unwrap());
  assert!(s.get_test(test.test_id).await.unwrap().is_none());
  assert!(s.list_results(test.test_id, 10).await.unwrap().is_empty());
  assert!(!s.delete_test(test.test_id).await.unwrap());
}

#[tokio::test]
async fn replace_generated_tests_keeps_manual_ones() {
  let s = store().await;
  let req = s.create_requirement(login_requirement()).await.unwrap();
  let id = req.requirement_id;

  let manual = s
    .create_test(NewTestCase::manual(Some(id), "manual", "functional"))
    .await
    .unwrap();

  let drafts = || {
    scenario::synthesize(ScenarioSource::from(&req))
      .into_iter()
      .map(|d| d.into_new_test(id))
      .collect::<Vec<_>>()
  };

  let first = s.replace_generated_tests(id, drafts()).await.unwrap();
  assert_eq!(first.len(), 4);
  s.record_result(NewTestResult::new(first[0].test_id, "failed")).await.unwrap();

  let second = s.replace_generated_tests(id, drafts()).await.unwrap();
  assert_eq!(second.len(), 4);

  let tests = s.list_tests(id).await.unwrap();
  assert_eq!(tests.len(), 5);
  assert!(tests.iter().any(|t| t.test_id == manual.test_id));
  assert_eq!(tests.iter().filter(|t| t.ai_generated).count(), 4);

  // Results of replaced tests are gone with them.
  assert!(s.list_results(first[0].test_id, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn count_failed_tests_counts_distinct_tests() {
  let s = store().await;
  let req = s.create_requirement(login_requirement()).await.unwrap();
  let id = req.requirement_id;

  let a = s.create_test(NewTestCase::manual(Some(id), "a", "functional")).await.unwrap();
  let b = s.create_test(NewTestCase::manual(Some(id), "b", "functional")).await.unwrap();
  s.create_test(NewTestCase::manual(Some(id), "c", "functional")).await.unwrap();

  s.record_result(NewTestResult::new(a.test_id, "failed")).await.unwrap();
  s.record_result(NewTestResult::new(a.test_id, "failed")).await.unwrap();
  s.record_result(NewTestResult::new(b.test_id, "passed")).await.unwrap();

  assert_eq!(s.count_tests(id).await.unwrap(), 3);
  assert_eq!(s.count_failed_tests(id).await.unwrap(), 1);
}

// ─── Results ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_results_newest_first_with_limit() {
  let s = store().await;
  let test = s
    .create_test(NewTestCase::manual(None, "t", "functional"))
    .await
    .unwrap();

  for status in ["passed", "failed", "passed", "failed", "passed", "failed"] {
    s.record_result(NewTestResult::new(test.test_id, status)).await.unwrap();
  }

  let recent = s.list_results(test.test_id, 5).await.unwrap();
  assert_eq!(recent.len(), 5);
  assert_eq!(recent[0].status, RunOutcome::Failed);
  assert_eq!(recent[1].status, RunOutcome::Passed);
}

#[tokio::test]
async fn result_fields_round_trip() {
  let s = store().await;
  let test = s
    .create_test(NewTestCase::manual(None, "t", "functional"))
    .await
    .unwrap();

  let mut input = NewTestResult::new(test.test_id, "timeout");
  input.log_output = Some("step 3 hung".into());
  input.error_message = Some("deadline exceeded".into());
  input.execution_time = Some(30_000);
  let recorded = s.record_result(input).await.unwrap();

  let fetched = s.list_results(test.test_id, 10).await.unwrap();
  assert_eq!(fetched, vec![recorded]);
  assert_eq!(fetched[0].status, RunOutcome::Other("timeout".into()));
}

// ─── Code changes ────────────────────────────────────────────────────────────

#[tokio::test]
async fn recent_change_window() {
  let s = store().await;
  let req = s.create_requirement(login_requirement()).await.unwrap();
  let id = req.requirement_id;
  s.create_test(NewTestCase::manual(Some(id), "t", "functional")).await.unwrap();

  let week_ago = Utc::now() - Duration::days(7);
  assert_eq!(s.count_changes_since(id, week_ago).await.unwrap(), 0);
  assert!(s.affected_tests(id, week_ago).await.unwrap().is_empty());

  s.record_code_change(change(id, "src/login.rs")).await.unwrap();
  assert_eq!(s.count_changes_since(id, week_ago).await.unwrap(), 1);
  assert_eq!(s.affected_tests(id, week_ago).await.unwrap().len(), 1);

  // A window starting in the future excludes the change.
  let later = Utc::now() + Duration::hours(1);
  assert_eq!(s.count_changes_since(id, later).await.unwrap(), 0);
  assert!(s.affected_tests(id, later).await.unwrap().is_empty());
}

// ─── Assessments ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn assessment_round_trip() {
  let s = store().await;
  let req = s.create_requirement(login_requirement()).await.unwrap();

  let recorded = s
    .record_assessment(NewAssessment {
      requirement_id:  req.requirement_id,
      report:          risk::assess(10, 2),
      business_impact: Some("checkout blocked".into()),
    })
    .await
    .unwrap();
  assert_eq!(recorded.risk_level, risk::RiskLevel::Medium);

  let listed = s.list_assessments(req.requirement_id).await.unwrap();
  assert_eq!(listed, vec![recorded]);
}

// ─── Snapshots ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn latest_snapshots_per_endpoint() {
  let s = store().await;
  for shape in [json!({"a": 1}), json!({"a": 1, "b": 2}), json!({"b": 2, "a": 1})] {
    s.record_snapshot(NewApiSnapshot::new("/users", shape).unwrap())
      .await
      .unwrap();
  }
  s.record_snapshot(NewApiSnapshot::new("/orders", json!({})).unwrap())
    .await
    .unwrap();

  let latest = s.latest_snapshots("/users", 2).await.unwrap();
  assert_eq!(latest.len(), 2);
  assert!(latest.iter().all(|snap| snap.endpoint == "/users"));

  // Key order survives storage.
  let keys: Vec<_> = latest[0]
    .response_structure
    .as_object()
    .unwrap()
    .keys()
    .cloned()
    .collect();
  assert_eq!(keys, ["b", "a"]);

  assert!(s.latest_snapshots("/missing", 2).await.unwrap().is_empty());
}
