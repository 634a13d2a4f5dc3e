//! [`SqliteStore`], the SQLite implementation of [`TrackerStore`].

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use reqtrack_core::{
  assessment::{NewAssessment, ReleaseAssessment},
  change::{CodeChange, NewCodeChange},
  requirement::{NewRequirement, Requirement, RequirementUpdate},
  run::{NewTestResult, TestResult},
  snapshot::{ApiSnapshot, NewApiSnapshot},
  store::TrackerStore,
  test_case::{DEFAULT_TEST_STATUS, NewTestCase, TestCase},
};
use rusqlite::{OptionalExtension as _, Row, types::Value};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    ASSESSMENT_COLUMNS, CHANGE_COLUMNS, REQUIREMENT_COLUMNS, RESULT_COLUMNS,
    RawAssessment, RawCodeChange, RawRequirement, RawSnapshot, RawTestCase,
    RawTestResult, SNAPSHOT_COLUMNS, TEST_COLUMNS, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

/// Children of a requirement, deleted in this order before the row itself.
const REQUIREMENT_CASCADE: [&str; 5] = [
  "DELETE FROM test_results
   WHERE test_id IN (SELECT test_id FROM tests WHERE requirement_id = ?1)",
  "DELETE FROM tests WHERE requirement_id = ?1",
  "DELETE FROM code_changes WHERE requirement_id = ?1",
  "DELETE FROM release_assessments WHERE requirement_id = ?1",
  "DELETE FROM requirements WHERE requirement_id = ?1",
];

// ─── Store ───────────────────────────────────────────────────────────────────

/// A reqtrack store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("sqlite schema initialised");
    Ok(())
  }

  /// Run `sql` and read every row with `read`.
  async fn select<R, F>(&self, sql: String, params: Vec<Value>, read: F) -> Result<Vec<R>>
  where
    R: Send + 'static,
    F: Fn(&Row<'_>) -> rusqlite::Result<R> + Send + 'static,
  {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  /// Run `sql` and read at most one row with `read`.
  async fn select_one<R, F>(
    &self,
    sql: String,
    params: Vec<Value>,
    read: F,
  ) -> Result<Option<R>>
  where
    R: Send + 'static,
    F: FnOnce(&Row<'_>) -> rusqlite::Result<R> + Send + 'static,
  {
    let row = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params_from_iter(params), read).optional()?)
      })
      .await?;
    Ok(row)
  }

  /// Run a `SELECT COUNT(...)` query.
  async fn count(&self, sql: &'static str, params: Vec<Value>) -> Result<u32> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(sql, rusqlite::params_from_iter(params), |r| r.get::<_, u32>(0))?)
      })
      .await?;
    Ok(n)
  }

  /// Execute a sequence of statements sharing `params` in one transaction.
  /// Returns the number of rows changed by the last statement.
  async fn execute_in_order(
    &self,
    statements: &'static [&'static str],
    params: Vec<Value>,
  ) -> Result<usize> {
    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut last = 0;
        for sql in statements {
          last = tx.execute(sql, rusqlite::params_from_iter(params.iter()))?;
        }
        tx.commit()?;
        Ok(last)
      })
      .await?;
    Ok(changed)
  }
}

/// Current time at the precision timestamps are stored with.
fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

fn id_param(id: Uuid) -> Value { Value::from(encode_uuid(id)) }

fn dt_param(dt: DateTime<Utc>) -> Value { Value::from(encode_dt(dt)) }

/// Insert row values for a test case, in [`TEST_COLUMNS`] order.
fn test_row(t: &TestCase) -> Vec<Value> {
  vec![
    id_param(t.test_id),
    t.requirement_id.map(id_param).unwrap_or(Value::Null),
    Value::from(t.title.clone()),
    t.description.clone().map(Value::from).unwrap_or(Value::Null),
    Value::from(t.test_type.clone()),
    Value::from(t.status.clone()),
    Value::from(t.ai_generated),
    dt_param(t.created_at),
  ]
}

fn build_test(input: NewTestCase, created_at: DateTime<Utc>) -> TestCase {
  TestCase {
    test_id: Uuid::new_v4(),
    requirement_id: input.requirement_id,
    title: input.title,
    description: input.description,
    test_type: input.test_type,
    status: DEFAULT_TEST_STATUS.to_owned(),
    ai_generated: input.ai_generated,
    created_at,
  }
}

// ─── TrackerStore impl ───────────────────────────────────────────────────────

impl TrackerStore for SqliteStore {
  type Error = crate::Error;

  // ── Requirements ──────────────────────────────────────────────────────────

  async fn create_requirement(&self, input: NewRequirement) -> Result<Requirement> {
    input.validate()?;
    let stamp = now();
    let requirement = Requirement {
      requirement_id:      Uuid::new_v4(),
      status:              input.status_or_default(),
      title:               input.title,
      description:         input.description,
      user_story:          input.user_story,
      acceptance_criteria: input.acceptance_criteria,
      created_at:          stamp,
      updated_at:          stamp,
    };

    let id_str      = encode_uuid(requirement.requirement_id);
    let title       = requirement.title.clone();
    let description = requirement.description.clone();
    let user_story  = requirement.user_story.clone();
    let criteria    = requirement.acceptance_criteria.clone();
    let status      = requirement.status.clone();
    let at_str      = encode_dt(stamp);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO requirements (
             requirement_id, title, description, user_story,
             acceptance_criteria, status, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
          rusqlite::params![
            id_str,
            title,
            description,
            user_story,
            criteria,
            status,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(requirement)
  }

  async fn get_requirement(&self, id: Uuid) -> Result<Option<Requirement>> {
    let raw = self
      .select_one(
        format!("SELECT {REQUIREMENT_COLUMNS} FROM requirements WHERE requirement_id = ?1"),
        vec![id_param(id)],
        RawRequirement::from_row,
      )
      .await?;
    raw.map(RawRequirement::into_requirement).transpose()
  }

  async fn list_requirements(&self) -> Result<Vec<Requirement>> {
    let raws = self
      .select(
        format!(
          "SELECT {REQUIREMENT_COLUMNS} FROM requirements
           ORDER BY created_at DESC, rowid DESC"
        ),
        vec![],
        RawRequirement::from_row,
      )
      .await?;
    raws.into_iter().map(RawRequirement::into_requirement).collect()
  }

  async fn update_requirement(
    &self,
    id: Uuid,
    update: RequirementUpdate,
  ) -> Result<Option<Requirement>> {
    update.validate()?;
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());

    let raw: Option<RawRequirement> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE requirements
           SET title = ?2, description = ?3, user_story = ?4,
               acceptance_criteria = ?5, status = COALESCE(?6, status),
               updated_at = ?7
           WHERE requirement_id = ?1",
          rusqlite::params![
            id_str,
            update.title,
            update.description,
            update.user_story,
            update.acceptance_criteria,
            update.status,
            at_str,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {REQUIREMENT_COLUMNS} FROM requirements WHERE requirement_id = ?1"
              ),
              rusqlite::params![id_str],
              RawRequirement::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRequirement::into_requirement).transpose()
  }

  async fn delete_requirement(&self, id: Uuid) -> Result<bool> {
    let removed = self
      .execute_in_order(&REQUIREMENT_CASCADE, vec![id_param(id)])
      .await?;
    Ok(removed > 0)
  }

  // ── Tests ─────────────────────────────────────────────────────────────────

  async fn create_test(&self, input: NewTestCase) -> Result<TestCase> {
    let test = build_test(input, now());
    let row = test_row(&test);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO tests ({TEST_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
          rusqlite::params_from_iter(row),
        )?;
        Ok(())
      })
      .await?;

    Ok(test)
  }

  async fn get_test(&self, id: Uuid) -> Result<Option<TestCase>> {
    let raw = self
      .select_one(
        format!("SELECT {TEST_COLUMNS} FROM tests WHERE test_id = ?1"),
        vec![id_param(id)],
        RawTestCase::from_row,
      )
      .await?;
    raw.map(RawTestCase::into_test_case).transpose()
  }

  async fn list_tests(&self, requirement_id: Uuid) -> Result<Vec<TestCase>> {
    let raws = self
      .select(
        format!(
          "SELECT {TEST_COLUMNS} FROM tests WHERE requirement_id = ?1
           ORDER BY created_at DESC, rowid DESC"
        ),
        vec![id_param(requirement_id)],
        RawTestCase::from_row,
      )
      .await?;
    raws.into_iter().map(RawTestCase::into_test_case).collect()
  }

  async fn delete_test(&self, id: Uuid) -> Result<bool> {
    const STATEMENTS: [&str; 2] = [
      "DELETE FROM test_results WHERE test_id = ?1",
      "DELETE FROM tests WHERE test_id = ?1",
    ];
    let removed = self.execute_in_order(&STATEMENTS, vec![id_param(id)]).await?;
    Ok(removed > 0)
  }

  async fn replace_generated_tests(
    &self,
    requirement_id: Uuid,
    tests: Vec<NewTestCase>,
  ) -> Result<Vec<TestCase>> {
    let stamp = now();
    let built: Vec<TestCase> =
      tests.into_iter().map(|input| build_test(input, stamp)).collect();
    let rows: Vec<Vec<Value>> = built.iter().map(test_row).collect();
    let id_str = encode_uuid(requirement_id);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM test_results WHERE test_id IN (
             SELECT test_id FROM tests WHERE requirement_id = ?1 AND ai_generated = 1
           )",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "DELETE FROM tests WHERE requirement_id = ?1 AND ai_generated = 1",
          rusqlite::params![id_str],
        )?;
        {
          let mut stmt = tx.prepare(&format!(
            "INSERT INTO tests ({TEST_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
          ))?;
          for row in rows {
            stmt.execute(rusqlite::params_from_iter(row))?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(built)
  }

  async fn count_tests(&self, requirement_id: Uuid) -> Result<u32> {
    self
      .count(
        "SELECT COUNT(*) FROM tests WHERE requirement_id = ?1",
        vec![id_param(requirement_id)],
      )
      .await
  }

  async fn count_failed_tests(&self, requirement_id: Uuid) -> Result<u32> {
    self
      .count(
        "SELECT COUNT(DISTINCT t.test_id)
         FROM tests t
         JOIN test_results r ON r.test_id = t.test_id
         WHERE t.requirement_id = ?1 AND r.status = 'failed'",
        vec![id_param(requirement_id)],
      )
      .await
  }

  async fn affected_tests(
    &self,
    requirement_id: Uuid,
    since: DateTime<Utc>,
  ) -> Result<Vec<TestCase>> {
    let raws = self
      .select(
        format!(
          "SELECT {TEST_COLUMNS} FROM tests
           WHERE requirement_id = ?1
             AND EXISTS (
               SELECT 1 FROM code_changes
               WHERE requirement_id = ?1 AND created_at > ?2
             )
           ORDER BY created_at DESC, rowid DESC"
        ),
        vec![id_param(requirement_id), dt_param(since)],
        RawTestCase::from_row,
      )
      .await?;
    raws.into_iter().map(RawTestCase::into_test_case).collect()
  }

  // ── Results ───────────────────────────────────────────────────────────────

  async fn record_result(&self, input: NewTestResult) -> Result<TestResult> {
    let result = TestResult {
      result_id:      Uuid::new_v4(),
      test_id:        input.test_id,
      status:         input.status,
      log_output:     input.log_output,
      error_message:  input.error_message,
      execution_time: input.execution_time,
      created_at:     now(),
    };

    let row = vec![
      id_param(result.result_id),
      id_param(result.test_id),
      Value::from(result.status.as_str().to_owned()),
      result.log_output.clone().map(Value::from).unwrap_or(Value::Null),
      result.error_message.clone().map(Value::from).unwrap_or(Value::Null),
      result.execution_time.map(Value::from).unwrap_or(Value::Null),
      dt_param(result.created_at),
    ];

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO test_results ({RESULT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
          rusqlite::params_from_iter(row),
        )?;
        Ok(())
      })
      .await?;

    Ok(result)
  }

  async fn list_results(&self, test_id: Uuid, limit: usize) -> Result<Vec<TestResult>> {
    let raws = self
      .select(
        format!(
          "SELECT {RESULT_COLUMNS} FROM test_results WHERE test_id = ?1
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?2"
        ),
        vec![id_param(test_id), Value::from(limit as i64)],
        RawTestResult::from_row,
      )
      .await?;
    raws.into_iter().map(RawTestResult::into_result).collect()
  }

  // ── Code changes ──────────────────────────────────────────────────────────

  async fn record_code_change(&self, input: NewCodeChange) -> Result<CodeChange> {
    let change = CodeChange {
      change_id:      Uuid::new_v4(),
      requirement_id: input.requirement_id,
      file_path:      input.file_path,
      change_type:    input.change_type,
      description:    input.description,
      commit_hash:    input.commit_hash,
      created_at:     now(),
    };

    let row = vec![
      id_param(change.change_id),
      id_param(change.requirement_id),
      Value::from(change.file_path.clone()),
      Value::from(change.change_type.clone()),
      change.description.clone().map(Value::from).unwrap_or(Value::Null),
      change.commit_hash.clone().map(Value::from).unwrap_or(Value::Null),
      dt_param(change.created_at),
    ];

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO code_changes ({CHANGE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
          rusqlite::params_from_iter(row),
        )?;
        Ok(())
      })
      .await?;

    Ok(change)
  }

  async fn list_code_changes(&self, requirement_id: Uuid) -> Result<Vec<CodeChange>> {
    let raws = self
      .select(
        format!(
          "SELECT {CHANGE_COLUMNS} FROM code_changes WHERE requirement_id = ?1
           ORDER BY created_at DESC, rowid DESC"
        ),
        vec![id_param(requirement_id)],
        RawCodeChange::from_row,
      )
      .await?;
    raws.into_iter().map(RawCodeChange::into_code_change).collect()
  }

  async fn count_changes_since(
    &self,
    requirement_id: Uuid,
    since: DateTime<Utc>,
  ) -> Result<u32> {
    self
      .count(
        "SELECT COUNT(*) FROM code_changes WHERE requirement_id = ?1 AND created_at > ?2",
        vec![id_param(requirement_id), dt_param(since)],
      )
      .await
  }

  // ── Assessments ───────────────────────────────────────────────────────────

  async fn record_assessment(&self, input: NewAssessment) -> Result<ReleaseAssessment> {
    let assessment = ReleaseAssessment {
      assessment_id:   Uuid::new_v4(),
      requirement_id:  input.requirement_id,
      risk_level:      input.report.risk_level,
      test_count:      input.report.test_coverage,
      failed_tests:    input.report.failed_tests,
      business_impact: input.business_impact,
      recommendation:  input.report.recommendation,
      created_at:      now(),
    };

    let row = vec![
      id_param(assessment.assessment_id),
      id_param(assessment.requirement_id),
      Value::from(assessment.risk_level.as_ref().to_owned()),
      Value::from(i64::from(assessment.test_count)),
      Value::from(i64::from(assessment.failed_tests)),
      assessment.business_impact.clone().map(Value::from).unwrap_or(Value::Null),
      Value::from(assessment.recommendation.clone()),
      dt_param(assessment.created_at),
    ];

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO release_assessments ({ASSESSMENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
          ),
          rusqlite::params_from_iter(row),
        )?;
        Ok(())
      })
      .await?;

    Ok(assessment)
  }

  async fn list_assessments(&self, requirement_id: Uuid) -> Result<Vec<ReleaseAssessment>> {
    let raws = self
      .select(
        format!(
          "SELECT {ASSESSMENT_COLUMNS} FROM release_assessments WHERE requirement_id = ?1
           ORDER BY created_at DESC, rowid DESC"
        ),
        vec![id_param(requirement_id)],
        RawAssessment::from_row,
      )
      .await?;
    raws.into_iter().map(RawAssessment::into_assessment).collect()
  }

  // ── Snapshots ─────────────────────────────────────────────────────────────

  async fn record_snapshot(&self, input: NewApiSnapshot) -> Result<ApiSnapshot> {
    let snapshot = ApiSnapshot {
      snapshot_id:        Uuid::new_v4(),
      endpoint:           input.endpoint,
      response_structure: input.response_structure,
      created_at:         now(),
    };

    let row = vec![
      id_param(snapshot.snapshot_id),
      Value::from(snapshot.endpoint.clone()),
      Value::from(serde_json::to_string(&snapshot.response_structure)?),
      dt_param(snapshot.created_at),
    ];

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO api_snapshots ({SNAPSHOT_COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
          rusqlite::params_from_iter(row),
        )?;
        Ok(())
      })
      .await?;

    Ok(snapshot)
  }

  async fn latest_snapshots<'a>(
    &'a self,
    endpoint: &'a str,
    limit: usize,
  ) -> Result<Vec<ApiSnapshot>> {
    let raws = self
      .select(
        format!(
          "SELECT {SNAPSHOT_COLUMNS} FROM api_snapshots WHERE endpoint = ?1
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?2"
        ),
        vec![Value::from(endpoint.to_owned()), Value::from(limit as i64)],
        RawSnapshot::from_row,
      )
      .await?;
    raws.into_iter().map(RawSnapshot::into_snapshot).collect()
  }
}
