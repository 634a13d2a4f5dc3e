//! SQL schema for the reqtrack SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS requirements (
    requirement_id      TEXT PRIMARY KEY,
    title               TEXT NOT NULL,
    description         TEXT,
    user_story          TEXT,
    acceptance_criteria TEXT,            -- newline-delimited clauses
    status              TEXT NOT NULL DEFAULT 'draft',
    created_at          TEXT NOT NULL,   -- RFC 3339 UTC, microseconds
    updated_at          TEXT NOT NULL
);

-- No ON DELETE CASCADE: the store removes children explicitly, in order.
CREATE TABLE IF NOT EXISTS tests (
    test_id        TEXT PRIMARY KEY,
    requirement_id TEXT REFERENCES requirements(requirement_id),
    title          TEXT NOT NULL,
    description    TEXT,
    type           TEXT NOT NULL,
    status         TEXT NOT NULL DEFAULT 'pending',
    ai_generated   INTEGER NOT NULL DEFAULT 0,
    created_at     TEXT NOT NULL
);

-- Append-only.
CREATE TABLE IF NOT EXISTS test_results (
    result_id      TEXT PRIMARY KEY,
    test_id        TEXT NOT NULL REFERENCES tests(test_id),
    status         TEXT NOT NULL,     -- 'passed' | 'failed' | other
    log_output     TEXT,
    error_message  TEXT,
    execution_time INTEGER,           -- milliseconds
    created_at     TEXT NOT NULL
);

-- Append-only.
CREATE TABLE IF NOT EXISTS code_changes (
    change_id      TEXT PRIMARY KEY,
    requirement_id TEXT NOT NULL REFERENCES requirements(requirement_id),
    file_path      TEXT NOT NULL,
    change_type    TEXT NOT NULL,
    description    TEXT,
    commit_hash    TEXT,
    created_at     TEXT NOT NULL
);

-- Append-only.
CREATE TABLE IF NOT EXISTS release_assessments (
    assessment_id   TEXT PRIMARY KEY,
    requirement_id  TEXT NOT NULL REFERENCES requirements(requirement_id),
    risk_level      TEXT NOT NULL,    -- 'high' | 'medium' | 'low'
    test_count      INTEGER NOT NULL,
    failed_tests    INTEGER NOT NULL,
    business_impact TEXT,
    recommendation  TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

-- Append-only.
CREATE TABLE IF NOT EXISTS api_snapshots (
    snapshot_id        TEXT PRIMARY KEY,
    endpoint           TEXT NOT NULL,
    response_structure TEXT NOT NULL, -- JSON
    created_at         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS tests_requirement_idx        ON tests(requirement_id);
CREATE INDEX IF NOT EXISTS test_results_test_idx        ON test_results(test_id, created_at);
CREATE INDEX IF NOT EXISTS code_changes_requirement_idx ON code_changes(requirement_id, created_at);
CREATE INDEX IF NOT EXISTS assessments_requirement_idx  ON release_assessments(requirement_id);
CREATE INDEX IF NOT EXISTS api_snapshots_endpoint_idx   ON api_snapshots(endpoint, created_at);

PRAGMA user_version = 1;
";
