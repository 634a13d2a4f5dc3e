//! Persisted release assessments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::risk::{RiskLevel, RiskReport};

/// A point-in-time risk score recorded against a requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseAssessment {
  pub assessment_id:   Uuid,
  pub requirement_id:  Uuid,
  pub risk_level:      RiskLevel,
  pub test_count:      u32,
  pub failed_tests:    u32,
  pub business_impact: Option<String>,
  pub recommendation:  String,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::TrackerStore::record_assessment`].
#[derive(Debug, Clone)]
pub struct NewAssessment {
  pub requirement_id:  Uuid,
  pub report:          RiskReport,
  pub business_impact: Option<String>,
}
