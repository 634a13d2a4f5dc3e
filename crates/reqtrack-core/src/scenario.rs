//! Rule-based test scenario synthesis from a requirement's free text.
//!
//! Rules are applied in order and are not exclusive:
//!
//! 1. a non-blank user story yields a happy-path and an error-handling case;
//! 2. non-blank acceptance criteria yield one case per non-blank line;
//! 3. otherwise a non-blank description yields one basic-functionality case;
//! 4. if nothing matched, a single fallback case is produced.
//!
//! The output is a pure function of the input fields.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::requirement::Requirement;

/// Title used when the requirement's title is empty.
const FALLBACK_TITLE: &str = "Feature";

/// The test type tag a synthesized scenario is stored with.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScenarioKind {
  Functional,
  Negative,
  Acceptance,
}

/// A candidate test, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDraft {
  pub title:       String,
  pub description: String,
  #[serde(rename = "type")]
  pub kind:        ScenarioKind,
}

/// The text fields synthesis reads. Borrowed so callers need not clone a
/// whole [`Requirement`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioSource<'a> {
  pub title:               &'a str,
  pub description:         Option<&'a str>,
  pub user_story:          Option<&'a str>,
  pub acceptance_criteria: Option<&'a str>,
}

impl<'a> From<&'a Requirement> for ScenarioSource<'a> {
  fn from(r: &'a Requirement) -> Self {
    Self {
      title:               &r.title,
      description:         r.description.as_deref(),
      user_story:          r.user_story.as_deref(),
      acceptance_criteria: r.acceptance_criteria.as_deref(),
    }
  }
}

/// Derive the ordered list of candidate tests for `source`.
pub fn synthesize<'a>(source: impl Into<ScenarioSource<'a>>) -> Vec<ScenarioDraft> {
  let source = source.into();
  let title = if source.title.is_empty() { FALLBACK_TITLE } else { source.title };
  let draft = |suffix: &str, description: String, kind| ScenarioDraft {
    title: format!("Test: {title} - {suffix}"),
    description,
    kind,
  };

  let mut drafts = Vec::new();

  if let Some(story) = non_blank(source.user_story) {
    drafts.push(draft(
      "Happy Path",
      format!("Verify that {story} works as expected"),
      ScenarioKind::Functional,
    ));
    drafts.push(draft(
      "Error Handling",
      format!("Verify error handling for {story}"),
      ScenarioKind::Negative,
    ));
  }

  if let Some(criteria) = non_blank(source.acceptance_criteria) {
    // Numbering counts emitted criteria, so blank lines leave no gaps.
    let lines = criteria.split('\n').map(str::trim).filter(|l| !l.is_empty());
    for (index, line) in lines.enumerate() {
      drafts.push(draft(
        &format!("Acceptance Criterion {}", index + 1),
        line.to_owned(),
        ScenarioKind::Acceptance,
      ));
    }
  } else if let Some(description) = non_blank(source.description) {
    drafts.push(draft(
      "Basic Functionality",
      format!("Verify basic functionality: {description}"),
      ScenarioKind::Functional,
    ));
  }

  if drafts.is_empty() {
    drafts.push(draft(
      "Basic Test",
      format!("Basic test for {title}"),
      ScenarioKind::Functional,
    ));
  }

  drafts
}

fn non_blank(field: Option<&str>) -> Option<&str> {
  field.map(str::trim).filter(|s| !s.is_empty())
}
