//! Error types for `reqtrack-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("requirement title must not be blank")]
  BlankTitle,

  #[error("invalid api snapshot: {0}")]
  InvalidSnapshot(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
