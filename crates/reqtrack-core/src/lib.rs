//! Core types, analysis rules and trait definitions for reqtrack.
//!
//! No HTTP or database dependencies. Records come in from a
//! [`store::TrackerStore`] backend; the analysis modules are pure functions
//! over those records.

pub mod assessment;
pub mod change;
pub mod diff;
pub mod error;
pub mod flaky;
pub mod impact;
pub mod release;
pub mod requirement;
pub mod risk;
pub mod run;
pub mod scenario;
pub mod snapshot;
pub mod store;
pub mod test_case;

pub use error::{Error, Result};
