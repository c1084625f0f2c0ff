//! Data quality assessment module.
//!
//! This module measures completeness and redundancy of a loaded dataset and
//! detects relational inconsistencies (keys that do not functionally
//! determine their dependent columns).

mod analyzer;
mod inconsistency;

pub use analyzer::QualityAssessor;
pub use inconsistency::{InconsistencyReport, detect_inconsistencies};
