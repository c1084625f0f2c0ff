//! Pipeline module.
//!
//! This module provides the audit pipeline and its report stages.

mod runner;
mod stages;

pub use runner::{Pipeline, PipelineBuilder};
pub use stages::PipelineStage;
