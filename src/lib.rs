//! Core data pipeline for a whole-body organ cohort explorer.
//!
//! Loads a cohort table plus three per-organ measurement tables, merges them
//! into one wide table via the organ dictionary, nulls out invalid survey
//! codes, and exposes correlation and summary statistics to a presentation
//! layer. See [`session::CohortSession`] for the top-level entry point.

pub mod data;
pub mod error;
pub mod session;
pub mod stats;

pub use data::assemble::Measure;
pub use data::filter::{CohortFilter, SexFilter};
pub use data::model::{DataTable, Value};
pub use error::ExplorerError;
pub use session::{CohortSession, DataPaths};
pub use stats::correlation::{Correlation, UndefinedReason};
