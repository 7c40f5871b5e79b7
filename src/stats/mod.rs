/// Statistics layer: correlation analysis and descriptive summaries over
/// the assembled table.
pub mod correlation;
pub mod summary;
