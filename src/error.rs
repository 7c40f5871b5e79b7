use thiserror::Error;

/// Typed failures of the data pipeline.
///
/// Loader-level I/O and parse problems stay on `anyhow`; these variants are
/// the domain errors a presentation layer is expected to branch on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExplorerError {
    /// A measurement column references an organ ID the dictionary does not
    /// know. Assembly must stop rather than merge mislabelled columns.
    #[error("organ id {0} is not present in the organ dictionary")]
    UnknownOrganId(u32),

    /// An organ name with no dictionary entry.
    #[error("organ '{0}' is not present in the organ dictionary")]
    UnknownOrgan(String),

    /// A measurement column that does not follow `<prefix><organ_id>`.
    #[error("measurement column '{0}' does not match the expected '{1}<id>' pattern")]
    BadMeasurementColumn(String, &'static str),

    /// A table is missing its subject key column.
    #[error("table has no '{0}' key column")]
    MissingKeyColumn(String),

    /// A requested analysis column is absent from the assembled table.
    #[error("column '{0}' not found in the assembled table")]
    MissingColumn(String),
}
