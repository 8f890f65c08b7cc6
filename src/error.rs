//! Error types for surveyplot

use thiserror::Error;

/// Result type for surveyplot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading data or configuring a pipeline run.
///
/// An empty result is not an error: see [`crate::processing::pipeline::PipelineOutcome::NoData`].
#[derive(Error, Debug)]
pub enum Error {
    /// A field name does not resolve within the active schema
    #[error("Unknown field '{field}' for the {schema} schema")]
    UnknownField { field: String, schema: String },

    /// A numeric operation was requested on a categorical field
    #[error("Field '{field}' is categorical, a numeric field is required")]
    FieldKind { field: String },

    /// The reduction needs a value field but none was configured
    #[error("Reduction '{0}' requires a value field")]
    MissingValueField(String),

    /// No grouping field was configured
    #[error("At least one grouping field is required")]
    NoGroupField,

    /// Bin width must be finite and strictly positive
    #[error("Invalid bin width {width} for field '{field}'")]
    InvalidBinWidth { field: String, width: f64 },

    /// Extent binning needs at least one bin
    #[error("Invalid bin count {count} for field '{field}'")]
    InvalidBinCount { field: String, count: usize },

    /// A filter value cannot be compared with its field
    #[error("Filter value '{value}' does not fit field '{field}'")]
    InvalidFilterValue { field: String, value: String },

    /// No header row could be located in the input
    #[error("No data found after header detection")]
    NoHeader,

    /// The header matches none of the known dataset schemas
    #[error("Header does not match a known schema (columns: {0})")]
    UnknownSchema(String),

    /// Unknown chart preset name
    #[error("Unknown chart kind '{0}'")]
    UnknownChart(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error stems from the pipeline configuration rather than the input data.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownField { .. }
                | Error::FieldKind { .. }
                | Error::MissingValueField(_)
                | Error::NoGroupField
                | Error::InvalidBinWidth { .. }
                | Error::InvalidBinCount { .. }
                | Error::InvalidFilterValue { .. }
                | Error::UnknownChart(_)
        )
    }
}
