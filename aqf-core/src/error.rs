/// Error types for the forecasting pipeline
use thiserror::Error;

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A forecast needs at least one historical record to start from
    #[error("No historical records supplied")]
    EmptyHistory,

    /// Requested horizon outside 1..=max
    #[error("Invalid forecast horizon {requested} (must be between 1 and {max} hours)")]
    InvalidHorizon { requested: u32, max: u32 },

    /// A batch handed to the pipeline must belong to a single location
    #[error("Record for location '{found}' found in a batch for '{expected}'")]
    MixedLocations { expected: String, found: String },

    /// Pollutant name not in the tracked set
    #[error("Unknown pollutant: {0}")]
    UnknownPollutant(String),

    /// Timestamp parsing failed
    #[error("Failed to parse timestamp: {0}")]
    InvalidTimestamp(String),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// A required CSV column is absent from the header row
    #[error("Missing CSV column: {0}")]
    MissingColumn(String),

    /// A numeric cell could not be parsed
    #[error("Invalid value '{value}' in column '{column}'")]
    InvalidNumber { column: String, value: String },
}

/// Type alias for Results using PipelineError
pub type Result<T> = std::result::Result<T, PipelineError>;
