/// Error types for model fitting and configuration
use thiserror::Error;

/// Errors raised while fitting or evaluating a regressor.
///
/// These never escape the trainer or the forecast generator; they are
/// logged and the affected pollutant is skipped or downgraded to the
/// trend fallback.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegressionError {
    /// No training rows
    #[error("No samples to fit")]
    NoSamples,

    /// Row widths or target count disagree
    #[error("Dimension mismatch (expected: {expected}, found: {found})")]
    DimensionMismatch { expected: usize, found: usize },

    /// NaN or infinite value in the training data
    #[error("Non-finite value in training data")]
    NonFiniteInput,

    /// Least squares solve did not produce a solution
    #[error("Least squares solve failed: {0}")]
    SolveFailed(String),

    /// The model produced NaN or an infinite value
    #[error("Prediction is not finite")]
    NonFinitePrediction,
}

/// Errors loading a [`crate::PipelineConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid config value: {0}")]
    Invalid(String),
}
