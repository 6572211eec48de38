//! Error type shared by the counting engine and the configuration layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RainflowError {
    /// A binning selection that cannot be honoured, e.g. more than one selector set.
    /// Raised before any cycle is processed.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A cycle range mapped past the last bin by more than floating-point noise.
    #[error("bin index {index} exceeds nbins {nbins} (quotient {quotient})")]
    Inconsistency {
        index: usize,
        nbins: usize,
        quotient: f64,
    },

    /// A configuration file that parsed but holds values outside their valid domain.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RainflowError {
    pub fn validation(message: impl Into<String>) -> Self {
        RainflowError::Validation(message.into())
    }
}
