//! A module for loading and validating the run configuration of the rainflow tool.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::RainflowError;
use crate::histogram::{Binning, CycleAggregator, DEFAULT_TOLERANCE};
use crate::matrix::MatrixOptions;

/// Represents the configuration for one rainflow counting run.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub input: Input,
    #[serde(default)]
    pub binning: BinningConfig,
    pub matrix: Option<MatrixConfig>,
    pub start_stop: Option<StartStopConfig>,
    #[serde(default)]
    pub output: Output,
}

impl Config {
    /// Validates the entire configuration.
    ///
    /// Each section is checked on its own; the first failure is returned.
    pub fn validate(&self) -> Result<(), RainflowError> {
        self.input.validate()?;
        self.binning.validate()?;
        if let Some(matrix) = &self.matrix {
            matrix.validate()?;
        }
        if let Some(start_stop) = &self.start_stop {
            validate_column(&start_stop.column, self.input.header)?;
        }
        Ok(())
    }
}

/// Selects the signal to count.
#[derive(Debug, Deserialize)]
pub struct Input {
    /// Path to a delimited text file holding the signal.
    pub path: String,
    /// Column holding the signal, by header name or zero-based position.
    pub column: Column,
    /// Whether the first row is a header.
    #[serde(default = "default_header")]
    pub header: bool,
    /// Field delimiter; a single ASCII character.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Sampling rate in Hz. Enables cycle start/end times in the report.
    pub sampling_rate: Option<f64>,
}

fn default_header() -> bool {
    true
}

fn default_delimiter() -> String {
    ",".to_owned()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Column {
    Index(usize),
    Name(String),
}

impl Input {
    /// Validates the `Input` section.
    ///
    /// # Examples
    ///
    /// ```
    /// use rainflow_fatigue::config::{Column, Input};
    ///
    /// let input = Input {
    ///     path: String::from("tests/signal.csv"),
    ///     column: Column::Name(String::from("force")),
    ///     header: true,
    ///     delimiter: String::from(","),
    ///     sampling_rate: Some(10.0),
    /// };
    /// assert!(input.validate().is_ok());
    ///
    /// let zero_rate = Input { column: Column::Index(2), sampling_rate: Some(0.0), ..input };
    /// assert!(zero_rate.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), RainflowError> {
        if self.path.trim().is_empty() {
            return Err(RainflowError::validation("path must not be empty"));
        }
        validate_column(&self.column, self.header)?;
        self.delimiter_byte()?;
        if let Some(fs) = self.sampling_rate {
            if !(fs.is_finite() && fs > 0.0) {
                return Err(RainflowError::validation(format!(
                    "sampling_rate must be greater than 0.0, got {}",
                    fs
                )));
            }
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> Result<u8, RainflowError> {
        match self.delimiter.as_bytes() {
            [byte] => Ok(*byte),
            _ => Err(RainflowError::validation(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            ))),
        }
    }
}

fn validate_column(column: &Column, header: bool) -> Result<(), RainflowError> {
    if let Column::Name(name) = column {
        if name.trim().is_empty() {
            return Err(RainflowError::validation("column name must not be empty"));
        }
        if !header {
            return Err(RainflowError::validation(format!(
                "column '{}' is selected by name but the file has no header",
                name
            )));
        }
    }
    Ok(())
}

/// Histogram binning selectors. At most one of `ndigits`, `nbins` and `binsize` may be
/// set; none means exact ranges.
#[derive(Debug, Default, Deserialize)]
pub struct BinningConfig {
    pub ndigits: Option<i32>,
    pub nbins: Option<usize>,
    pub binsize: Option<f64>,
    /// Fraction of a bin under which an overshoot past `nbins` is treated as rounding noise.
    pub tolerance: Option<f64>,
}

impl BinningConfig {
    pub fn validate(&self) -> Result<(), RainflowError> {
        self.binning()?;
        if let Some(tolerance) = self.tolerance {
            if !(0.0..1.0).contains(&tolerance) {
                return Err(RainflowError::validation(format!(
                    "tolerance must be in [0.0, 1.0), got {}",
                    tolerance
                )));
            }
        }
        Ok(())
    }

    pub fn binning(&self) -> Result<Binning, RainflowError> {
        Binning::from_options(self.ndigits, self.nbins, self.binsize)
    }

    pub fn aggregator(&self) -> Result<CycleAggregator, RainflowError> {
        let tolerance = self.tolerance.unwrap_or(DEFAULT_TOLERANCE);
        Ok(CycleAggregator::new(self.binning()?).with_tolerance(tolerance))
    }
}

/// Resolution of the range × mean matrix. The section's presence requests the matrix.
#[derive(Debug, Deserialize)]
pub struct MatrixConfig {
    #[serde(default = "default_bins")]
    pub range_bins: usize,
    #[serde(default = "default_bins")]
    pub mean_bins: usize,
}

fn default_bins() -> usize {
    MatrixOptions::default().range_bins
}

impl MatrixConfig {
    pub fn validate(&self) -> Result<(), RainflowError> {
        if self.range_bins == 0 {
            return Err(RainflowError::validation("range_bins must be greater than 0"));
        }
        if self.mean_bins == 0 {
            return Err(RainflowError::validation("mean_bins must be greater than 0"));
        }
        Ok(())
    }

    pub fn options(&self) -> MatrixOptions {
        MatrixOptions {
            range_bins: self.range_bins,
            mean_bins: self.mean_bins,
        }
    }
}

/// Speed-like column of the input file on which startups and shutdowns are counted.
#[derive(Debug, Deserialize)]
pub struct StartStopConfig {
    pub column: Column,
}

#[derive(Debug, Default, Deserialize)]
pub struct Output {
    /// Where to write the per-cycle detail table, if anywhere.
    pub cycles_csv: Option<String>,
}

/// Loads the configuration from a YAML or TOML file, chosen by extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse. The configuration
/// is not validated here; call [`Config::validate`].
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<Config, RainflowError> {
    let path = config_path.as_ref();
    let content = fs::read_to_string(path)?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(toml::from_str(&content)?),
        _ => Ok(serde_yaml::from_str(&content)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config() {
        let config = load_config("tests/config.yaml").expect("Failed to load config");
        assert!(
            config.validate().is_ok(),
            "Expected Ok(()) but got Err with {:?}",
            config.validate()
        );
        assert_eq!(config.input.column, Column::Name("force".into()));
        assert_eq!(config.binning.binning().unwrap(), Binning::FixedBinSize(2.0));
        assert_eq!(
            config.matrix.map(|m| m.options()),
            Some(MatrixOptions {
                range_bins: 10,
                mean_bins: 5
            })
        );
    }

    #[test]
    fn test_load_toml_config() {
        let config = load_config("tests/config.toml").expect("Failed to load config");
        assert!(config.validate().is_ok());
        assert_eq!(config.input.column, Column::Index(1));
        assert_eq!(config.input.delimiter_byte().unwrap(), b';');
        assert_eq!(config.binning.binning().unwrap(), Binning::DigitRounding(1));
        assert!(config.matrix.is_none());
        assert!(config.output.cycles_csv.is_none());
    }

    #[test]
    fn test_conflicting_selectors_rejected() {
        let yaml = "input: {path: a.csv, column: 0}\nbinning: {ndigits: 2, nbins: 8}\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(config.validate(), Err(RainflowError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_defaults() {
        let config: Config =
            serde_yaml::from_str("input: {path: a.csv, column: 3}\nmatrix: {}\n").unwrap();
        assert!(config.input.header);
        assert_eq!(config.input.delimiter, ",");
        assert_eq!(config.binning.binning().unwrap(), Binning::NoBinning);
        assert_eq!(config.matrix.unwrap().options(), MatrixOptions::default());
    }

    #[test]
    fn test_invalid_sections() {
        let cases = [
            "input: {path: a.csv, column: x, header: false}",
            "input: {path: a.csv, column: 0, delimiter: ';;'}",
            "input: {path: a.csv, column: 0, sampling_rate: -5.0}",
            "input: {path: ' ', column: 0}",
            "input: {path: a.csv, column: 0}\nbinning: {tolerance: 1.5}",
            "input: {path: a.csv, column: 0}\nmatrix: {range_bins: 0}",
            "input: {path: a.csv, column: 0, header: false}\nstart_stop: {column: speed}",
        ];
        for yaml in cases {
            let config: Config = serde_yaml::from_str(yaml).unwrap();
            assert!(config.validate().is_err(), "expected failure for {}", yaml);
        }
    }
}
