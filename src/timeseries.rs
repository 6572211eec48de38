//! Loading a signal from one column of a delimited text file.
use csv::ReaderBuilder;
use log::debug;
use std::path::Path;

use crate::config::{Column, Input};
use crate::error::RainflowError;

/// A loaded signal and, when known, the rate it was sampled at.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub samples: Vec<f64>,
    pub sampling_rate: Option<f64>,
}

impl TimeSeries {
    /// Reads the column selected by `input`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the column does not exist, or a
    /// row holds something other than a finite number in that column. Row numbers in
    /// messages are one-based and count the header.
    pub fn read(input: &Input) -> Result<TimeSeries, RainflowError> {
        let delimiter = input.delimiter_byte()?;
        let samples = read_column(&input.path, &input.column, input.header, delimiter)?;
        Ok(TimeSeries {
            samples,
            sampling_rate: input.sampling_rate,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

pub fn read_column<P: AsRef<Path>>(
    path: P,
    column: &Column,
    header: bool,
    delimiter: u8,
) -> Result<Vec<f64>, RainflowError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(header)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let position = match column {
        Column::Index(index) => *index,
        Column::Name(name) => reader
            .headers()?
            .iter()
            .position(|h| h == name.as_str())
            .ok_or_else(|| {
                RainflowError::validation(format!("column '{}' not found in header", name))
            })?,
    };

    let first_row = if header { 2 } else { 1 };
    let mut samples = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = first_row + i;
        let field = record.get(position).ok_or_else(|| {
            RainflowError::validation(format!("row {} has no column {}", row, position))
        })?;
        let value: f64 = field
            .parse()
            .map_err(|_| {
                RainflowError::validation(format!("row {}: '{}' is not a number", row, field))
            })?;
        if !value.is_finite() {
            return Err(RainflowError::validation(format!("row {}: sample is not finite", row)));
        }
        samples.push(value);
    }
    debug!("read {} samples from {}", samples.len(), path.as_ref().display());
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_named_column() {
        let column = Column::Name("force".into());
        let samples = read_column("tests/signal.csv", &column, true, b',').unwrap();
        assert_eq!(samples, vec![-2.0, 1.0, -3.0, 5.0, -1.0, 3.0, -4.0, 4.0, -2.0]);
    }

    #[test]
    fn test_read_indexed_column_without_header() {
        let file = write_temp("1;0.5\n2; -1.5\n3;2\n");
        let samples = read_column(file.path(), &Column::Index(1), false, b';').unwrap();
        assert_eq!(samples, vec![0.5, -1.5, 2.0]);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let result = read_column("tests/signal.csv", &Column::Name("torque".into()), true, b',');
        assert!(matches!(result, Err(RainflowError::Validation(_))));
    }

    #[test]
    fn test_bad_row_is_reported_with_row_number() {
        let file = write_temp("t,x\n0,1.0\n1,abc\n");
        let err = read_column(file.path(), &Column::Name("x".into()), true, b',').unwrap_err();
        assert!(err.to_string().contains("row 3"), "{}", err);
    }

    #[test]
    fn test_non_finite_sample_rejected() {
        let file = write_temp("x\n1.0\nNaN\n");
        assert!(read_column(file.path(), &Column::Index(0), true, b',').is_err());
    }

    #[test]
    fn test_read_from_input() {
        let input = Input {
            path: "tests/signal.csv".into(),
            column: Column::Index(1),
            header: true,
            delimiter: ",".into(),
            sampling_rate: Some(10.0),
        };
        let series = TimeSeries::read(&input).unwrap();
        assert_eq!(series.len(), 9);
        assert!(!series.is_empty());
        assert_eq!(series.sampling_rate, Some(10.0));
    }
}
