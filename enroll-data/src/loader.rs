use std::fs::File;
use std::io::Read;
use std::path::Path;

use enroll_core::{PinDirectory, PinLocation};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading a PIN table.
#[derive(Debug, Error)]
pub enum PinTableError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Row {row}: invalid PIN code '{pin}' (expected 6 digits)")]
    InvalidPin { row: usize, pin: String },

    #[error("Row {row}: {column} is empty")]
    MissingValue { row: usize, column: &'static str },

    #[error("Failed to open PIN table '{path}': {message}")]
    Io { path: String, message: String },
}

impl From<csv::Error> for PinTableError {
    fn from(err: csv::Error) -> Self {
        PinTableError::CsvParse(err.to_string())
    }
}

/// A single record from the PIN table CSV file.
///
/// - `pin_code`: six-digit postal code, e.g. `110001`
/// - `city`: city filled in when the code is entered
/// - `state`: state filled in alongside the city
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PinRecord {
    pub pin_code: String,
    pub city: String,
    pub state: String,
}

impl PinRecord {
    fn check(
        &self,
        row: usize,
    ) -> Result<(), PinTableError> {
        if self.pin_code.len() != 6 || !self.pin_code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PinTableError::InvalidPin {
                row,
                pin: self.pin_code.clone(),
            });
        }
        if self.city.is_empty() {
            return Err(PinTableError::MissingValue { row, column: "city" });
        }
        if self.state.is_empty() {
            return Err(PinTableError::MissingValue {
                row,
                column: "state",
            });
        }
        Ok(())
    }
}

/// Loader for PIN lookup tables stored as CSV.
pub struct PinTableLoader;

impl PinTableLoader {
    /// Parse and check PIN records from a CSV reader.
    ///
    /// Fields are trimmed. Row numbers in errors count data rows from 1,
    /// not counting the header.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<PinRecord>, PinTableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for (i, result) in csv_reader.deserialize().enumerate() {
            let record: PinRecord = result?;
            record.check(i + 1)?;
            records.push(record);
        }

        Ok(records)
    }

    /// Builds a lookup directory. A PIN listed twice keeps its last row.
    pub fn into_directory(records: Vec<PinRecord>) -> PinDirectory {
        let mut directory = PinDirectory::empty();
        for record in records {
            directory.insert(record.pin_code, PinLocation {
                city: record.city,
                state: record.state,
            });
        }
        directory
    }

    /// Reads `path` and returns the directory it describes.
    pub fn load_from_file(path: &Path) -> Result<PinDirectory, PinTableError> {
        let file = File::open(path).map_err(|e| PinTableError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let records = Self::parse(file)?;
        debug!(path = %path.display(), rows = records.len(), "PIN table loaded");
        Ok(Self::into_directory(records))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const HEADER: &str = "pin_code,city,state\n";

    #[test]
    fn test_parse_single_row() {
        let csv = format!("{HEADER}110001,New Delhi,Delhi");

        let records = PinTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(
            records,
            vec![PinRecord {
                pin_code: "110001".to_string(),
                city: "New Delhi".to_string(),
                state: "Delhi".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_trims_fields() {
        let csv = format!("{HEADER} 400001 , Mumbai ,Maharashtra ");

        let records = PinTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].pin_code, "400001");
        assert_eq!(records[0].city, "Mumbai");
    }

    #[test]
    fn test_invalid_pin_reports_row() {
        let csv = format!("{HEADER}110001,New Delhi,Delhi\n11000A,Nowhere,Delhi");

        let err = PinTableLoader::parse(csv.as_bytes()).unwrap_err();

        match err {
            PinTableError::InvalidPin { row, pin } => {
                assert_eq!(row, 2);
                assert_eq!(pin, "11000A");
            }
            other => panic!("Expected InvalidPin, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_state_reports_column() {
        let csv = format!("{HEADER}560001,Bangalore,");

        let err = PinTableLoader::parse(csv.as_bytes()).unwrap_err();

        assert!(matches!(
            err,
            PinTableError::MissingValue {
                row: 1,
                column: "state"
            }
        ));
    }

    #[test]
    fn test_wrong_column_count_is_parse_error() {
        let csv = format!("{HEADER}560001,Bangalore");

        let err = PinTableLoader::parse(csv.as_bytes()).unwrap_err();

        assert!(matches!(err, PinTableError::CsvParse(_)));
    }

    #[test]
    fn test_duplicate_pin_last_row_wins() {
        let csv = format!("{HEADER}110001,Delhi,Delhi\n110001,New Delhi,Delhi");
        let records = PinTableLoader::parse(csv.as_bytes()).unwrap();

        let directory = PinTableLoader::into_directory(records);

        assert_eq!(directory.len(), 1);
        assert_eq!(directory.lookup("110001").unwrap().city, "New Delhi");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = PinTableLoader::load_from_file(Path::new("/nonexistent/pins.csv")).unwrap_err();

        assert!(matches!(err, PinTableError::Io { .. }));
    }
}
