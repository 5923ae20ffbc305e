//! CSV reading
//!
//! Opens a bank export and yields its data rows one at a time as ordered
//! column→value pairs. The sequence is finite and cannot be restarted.

use std::fs::File;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord, StringRecordsIntoIter};

use crate::error::{ReconcileError, ReconcileResult};

/// A single CSV data row keyed by header name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    line: usize,
    columns: Vec<(String, String)>,
}

impl RawRow {
    /// Create a row from its file line number and ordered columns
    pub fn new(line: usize, columns: Vec<(String, String)>) -> Self {
        Self { line, columns }
    }

    /// Build a row from `(header, value)` string pairs (test and fixture helper)
    pub fn from_pairs(line: usize, pairs: &[(&str, &str)]) -> Self {
        Self::new(
            line,
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    /// Line in the source file (the header is line 1)
    pub fn line(&self) -> usize {
        self.line
    }

    /// Look a value up by header name, ignoring case and surrounding whitespace
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.columns
            .iter()
            .find(|(header, _)| header.trim().eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Opens CSV exports for reading
#[derive(Debug, Clone)]
pub struct CsvImporter {
    delimiter: u8,
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvImporter {
    /// Create an importer for a given delimiter
    pub fn new(delimiter: char) -> ReconcileResult<Self> {
        if !delimiter.is_ascii() {
            return Err(ReconcileError::Config(format!(
                "CSV delimiter must be a single ASCII character, got '{}'",
                delimiter
            )));
        }
        Ok(Self {
            delimiter: delimiter as u8,
        })
    }

    /// Open `path` with the given delimiter
    pub fn open(path: impl AsRef<Path>, delimiter: char) -> ReconcileResult<RowIter<File>> {
        Self::new(delimiter)?.read_rows(path)
    }

    /// Open a file and read its header row
    pub fn read_rows(&self, path: impl AsRef<Path>) -> ReconcileResult<RowIter<File>> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ReconcileError::FileNotFound(path.display().to_string()));
        }

        let reader = self
            .builder()
            .from_path(path)
            .map_err(|e| ReconcileError::Parse(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("Reading CSV from {}", path.display());
        RowIter::new(reader)
    }

    /// Read rows from any reader (stdin, in-memory fixtures)
    pub fn read_rows_from<R: std::io::Read>(&self, input: R) -> ReconcileResult<RowIter<R>> {
        RowIter::new(self.builder().from_reader(input))
    }

    fn builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers);
        builder
    }
}

/// Lazy iterator over the data rows of a CSV source
pub struct RowIter<R> {
    headers: StringRecord,
    records: StringRecordsIntoIter<R>,
}

impl<R: std::io::Read> RowIter<R> {
    fn new(mut reader: Reader<R>) -> ReconcileResult<Self> {
        let headers = reader
            .headers()
            .map_err(|e| ReconcileError::Parse(format!("Error reading CSV header: {}", e)))?
            .clone();
        Ok(Self {
            headers,
            records: reader.into_records(),
        })
    }
}

impl<R: std::io::Read> Iterator for RowIter<R> {
    type Item = ReconcileResult<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => {
                return Some(Err(ReconcileError::Parse(format!(
                    "Error reading CSV record: {}",
                    e
                ))))
            }
        };

        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        // Short rows get empty values; extra cells without a header are dropped
        let columns = self
            .headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                (
                    header.to_string(),
                    record.get(idx).unwrap_or("").to_string(),
                )
            })
            .collect();

        Some(Ok(RawRow::new(line, columns)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rows_in_file_order() {
        let data = "Date,Amount,Payee\n2024-01-01,-5.00,Coffee\n2024-01-02,10.00,Pay";
        let rows: Vec<RawRow> = CsvImporter::default()
            .read_rows_from(data.as_bytes())
            .unwrap()
            .collect::<ReconcileResult<_>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("date"), Some("2024-01-01"));
        assert_eq!(rows[0].get("payee"), Some("Coffee"));
        assert_eq!(rows[1].get("AMOUNT"), Some("10.00"));
        assert_eq!(rows[0].line(), 2);
        assert_eq!(rows[1].line(), 3);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let data = "Date,Amount,Payee,Memo\n2024-01-01,-5.00";
        let row = CsvImporter::default()
            .read_rows_from(data.as_bytes())
            .unwrap()
            .next()
            .unwrap()
            .unwrap();

        assert_eq!(row.get("payee"), Some(""));
        assert_eq!(row.get("memo"), Some(""));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let data = "Date;Amount\n2024-01-01;-5,00";
        let row = CsvImporter::new(';')
            .unwrap()
            .read_rows_from(data.as_bytes())
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(row.get("amount"), Some("-5,00"));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = CsvImporter::default()
            .read_rows(temp_dir.path().join("missing.csv"))
            .err()
            .unwrap();
        assert!(matches!(err, ReconcileError::FileNotFound(_)));
    }

    #[test]
    fn test_reads_from_file_lazily() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bank.csv");
        std::fs::write(&path, "date,amount\n2024-01-01,1.00\n2024-01-02,2.00\n").unwrap();

        let mut rows = CsvImporter::default().read_rows(&path).unwrap();
        assert_eq!(rows.next().unwrap().unwrap().get("amount"), Some("1.00"));
        assert_eq!(rows.next().unwrap().unwrap().get("amount"), Some("2.00"));
        assert!(rows.next().is_none());
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        assert!(CsvImporter::new('§').is_err());
    }
}
