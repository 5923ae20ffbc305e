//! Transaction normalization
//!
//! Converts remote API records and CSV rows into the common [`Transaction`]
//! shape. Pure: no I/O, no shared state. A record with a missing or
//! unparsable date or amount becomes a `MalformedRecord` error; batch
//! helpers collect those as skipped records instead of aborting.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ReconcileConfig;
use crate::error::{ReconcileError, ReconcileResult};
use crate::import::RawRow;
use crate::models::{Money, RemoteTransaction, Source, Transaction};

/// Date formats tried after the configured one
const FALLBACK_DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%d/%m/%Y", "%Y/%m/%d", "%d.%m.%Y",
];

/// Column mapping configuration for CSV rows
///
/// Each field names the CSV header holding that value. Unset fields fall
/// back to a header with the field's own name (`date`, `amount`, `payee`,
/// `memo`, `reference`, `outflow`, `inflow`). Header matching ignores case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub date: Option<String>,
    pub amount: Option<String>,
    /// Debit column, for exports that split amounts in two
    pub outflow: Option<String>,
    /// Credit column, for exports that split amounts in two
    pub inflow: Option<String>,
    pub payee: Option<String>,
    pub memo: Option<String>,
    /// Bank reference that may echo a remote id or import id
    pub reference: Option<String>,
    /// Date format string tried before the built-in list (e.g. "%d/%m/%Y")
    pub date_format: Option<String>,
    /// Flip signs (some banks export debits as positive numbers)
    pub invert_amounts: bool,
    /// Field delimiter
    pub delimiter: char,
    /// Decimal separator of amounts, `.` or `,`
    pub decimal_separator: char,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date: None,
            amount: None,
            outflow: None,
            inflow: None,
            payee: None,
            memo: None,
            reference: None,
            date_format: None,
            invert_amounts: false,
            delimiter: ',',
            decimal_separator: '.',
        }
    }
}

impl ColumnMapping {
    fn column<'a>(configured: &'a Option<String>, default: &'a str) -> &'a str {
        configured.as_deref().unwrap_or(default)
    }

    pub fn date_column(&self) -> &str {
        Self::column(&self.date, "date")
    }

    pub fn amount_column(&self) -> &str {
        Self::column(&self.amount, "amount")
    }

    pub fn outflow_column(&self) -> &str {
        Self::column(&self.outflow, "outflow")
    }

    pub fn inflow_column(&self) -> &str {
        Self::column(&self.inflow, "inflow")
    }

    pub fn payee_column(&self) -> &str {
        Self::column(&self.payee, "payee")
    }

    pub fn memo_column(&self) -> &str {
        Self::column(&self.memo, "memo")
    }

    pub fn reference_column(&self) -> &str {
        Self::column(&self.reference, "reference")
    }
}

/// A record that could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub source: Source,
    /// CSV file line, or 1-based position in the remote list
    pub row: usize,
    pub reason: String,
}

impl SkippedRecord {
    /// Record a recoverable error; fatal errors are handed back
    fn from_error(source: Source, err: ReconcileError) -> ReconcileResult<Self> {
        if err.is_fatal() {
            return Err(err);
        }
        match err {
            ReconcileError::MalformedRecord { row, reason } => Ok(Self { source, row, reason }),
            other => Err(other),
        }
    }
}

/// Output of normalizing a whole source
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub transactions: Vec<Transaction>,
    pub skipped: Vec<SkippedRecord>,
}

/// Converts raw records into normalized transactions
#[derive(Debug, Clone)]
pub struct Normalizer {
    mapping: ColumnMapping,
    decimal_places: u32,
}

impl Normalizer {
    /// Create a normalizer
    pub fn new(mapping: ColumnMapping, decimal_places: u32) -> Self {
        Self {
            mapping,
            decimal_places,
        }
    }

    /// Create a normalizer from run settings
    pub fn from_config(config: &ReconcileConfig) -> Self {
        Self::new(config.column_mapping.clone(), config.decimal_places)
    }

    pub fn decimal_places(&self) -> u32 {
        self.decimal_places
    }

    /// Normalize one remote record; `position` is its index in the list
    pub fn normalize_remote(
        &self,
        raw: &RemoteTransaction,
        position: usize,
    ) -> ReconcileResult<Transaction> {
        let row = position + 1;

        let date = NaiveDate::parse_from_str(raw.date.trim(), "%Y-%m-%d").map_err(|_| {
            ReconcileError::malformed(row, format!("Could not parse date: '{}'", raw.date))
        })?;

        let amount = Money::from_milliunits(raw.amount, self.decimal_places)
            .map_err(|e| ReconcileError::malformed(row, e.to_string()))?;

        Ok(Transaction {
            id: Some(raw.id.clone()),
            reference: non_empty(raw.import_id.as_deref()),
            date,
            amount,
            payee: raw.payee_name.as_deref().unwrap_or("").trim().to_string(),
            memo: non_empty(raw.memo.as_deref()),
            source: Source::Remote,
            position,
            line: None,
        })
    }

    /// Normalize every live remote record, collecting the malformed ones
    pub fn normalize_remote_all(
        &self,
        raws: &[RemoteTransaction],
    ) -> ReconcileResult<NormalizedBatch> {
        let mut batch = NormalizedBatch::default();

        for (position, raw) in raws.iter().enumerate().filter(|(_, raw)| !raw.deleted) {
            match self.normalize_remote(raw, position) {
                Ok(mut txn) => {
                    // Positions are dense so tie-breaks follow list order
                    txn.position = batch.transactions.len();
                    batch.transactions.push(txn);
                }
                Err(err) => {
                    let skipped = SkippedRecord::from_error(Source::Remote, err)?;
                    tracing::warn!("Skipping remote record {}: {}", skipped.row, skipped.reason);
                    batch.skipped.push(skipped);
                }
            }
        }

        Ok(batch)
    }

    /// Normalize one CSV row; `position` is its index among data rows
    pub fn normalize_row(&self, row: &RawRow, position: usize) -> ReconcileResult<Transaction> {
        let line = row.line();

        let date_str = required(row, self.mapping.date_column())
            .ok_or_else(|| ReconcileError::malformed(line, "Missing date"))?;
        let date = self
            .parse_date(date_str)
            .ok_or_else(|| ReconcileError::malformed(line, format!("Could not parse date: '{}'", date_str)))?;

        let amount = self.amount_from_row(row)?;
        let amount = if self.mapping.invert_amounts { -amount } else { amount };

        Ok(Transaction {
            id: None,
            reference: non_empty(row.get(self.mapping.reference_column())),
            date,
            amount,
            payee: row
                .get(self.mapping.payee_column())
                .unwrap_or("")
                .trim()
                .to_string(),
            memo: non_empty(row.get(self.mapping.memo_column())),
            source: Source::Imported,
            position,
            line: Some(line),
        })
    }

    /// Normalize a stream of CSV rows, collecting the malformed ones.
    ///
    /// Errors from the row source itself (unreadable file, broken CSV) are
    /// fatal and returned as-is.
    pub fn normalize_rows<I>(&self, rows: I) -> ReconcileResult<NormalizedBatch>
    where
        I: IntoIterator<Item = ReconcileResult<RawRow>>,
    {
        let mut batch = NormalizedBatch::default();

        for row in rows {
            let row = row?;
            match self.normalize_row(&row, batch.transactions.len()) {
                Ok(txn) => batch.transactions.push(txn),
                Err(err) => {
                    let skipped = SkippedRecord::from_error(Source::Imported, err)?;
                    tracing::warn!("Skipping CSV line {}: {}", skipped.row, skipped.reason);
                    batch.skipped.push(skipped);
                }
            }
        }

        Ok(batch)
    }

    fn amount_from_row(&self, row: &RawRow) -> ReconcileResult<Money> {
        let line = row.line();
        let separator = self.mapping.decimal_separator;
        let parse = |s: &str| {
            Money::parse_decimal_with(s, self.decimal_places, separator).map_err(|e| {
                ReconcileError::malformed(line, format!("Could not parse amount '{}': {}", s.trim(), e))
            })
        };

        if let Some(amount) = required(row, self.mapping.amount_column()) {
            return parse(amount);
        }

        let outflow = required(row, self.mapping.outflow_column());
        let inflow = required(row, self.mapping.inflow_column());
        if outflow.is_none() && inflow.is_none() {
            return Err(ReconcileError::malformed(line, "Missing amount"));
        }

        let outflow = outflow.map(parse).transpose()?.unwrap_or_default();
        let inflow = inflow.map(parse).transpose()?.unwrap_or_default();
        Ok(inflow.abs() - outflow.abs())
    }

    /// Parse a date string using the configured format, then common formats
    fn parse_date(&self, s: &str) -> Option<NaiveDate> {
        self.mapping
            .date_format
            .as_deref()
            .into_iter()
            .chain(FALLBACK_DATE_FORMATS)
            .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
    }
}

/// Render an amount back to the decimal form a CSV would carry
pub fn format_amount(amount: Money, decimal_places: u32) -> String {
    amount.to_decimal_string(decimal_places)
}

fn required<'a>(row: &'a RawRow, column: &str) -> Option<&'a str> {
    row.get(column).map(str::trim).filter(|v| !v.is_empty())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
