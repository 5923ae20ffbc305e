//! Import of external transaction files

pub mod csv;

pub use self::csv::{CsvImporter, RawRow, RowIter};
