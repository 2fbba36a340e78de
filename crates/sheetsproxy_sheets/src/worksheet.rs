use std::borrow::Cow;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::Serialize;

use crate::a1::cell_label;
use crate::errors::{Result, SheetsError};

/// Value of a single cell.
///
/// Values read back from a sheet are the formatted strings; values written
/// may be any json scalar.
pub type CellValue = serde_json::Value;

/// Full or partial row contents, ordered by column.
pub type Row = Vec<CellValue>;

/// Identifies one worksheet inside one spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetRef {
    pub spreadsheet_key: String,
    pub worksheet_title: String,
}

/// A write of a single cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellUpdate {
    pub column_label: String,
    pub row: u32,
    pub value: CellValue,
}

impl CellUpdate {
    /// Cell label relative to the worksheet, e.g. `B21`.
    pub fn range(&self) -> String {
        cell_label(&self.column_label, self.row)
    }
}

/// Text of a cell as used for matching.
pub fn cell_text(value: &CellValue) -> Cow<'_, str> {
    match value {
        CellValue::String(s) => Cow::Borrowed(s.as_str()),
        CellValue::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// Row numbers (1-based) of the cells in `column` equal to `needle`.
///
/// `column` is a single column as returned by the backend, one inner vec per
/// row. Blank rows are empty vecs.
pub fn matching_rows(column: &[Row], needle: &str) -> Vec<u32> {
    column
        .iter()
        .enumerate()
        .filter(|(_, row)| row.first().is_some_and(|cell| cell_text(cell) == needle))
        .map(|(idx, _)| idx as u32 + 1)
        .collect()
}

/// Opens worksheets.
#[async_trait]
pub trait SpreadsheetBackend: Sync + Send + Debug {
    /// Resolve a worksheet, authenticating from scratch.
    async fn open(&self, reference: &SpreadsheetRef) -> Result<Box<dyn Worksheet>>;
}

/// Row level operations on a single open worksheet.
///
/// Column labels passed in are expected to be normalized (upper case).
#[async_trait]
pub trait Worksheet: Sync + Send + Debug {
    fn title(&self) -> &str;

    /// Find all rows whose cell in `column_label` is exactly `value`, in
    /// ascending row order.
    async fn find_all_rows(&self, column_label: &str, value: &str) -> Result<Vec<u32>>;

    /// Find the first row whose cell in `column_label` is exactly `value`.
    async fn find_row(&self, column_label: &str, value: &str) -> Result<u32> {
        let rows = self.find_all_rows(column_label, value).await?;
        rows.first()
            .copied()
            .ok_or_else(|| SheetsError::RowNotFound {
                column_label: column_label.to_string(),
                value: value.to_string(),
            })
    }

    /// Read the contents of a row.
    async fn read_row(&self, row: u32) -> Result<Row>;

    /// Read columns `1..=last_column` of each row in a single round trip.
    ///
    /// Output order matches `rows`.
    async fn read_rows(&self, rows: &[u32], last_column: u32) -> Result<Vec<Row>>;

    /// Append rows after the last occupied row.
    async fn append_rows(&self, rows: &[Row]) -> Result<()>;

    /// Apply all cell writes in a single round trip.
    async fn batch_update(&self, updates: &[CellUpdate]) -> Result<()>;
}
