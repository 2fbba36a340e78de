//! A1 notation arithmetic.
//!
//! Columns are labeled with bijective base-26 letters: `A` is column 1, `Z`
//! is 26, `AA` is 27. Rows are plain 1-based numbers.

use crate::errors::{Result, SheetsError};

/// Convert a column label into its 1-based index.
///
/// Labels are case-insensitive.
pub fn column_label_to_index(label: &str) -> Result<u32> {
    if label.is_empty() {
        return Err(SheetsError::InvalidColumnLabel(label.to_string()));
    }

    let mut index: u32 = 0;
    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(SheetsError::InvalidColumnLabel(label.to_string()));
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        index = index
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| SheetsError::InvalidColumnLabel(label.to_string()))?;
    }

    Ok(index)
}

/// Convert a 1-based column index into its label.
pub fn index_to_column_label(index: u32) -> Result<String> {
    if index == 0 {
        return Err(SheetsError::InvalidColumnIndex(index));
    }

    let mut letters = Vec::new();
    let mut rem = index;
    while rem > 0 {
        let digit = (rem - 1) % 26;
        letters.push(char::from(b'A' + digit as u8));
        rem = (rem - 1) / 26;
    }

    Ok(letters.iter().rev().collect())
}

/// Validate a column label, returning it upper cased.
pub fn normalize_column_label(label: &str) -> Result<String> {
    column_label_to_index(label)?;
    Ok(label.to_ascii_uppercase())
}

/// Label for a single cell, e.g. `B21`.
pub fn cell_label(column_label: &str, row: u32) -> String {
    format!("{column_label}{row}")
}

/// Quote a worksheet title for use in a range.
///
/// Single quotes inside the title are escaped by doubling them.
pub fn quoted_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Prefix a range with the worksheet it belongs to, e.g. `'Tab1'!B:B`.
pub fn absolute_range(title: &str, range: &str) -> String {
    format!("{}!{}", quoted_title(title), range)
}
