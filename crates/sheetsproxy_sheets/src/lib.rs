//! Row level access to Google Sheets worksheets.
//!
//! A worksheet is resolved fresh for every [`SpreadsheetBackend::open`] call.
//! Nothing is cached between calls, including the access token.
pub mod a1;
pub mod client;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod remote;
pub mod worksheet;

pub use config::SheetsConfig;
pub use errors::{Result, SheetsError};
pub use remote::GoogleSheetsBackend;
pub use worksheet::{CellUpdate, CellValue, Row, SpreadsheetBackend, SpreadsheetRef, Worksheet};
