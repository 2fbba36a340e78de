//! Request parameter validation.
//!
//! Every operation checks the worksheet reference first, then its own
//! fields, in a fixed order. The first problem found is returned; errors are
//! never aggregated.

use serde_json::Value;
use sheetsproxy_sheets::a1::normalize_column_label;
use sheetsproxy_sheets::{CellValue, Row, SpreadsheetRef};

use crate::errors::{ServiceError, ServiceResult};

pub const SPREADSHEET_KEY: &str = "spreadsheet_key";
pub const WORKSHEET_TITLE: &str = "worksheet_title";
pub const ROW_VALUES: &str = "row_values";
pub const ID_COLUMN_LABEL: &str = "id_column_label";
pub const LABEL_VALUE_MAP: &str = "label_value_map";
pub const COLUMN_LABEL: &str = "column_label";
pub const VALUE: &str = "value";

/// Raw request parameters.
pub type Params = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct AppendParams {
    pub sheet: SpreadsheetRef,
    pub row_values: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatchParams {
    pub sheet: SpreadsheetRef,
    pub id_column_label: String,
    /// Column label to new value, in request order.
    pub label_value_map: Vec<(String, CellValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetParams {
    pub sheet: SpreadsheetRef,
    pub id_column_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub sheet: SpreadsheetRef,
    pub column_label: String,
    pub value: String,
}

/// Parse a json object body.
pub fn parse_body(body: &[u8]) -> ServiceResult<Params> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ServiceError::InvalidBody(e.to_string()))?;
    match value {
        Value::Object(params) => Ok(params),
        _ => Err(ServiceError::InvalidBody(
            "request body must be a JSON object".to_string(),
        )),
    }
}

/// Parse query string parameters.
///
/// Older clients send GET parameters as a json body. If a body is present,
/// its fields fill in anything missing from the query string.
pub fn parse_query(query: Option<&str>, body: &[u8]) -> ServiceResult<Params> {
    let mut params = if body.iter().all(u8::is_ascii_whitespace) {
        Params::new()
    } else {
        parse_body(body)?
    };

    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query.unwrap_or_default())
        .map_err(|e| ServiceError::InvalidBody(e.to_string()))?;
    for (key, value) in pairs {
        params.insert(key, Value::String(value));
    }

    Ok(params)
}

fn require<'a>(params: &'a Params, name: &'static str) -> ServiceResult<&'a Value> {
    match params.get(name) {
        None | Some(Value::Null) => Err(ServiceError::MissingParameter(name)),
        Some(value) => Ok(value),
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ServiceError {
    ServiceError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

fn require_string(params: &Params, name: &'static str) -> ServiceResult<String> {
    match require(params, name)? {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        Value::String(_) => Err(invalid(name, "must not be empty")),
        _ => Err(invalid(name, "must be a string")),
    }
}

fn require_column_label(params: &Params, name: &'static str) -> ServiceResult<String> {
    let label = require_string(params, name)?;
    normalize_column_label(&label).map_err(|e| invalid(name, e.to_string()))
}

fn check_cell(name: &'static str, value: &CellValue) -> ServiceResult<()> {
    match value {
        Value::Array(_) | Value::Object(_) => Err(invalid(
            name,
            "cell values must be strings, numbers, booleans or null",
        )),
        _ => Ok(()),
    }
}

/// Checks shared by every operation.
pub fn validate_sheet_params(params: &Params) -> ServiceResult<SpreadsheetRef> {
    let spreadsheet_key = require_string(params, SPREADSHEET_KEY)?;
    let worksheet_title = require_string(params, WORKSHEET_TITLE)?;
    Ok(SpreadsheetRef {
        spreadsheet_key,
        worksheet_title,
    })
}

pub fn validate_append_params(params: &Params) -> ServiceResult<AppendParams> {
    let sheet = validate_sheet_params(params)?;

    let rows = match require(params, ROW_VALUES)? {
        Value::Array(rows) => rows,
        _ => return Err(invalid(ROW_VALUES, "must be an array of rows")),
    };
    if rows.is_empty() {
        return Err(invalid(ROW_VALUES, "must contain at least one row"));
    }

    let mut row_values = Vec::with_capacity(rows.len());
    for row in rows {
        let Value::Array(cells) = row else {
            return Err(invalid(ROW_VALUES, "each row must be an array of cell values"));
        };
        for cell in cells {
            check_cell(ROW_VALUES, cell)?;
        }
        row_values.push(cells.clone());
    }

    Ok(AppendParams { sheet, row_values })
}

pub fn validate_patch_params(params: &Params) -> ServiceResult<PatchParams> {
    let sheet = validate_sheet_params(params)?;
    let id_column_label = require_column_label(params, ID_COLUMN_LABEL)?;

    let map = match require(params, LABEL_VALUE_MAP)? {
        Value::Object(map) => map,
        _ => return Err(invalid(LABEL_VALUE_MAP, "must be an object")),
    };
    if map.is_empty() {
        return Err(invalid(LABEL_VALUE_MAP, "must contain at least one column"));
    }

    let mut label_value_map = Vec::with_capacity(map.len());
    for (label, value) in map {
        let label = normalize_column_label(label)
            .map_err(|e| invalid(LABEL_VALUE_MAP, e.to_string()))?;
        if label_value_map.iter().any(|(existing, _)| *existing == label) {
            return Err(invalid(
                LABEL_VALUE_MAP,
                format!("column {label} given more than once"),
            ));
        }
        check_cell(LABEL_VALUE_MAP, value)?;
        label_value_map.push((label, value.clone()));
    }

    Ok(PatchParams {
        sheet,
        id_column_label,
        label_value_map,
    })
}

pub fn validate_get_params(params: &Params) -> ServiceResult<GetParams> {
    let sheet = validate_sheet_params(params)?;
    let id_column_label = require_column_label(params, ID_COLUMN_LABEL)?;
    Ok(GetParams {
        sheet,
        id_column_label,
    })
}

pub fn validate_search_params(params: &Params) -> ServiceResult<SearchParams> {
    let sheet = validate_sheet_params(params)?;
    let column_label = require_column_label(params, COLUMN_LABEL)?;

    let value = match require(params, VALUE)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return Err(invalid(VALUE, "must be a string")),
    };

    Ok(SearchParams {
        sheet,
        column_label,
        value,
    })
}
