use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use serde::Serialize;
use sheetsproxy_sheets::{CellUpdate, CellValue, Row};
use tracing::{debug, info};

use crate::envelope::Envelope;
use crate::errors::{ServiceError, ServiceResult};
use crate::params::{
    parse_body, parse_query, validate_append_params, validate_get_params, validate_patch_params,
    validate_search_params,
};
use crate::server::ServerState;

/// A single written cell range, as reported back to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedUpdate {
    pub range: String,
    pub values: Vec<Vec<CellValue>>,
}

impl From<&CellUpdate> for AppliedUpdate {
    fn from(update: &CellUpdate) -> Self {
        AppliedUpdate {
            range: update.range(),
            values: vec![vec![update.value.clone()]],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AppendedRows {
    pub row: Vec<Row>,
}

#[derive(Debug, Serialize)]
pub struct PatchedRow {
    pub updates: Vec<AppliedUpdate>,
}

#[derive(Debug, Serialize)]
pub struct RowContents {
    pub row: Row,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub rows: Vec<Row>,
}

pub async fn healthz() -> &'static str {
    "OK"
}

pub async fn not_found() -> (StatusCode, Json<Envelope<()>>) {
    (StatusCode::NOT_FOUND, Envelope::error("404 - Not Found"))
}

pub async fn method_not_allowed() -> (StatusCode, Json<Envelope<()>>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Envelope::error("405 - Method Not Allowed"),
    )
}

/// POST /rows
pub async fn append_rows(
    State(state): State<Arc<ServerState>>,
    body: Result<Bytes, BytesRejection>,
) -> ServiceResult<Json<Envelope<AppendedRows>>> {
    let body = body.map_err(ServiceError::BodyRejected)?;
    let result = async {
        let params = validate_append_params(&parse_body(&body)?)?;

        let sheet = state.backend.open(&params.sheet).await?;
        sheet.append_rows(&params.row_values).await?;
        info!(rows = params.row_values.len(), title = %sheet.title(), "appended rows");

        Ok::<_, ServiceError>(Envelope::success(AppendedRows {
            row: params.row_values,
        }))
    }
    .await;

    if result.is_err() {
        debug!(body = %String::from_utf8_lossy(&body), "append failed");
    }

    result
}

/// PATCH /rows/:row_id
pub async fn patch_row(
    State(state): State<Arc<ServerState>>,
    Path(row_id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> ServiceResult<Json<Envelope<PatchedRow>>> {
    let body = body.map_err(ServiceError::BodyRejected)?;
    let params = validate_patch_params(&parse_body(&body)?)?;

    let sheet = state.backend.open(&params.sheet).await?;
    let row = sheet.find_row(&params.id_column_label, &row_id).await?;

    let updates: Vec<_> = params
        .label_value_map
        .into_iter()
        .map(|(column_label, value)| CellUpdate {
            column_label,
            row,
            value,
        })
        .collect();
    sheet.batch_update(&updates).await?;
    info!(%row_id, row, cells = updates.len(), "patched row");

    Ok(Envelope::success(PatchedRow {
        updates: updates.iter().map(AppliedUpdate::from).collect(),
    }))
}

/// GET /rows/:row_id
pub async fn get_row(
    State(state): State<Arc<ServerState>>,
    Path(row_id): Path<String>,
    RawQuery(query): RawQuery,
    body: Result<Bytes, BytesRejection>,
) -> ServiceResult<Json<Envelope<RowContents>>> {
    let body = body.map_err(ServiceError::BodyRejected)?;
    let params = validate_get_params(&parse_query(query.as_deref(), &body)?)?;

    let sheet = state.backend.open(&params.sheet).await?;
    let row = sheet.find_row(&params.id_column_label, &row_id).await?;
    let contents = sheet.read_row(row).await?;

    Ok(Envelope::success(RowContents { row: contents }))
}

/// GET /rows
///
/// Row width is taken from the first (header) row. Matched rows are read
/// across that many columns, anything past it is dropped.
pub async fn search_rows(
    State(state): State<Arc<ServerState>>,
    RawQuery(query): RawQuery,
    body: Result<Bytes, BytesRejection>,
) -> ServiceResult<Json<Envelope<SearchResults>>> {
    let body = body.map_err(ServiceError::BodyRejected)?;
    let params = validate_search_params(&parse_query(query.as_deref(), &body)?)?;

    let sheet = state.backend.open(&params.sheet).await?;
    let rows = sheet
        .find_all_rows(&params.column_label, &params.value)
        .await?;
    if rows.is_empty() {
        return Err(ServiceError::RowNotFound {
            column_label: params.column_label,
            value: params.value,
        });
    }

    let last_column = sheet.read_row(1).await?.len() as u32;
    let contents = sheet.read_rows(&rows, last_column).await?;
    debug!(matches = rows.len(), last_column, "search complete");

    Ok(Envelope::success(SearchResults { rows: contents }))
}
