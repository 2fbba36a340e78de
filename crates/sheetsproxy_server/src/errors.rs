use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sheetsproxy_sheets::SheetsError;
use tracing::{error, warn};

use crate::envelope::Envelope;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Forbidden")]
    Forbidden,

    #[error("Missing {0} parameter in request")]
    MissingParameter(&'static str),

    #[error("Invalid {name} parameter in request: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Invalid request: {0}")]
    InvalidBody(String),

    #[error("Invalid request: {}", .0.body_text())]
    BodyRejected(BytesRejection),

    #[error("No row found with value '{value}' in column {column_label}")]
    RowNotFound { column_label: String, value: String },

    #[error(transparent)]
    Sheets(SheetsError),
}

impl From<SheetsError> for ServiceError {
    fn from(value: SheetsError) -> Self {
        match value {
            SheetsError::RowNotFound {
                column_label,
                value,
            } => ServiceError::RowNotFound {
                column_label,
                value,
            },
            other => ServiceError::Sheets(other),
        }
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::RowNotFound { .. } => StatusCode::NOT_FOUND,
            // Body couldn't be read at all, e.g. over the size limit.
            ServiceError::BodyRejected(rejection) => rejection.status(),
            // Validation failures have always been reported as 500. Keep it
            // that way, clients depend on it.
            ServiceError::MissingParameter(_)
            | ServiceError::InvalidParameter { .. }
            | ServiceError::InvalidBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Sheets(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ServiceError::Sheets(_) => error!(%status, error = ?self, "request failed"),
            _ => warn!(%status, error = ?self, "request rejected"),
        }

        (status, Envelope::error(self.to_string())).into_response()
    }
}

pub type ServiceResult<T, E = ServiceError> = std::result::Result<T, E>;
