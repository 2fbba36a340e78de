use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    #[error(transparent)]
    UrlEncode(#[from] serde_urlencoded::ser::Error),

    #[error("Failed to read credentials file '{}': {source}", path.display())]
    CredentialsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid service account credentials: {0}")]
    InvalidCredentials(String),

    #[error("Invalid API url: {0}")]
    InvalidApiUrl(String),

    #[error("APIError: [{code}]: {message}")]
    Api { code: u16, message: String },

    #[error("Request errored with status code: {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),

    #[error("Invalid column label: '{0}'")]
    InvalidColumnLabel(String),

    #[error("Invalid column index: {0}")]
    InvalidColumnIndex(u32),

    #[error("No row found with value '{value}' in column {column_label}")]
    RowNotFound { column_label: String, value: String },
}

pub type Result<T, E = SheetsError> = std::result::Result<T, E>;
