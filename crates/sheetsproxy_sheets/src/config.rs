use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const DEFAULT_API_URL: &str = "https://sheets.googleapis.com/v4/";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for connecting to the Sheets API.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// Path to the service account key file.
    ///
    /// Read on every open, so rotating the key on disk doesn't require a
    /// restart.
    pub credentials_path: PathBuf,
    /// Base url of the Sheets v4 API.
    pub api_url: Url,
    /// Token endpoint to use instead of the one in the service account key.
    pub token_uri: Option<Url>,
    /// Timeout applied to each request made to Google.
    pub request_timeout: Duration,
}

impl SheetsConfig {
    pub fn new(credentials_path: impl Into<PathBuf>) -> Self {
        SheetsConfig {
            credentials_path: credentials_path.into(),
            // Constant is a valid url.
            api_url: Url::parse(DEFAULT_API_URL).expect("default api url to be valid"),
            token_uri: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
