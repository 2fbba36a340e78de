use std::path::PathBuf;

use axum::http::HeaderName;
use clap::Args;
use url::Url;

#[derive(Debug, Args)]
pub struct ServerArgs {
    /// TCP address to bind to for the HTTP interface.
    #[arg(short, long, value_parser, default_value_t = String::from("0.0.0.0:8000"))]
    pub bind: String,

    /// Shared secret clients must send with every row request.
    ///
    /// If unset, all row requests are rejected.
    #[arg(long, env = "ACCESS_KEY", hide_env_values = true, value_parser)]
    pub access_key: Option<String>,

    /// Header the access key is read from.
    #[arg(long, value_parser, default_value = "ACCESS_KEY")]
    pub access_key_header: HeaderName,

    /// Path to the GCP service account key used to access Google Sheets.
    ///
    /// The file is read for every request.
    #[arg(short, long, env = "GOOGLE_APPLICATION_CREDENTIALS", value_parser)]
    pub credentials_path: PathBuf,

    /// Timeout in seconds for each request made to Google.
    #[arg(long, value_parser, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Base url of the Sheets API.
    ///
    /// (Internal)
    ///
    /// Only useful for pointing the service at a fake during development.
    #[arg(long, hide = true, value_parser)]
    pub api_url: Option<Url>,

    /// Override the token endpoint from the service account key.
    ///
    /// (Internal)
    #[arg(long, hide = true, value_parser)]
    pub token_uri: Option<Url>,
}
