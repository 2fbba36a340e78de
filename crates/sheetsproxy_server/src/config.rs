use axum::http::HeaderName;
use sheetsproxy_sheets::SheetsConfig;

/// Header clients put the access key in by default.
pub const DEFAULT_ACCESS_KEY_HEADER: &str = "access_key";

/// Service wide configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Shared secret clients must present. When `None`, every gated request
    /// is rejected.
    pub access_key: Option<String>,
    /// Header carrying the shared secret.
    pub access_key_header: HeaderName,
    /// How to reach the spreadsheet backend.
    pub sheets: SheetsConfig,
}

impl ServiceConfig {
    pub fn new(access_key: Option<String>, sheets: SheetsConfig) -> Self {
        ServiceConfig {
            // An empty key would let through requests sending an empty header.
            access_key: access_key.filter(|key| !key.is_empty()),
            access_key_header: HeaderName::from_static(DEFAULT_ACCESS_KEY_HEADER),
            sheets,
        }
    }

    pub fn with_access_key_header(mut self, header: HeaderName) -> Self {
        self.access_key_header = header;
        self
    }
}
