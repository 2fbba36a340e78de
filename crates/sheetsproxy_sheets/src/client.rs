use reqwest::{Client, Response};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::trace;
use url::Url;

use crate::errors::{Result, SheetsError};

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build the http client used for talking to Google.
pub fn build_http_client(timeout: std::time::Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(APP_USER_AGENT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Authorized client for a single spreadsheet session.
///
/// Holds a bearer token obtained for this session only.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl SheetsClient {
    pub fn new(http: Client, base_url: Url, token: String) -> Self {
        SheetsClient {
            http,
            base_url,
            token,
        }
    }

    /// Build a url of the form `<base>/spreadsheets/<key>/<segments...>`.
    ///
    /// Each segment is percent encoded as a single path segment.
    pub fn spreadsheet_url(&self, spreadsheet_key: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| SheetsError::InvalidApiUrl(self.base_url.to_string()))?;
            path.pop_if_empty().push("spreadsheets").push(spreadsheet_key);
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    pub async fn get<Q, R>(&self, url: Url, query: &Q) -> Result<R>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        trace!(%url, "GET");
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;
        let text = read_response_text(resp).await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn post<Q, B, R>(&self, url: Url, query: &Q, body: &B) -> Result<R>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        trace!(%url, "POST");
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .query(query)
            .json(body)
            .send()
            .await?;
        let text = read_response_text(resp).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Error body returned by Google APIs.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorDetail {
    /// Sheets API shape: `{"error": {"code": 404, "message": "..."}}`
    Api { code: u16, message: String },
    /// OAuth token endpoint shape: `{"error": "invalid_grant", "error_description": "..."}`
    OAuth(String),
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    #[serde(default)]
    error_description: Option<String>,
}

/// Read the body of a response, turning non-success statuses into errors.
pub async fn read_response_text(resp: Response) -> Result<String> {
    let status = resp.status();
    let text = resp.text().await?;
    trace!(%status, %text, "response");

    if status.is_success() {
        return Ok(text);
    }

    Err(decode_error_body(status, &text))
}

fn decode_error_body(status: reqwest::StatusCode, text: &str) -> SheetsError {
    match serde_json::from_str::<ApiErrorBody>(text) {
        Ok(ApiErrorBody {
            error: ApiErrorDetail::Api { code, message },
        }) => SheetsError::Api { code, message },
        Ok(ApiErrorBody {
            error: ApiErrorDetail::OAuth(error),
        }) => {
            let message = match serde_json::from_str::<OAuthErrorBody>(text) {
                Ok(OAuthErrorBody {
                    error_description: Some(desc),
                }) => format!("{error}: {desc}"),
                _ => error,
            };
            SheetsError::Api {
                code: status.as_u16(),
                message,
            }
        }
        Err(_) => SheetsError::HttpStatus(status),
    }
}
