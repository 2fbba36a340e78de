use std::path::Path;

use base64::Engine;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use ring::signature::RsaKeyPair;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::client::read_response_text;
use crate::errors::{Result, SheetsError};

/// Read and write access to spreadsheets.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// The subset of a service account key file that we need.
#[derive(Debug, Deserialize)]
pub struct ServiceAccount {
    client_email: String,
    private_key: String,
    token_uri: String,
    #[serde(default)]
    private_key_id: Option<String>,
}

#[derive(Serialize)]
struct JwtHeader<'a> {
    alg: &'static str,
    typ: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: u64,
}

impl ServiceAccount {
    pub fn try_from_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|e| {
            SheetsError::InvalidCredentials(format!(
                "Failed to deserialize json service account key: {e}"
            ))
        })
    }

    /// Read a service account key from a file.
    pub async fn read_from_file(path: &Path) -> Result<Self> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| SheetsError::CredentialsFile {
                    path: path.to_path_buf(),
                    source,
                })?;
        Self::try_from_str(&contents)
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// Build a signed RS256 jwt asserting this service account, valid for an
    /// hour from `now`.
    pub fn signed_jwt(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = JwtClaims {
            iss: &self.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let header = JwtHeader {
            alg: "RS256",
            typ: "JWT",
            kid: self.private_key_id.as_deref(),
        };

        let header_b64 = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_string(&header)?);
        let claims_b64 = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_string(&claims)?);
        let signing_input = format!("{header_b64}.{claims_b64}");

        let key_pair = self.key_pair()?;

        // Sign with PKCS#1 v1.5 SHA-256 (RS256)
        let mut signature = vec![0; key_pair.public().modulus_len()];
        key_pair
            .sign(
                &ring::signature::RSA_PKCS1_SHA256,
                &ring::rand::SystemRandom::new(),
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| SheetsError::InvalidCredentials("Failed to sign jwt".to_string()))?;

        let sig_b64 = BASE64_URL_SAFE_NO_PAD.encode(&signature);
        Ok(format!("{signing_input}.{sig_b64}"))
    }

    fn key_pair(&self) -> Result<RsaKeyPair> {
        let mut reader = std::io::Cursor::new(self.private_key.as_bytes());
        let key = rustls_pemfile::read_one(&mut reader).map_err(|e| {
            SheetsError::InvalidCredentials(format!("Invalid PEM private key: {e}"))
        })?;

        match key {
            Some(rustls_pemfile::Item::Pkcs8Key(der)) => {
                RsaKeyPair::from_pkcs8(der.secret_pkcs8_der()).map_err(|e| {
                    SheetsError::InvalidCredentials(format!(
                        "Failed to create rsa key pair from pkcs8 key: {e}"
                    ))
                })
            }
            Some(rustls_pemfile::Item::Pkcs1Key(der)) => {
                RsaKeyPair::from_der(der.secret_pkcs1_der()).map_err(|e| {
                    SheetsError::InvalidCredentials(format!(
                        "Failed to create rsa key pair from pkcs1 key: {e}"
                    ))
                })
            }
            _ => Err(SheetsError::InvalidCredentials(
                "Missing private key".to_string(),
            )),
        }
    }

    /// Exchange a signed jwt for an access token.
    ///
    /// `token_uri` overrides the endpoint from the key file.
    pub async fn fetch_access_token(
        &self,
        http: &reqwest::Client,
        token_uri: Option<&Url>,
    ) -> Result<AccessToken> {
        let jwt = self.signed_jwt(Utc::now())?;
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", jwt.as_str()),
        ];
        let url = match token_uri {
            Some(url) => url.clone(),
            None => Url::parse(&self.token_uri)?,
        };
        debug!(%url, client_email = %self.client_email, "fetching access token");

        let body = serde_urlencoded::to_string(params)?;
        let resp = http
            .post(url)
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .body(body)
            .send()
            .await?;

        let text = read_response_text(resp).await?;
        let token: AccessToken = serde_json::from_str(&text)?;

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::Value;

    use super::*;

    const TEST_KEY: &str = include_str!("../tests/testdata/service_account_key.pem");

    fn test_account() -> ServiceAccount {
        let key = serde_json::json!({
            "type": "service_account",
            "project_id": "test-project",
            "private_key_id": "abc123",
            "private_key": TEST_KEY,
            "client_email": "proxy@test-project.iam.gserviceaccount.com",
            "token_uri": "https://oauth2.googleapis.com/token",
        });
        ServiceAccount::try_from_str(&key.to_string()).unwrap()
    }

    fn decode_segment(segment: &str) -> Value {
        let bytes = BASE64_URL_SAFE_NO_PAD.decode(segment).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn jwt_contents() {
        let account = test_account();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        let jwt = account.signed_jwt(now).unwrap();
        let segments: Vec<_> = jwt.split('.').collect();
        assert_eq!(3, segments.len());

        let header = decode_segment(segments[0]);
        assert_eq!("RS256", header["alg"]);
        assert_eq!("abc123", header["kid"]);

        let claims = decode_segment(segments[1]);
        assert_eq!(
            "proxy@test-project.iam.gserviceaccount.com",
            claims["iss"]
        );
        assert_eq!(SPREADSHEETS_SCOPE, claims["scope"]);
        assert_eq!("https://oauth2.googleapis.com/token", claims["aud"]);
        assert_eq!(now.timestamp(), claims["iat"].as_i64().unwrap());
        assert_eq!(now.timestamp() + 3600, claims["exp"].as_i64().unwrap());

        // 2048 bit key.
        let sig = BASE64_URL_SAFE_NO_PAD.decode(segments[2]).unwrap();
        assert_eq!(256, sig.len());
    }

    #[test]
    fn missing_fields() {
        let err = ServiceAccount::try_from_str(r#"{"client_email": "a@b.c"}"#).unwrap_err();
        assert!(matches!(err, SheetsError::InvalidCredentials(_)));
    }

    #[test]
    fn bad_private_key() {
        let key = serde_json::json!({
            "private_key": "not a key",
            "client_email": "a@b.c",
            "token_uri": "https://oauth2.googleapis.com/token",
        });
        let account = ServiceAccount::try_from_str(&key.to_string()).unwrap();
        let err = account.signed_jwt(Utc::now()).unwrap_err();
        assert!(matches!(err, SheetsError::InvalidCredentials(_)));
    }

    #[tokio::test]
    async fn missing_file() {
        let err = ServiceAccount::read_from_file(Path::new("/does/not/exist.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, SheetsError::CredentialsFile { .. }));
        assert!(err.to_string().contains("/does/not/exist.json"));
    }
}
