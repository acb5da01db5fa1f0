use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{RevenueSheet, SheetError};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Refresh the cached access token once it is this close to expiry.
const TOKEN_SLACK_SECS: i64 = 60;

/// Google Sheets client authenticated with an injected service-account key.
///
/// The access token is fetched lazily on first use and cached for the life
/// of the process; every sheet operation acquires it through
/// [`GoogleSheet::access_token`].
pub struct GoogleSheet {
    client: reqwest::Client,
    spreadsheet_id: String,
    worksheet: String,
    client_email: String,
    token_uri: String,
    signing_key: EncodingKey,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl GoogleSheet {
    /// Load the service-account key from `path` and bind the client to one
    /// worksheet. Fails early on an unreadable or malformed key so a bad
    /// deployment is caught at startup, not on the first approval.
    pub fn from_credentials_file(
        path: &Path,
        spreadsheet_id: &str,
        worksheet: &str,
    ) -> Result<Self, SheetError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SheetError::Credentials(format!("{}: {}", path.display(), e)))?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|e| SheetError::Credentials(format!("{}: {}", path.display(), e)))?;

        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetError::Credentials(format!("invalid private key: {}", e)))?;

        Ok(Self {
            client: reqwest::Client::new(),
            spreadsheet_id: spreadsheet_id.to_string(),
            worksheet: worksheet.to_string(),
            client_email: key.client_email,
            token_uri: key.token_uri,
            signing_key,
            token: Mutex::new(None),
        })
    }

    /// Cached OAuth2 access token, refreshed via the signed JWT grant when
    /// absent or about to expire.
    async fn access_token(&self) -> Result<String, SheetError> {
        let mut slot = self.token.lock().await;

        if let Some(cached) = slot.as_ref() {
            if cached.expires_at - Utc::now() > Duration::seconds(TOKEN_SLACK_SECS) {
                return Ok(cached.value.clone());
            }
        }

        let now = Utc::now();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| SheetError::Auth(e.to_string()))?;

        let resp = self
            .client
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetError::Auth(format!("token endpoint {status}: {body}")));
        }

        let token: TokenResponse = resp.json().await?;
        debug!("Refreshed sheet access token for {}", self.client_email);

        let value = token.access_token.clone();
        *slot = Some(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        });

        Ok(value)
    }

    fn values_url(&self, range: &str) -> String {
        format!("{}/{}/values/{}", SHEETS_API, self.spreadsheet_id, range)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, SheetError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(SheetError::Api { status, body })
        }
    }
}

#[async_trait]
impl RevenueSheet for GoogleSheet {
    async fn all_rows(&self) -> Result<Vec<Vec<String>>, SheetError> {
        let token = self.access_token().await?;
        let resp = self
            .client
            .get(self.values_url(&self.worksheet))
            .bearer_auth(token)
            .send()
            .await?;

        let parsed: ValuesResponse = Self::check(resp).await?.json().await?;
        Ok(parsed.values)
    }

    async fn append_row(&self, cells: Vec<String>) -> Result<(), SheetError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS",
            self.values_url(&self.worksheet)
        );

        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "values": [cells] }))
            .send()
            .await?;

        Self::check(resp).await?;
        Ok(())
    }

    async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<(), SheetError> {
        let token = self.access_token().await?;
        let range = format!("{}!{}", self.worksheet, a1(row, col));
        let url = format!(
            "{}?valueInputOption=USER_ENTERED",
            self.values_url(&range)
        );

        let resp = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "values": [[value]] }))
            .send()
            .await?;

        Self::check(resp).await?;
        Ok(())
    }

    async fn read_cell(&self, row: usize, col: usize) -> Result<String, SheetError> {
        let token = self.access_token().await?;
        let range = format!("{}!{}", self.worksheet, a1(row, col));

        let resp = self
            .client
            .get(self.values_url(&range))
            .bearer_auth(token)
            .send()
            .await?;

        let parsed: ValuesResponse = Self::check(resp).await?.json().await?;
        let cell = parsed
            .values
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .unwrap_or_default();
        Ok(cell)
    }
}

/// 1-based (row, col) to A1 notation: (2, 6) -> "F2", (1, 27) -> "AA1".
fn a1(row: usize, col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    format!("{}{}", String::from_utf8_lossy(&letters), row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a1_covers_single_and_double_letters() {
        assert_eq!(a1(1, 1), "A1");
        assert_eq!(a1(2, 6), "F2");
        assert_eq!(a1(10, 26), "Z10");
        assert_eq!(a1(1, 27), "AA1");
        assert_eq!(a1(3, 52), "AZ3");
    }
}
