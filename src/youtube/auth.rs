use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Tokens are treated as expired slightly ahead of their stated expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Authorized-user OAuth credentials, in the JSON layout the platform's
/// client libraries write to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_uri: Option<String>,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub expiry: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

impl Credentials {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AppError::Auth(format!(
                "no stored credentials at {}; complete the OAuth consent flow first",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = URL_SAFE
            .decode(encoded.trim())
            .map_err(|e| AppError::Auth(format!("credentials are not valid base64: {e}")))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn to_base64(&self) -> Result<String> {
        Ok(URL_SAFE.encode(serde_json::to_vec(self)?))
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        if self.token.is_none() {
            return false;
        }
        match self.expiry {
            Some(expiry) => now + TimeDelta::seconds(EXPIRY_SKEW_SECS) < expiry,
            None => true,
        }
    }

    /// Exchange the refresh token for a new access token. Fails when no
    /// refresh token is stored.
    pub async fn refresh(&mut self, default_token_uri: &str) -> Result<()> {
        let Some(refresh_token) = self.refresh_token.clone() else {
            return Err(AppError::Auth(
                "unable to refresh credentials: no refresh token stored".to_string(),
            ));
        };

        let token_uri = self
            .token_uri
            .clone()
            .unwrap_or_else(|| default_token_uri.to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let response = client
            .post(&token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AppError::Auth(format!("token refresh rejected: {error_text}")));
        }

        let token: TokenResponse = response.json().await?;
        self.token = Some(token.access_token);
        self.expiry = token
            .expires_in
            .map(|secs| Utc::now() + TimeDelta::seconds(secs));

        Ok(())
    }

    /// Refresh once if the access token is unusable. Returns whether a refresh happened.
    pub async fn ensure_valid(&mut self, default_token_uri: &str) -> Result<bool> {
        if self.is_valid(Utc::now()) {
            return Ok(false);
        }
        self.refresh(default_token_uri).await?;
        Ok(true)
    }

    pub fn access_token(&self) -> Result<String> {
        self.token
            .clone()
            .ok_or_else(|| AppError::Auth("credentials hold no access token".to_string()))
    }
}

/// Write the URL-safe base64 form of a credential JSON file next to it, for
/// pasting into the CI secret.
pub fn encode_credentials_file(json_path: &Path, export_path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(json_path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let encoded = URL_SAFE.encode(serde_json::to_vec(&value)?);
    std::fs::write(export_path, encoded)?;
    Ok(())
}
