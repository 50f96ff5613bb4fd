use std::time::Duration;

use medassist_core::{CLIENT_TIMEOUT_SECS, DEFAULT_API_URL, env_string};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// Base URL from `MEDASSIST_API_URL`, or the local default.
#[must_use]
pub fn api_url_from_env() -> String {
    env_string("MEDASSIST_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned())
}

/// Thin JSON wrapper over `reqwest` shared by both clients.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(CLIENT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ClientError::ClientInit(e.to_string()))?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let response =
            self.client.get(format!("{}{path}", self.base_url)).query(query).send().await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response =
            self.client.post(format!("{}{path}", self.base_url)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::HttpStatus { code: status.as_u16(), message: error_message(&body) })
    }
}

/// The `error` field of a JSON error body, or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(ToOwned::to_owned))
        .unwrap_or_else(|| body.to_owned())
}
