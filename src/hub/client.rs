// Data hub HTTP client.
// Handles base URL resolution, timeouts, and response error mapping.

use std::time::Duration;

use reqwest::{
    Client, Response, StatusCode, Url,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::Serialize;

use crate::config::Config;
use crate::error::{HubError, Result};

use super::types::ErrorBody;

/// Client for the quick-start REST service.
#[derive(Debug, Clone)]
pub struct HubClient {
    client: Client,
    base: Url,
}

impl HubClient {
    /// Create a client for the configured service.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("quickstart-tui"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(HubError::Http)?;

        Ok(Self {
            client,
            base: config.base()?,
        })
    }

    /// Resolve a relative endpoint against the base URL.
    pub fn url(&self, endpoint: &str) -> Result<Url> {
        self.base
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| HubError::Other(format!("bad endpoint {}: {}", endpoint, e)))
    }

    /// Make a GET request.
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        let url = self.url(endpoint)?;
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await.map_err(HubError::Http)?;
        check_response(response).await
    }

    /// Make a POST request with a JSON body.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<Response> {
        let url = self.url(endpoint)?;
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(HubError::Http)?;
        check_response(response).await
    }
}

/// Check response status and convert errors.
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(HubError::NotFound(response.url().to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    Err(HubError::Service {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Pull the `message` field out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => body.trim().to_string(),
    }
}
