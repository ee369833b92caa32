use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::ClientConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("http status {status}: {message}")]
    HttpStatus { status: u16, message: String },
    /// The backend answered with `success: false`.
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("could not save download: {0}")]
    Persist(String),
}

impl ApiError {
    /// Text suitable for a notification: the server's message when it sent
    /// one, a generic fallback otherwise.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::HttpStatus { message, .. } | ApiError::Rejected(message)
                if !message.is_empty() =>
            {
                message.clone()
            }
            ApiError::Timeout => "The server took too long to respond.".to_string(),
            ApiError::Network(_) => "Could not reach the server.".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// Standard response wrapper used by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct PageEnvelope<T> {
    success: bool,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    page: u32,
    #[serde(default)]
    per_page: u32,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    total_pages: u32,
}

/// One page of a paginated list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub per_page: u32,
    pub has_more: bool,
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
    pub search: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            search: None,
        }
    }
}

impl PageRequest {
    pub(crate) fn apply(&self, url: &mut Url) {
        let mut query = url.query_pairs_mut();
        query.append_pair("page", &self.page.to_string());
        query.append_pair("per_page", &self.per_page.to_string());
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query.append_pair("search", search.trim());
        }
    }
}

/// Thin typed client over the backend's JSON API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn url(&self, segments: &[&str]) -> Url {
        self.config.api_url(segments)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let bytes = self.execute(self.request(Method::GET, url)).await?;
        decode_data(&bytes)
    }

    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        mut url: Url,
        page: &PageRequest,
    ) -> Result<Page<T>, ApiError> {
        page.apply(&mut url);
        let bytes = self.execute(self.request(Method::GET, url)).await?;
        let envelope: PageEnvelope<T> =
            serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))?;
        if !envelope.success {
            return Err(rejected(envelope.message));
        }
        Ok(Page {
            items: envelope.data,
            total_count: envelope.total_count,
            page: envelope.page,
            per_page: envelope.per_page,
            has_more: envelope.has_more,
            total_pages: envelope.total_pages,
        })
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body =
            serde_json::to_vec(body).map_err(|err| ApiError::InvalidRequest(err.to_string()))?;
        let request = self
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let bytes = self.execute(request).await?;
        decode_data(&bytes)
    }

    /// For endpoints whose `data` carries nothing the caller needs.
    pub(crate) async fn delete(&self, url: Url) -> Result<(), ApiError> {
        let bytes = self.execute(self.request(Method::DELETE, url)).await?;
        if bytes.is_empty() {
            return Ok(());
        }
        let envelope: ApiEnvelope<Value> =
            serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))?;
        if envelope.success {
            Ok(())
        } else {
            Err(rejected(envelope.message))
        }
    }

    /// Fetches a binary body, streaming it into memory.
    pub(crate) async fn get_bytes(&self, url: Url) -> Result<Vec<u8>, ApiError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(ACCEPT, "application/json")
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(status_error(status, &bytes));
        }
        Ok(bytes.to_vec())
    }
}

fn decode_data<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let envelope: ApiEnvelope<T> =
        serde_json::from_slice(bytes).map_err(|err| ApiError::Decode(err.to_string()))?;
    if !envelope.success {
        return Err(rejected(envelope.message));
    }
    envelope
        .data
        .ok_or_else(|| ApiError::Decode("response has no data".to_string()))
}

fn rejected(message: Option<String>) -> ApiError {
    ApiError::Rejected(message.unwrap_or_else(|| "request failed".to_string()))
}

fn status_error(status: reqwest::StatusCode, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("detail"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| status.to_string());
    ApiError::HttpStatus {
        status: status.as_u16(),
        message,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    if err.is_builder() {
        return ApiError::InvalidRequest(err.to_string());
    }
    ApiError::Network(err.to_string())
}
