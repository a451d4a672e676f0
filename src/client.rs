//! HTTP Client Module
//!
//! Thin wrapper over `reqwest` for the Mottooth REST backend. Every request
//! picks up the stored bearer token; a 401 wipes the stored credentials.

use std::time::Duration;

use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::Listing;
use crate::storage::{DeviceStorage, StorageError, TOKEN_KEY, USER_ID_KEY};

/// API client for the Mottooth backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    storage: DeviceStorage,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str, timeout: Duration, storage: DeviceStorage) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Setup(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            client,
            storage,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn storage(&self) -> &DeviceStorage {
        &self.storage
    }

    /// GET a single JSON document
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(Method::GET, path, None::<&()>).await?;
        decode(response).await
    }

    /// GET a collection, unwrapping a paginated envelope if the backend sends one
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let response = self.send(Method::GET, path, None::<&()>).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let listing: Listing<T> =
            serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(listing.into_items())
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::POST, path, Some(body)).await?;
        decode(response).await
    }

    /// POST whose response body is not needed
    pub async fn post_discard<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.send(Method::POST, path, Some(body)).await?;
        Ok(())
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::PUT, path, Some(body)).await?;
        decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, None::<&()>).await?;
        Ok(())
    }

    /// Issue a request and turn non-2xx statuses into `ApiError::Http`
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = self.authorize(self.client.request(method.clone(), &url));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(response).await;

        if status == StatusCode::UNAUTHORIZED {
            self.clear_credentials();
        } else if status.is_server_error() {
            warn!("Server error on {} {}: {} {:?}", method, path, status, message);
        } else {
            debug!("{} {} failed with {}", method, path, status);
        }

        Err(ApiError::Http {
            status: status.as_u16(),
            message,
        })
    }

    /// Attach `Authorization: Bearer <token>` when a token is stored
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.storage.get_item(TOKEN_KEY) {
            Ok(Some(token)) if !token.is_empty() => request.bearer_auth(token),
            Ok(_) => request,
            Err(e) => {
                warn!("Failed to read stored token: {}", e);
                request
            }
        }
    }

    fn clear_credentials(&self) {
        match self.storage.multi_remove(&[TOKEN_KEY, USER_ID_KEY]) {
            Ok(()) => info!("Session expired. Stored credentials cleared"),
            Err(e) => warn!("Session expired but credentials could not be cleared: {}", e),
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Backend error bodies carry `message` or `error`
#[derive(Deserialize)]
struct ErrorResponse {
    message: Option<String>,
    error: Option<String>,
}

async fn error_message(response: Response) -> Option<String> {
    let text = response.text().await.ok()?;
    match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => body.message.or(body.error).filter(|m| !m.trim().is_empty()),
        Err(_) => {
            let trimmed = text.trim();
            (!trimmed.is_empty() && trimmed.len() <= 200).then(|| trimmed.to_string())
        }
    }
}

/// API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server responded with status {status}")]
    Http {
        status: u16,
        message: Option<String>,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("HTTP client setup failed: {0}")]
    Setup(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message sent by the backend, if any
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
