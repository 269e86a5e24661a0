//! # tinylink-rs
//!
//! Wire types and a small async client for the tinylink URL shortener.
//!
//! The server shares the request/response types defined here, so a client built
//! on this crate always speaks the same JSON as the service it talks to.
//!
//! ## Example
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), tinylink_rs::TinylinkApiError> {
//! use tinylink_rs::TinylinkApi;
//!
//! let api = TinylinkApi::new("http://localhost:8000");
//!
//! let code = api.shorten("https://example.com/very/long/url").await?;
//! let target = api.resolve(&code).await?;
//! assert_eq!(target.as_deref(), Some("https://example.com/very/long/url"));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Request payload for `POST /shorten`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortenRequest {
    /// The URL to be shortened.
    pub url: String,
}

/// Response of `POST /shorten`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenResponse {
    /// The short code now mapped to the submitted URL.
    pub short_url: String,
}

/// Response of `GET /get-link/{code}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLinkResponse {
    /// The target URL behind the code.
    pub url: String,
}

/// Response of the `GET /` liveness probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: String::from("OK"),
        }
    }
}

/// Full link record as returned by `GET /stats/{code}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    pub id: i32,
    pub code: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    /// Number of shorten requests that produced or returned this link.
    pub attempt_count: i32,
    /// Number of resolves of this link.
    pub click_count: i32,
}

/// Clicks of a link on one UTC calendar day, as returned by `GET /stats/{code}/clicks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClicks {
    pub date: NaiveDate,
    pub clicks: i32,
}

/// Errors that can occur when talking to a tinylink server.
#[derive(Debug, Error)]
pub enum TinylinkApiError {
    /// The configured endpoint could not be turned into a request URL.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    /// Sending the request failed or the server answered with an error status.
    #[error("Request error: {0}")]
    RequestError(String),
    /// The response body did not match the expected shape.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

/// A client for a tinylink server.
///
/// Lookups (`stats`, `resolve`, `daily_clicks`) return `Ok(None)` when the
/// server does not know the code.
#[derive(Clone)]
pub struct TinylinkApi {
    url: String,
    client: reqwest::Client,
}

impl TinylinkApi {
    /// Creates a client for the server at `url`, e.g. `http://localhost:8000`.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, TinylinkApiError> {
        Url::parse(&format!("{}{}", self.url, path))
            .map_err(|e| TinylinkApiError::ConfigurationError(e.to_string()))
    }

    /// Shortens `original_link` and returns its code.
    ///
    /// Submitting the same URL again returns the same code.
    pub async fn shorten(&self, original_link: &str) -> Result<String, TinylinkApiError> {
        let resp = self
            .client
            .post(self.endpoint("/shorten")?)
            .json(&ShortenRequest {
                url: original_link.to_string(),
            })
            .send()
            .await
            .map_err(|e| TinylinkApiError::RequestError(e.to_string()))?
            .error_for_status()
            .map_err(|e| TinylinkApiError::RequestError(e.to_string()))?
            .json::<ShortenResponse>()
            .await
            .map_err(|e| TinylinkApiError::DeserializationError(e.to_string()))?;

        Ok(resp.short_url)
    }

    /// Resolves `code` to its target URL. Counts as a click on the server.
    pub async fn resolve(&self, code: &str) -> Result<Option<String>, TinylinkApiError> {
        let resp: Option<ResolvedLinkResponse> =
            self.get_optional(&format!("/get-link/{code}")).await?;

        Ok(resp.map(|r| r.url))
    }

    pub async fn stats(&self, code: &str) -> Result<Option<LinkStats>, TinylinkApiError> {
        self.get_optional(&format!("/stats/{code}")).await
    }

    pub async fn daily_clicks(
        &self,
        code: &str,
    ) -> Result<Option<Vec<DailyClicks>>, TinylinkApiError> {
        self.get_optional(&format!("/stats/{code}/clicks")).await
    }

    pub async fn health(&self) -> Result<HealthResponse, TinylinkApiError> {
        self.get_optional("/")
            .await?
            .ok_or_else(|| TinylinkApiError::RequestError(String::from("health check not found")))
    }

    async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, TinylinkApiError> {
        let resp = self
            .client
            .get(self.endpoint(path)?)
            .send()
            .await
            .map_err(|e| TinylinkApiError::RequestError(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = resp
            .error_for_status()
            .map_err(|e| TinylinkApiError::RequestError(e.to_string()))?
            .json::<T>()
            .await
            .map_err(|e| TinylinkApiError::DeserializationError(e.to_string()))?;

        Ok(Some(body))
    }
}
