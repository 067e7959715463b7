//! Recommendation endpoint client
//!
//! One `POST` per user turn. The response is classified into the success
//! path (HTTP 200 with a recommendation body) or one of the
//! [`RecommendError`] variants.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{RecommendError, Result};
use crate::types::{RecommendRequest, RecommendationResult};

/// Header that keeps ngrok from answering with its HTML interstitial
pub const SKIP_BROWSER_WARNING_HEADER: &str = "ngrok-skip-browser-warning";

/// Anything that can turn a request into recommendations
#[async_trait]
pub trait RecommendClient: Send + Sync {
    async fn recommend(&self, request: &RecommendRequest) -> Result<RecommendationResult>;

    /// Endpoint description used in logs and error messages
    fn endpoint(&self) -> &str;
}

/// reqwest-backed client for the `/recommend-persona/` endpoint
pub struct HttpRecommendClient {
    endpoint: String,
    http_client: reqwest::Client,
    skip_browser_warning: bool,
}

impl HttpRecommendClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RecommendError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: config.endpoint.trim().to_string(),
            http_client,
            skip_browser_warning: config.skip_browser_warning,
        })
    }

    fn classify_transport(&self, error: reqwest::Error) -> RecommendError {
        if error.is_timeout() {
            RecommendError::Timeout {
                endpoint: self.endpoint.clone(),
            }
        } else if error.is_connect() {
            RecommendError::Connection {
                endpoint: self.endpoint.clone(),
                message: error.to_string(),
            }
        } else {
            RecommendError::Request(error.to_string())
        }
    }
}

impl std::fmt::Debug for HttpRecommendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRecommendClient")
            .field("endpoint", &self.endpoint)
            .field("skip_browser_warning", &self.skip_browser_warning)
            .finish()
    }
}

#[async_trait]
impl RecommendClient for HttpRecommendClient {
    async fn recommend(&self, request: &RecommendRequest) -> Result<RecommendationResult> {
        let started = Instant::now();
        debug!(
            endpoint = %self.endpoint,
            top_k = ?request.top_k,
            model = ?request.model_type,
            chars = request.free_text.chars().count(),
            "sending recommendation request"
        );

        let mut builder = self.http_client.post(&self.endpoint).json(request);
        if self.skip_browser_warning {
            builder = builder.header(SKIP_BROWSER_WARNING_HEADER, "true");
        }

        let response = builder.send().await.map_err(|e| {
            let error = self.classify_transport(e);
            warn!(endpoint = %self.endpoint, "recommendation request failed: {error}");
            error
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify_transport(e))?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if status != StatusCode::OK {
            warn!(
                endpoint = %self.endpoint,
                status = status.as_u16(),
                elapsed_ms,
                "recommendation endpoint returned an error status"
            );
            return Err(RecommendError::from_status(status.as_u16(), body));
        }

        let result: RecommendationResult = serde_json::from_str(&body).map_err(|e| {
            warn!(endpoint = %self.endpoint, elapsed_ms, "unparseable recommendation body: {e}");
            RecommendError::InvalidBody(e.to_string())
        })?;

        info!(
            endpoint = %self.endpoint,
            status = status.as_u16(),
            elapsed_ms,
            recs = result.recs.len(),
            model_used = result.model_used.as_deref().unwrap_or("-"),
            "recommendations received"
        );
        Ok(result)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
