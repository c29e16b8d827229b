//! Client for the remote carbon service.
//!
//! Handles:
//! - Per-category create requests (`/transport`, `/food`, `/energy`)
//! - Scoring of a full activity record (`/demo-run`)

use crate::errors::ApiError;
use crate::models::{ActivityRecord, CategoryPayload, ScoreResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

pub const SCORE_ENDPOINT: &str = "/demo-run";

#[async_trait]
pub trait CarbonApi: Send + Sync {
    /// Full URL a request for `endpoint` is sent to.
    fn endpoint_url(&self, endpoint: &str) -> String;

    /// Sends one category's raw values. Any HTTP status counts as settled;
    /// only transport failures are errors.
    async fn log_category(&self, payload: &CategoryPayload) -> Result<u16, ApiError>;

    async fn score(&self, record: &ActivityRecord) -> Result<ScoreResult, ApiError>;
}

#[derive(Clone)]
pub struct HttpCarbonApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCarbonApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CarbonApi for HttpCarbonApi {
    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn log_category(&self, payload: &CategoryPayload) -> Result<u16, ApiError> {
        let url = self.endpoint_url(payload.category().endpoint());
        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|source| ApiError::Unreachable {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(%url, status = status.as_u16(), "category logged");
        } else {
            warn!(%url, status = status.as_u16(), "category endpoint rejected payload");
        }
        Ok(status.as_u16())
    }

    async fn score(&self, record: &ActivityRecord) -> Result<ScoreResult, ApiError> {
        let url = self.endpoint_url(SCORE_ENDPOINT);
        let response = self
            .http
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|source| ApiError::Unreachable {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<ScoreResult>()
            .await
            .map_err(|e| ApiError::Malformed {
                url,
                reason: e.to_string(),
            })
    }
}
