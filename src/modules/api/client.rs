//! HTTP client for the maintenance reporting REST backend
//!
//! Every request carries the static API key. Classification status fetches
//! separate "not classified yet" from real failures so the long-poll can
//! tell them apart.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use uuid::Uuid;

use crate::core::config::ApiConfig;
use crate::core::error::{AppError, Result};
use crate::features::catalog::ReportCatalog;
use crate::features::submissions::dtos::SubmissionPatch;
use crate::features::submissions::models::{Submission, SubmissionStatus};
use crate::shared::constants::API_KEY_HEADER;

/// Result of one classification status fetch
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationStatus {
    /// The backend has classified the picture
    Ready(Box<Submission>),
    /// No record yet (404) or still processing (202)
    Pending,
    /// Server-side or transport failure worth retrying
    Retryable(String),
}

/// Backend operations both flows depend on
#[async_trait]
pub trait MaintenanceApi: Send + Sync {
    /// `GET /reports`
    async fn list_reports(&self) -> Result<ReportCatalog>;

    /// `GET /submissions?status={status}`
    async fn list_submissions(&self, status: SubmissionStatus) -> Result<Vec<Submission>>;

    /// `GET /submission/{id}`
    ///
    /// Client errors other than 404 are permanent and come back as
    /// `ClassificationUnavailable`.
    async fn fetch_classification(&self, id: Uuid) -> Result<ClassificationStatus>;

    /// `PATCH /submission/{id}` with action `submit`
    async fn submit(&self, id: Uuid, patch: SubmissionPatch) -> Result<Submission>;

    /// `PATCH /submission/{id}` with action `resolve`
    async fn resolve(&self, id: Uuid) -> Result<()>;
}

pub struct HttpMaintenanceApi {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl HttpMaintenanceApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(concat!("maint-report/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a PATCH and return the raw response body
    async fn patch(
        &self,
        id: Uuid,
        patch: &SubmissionPatch,
    ) -> std::result::Result<String, String> {
        let url = self.url(&format!("/submission/{}", id));

        tracing::debug!("PATCH {} action={}", url, patch.action());

        let response = self
            .http_client
            .patch(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(patch)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            tracing::error!("Backend API error: HTTP {} - {}", status, body);
            return Err(format!("HTTP {} - {}", status, body));
        }

        Ok(body)
    }
}

#[async_trait]
impl MaintenanceApi for HttpMaintenanceApi {
    async fn list_reports(&self) -> Result<ReportCatalog> {
        let url = self.url("/reports");

        tracing::debug!("Fetching report catalog: {}", url);

        let response = self
            .http_client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch reports: {}", e);
                AppError::ExternalServiceError(format!("Failed to fetch reports: {}", e))
            })?;

        // An empty catalog is reported as 404
        if response.status() == StatusCode::NOT_FOUND {
            tracing::warn!("Backend has no report types configured");
            return Ok(ReportCatalog::default());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Backend API error: HTTP {} - {}", status, body);
            return Err(AppError::ExternalServiceError(format!(
                "Failed to fetch reports: HTTP {} - {}",
                status, body
            )));
        }

        response.json::<ReportCatalog>().await.map_err(|e| {
            tracing::error!("Failed to parse reports response: {}", e);
            AppError::ExternalServiceError(format!("Failed to parse reports response: {}", e))
        })
    }

    async fn list_submissions(&self, status: SubmissionStatus) -> Result<Vec<Submission>> {
        let url = self.url(&format!("/submissions?status={}", status.as_str()));

        tracing::debug!("Fetching submissions: {}", url);

        let response = self
            .http_client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch submissions: {}", e);
                AppError::ExternalServiceError(format!("Failed to fetch submissions: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Backend API error: HTTP {} - {}", status, body);
            return Err(AppError::ExternalServiceError(format!(
                "Failed to fetch submissions: HTTP {} - {}",
                status, body
            )));
        }

        response.json::<Vec<Submission>>().await.map_err(|e| {
            tracing::error!("Failed to parse submissions response: {}", e);
            AppError::ExternalServiceError(format!("Failed to parse submissions response: {}", e))
        })
    }

    async fn fetch_classification(&self, id: Uuid) -> Result<ClassificationStatus> {
        let url = self.url(&format!("/submission/{}", id));

        let response = match self
            .http_client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Classification fetch for {} failed: {}", id, e);
                return Ok(ClassificationStatus::Retryable(e.to_string()));
            }
        };

        let status = response.status();
        match status {
            StatusCode::OK => {
                let submission = response.json::<Submission>().await.map_err(|e| {
                    tracing::error!("Failed to parse submission {}: {}", id, e);
                    AppError::ExternalServiceError(format!(
                        "Failed to parse submission response: {}",
                        e
                    ))
                })?;
                Ok(ClassificationStatus::Ready(Box::new(submission)))
            }
            StatusCode::NOT_FOUND | StatusCode::ACCEPTED => Ok(ClassificationStatus::Pending),
            s if s.is_server_error() => {
                tracing::warn!("Classification fetch for {} returned HTTP {}", id, s);
                Ok(ClassificationStatus::Retryable(format!("HTTP {}", s)))
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                tracing::error!("Classification fetch for {} rejected: HTTP {} - {}", id, s, body);
                Err(AppError::ClassificationUnavailable { status: s.as_u16() })
            }
        }
    }

    async fn submit(&self, id: Uuid, patch: SubmissionPatch) -> Result<Submission> {
        let body = self
            .patch(id, &patch)
            .await
            .map_err(AppError::SubmitFailure)?;

        serde_json::from_str::<Submission>(&body).map_err(|e| {
            tracing::error!("Failed to parse submit response: {}", e);
            AppError::SubmitFailure(format!("Failed to parse submit response: {}", e))
        })
    }

    async fn resolve(&self, id: Uuid) -> Result<()> {
        self.patch(id, &SubmissionPatch::Resolve)
            .await
            .map_err(AppError::ResolveFailure)?;

        tracing::info!("Resolved submission {}", id);
        Ok(())
    }
}
