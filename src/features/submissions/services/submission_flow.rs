use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::config::PollConfig;
use crate::core::error::{AppError, Result};
use crate::features::catalog::ReportCatalog;
use crate::features::submissions::dtos::{SubmissionPatch, SubmissionReceipt};
use crate::features::submissions::models::{image_key, Submission};
use crate::features::submissions::services::{ClassificationPoller, Geolocator};
use crate::features::submissions::views::ClassificationView;
use crate::modules::api::MaintenanceApi;
use crate::modules::storage::{ObjectStore, ProgressFn, UploadProgress};
use crate::shared::constants::{MAX_IMAGE_BYTES, PROGRESS_LABEL_THRESHOLD};
use crate::shared::types::Coordinates;
use crate::shared::validation::new_submission_id;

/// A picture ready to be uploaded
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub content_type: String,
}

impl ImageUpload {
    pub fn new(data: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            data,
            content_type: content_type.into(),
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            AppError::Validation(format!("Cannot read image '{}': {}", path.display(), e))
        })?;

        let content_type = match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("heic") => "image/heic",
            _ => "application/octet-stream",
        };

        Ok(Self::new(data, content_type))
    }
}

/// Where one report is in its lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Uploading {
        id: Uuid,
    },
    Classifying {
        id: Uuid,
    },
    AwaitingUserConfirmation {
        submission: Box<Submission>,
        view: ClassificationView,
    },
    Submitting {
        id: Uuid,
    },
    Submitted {
        receipt: SubmissionReceipt,
    },
}

impl SubmissionState {
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Uploading { .. } => "uploading",
            SubmissionState::Classifying { .. } => "classifying",
            SubmissionState::AwaitingUserConfirmation { .. } => "awaiting confirmation",
            SubmissionState::Submitting { .. } => "submitting",
            SubmissionState::Submitted { .. } => "submitted",
        }
    }

    /// Id of the submission this state refers to, if any
    pub fn submission_id(&self) -> Option<Uuid> {
        match self {
            SubmissionState::Idle => None,
            SubmissionState::Uploading { id }
            | SubmissionState::Classifying { id }
            | SubmissionState::Submitting { id } => Some(*id),
            SubmissionState::AwaitingUserConfirmation { submission, .. } => Some(submission.id),
            SubmissionState::Submitted { receipt } => Some(receipt.submission_id),
        }
    }
}

/// Progress bar caption for an upload at `progress`
pub fn progress_label(progress: &UploadProgress) -> Option<&'static str> {
    (progress.percent() > PROGRESS_LABEL_THRESHOLD).then_some("Uploading")
}

/// Session context for reporting one issue at a time
///
/// Upload, classify and submit each move the flow one step forward.
/// Methods take `&mut self`, so at most one classification poll runs per
/// flow; a new upload cancels any poll left over from an earlier one.
pub struct SubmissionFlow {
    api: Arc<dyn MaintenanceApi>,
    store: Arc<dyn ObjectStore>,
    poller: ClassificationPoller,
    catalog: ReportCatalog,
    state: SubmissionState,
    cancel: CancellationToken,
}

impl SubmissionFlow {
    pub fn new(
        api: Arc<dyn MaintenanceApi>,
        store: Arc<dyn ObjectStore>,
        poll: PollConfig,
        catalog: ReportCatalog,
    ) -> Self {
        Self {
            poller: ClassificationPoller::new(Arc::clone(&api), poll),
            api,
            store,
            catalog,
            state: SubmissionState::Idle,
            cancel: CancellationToken::new(),
        }
    }

    /// Fetch the report catalog once and start an idle session
    pub async fn start(
        api: Arc<dyn MaintenanceApi>,
        store: Arc<dyn ObjectStore>,
        poll: PollConfig,
    ) -> Result<Self> {
        let catalog = api.list_reports().await?;
        tracing::info!("Loaded {} report types", catalog.len());
        Ok(Self::new(api, store, poll, catalog))
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn catalog(&self) -> &ReportCatalog {
        &self.catalog
    }

    /// Token that aborts the classification poll currently in flight
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Abandon the current report and return to `Idle`
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        if let Some(id) = self.state.submission_id() {
            tracing::info!("Abandoning submission {} while {}", id, self.state.name());
        }
        self.state = SubmissionState::Idle;
    }

    /// Idle → Uploading → Classifying
    pub async fn upload(
        &mut self,
        image: ImageUpload,
        on_progress: ProgressFn<'_>,
    ) -> Result<Uuid> {
        let abandons_report = match self.state {
            SubmissionState::Idle | SubmissionState::Submitted { .. } => false,
            SubmissionState::Classifying { .. } | SubmissionState::AwaitingUserConfirmation { .. } => {
                true
            }
            _ => return Err(self.invalid("upload")),
        };

        // A rejected picture leaves the current report alone
        if image.data.is_empty() {
            return Err(AppError::Validation("Image is empty".to_string()));
        }
        if image.data.len() as u64 > MAX_IMAGE_BYTES {
            return Err(AppError::Validation(format!(
                "Image is too large: {} bytes (limit {} bytes)",
                image.data.len(),
                MAX_IMAGE_BYTES
            )));
        }
        if abandons_report {
            self.cancel();
        }

        // Fresh token per report so a cancelled poll cannot leak into the next one
        self.cancel.cancel();
        self.cancel = CancellationToken::new();

        let id = new_submission_id();
        let key = image_key(id);
        self.state = SubmissionState::Uploading { id };
        tracing::info!("Uploading submission {} to '{}'", id, key);

        let result = self
            .store
            .upload(&key, image.data, &image.content_type, on_progress)
            .await;

        match result {
            Ok(()) => {
                tracing::info!("Upload of {} complete, waiting for classification", id);
                self.state = SubmissionState::Classifying { id };
                Ok(id)
            }
            Err(e) => {
                tracing::error!("Upload of {} failed: {}", id, e);
                self.state = SubmissionState::Idle;
                Err(match e {
                    AppError::UploadFailure(_) => e,
                    other => AppError::UploadFailure(other.to_string()),
                })
            }
        }
    }

    /// Classifying → AwaitingUserConfirmation
    pub async fn classify(&mut self) -> Result<ClassificationView> {
        let id = match self.state {
            SubmissionState::Classifying { id } => id,
            _ => return Err(self.invalid("classify")),
        };

        let cancel = self.cancel.clone();
        match self.poller.poll(id, &cancel).await {
            Ok(submission) => {
                let view = ClassificationView::build(&submission, &self.catalog);
                tracing::info!(
                    "Submission {} classified with {} suggestion(s)",
                    id,
                    view.suggested.len()
                );
                self.state = SubmissionState::AwaitingUserConfirmation {
                    submission: Box::new(submission),
                    view: view.clone(),
                };
                Ok(view)
            }
            Err(e) => {
                tracing::error!("Classification of {} failed: {}", id, e);
                self.state = SubmissionState::Idle;
                Err(e)
            }
        }
    }

    /// AwaitingUserConfirmation → Submitting → Submitted
    ///
    /// A failed location lookup submits `(0, 0)`. A failed PATCH leaves the
    /// user on the confirmation step so they can try again.
    pub async fn submit(
        &mut self,
        selected: Vec<String>,
        locator: &dyn Geolocator,
    ) -> Result<SubmissionReceipt> {
        let id = match &self.state {
            SubmissionState::AwaitingUserConfirmation { submission, .. } => submission.id,
            _ => return Err(self.invalid("submit")),
        };

        let selected = self.validate_selection(selected)?;

        let coords = match locator.locate().await {
            Ok(coords) => coords,
            Err(e) => {
                tracing::warn!("Geolocation failed for {}, submitting (0, 0): {}", id, e);
                Coordinates::ZERO
            }
        };

        let confirming = std::mem::replace(&mut self.state, SubmissionState::Submitting { id });
        let patch = SubmissionPatch::Submit {
            selected_reports: selected,
            coords,
        };

        match self.api.submit(id, patch).await {
            Ok(submission) => {
                let receipt = SubmissionReceipt {
                    submission_id: submission.id,
                    submitted_at: submission.timestamp_submitted,
                    coords,
                };
                tracing::info!("Submission {} received", submission.id);
                self.state = SubmissionState::Submitted {
                    receipt: receipt.clone(),
                };
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!("Submitting {} failed: {}", id, e);
                self.state = confirming;
                Err(match e {
                    AppError::SubmitFailure(_) => e,
                    other => AppError::SubmitFailure(other.to_string()),
                })
            }
        }
    }

    /// Non-empty, known to the catalog, duplicates dropped in order
    fn validate_selection(&self, selected: Vec<String>) -> Result<Vec<String>> {
        if selected.is_empty() {
            return Err(AppError::Validation(
                "Select at least one report type".to_string(),
            ));
        }

        let mut unique: Vec<String> = Vec::with_capacity(selected.len());
        for id in selected {
            if !self.catalog.contains(&id) {
                return Err(AppError::Validation(format!("Unknown report type '{}'", id)));
            }
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Ok(unique)
    }

    fn invalid(&self, action: &'static str) -> AppError {
        AppError::InvalidTransition {
            action,
            state: self.state.name().to_string(),
        }
    }
}
