//! In-memory stand-ins for the backend, object store and marker layer

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use fake::Fake;
use serde_json::Value;
use tokio::time::Instant;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::catalog::{ReportCatalog, ReportType};
use crate::features::operator_map::MarkerLayer;
use crate::features::submissions::dtos::SubmissionPatch;
use crate::features::submissions::models::{Submission, SubmissionStatus};
use crate::modules::api::{ClassificationStatus, MaintenanceApi};
use crate::modules::storage::{ObjectStore, ProgressFn, UploadProgress};
use crate::shared::types::{Coordinates, Scores};

pub fn sample_catalog() -> ReportCatalog {
    let entry = |id: &'static str, name: &str, labels: &[&str]| {
        let labels = labels.iter().map(|l| l.to_string()).collect();
        (id, ReportType::new(name, labels))
    };
    [
        entry("report-pothole", "Pothole", &["Road", "Hole", "Asphalt"]),
        entry("report-graffiti", "Graffiti", &["Art", "Graffiti"]),
        entry("report-streetlight", "Broken Streetlight", &["Lamp", "Light"]),
        entry("report-sidewalk", "Damaged Sidewalk", &["Sidewalk", "Path"]),
        entry("report-trash", "Overflowing Trash", &["Trash", "Garbage"]),
    ]
    .into_iter()
    .collect()
}

/// A submitted report with suggestions, labels and both coordinate sources
pub fn sample_submitted(id: Uuid) -> Submission {
    Submission {
        id,
        status: SubmissionStatus::Submitted,
        coords_image: Coordinates::new(12.0, 34.0),
        coords_browser: Coordinates::new(40.0, -70.0),
        relevant_reports: [("report-pothole", 197.46), ("report-sidewalk", 55.56)]
            .into_iter()
            .collect::<Scores>(),
        ml_labels: [("Road", 99.91), ("Asphalt", 97.04), ("Tarmac", 97.04)]
            .into_iter()
            .collect::<Scores>(),
        selected_reports: vec!["report-pothole".to_string(), "report-sidewalk".to_string()],
        timestamp_submitted: Some(Utc.with_ymd_and_hms(2022, 3, 1, 18, 22, 9).unwrap()),
        timestamp_resolved: None,
    }
}

/// `sample_submitted` at a random spot with a random image location
pub fn random_submitted() -> Submission {
    let mut submission = sample_submitted(Uuid::new_v4());
    submission.coords_image = Coordinates::new(
        (-90.0..90.0f64).fake::<f64>(),
        (-180.0..180.0f64).fake::<f64>(),
    );
    submission
}

#[derive(Default)]
struct FakeApiState {
    catalog: Option<ReportCatalog>,
    submitted: Vec<Submission>,
    fetches: HashMap<Uuid, Vec<Instant>>,
    ready: HashMap<Uuid, (usize, Submission)>,
    transient: HashMap<Uuid, usize>,
    rejected: HashMap<Uuid, u16>,
    fail_submit: bool,
    fail_resolve: HashSet<Uuid>,
    patches: Vec<(Uuid, SubmissionPatch)>,
}

/// Backend double: classification stays pending unless told otherwise
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeApiState>,
}

impl FakeApi {
    pub fn with_data(catalog: ReportCatalog, submitted: Vec<Submission>) -> Self {
        let api = Self::default();
        {
            let mut state = api.state.lock().unwrap();
            state.catalog = Some(catalog);
            state.submitted = submitted;
        }
        api
    }

    /// The `attempt`-th fetch (1-based) and every later one returns `submission`
    pub fn ready_after(&self, id: Uuid, attempt: usize, submission: Submission) {
        self.state
            .lock()
            .unwrap()
            .ready
            .insert(id, (attempt, submission));
    }

    /// The first `count` fetches answer like a failing server
    pub fn fail_transiently(&self, id: Uuid, count: usize) {
        self.state.lock().unwrap().transient.insert(id, count);
    }

    pub fn reject_classification(&self, id: Uuid, status: u16) {
        self.state.lock().unwrap().rejected.insert(id, status);
    }

    pub fn fail_submit(&self, fail: bool) {
        self.state.lock().unwrap().fail_submit = fail;
    }

    pub fn fail_resolve(&self, id: Uuid) {
        self.state.lock().unwrap().fail_resolve.insert(id);
    }

    pub fn fetch_count(&self, id: Uuid) -> usize {
        self.fetch_times(id).len()
    }

    pub fn fetch_times(&self, id: Uuid) -> Vec<Instant> {
        self.state
            .lock()
            .unwrap()
            .fetches
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn patches(&self) -> Vec<(Uuid, SubmissionPatch)> {
        self.state.lock().unwrap().patches.clone()
    }
}

#[async_trait]
impl MaintenanceApi for FakeApi {
    async fn list_reports(&self) -> Result<ReportCatalog> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .catalog
            .clone()
            .unwrap_or_else(sample_catalog))
    }

    async fn list_submissions(&self, status: SubmissionStatus) -> Result<Vec<Submission>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .submitted
            .iter()
            .filter(|s| s.status == status)
            .cloned()
            .collect())
    }

    async fn fetch_classification(&self, id: Uuid) -> Result<ClassificationStatus> {
        let mut state = self.state.lock().unwrap();
        let attempts = {
            let times = state.fetches.entry(id).or_default();
            times.push(Instant::now());
            times.len()
        };

        if let Some(status) = state.rejected.get(&id) {
            return Err(AppError::ClassificationUnavailable { status: *status });
        }
        if attempts <= state.transient.get(&id).copied().unwrap_or(0) {
            return Ok(ClassificationStatus::Retryable("HTTP 503".to_string()));
        }
        match state.ready.get(&id) {
            Some((after, submission)) if attempts >= *after => {
                Ok(ClassificationStatus::Ready(Box::new(submission.clone())))
            }
            _ => Ok(ClassificationStatus::Pending),
        }
    }

    async fn submit(&self, id: Uuid, patch: SubmissionPatch) -> Result<Submission> {
        let mut state = self.state.lock().unwrap();
        state.patches.push((id, patch.clone()));
        if state.fail_submit {
            return Err(AppError::SubmitFailure("HTTP 500".to_string()));
        }

        let mut submission = state
            .ready
            .get(&id)
            .map(|(_, s)| s.clone())
            .unwrap_or_else(|| Submission::pending(id));
        if let SubmissionPatch::Submit {
            selected_reports,
            coords,
        } = patch
        {
            submission.selected_reports = selected_reports;
            submission.coords_browser = coords;
        }
        submission.status = SubmissionStatus::Submitted;
        submission.timestamp_submitted = Some(Utc.with_ymd_and_hms(2022, 3, 1, 18, 22, 9).unwrap());
        Ok(submission)
    }

    async fn resolve(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.patches.push((id, SubmissionPatch::Resolve));
        if state.fail_resolve.contains(&id) {
            return Err(AppError::ResolveFailure("HTTP 500".to_string()));
        }
        match state.submitted.iter_mut().find(|s| s.id == id) {
            Some(submission) => {
                submission.status = SubmissionStatus::Resolved;
                Ok(())
            }
            None => Err(AppError::ResolveFailure("Submission ID Not Found".to_string())),
        }
    }
}

/// Object store double that reports progress in quarters
#[derive(Default)]
pub struct FakeStore {
    uploads: Mutex<Vec<(String, usize, String)>>,
    fail: Mutex<bool>,
}

impl FakeStore {
    pub fn failing() -> Self {
        let store = Self::default();
        *store.fail.lock().unwrap() = true;
        store
    }

    /// `(key, byte count, content type)` per successful upload
    pub fn uploads(&self) -> Vec<(String, usize, String)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        on_progress: ProgressFn<'_>,
    ) -> Result<()> {
        let total = data.len() as u64;
        for quarter in 0..=4u64 {
            on_progress(UploadProgress {
                loaded: total * quarter / 4,
                total,
            });
            if quarter == 2 && *self.fail.lock().unwrap() {
                return Err(AppError::UploadFailure("NetworkingError".to_string()));
            }
        }
        self.uploads
            .lock()
            .unwrap()
            .push((key.to_string(), data.len(), content_type.to_string()));
        Ok(())
    }
}

/// Marker layer that keeps every FeatureCollection it was handed
#[derive(Default)]
pub struct RecordingLayer {
    pub renders: Vec<Value>,
}

impl MarkerLayer for RecordingLayer {
    fn set_data(&mut self, features: &Value) -> Result<()> {
        self.renders.push(features.clone());
        Ok(())
    }
}
