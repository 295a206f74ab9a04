use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::types::Coordinates;

/// Body of `PATCH /submission/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SubmissionPatch {
    /// Attach the user's selection and device location
    Submit {
        selected_reports: Vec<String>,
        coords: Coordinates,
    },
    /// Operator closes the submission
    Resolve,
}

impl SubmissionPatch {
    pub fn action(&self) -> &'static str {
        match self {
            SubmissionPatch::Submit { .. } => "submit",
            SubmissionPatch::Resolve => "resolve",
        }
    }
}

/// What the user is shown once the backend accepted a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReceipt {
    pub submission_id: Uuid,
    pub submitted_at: Option<DateTime<Utc>>,
    pub coords: Coordinates,
}

impl SubmissionReceipt {
    /// `MM/DD/YYYY @ h:mm:ss AM`, in UTC
    pub fn display_timestamp(&self) -> Option<String> {
        self.submitted_at
            .map(|ts| ts.format("%-m/%-d/%Y @ %-I:%M:%S %p").to_string())
    }
}
