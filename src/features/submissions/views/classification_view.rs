use serde::Serialize;

use crate::features::catalog::ReportCatalog;
use crate::features::submissions::models::Submission;

pub const SUGGESTED_HEADING: &str = "Looks like you're reporting...";
pub const OTHER_HEADING: &str = "Something else?";
pub const OTHER_HEADING_NO_SUGGESTIONS: &str = "What are you reporting?";

/// One checkbox the user can tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOption {
    pub id: String,
    pub name: String,
    /// Confidence rounded to one decimal; only set for suggestions
    pub score: Option<String>,
}

/// Render-ready choices after classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationView {
    pub suggested_heading: &'static str,
    /// Backend suggestions, best match first
    pub suggested: Vec<ReportOption>,
    pub other_heading: &'static str,
    /// Every other catalog entry, in catalog order
    pub other: Vec<ReportOption>,
}

impl ClassificationView {
    pub fn build(submission: &Submission, catalog: &ReportCatalog) -> Self {
        let suggested: Vec<ReportOption> = submission
            .relevant_reports
            .ranked(None)
            .into_iter()
            .filter_map(|entry| match catalog.name_of(&entry.key) {
                Some(name) => Some(ReportOption {
                    id: entry.key,
                    name: name.to_string(),
                    score: Some(entry.score.to_string()),
                }),
                None => {
                    tracing::warn!(
                        "Submission {} suggests unknown report type {}",
                        submission.id,
                        entry.key
                    );
                    None
                }
            })
            .collect();

        let other = catalog
            .iter()
            .filter(|(id, _)| !submission.relevant_reports.contains_key(id))
            .map(|(id, report)| ReportOption {
                id: id.to_string(),
                name: report.name.clone(),
                score: None,
            })
            .collect();

        let other_heading = if submission.relevant_reports.is_empty() {
            OTHER_HEADING_NO_SUGGESTIONS
        } else {
            OTHER_HEADING
        };

        Self {
            suggested_heading: SUGGESTED_HEADING,
            suggested,
            other_heading,
            other,
        }
    }

    pub fn has_suggestions(&self) -> bool {
        !self.suggested.is_empty()
    }

    /// Whether `id` is one of the options offered
    pub fn offers(&self, id: &str) -> bool {
        self.suggested
            .iter()
            .chain(self.other.iter())
            .any(|option| option.id == id)
    }
}
