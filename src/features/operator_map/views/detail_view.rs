use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::relative_time::humanize;
use crate::core::error::Result;
use crate::features::catalog::ReportCatalog;
use crate::features::operator_map::models::marker_title;
use crate::features::submissions::models::Submission;
use crate::shared::constants::DETAIL_TOP_N;
use crate::shared::render::render_template;
use crate::shared::types::{Coordinates, Scores};

/// `Label (score)` entry of a ranked list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedLine {
    pub label: String,
    pub score: String,
}

/// Latitude and longitude as displayed, `12` rather than `12.0`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateLines {
    pub latitude: String,
    pub longitude: String,
}

impl From<Coordinates> for CoordinateLines {
    fn from(coords: Coordinates) -> Self {
        Self {
            latitude: coords.latitude.to_string(),
            longitude: coords.longitude.to_string(),
        }
    }
}

/// Everything the operator sees after clicking a marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailPanel {
    pub title: String,
    pub submission_id: Uuid,
    pub image_path: String,
    pub relevant_reports: Vec<RankedLine>,
    pub ml_labels: Vec<RankedLine>,
    pub image_coords: CoordinateLines,
    pub device_coords: CoordinateLines,
    /// Empty when the backend sent no submission time
    pub submitted_ago: String,
}

impl DetailPanel {
    pub fn build(submission: &Submission, catalog: &ReportCatalog, now: DateTime<Utc>) -> Self {
        let relevant_reports = ranked_lines(&submission.relevant_reports, |key| {
            catalog.name_of(key).map(str::to_string)
        });
        let ml_labels = ranked_lines(&submission.ml_labels, |key| Some(key.to_string()));

        Self {
            title: marker_title(submission, catalog),
            submission_id: submission.id,
            image_path: submission.image_path(),
            relevant_reports,
            ml_labels,
            image_coords: submission.coords_image.into(),
            device_coords: submission.coords_browser.into(),
            submitted_ago: submission
                .timestamp_submitted
                .map(|ts| humanize(ts, now))
                .unwrap_or_default(),
        }
    }

    pub fn relevant_reports_html(&self) -> Result<String> {
        lines_html(&self.relevant_reports)
    }

    pub fn ml_labels_html(&self) -> Result<String> {
        lines_html(&self.ml_labels)
    }

    pub fn image_coords_html(&self) -> Result<String> {
        coords_html(&self.image_coords)
    }

    pub fn device_coords_html(&self) -> Result<String> {
        coords_html(&self.device_coords)
    }
}

/// Top labelled entries by score; `label_for` returning `None` drops the entry
/// before the cut
fn ranked_lines(scores: &Scores, label_for: impl Fn(&str) -> Option<String>) -> Vec<RankedLine> {
    scores
        .ranked(None)
        .into_iter()
        .filter_map(|entry| {
            let label = label_for(&entry.key);
            if label.is_none() {
                tracing::warn!("Skipping unknown report type {} in detail panel", entry.key);
            }
            label.map(|label| RankedLine {
                label,
                score: entry.score.to_string(),
            })
        })
        .take(DETAIL_TOP_N)
        .collect()
}

fn lines_html(lines: &[RankedLine]) -> Result<String> {
    Ok(render_template(
        "ranked_lines.html",
        minijinja::context! { lines => lines },
    )?)
}

fn coords_html(coords: &CoordinateLines) -> Result<String> {
    Ok(render_template(
        "coordinates.html",
        minijinja::context! { coords => coords },
    )?)
}
