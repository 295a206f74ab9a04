use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::catalog::ReportCatalog;
use crate::features::submissions::models::Submission;
use crate::shared::constants::TITLE_SEPARATOR;
use crate::shared::render::render_template;
use crate::shared::types::Coordinates;

/// Display names of the submission's selected reports, joined with `" / "`
///
/// Ids the catalog does not know are skipped.
pub fn marker_title(submission: &Submission, catalog: &ReportCatalog) -> String {
    submission
        .final_selection()
        .iter()
        .filter_map(|id| {
            let name = catalog.name_of(id);
            if name.is_none() {
                tracing::warn!(
                    "Submission {} selected unknown report type {}",
                    submission.id,
                    id
                );
            }
            name
        })
        .collect::<Vec<_>>()
        .join(TITLE_SEPARATOR)
}

/// One open submission placed on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub submission_id: Uuid,
    pub coordinates: Coordinates,
    pub title: String,
    /// Popup HTML, rendered once when the marker is built
    pub description: String,
}

impl MapMarker {
    pub fn from_submission(submission: &Submission, catalog: &ReportCatalog) -> Result<Self> {
        let title = marker_title(submission, catalog);
        let description = render_template(
            "popup.html",
            minijinja::context! {
                title => &title,
                image_path => submission.image_path(),
                submission_id => submission.id.to_string(),
            },
        )?;

        Ok(Self {
            submission_id: submission.id,
            coordinates: submission.effective_coordinates(),
            title,
            description,
        })
    }

    /// GeoJSON point feature; positions are `[longitude, latitude]`
    pub fn to_feature(&self) -> Value {
        json!({
            "type": "Feature",
            "properties": {
                "description": self.description,
                "submission_id": self.submission_id,
            },
            "geometry": {
                "type": "Point",
                "coordinates": [self.coordinates.longitude, self.coordinates.latitude],
            },
        })
    }
}

/// The markers currently shown, in load order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerCollection {
    markers: Vec<MapMarker>,
}

impl MarkerCollection {
    pub fn new(markers: Vec<MapMarker>) -> Self {
        Self { markers }
    }

    pub fn get(&self, id: Uuid) -> Option<&MapMarker> {
        self.markers.iter().find(|m| m.submission_id == id)
    }

    /// Remove the marker for `id`, leaving every other marker in place
    pub fn remove(&mut self, id: Uuid) -> Option<MapMarker> {
        let index = self.markers.iter().position(|m| m.submission_id == id)?;
        Some(self.markers.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapMarker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn to_feature_collection(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.markers.iter().map(MapMarker::to_feature).collect::<Vec<_>>(),
        })
    }
}
