use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::catalog::ReportCatalog;
use crate::features::operator_map::models::{MapMarker, MarkerCollection};
use crate::features::operator_map::views::{DetailPanel, Popup};
use crate::features::operator_map::MarkerLayer;
use crate::features::submissions::models::{Submission, SubmissionStatus};
use crate::modules::api::MaintenanceApi;

/// Session context for the operator map
///
/// Owns the open submissions, their markers, the current selection and the
/// hover popup. Markers only change on load and after a successful resolve.
pub struct OperatorMap<L: MarkerLayer> {
    api: Arc<dyn MaintenanceApi>,
    catalog: ReportCatalog,
    submissions: Vec<Submission>,
    markers: MarkerCollection,
    layer: L,
    selected: Option<Uuid>,
    popup: Option<Popup>,
}

impl<L: MarkerLayer> OperatorMap<L> {
    /// Fetch open submissions and the catalog, then publish the markers
    pub async fn load(api: Arc<dyn MaintenanceApi>, mut layer: L) -> Result<Self> {
        let (submissions, catalog) = tokio::try_join!(
            api.list_submissions(SubmissionStatus::Submitted),
            api.list_reports()
        )?;

        let markers = MarkerCollection::new(
            submissions
                .iter()
                .map(|submission| MapMarker::from_submission(submission, &catalog))
                .collect::<Result<Vec<_>>>()?,
        );
        layer.set_data(&markers.to_feature_collection())?;

        tracing::info!(
            "Operator map loaded: {} open submissions, {} report types",
            markers.len(),
            catalog.len()
        );

        Ok(Self {
            api,
            catalog,
            submissions,
            markers,
            layer,
            selected: None,
            popup: None,
        })
    }

    pub fn markers(&self) -> &MarkerCollection {
        &self.markers
    }

    pub fn catalog(&self) -> &ReportCatalog {
        &self.catalog
    }

    pub fn layer(&self) -> &L {
        &self.layer
    }

    pub fn submission(&self, id: Uuid) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.id == id)
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    /// Detail panel for a submission, with relative time measured from `now`
    pub fn detail(&self, id: Uuid, now: DateTime<Utc>) -> Result<DetailPanel> {
        let submission = self
            .submission(id)
            .ok_or_else(|| AppError::NotFound(format!("Submission {} is not on the map", id)))?;
        Ok(DetailPanel::build(submission, &self.catalog, now))
    }

    /// Marker click
    pub fn select(&mut self, id: Uuid) -> Result<DetailPanel> {
        let panel = self.detail(id, Utc::now())?;
        self.selected = Some(id);
        Ok(panel)
    }

    /// Pointer entered a marker at `cursor_longitude`
    pub fn hover(&mut self, id: Uuid, cursor_longitude: f64) -> Result<&Popup> {
        let marker = self
            .markers
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("No marker for submission {}", id)))?;
        Ok(self.popup.insert(Popup::for_marker(marker, cursor_longitude)))
    }

    /// Pointer left the marker
    pub fn leave(&mut self) {
        self.popup = None;
    }

    /// Close a submission and drop its marker
    ///
    /// Nothing changes locally unless the backend confirmed the resolve.
    pub async fn resolve(&mut self, id: Uuid) -> Result<()> {
        if self.markers.get(id).is_none() {
            return Err(AppError::NotFound(format!(
                "Submission {} is not on the map",
                id
            )));
        }

        if let Err(e) = self.api.resolve(id).await {
            tracing::error!("Resolving submission {} failed: {}", id, e);
            return Err(match e {
                AppError::ResolveFailure(_) => e,
                other => AppError::ResolveFailure(other.to_string()),
            });
        }

        self.markers.remove(id);
        self.submissions.retain(|s| s.id != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.popup.as_ref().is_some_and(|p| p.submission_id == id) {
            self.popup = None;
        }

        self.layer.set_data(&self.markers.to_feature_collection())?;
        tracing::info!(
            "Resolved submission {}, {} markers left",
            id,
            self.markers.len()
        );
        Ok(())
    }
}
