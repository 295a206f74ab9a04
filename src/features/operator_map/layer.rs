use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::core::error::{AppError, Result};

/// Data source the marker symbols are drawn from
///
/// Receives the whole FeatureCollection every time the markers change.
pub trait MarkerLayer: Send {
    fn set_data(&mut self, features: &Value) -> Result<()>;
}

/// Discards marker updates, for read-only views of the map
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLayer;

impl MarkerLayer for NoopLayer {
    fn set_data(&mut self, _features: &Value) -> Result<()> {
        Ok(())
    }
}

/// Writes the marker source to a GeoJSON file, replacing it on every update
pub struct GeoJsonFileLayer {
    path: PathBuf,
}

impl GeoJsonFileLayer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MarkerLayer for GeoJsonFileLayer {
    fn set_data(&mut self, features: &Value) -> Result<()> {
        let body = serde_json::to_vec_pretty(features)
            .map_err(|e| AppError::Internal(format!("Failed to encode markers: {}", e)))?;

        std::fs::write(&self.path, body).map_err(|e| {
            AppError::Internal(format!(
                "Failed to write markers to {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!("Wrote marker source to {}", self.path.display());
        Ok(())
    }
}
