use serde::Serialize;
use uuid::Uuid;

use crate::features::operator_map::models::MapMarker;

/// Hover popup anchored on a marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub submission_id: Uuid,
    pub longitude: f64,
    pub latitude: f64,
    /// Precomputed marker description HTML
    pub description: String,
}

impl Popup {
    pub fn for_marker(marker: &MapMarker, cursor_longitude: f64) -> Self {
        Self {
            submission_id: marker.submission_id,
            longitude: unwrap_longitude(marker.coordinates.longitude, cursor_longitude),
            latitude: marker.coordinates.latitude,
            description: marker.description.clone(),
        }
    }
}

/// Shift `longitude` by whole turns until it lies within 180° of `cursor`
///
/// When the world repeats horizontally this picks the copy of the marker
/// under the pointer.
pub fn unwrap_longitude(longitude: f64, cursor: f64) -> f64 {
    if !longitude.is_finite() || !cursor.is_finite() {
        return longitude;
    }

    // Fewest whole turns that bring the gap to within 180°
    let gap = cursor - longitude;
    if gap > 180.0 {
        longitude + 360.0 * ((gap - 180.0) / 360.0).ceil()
    } else if gap < -180.0 {
        longitude - 360.0 * ((-gap - 180.0) / 360.0).ceil()
    } else {
        longitude
    }
}
