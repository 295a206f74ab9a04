mod marker;

pub use marker::{marker_title, MapMarker, MarkerCollection};
