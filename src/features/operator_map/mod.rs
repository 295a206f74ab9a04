//! Operator flow: open submissions on a map, inspect them, resolve them

mod layer;
pub mod models;
pub mod services;
pub mod views;

pub use layer::{GeoJsonFileLayer, MarkerLayer, NoopLayer};
pub use services::OperatorMap;
