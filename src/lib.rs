//! # maint-report
//!
//! Client for a public-maintenance reporting backend.
//!
//! - [`features::submissions`]: the citizen flow. Upload a picture, wait for
//!   its classification, confirm the report types and submit.
//! - [`features::operator_map`]: the operator flow. Open submissions as map
//!   markers with hover popups and a detail panel, resolved one by one.

pub mod core;
pub mod features;
pub mod modules;
pub mod shared;
