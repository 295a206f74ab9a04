//! Report-type reference data shared by both flows

pub mod models;

pub use models::{ReportCatalog, ReportType};
