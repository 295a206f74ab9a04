//! REST backend client

mod client;

pub use client::{ClassificationStatus, HttpMaintenanceApi, MaintenanceApi};
