//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients for the REST backend and for object storage.

pub mod api;
pub mod storage;
