//! Template engine for view rendering using Jinja2 syntax.
//!
//! Views are pure data; this module turns them into HTML fragments for a
//! browser front end or plain text for the CLI. Templates ending in `.html`
//! are auto-escaped.

use std::sync::OnceLock;

use minijinja::{Environment, Value};
use thiserror::Error;

use crate::core::error::AppError;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Templates compiled into the binary, keyed by the name they render under
const TEMPLATES: &[(&str, &str)] = &[
    (
        "classification.html",
        include_str!("../../../templates/views/classification.html"),
    ),
    (
        "popup.html",
        include_str!("../../../templates/views/popup.html"),
    ),
    (
        "ranked_lines.html",
        include_str!("../../../templates/views/ranked_lines.html"),
    ),
    (
        "coordinates.html",
        include_str!("../../../templates/views/coordinates.html"),
    ),
    (
        "classification.txt",
        include_str!("../../../templates/views/classification.txt"),
    ),
    (
        "detail.txt",
        include_str!("../../../templates/views/detail.txt"),
    ),
    (
        "markers.txt",
        include_str!("../../../templates/views/markers.txt"),
    ),
];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

impl From<TemplateError> for AppError {
    fn from(e: TemplateError) -> Self {
        AppError::Internal(e.to_string())
    }
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for &(name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        } else {
            tracing::debug!("Loaded template: {}", name);
        }
    }

    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render `template_name` with any serializable context
pub fn render_template<S: serde::Serialize>(
    template_name: &str,
    ctx: S,
) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(Value::from_serialize(&ctx))
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

/// Check if a template exists
pub fn template_exists(template_name: &str) -> bool {
    get_environment().get_template(template_name).is_ok()
}
