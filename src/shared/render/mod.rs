//! View rendering
//!
//! Turns the pure view models of both flows into HTML fragments (the markup
//! a browser front end embeds) or plain text for the CLI.

pub mod engine;

pub use engine::{render_template, TemplateError};
