use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

lazy_static! {
    /// Regex for submission ids as they appear in API paths and storage keys
    /// - Valid: "0f8fad5b-d9cb-469f-a165-70867728950e"
    /// - Invalid: "0f8fad5b", "submission_0f8f...", "0f8fad5b-d9cb-469f-a165-70867728950e/x"
    pub static ref SUBMISSION_ID_REGEX: Regex = Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$"
    )
    .unwrap();

    /// Regex for freshly generated version-4 ids
    pub static ref UUID_V4_REGEX: Regex = Regex::new(
        r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$"
    )
    .unwrap();
}

/// Parse a submission id coming from user input or a marker
pub fn parse_submission_id(raw: &str) -> Result<Uuid> {
    let raw = raw.trim();
    if !SUBMISSION_ID_REGEX.is_match(raw) {
        return Err(AppError::Validation(format!(
            "Invalid submission id '{}'. Submission ID must be UUID format.",
            raw
        )));
    }
    Uuid::parse_str(raw).map_err(|e| AppError::Validation(e.to_string()))
}

/// Generate the id a new submission is uploaded under
///
/// `Uuid::new_v4` draws from the operating system CSPRNG.
pub fn new_submission_id() -> Uuid {
    Uuid::new_v4()
}
