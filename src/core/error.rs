use thiserror::Error;

/// Errors raised by the submission and operator map flows.
///
/// Every variant is scoped to the single user action that produced it; none
/// of them poisons the session that returned it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Upload failed: {0}")]
    UploadFailure(String),

    #[error("Classification timed out after {attempts} attempts")]
    ClassificationTimeout { attempts: u32 },

    #[error("Classification unavailable: backend returned HTTP {status}")]
    ClassificationUnavailable { status: u16 },

    #[error("Submit failed: {0}")]
    SubmitFailure(String),

    #[error("Resolve failed: {0}")]
    ResolveFailure(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid transition: cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message suitable for showing inline next to the action that failed.
    pub fn user_message(&self) -> String {
        match self {
            AppError::UploadFailure(_) => {
                "There was an error uploading the file, please try again".to_string()
            }
            AppError::ClassificationTimeout { .. } => {
                "We could not process your picture in time, please try again".to_string()
            }
            AppError::ClassificationUnavailable { .. } => {
                "Your picture could not be processed".to_string()
            }
            AppError::SubmitFailure(_) => "Error! Your report was not received".to_string(),
            AppError::ResolveFailure(_) => "Error! The report was not resolved".to_string(),
            AppError::Cancelled => "Cancelled".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
