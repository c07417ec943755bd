use thiserror::Error;

/// Application-level error type.
///
/// Degraded candidate data never produces an error (it scores as zero or
/// empty). Errors are reserved for things a caller has to act on: an unknown
/// job category, unreadable inputs, or a collaborator that kept failing.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unknown job category: {0}")]
    UnknownJobCategory(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Critique failed: {0}")]
    Critique(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Short machine-readable code, used when failures are serialized into
    /// run output.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::UnknownJobCategory(_) => "UNKNOWN_JOB_CATEGORY",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Csv(_) => "CSV_ERROR",
            AppError::Json(_) => "JSON_ERROR",
            AppError::Llm(_) => "LLM_ERROR",
            AppError::Critique(_) => "CRITIQUE_FAILED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
