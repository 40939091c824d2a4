use thiserror::Error;

/// Application-level error type.
/// Every pipeline stage returns `Result<T, AppError>`; `main` logs the code and exits non-zero.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("PDF extraction error: {0}")]
    Pdf(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Email error: {0}")]
    Email(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code, used as a structured log field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Llm(_) => "LLM_ERROR",
            AppError::Pdf(_) => "PDF_ERROR",
            AppError::Render(_) => "RENDER_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Email(_) => "EMAIL_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Json(_) => "JSON_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message_and_code() {
        let err = AppError::Validation("job description is empty".to_string());
        assert_eq!(err.to_string(), "Validation error: job description is empty");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_io_error_converts_via_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.pdf");
        let err: AppError = io.into();
        assert_eq!(err.code(), "IO_ERROR");
        assert!(err.to_string().contains("missing.pdf"));
    }
}
