//! Resume and job-description input: PDF text extraction and section splitting.

pub mod sections;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::resume::ResumeSections;

pub use sections::split_resume_sections;

/// Extracts all text from a PDF. Extraction is CPU-bound, so it runs on the blocking pool.
pub async fn read_pdf_text(path: &Path) -> Result<String, AppError> {
    if !path.is_file() {
        return Err(AppError::NotFound(format!(
            "PDF file not found: {}",
            path.display()
        )));
    }

    let owned: PathBuf = path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
        .map_err(|e| AppError::Pdf(format!("{}: {e}", path.display())))?;

    info!("Extracted {} characters from {}", text.len(), path.display());
    Ok(text)
}

pub async fn read_text_file(path: &Path) -> Result<String, AppError> {
    tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            AppError::NotFound(format!("Text file not found: {}", path.display()))
        }
        _ => AppError::Io(e),
    })
}

/// Reads a resume PDF and splits it into the four known sections.
pub async fn parse_resume(path: &Path) -> Result<ResumeSections, AppError> {
    let text = read_pdf_text(path).await?;
    if text.trim().is_empty() {
        return Err(AppError::Pdf(format!(
            "No extractable text in {}",
            path.display()
        )));
    }

    let sections = split_resume_sections(&text);
    if sections.is_blank() {
        warn!(
            "No known section headers found in {}; every section is empty",
            path.display()
        );
    }
    Ok(sections)
}
