// Rendering: tailored text → DOCX documents → PDFs through a DocumentConverter.
// Conversion failures are logged and leave the DOCX in place; they never abort a run.

pub mod cover_letter;
pub mod docx;
pub mod drive;
pub mod naming;
pub mod resume;
pub mod structure;

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::profile::Profile;
use crate::models::resume::ResumeSections;
use crate::render::cover_letter::build_cover_letter_docx;
use crate::render::docx::Document;
use crate::render::drive::DocumentConverter;
use crate::render::naming::sanitize_drive_prefix;
use crate::render::resume::{build_resume_docx, ResumeLayout};

/// What to render for one application and where to put it.
pub struct RenderRequest<'a> {
    pub profile: &'a Profile,
    pub tailored: &'a ResumeSections,
    /// `None` skips the cover letter documents.
    pub cover_letter: Option<&'a str>,
    pub output_dir: &'a Path,
    pub resume_base: String,
    pub cover_letter_base: String,
    pub layout: ResumeLayout,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedDocuments {
    pub resume_docx: Option<PathBuf>,
    pub resume_pdf: Option<PathBuf>,
    pub cover_letter_docx: Option<PathBuf>,
    pub cover_letter_pdf: Option<PathBuf>,
}

/// Writes `{base}.docx` and, when a converter is given, `{base}.pdf`.
/// Returns the DOCX path and the PDF path if conversion succeeded.
async fn write_document(
    doc: &Document,
    output_dir: &Path,
    base: &str,
    converter: Option<&dyn DocumentConverter>,
) -> Result<(PathBuf, Option<PathBuf>), AppError> {
    let bytes = doc
        .to_bytes()
        .map_err(|e| AppError::Render(format!("{base}: {e}")))?;
    tokio::fs::create_dir_all(output_dir).await?;
    let docx_path = output_dir.join(format!("{base}.docx"));
    tokio::fs::write(&docx_path, &bytes).await?;
    info!(path = %docx_path.display(), "DOCX written");

    let Some(converter) = converter else {
        return Ok((docx_path, None));
    };
    let pdf_path = output_dir.join(format!("{base}.pdf"));
    match converter
        .convert_docx_to_pdf(&bytes, &sanitize_drive_prefix(base), &pdf_path)
        .await
    {
        Ok(()) => {
            info!(path = %pdf_path.display(), "PDF generated");
            Ok((docx_path, Some(pdf_path)))
        }
        Err(e) => {
            error!(base, "PDF conversion failed: {e}");
            Ok((docx_path, None))
        }
    }
}

pub async fn render_application(
    request: &RenderRequest<'_>,
    converter: Option<&dyn DocumentConverter>,
) -> Result<RenderedDocuments, AppError> {
    let mut rendered = RenderedDocuments::default();

    let resume = build_resume_docx(request.profile, request.tailored, &request.layout);
    let (docx, pdf) =
        write_document(&resume, request.output_dir, &request.resume_base, converter).await?;
    rendered.resume_docx = Some(docx);
    rendered.resume_pdf = pdf;

    match request.cover_letter.map(str::trim).filter(|t| !t.is_empty()) {
        Some(body) => {
            let letter = build_cover_letter_docx(request.profile, body);
            let (docx, pdf) = write_document(
                &letter,
                request.output_dir,
                &request.cover_letter_base,
                converter,
            )
            .await?;
            rendered.cover_letter_docx = Some(docx);
            rendered.cover_letter_pdf = pdf;
        }
        None => warn!("No cover letter text; skipping cover letter documents"),
    }

    Ok(rendered)
}
