//! Turns one relevant scraped posting into tailored documents and a critique.

use std::io::Write;
use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::generation::critique::format_critique_text;
use crate::generation::pipeline::{run_pipeline, PipelineInputs, COVER_LETTER_ERROR};
use crate::generation::post_process::{compact_cover_letter, COVER_LETTER_MAX_CHARS};
use crate::ingest::read_text_file;
use crate::llm_client::TextGenerator;
use crate::models::job::{is_missing, JobRecord, ProcessedArtifacts};
use crate::models::profile::Profile;
use crate::render::drive::DocumentConverter;
use crate::render::naming::{cover_letter_file_base, resume_file_base, scraped_file_base};
use crate::render::resume::ResumeLayout;
use crate::render::{render_application, RenderRequest};

/// Shared, per-cycle dependencies of [`process_job`].
pub struct ProcessorContext<'a> {
    pub llm: &'a dyn TextGenerator,
    pub profile: &'a Profile,
    pub converter: Option<&'a dyn DocumentConverter>,
    pub base_resume: PathBuf,
    pub master_profile: Option<String>,
    pub output_dir: PathBuf,
    pub keyword: String,
    pub yoe: Option<u32>,
}

/// JD text as the pipeline expects it: title on the first line, then the description.
pub fn job_description_text(job: &JobRecord) -> String {
    format!("{}\n\n{}", job.title(), job.description.trim())
}

/// `(resume_base, cover_letter_base)` for a scraped posting.
pub fn document_bases(job: &JobRecord, keyword: &str, last_name: &str, yoe: Option<u32>) -> (String, String) {
    let company = &job.company_name;
    let title = job.title();
    let resume_prefix = scraped_file_base("Resume", company, title, Some(keyword));
    let letter_prefix = scraped_file_base("CoverLetter", company, title, Some(keyword));
    (
        resume_file_base(&resume_prefix, company, last_name, yoe),
        cover_letter_file_base(&letter_prefix, company, last_name),
    )
}

fn usable_cover_letter(text: Option<&str>) -> Option<String> {
    let text = text.map(str::trim).filter(|t| !t.is_empty())?;
    if text == COVER_LETTER_ERROR {
        warn!("Cover letter generation failed; skipping cover letter documents");
        return None;
    }
    Some(compact_cover_letter(text, COVER_LETTER_MAX_CHARS))
}

pub async fn process_job(
    job: &JobRecord,
    ctx: &ProcessorContext<'_>,
) -> Result<ProcessedArtifacts, AppError> {
    let job_id = job.id.clone().unwrap_or_else(|| "N/A".to_string());
    let title = job.title().to_string();
    if is_missing(&job.description) {
        return Err(AppError::Validation(format!(
            "Job {job_id} has no description"
        )));
    }
    info!(id = %job_id, title = %title, company = %job.company_name, "Processing job");

    let mut jd_file = tempfile::Builder::new()
        .prefix("jd_")
        .suffix(".txt")
        .tempfile()?;
    jd_file.write_all(job_description_text(job).as_bytes())?;
    jd_file.flush()?;
    let jd_text = read_text_file(jd_file.path()).await?;

    let company = (!is_missing(&job.company_name)).then(|| job.company_name.clone());
    let inputs = PipelineInputs {
        resume_path: ctx.base_resume.clone(),
        jd_text,
        master_profile: ctx.master_profile.clone(),
        company: company.clone(),
        location_type: job.location.clone(),
        cover_letter_company: company,
    };
    let result = run_pipeline(&inputs, ctx.llm, ctx.profile).await?;

    let Some(tailored) = result.tailored_resume.as_ref() else {
        return Err(AppError::Internal(anyhow::anyhow!(
            "Pipeline returned no tailored resume for job {job_id}"
        )));
    };

    let (resume_base, cover_letter_base) =
        document_bases(job, &ctx.keyword, ctx.profile.contact.last_name(), ctx.yoe);
    let cover_letter = usable_cover_letter(result.generated_cover_letter_text.as_deref());

    let request = RenderRequest {
        profile: ctx.profile,
        tailored,
        cover_letter: cover_letter.as_deref(),
        output_dir: &ctx.output_dir,
        resume_base,
        cover_letter_base,
        layout: ResumeLayout::default(),
    };
    let rendered = render_application(&request, ctx.converter).await?;
    if rendered.resume_pdf.is_none() {
        warn!(id = %job_id, "Resume PDF not produced");
    }

    let critique_text = format_critique_text(
        &title,
        &job.company_name,
        result.resume_critique.as_ref(),
        result.raw_critique_text.as_deref(),
    );

    Ok(ProcessedArtifacts {
        job_id,
        job_title: title,
        company_name: job.company_name.clone(),
        job_url: job.url.clone(),
        source_platform: job.source_platform.clone(),
        search_source_name: job.search_source_name.clone(),
        resume_pdf: rendered.resume_pdf,
        cover_letter_pdf: rendered.cover_letter_pdf,
        critique_text,
    })
}

/// Processes jobs one after another. A failing job is logged and left out.
pub async fn process_jobs(jobs: &[JobRecord], ctx: &ProcessorContext<'_>) -> Vec<ProcessedArtifacts> {
    let mut processed = Vec::new();
    for job in jobs {
        match process_job(job, ctx).await {
            Ok(artifacts) => processed.push(artifacts),
            Err(e) => error!(
                id = job.id.as_deref().unwrap_or("N/A"),
                code = e.code(),
                "Failed to process job: {e}"
            ),
        }
    }
    info!(processed = processed.len(), total = jobs.len(), "Job processing finished");
    processed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::tests::ScriptedGenerator;

    fn job() -> JobRecord {
        let mut j = JobRecord::new("linkedin", "AI Roles");
        j.id = Some("3901234567".to_string());
        j.detailed_title = "ML Engineer".to_string();
        j.company_name = "Acme, Inc.".to_string();
        j.url = "https://www.linkedin.com/jobs/view/3901234567".to_string();
        j.description = "  Build ranking models.\nShip them.  ".to_string();
        j
    }

    #[test]
    fn test_job_description_text_leads_with_title() {
        assert_eq!(
            job_description_text(&job()),
            "ML Engineer\n\nBuild ranking models.\nShip them."
        );
    }

    #[test]
    fn test_document_bases() {
        let (resume, letter) = document_bases(&job(), "AI", "Lovelace", Some(4));
        assert_eq!(resume, "Resume_Acme_Inc_ML_Engineer_AI_AcmeInc_Lovelace_4YOE");
        assert_eq!(letter, "CoverLetter_Acme_Inc_ML_Engineer_AI_AcmeInc_Lovelace");
    }

    #[test]
    fn test_usable_cover_letter() {
        assert_eq!(usable_cover_letter(None), None);
        assert_eq!(usable_cover_letter(Some("   ")), None);
        assert_eq!(usable_cover_letter(Some(COVER_LETTER_ERROR)), None);
        assert_eq!(usable_cover_letter(Some("Dear team,\n\nHi.")).as_deref(), Some("Dear team,\n\nHi."));
    }

    #[tokio::test]
    async fn test_missing_description_is_rejected() {
        let llm = ScriptedGenerator::ok(&[]);
        let profile = Profile::default();
        let dir = tempfile::tempdir().unwrap();
        let ctx = ProcessorContext {
            llm: &llm,
            profile: &profile,
            converter: None,
            base_resume: dir.path().join("resume.pdf"),
            master_profile: None,
            output_dir: dir.path().to_path_buf(),
            keyword: "AI".to_string(),
            yoe: Some(4),
        };
        let mut j = job();
        j.description = "N/A".to_string();
        assert!(matches!(process_job(&j, &ctx).await, Err(AppError::Validation(_))));
        assert!(llm.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_failed_jobs_are_skipped() {
        let llm = ScriptedGenerator::ok(&["python, pytorch"]);
        let profile = Profile::default();
        let dir = tempfile::tempdir().unwrap();
        let ctx = ProcessorContext {
            llm: &llm,
            profile: &profile,
            converter: None,
            base_resume: dir.path().join("missing.pdf"),
            master_profile: None,
            output_dir: dir.path().to_path_buf(),
            keyword: "AI".to_string(),
            yoe: Some(4),
        };
        let processed = process_jobs(&[job()], &ctx).await;
        assert!(processed.is_empty());
    }
}
