//! Pipeline orchestrator: JD analysis → resume parse → tailoring → cover letter → critique.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::generation::cover_letter::generate_cover_letter;
use crate::generation::critique::critique_resume;
use crate::generation::jd_parser::analyze_job_description;
use crate::generation::post_process::{compact_summary, SUMMARY_MAX_CHARS};
use crate::generation::tailoring::{tailor_sections, TailoringContext};
use crate::ingest::parse_resume;
use crate::llm_client::TextGenerator;
use crate::models::job::JobPosting;
use crate::models::profile::Profile;
use crate::models::resume::{PipelineResult, ResumeSections, Section};

pub const COVER_LETTER_ERROR: &str = "Error generating cover letter.";
pub const CRITIQUE_ERROR: &str = "Error generating resume critique.";

/// Everything one run needs besides the LLM and the profile.
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    pub resume_path: PathBuf,
    pub jd_text: String,
    pub master_profile: Option<String>,
    /// Company named in the posting, passed to section prompts as context.
    pub company: Option<String>,
    pub location_type: Option<String>,
    /// Company used in the cover letter; derived from the job title when absent.
    pub cover_letter_company: Option<String>,
}

/// Runs the full tailoring pipeline. Only JD validation and resume parsing abort the run;
/// later stages record their failure in the result and carry on.
pub async fn run_pipeline(
    inputs: &PipelineInputs,
    llm: &dyn TextGenerator,
    profile: &Profile,
) -> Result<PipelineResult, AppError> {
    info!(resume = %inputs.resume_path.display(), "Starting tailoring pipeline");

    let job = analyze_job_description(&inputs.jd_text, llm).await?;
    info!(
        title = %job.job_title,
        keywords = job.ats_keywords.len(),
        "Job description analyzed"
    );

    let original = parse_resume(&inputs.resume_path).await?;
    info!("Resume parsed");

    Ok(run_pipeline_with_sections(inputs, job, original, llm, profile).await)
}

/// Tailoring, cover letter and critique for an analyzed JD and an already-parsed resume.
/// Failures past this point are recorded in the result rather than returned.
pub async fn run_pipeline_with_sections(
    inputs: &PipelineInputs,
    job: JobPosting,
    original: ResumeSections,
    llm: &dyn TextGenerator,
    profile: &Profile,
) -> PipelineResult {
    let mut result = PipelineResult::default();

    let education_fact = profile.education_fact();
    let ctx = TailoringContext {
        company: inputs.company.as_deref(),
        location_type: inputs.location_type.as_deref(),
        master_profile: inputs.master_profile.as_deref(),
        education_fact: education_fact.as_deref(),
    };
    let outcome = tailor_sections(&original, &job, &ctx, llm).await;
    let mut tailored = outcome.sections;

    if let Some(summary) = tailored.non_empty(Section::Summary) {
        let compacted = compact_summary(summary, SUMMARY_MAX_CHARS);
        tailored.set(Section::Summary, compacted);
    }

    let narrative = tailored.has_narrative_content();

    if narrative {
        match generate_cover_letter(
            &job,
            &tailored,
            profile,
            inputs.master_profile.as_deref(),
            inputs.cover_letter_company.as_deref(),
            llm,
        )
        .await
        {
            Ok(Some(letter)) => {
                info!("Cover letter generated");
                result.generated_cover_letter_text = Some(letter);
            }
            Ok(None) => warn!("Cover letter generation returned nothing"),
            Err(e) => {
                error!("Error during cover letter generation: {e}");
                result.generated_cover_letter_text = Some(COVER_LETTER_ERROR.to_string());
            }
        }

        match critique_resume(&job, &tailored, &profile.contact.name, llm).await {
            Ok(Some((raw, critique))) => {
                match critique.ats_score {
                    Some(score) => info!("Resume critique complete. ATS Score: {score:.1}%"),
                    None => warn!("Critique text generated but no ATS score was parsed"),
                }
                result.raw_critique_text = Some(raw);
                result.resume_critique = Some(critique);
            }
            Ok(None) => warn!("Resume critique returned no text"),
            Err(e) => {
                error!("Error during resume critique: {e}");
                result.raw_critique_text = Some(CRITIQUE_ERROR.to_string());
            }
        }
    } else {
        warn!("Tailored resume has no narrative content; skipping cover letter and critique");
    }

    result.job_description = Some(job);
    result.original_resume = Some(original);
    result.tailored_resume = Some(tailored);
    result.accumulated_tailored_text = Some(outcome.accumulated_text);

    info!("Tailoring pipeline completed");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::tests::ScriptedGenerator;
    use crate::llm_client::LlmError;

    fn inputs(jd: &str) -> PipelineInputs {
        PipelineInputs {
            resume_path: PathBuf::from("/nonexistent/resume.pdf"),
            jd_text: jd.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_blank_jd_aborts_before_any_call() {
        let llm = ScriptedGenerator::ok(&[]);
        let err = run_pipeline(&inputs("   "), &llm, &Profile::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(llm.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_missing_resume_aborts_after_jd_analysis() {
        let llm = ScriptedGenerator::new(vec![Err(LlmError::EmptyContent)]);
        let err = run_pipeline(&inputs("ML Engineer\nPython"), &llm, &Profile::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(llm.recorded().len(), 1);
    }

    fn job() -> JobPosting {
        JobPosting {
            job_title: "ML Engineer".to_string(),
            requirements: vec!["Python".to_string()],
            ats_keywords: vec!["PyTorch".to_string()],
        }
    }

    fn full_resume() -> ResumeSections {
        ResumeSections {
            summary: Some("Engineer.".to_string()),
            work_experience: Some("Acme, 2020 - now.".to_string()),
            technical_skills: Some("Languages: Python".to_string()),
            projects: Some("Ranker | _Search_".to_string()),
        }
    }

    #[tokio::test]
    async fn test_failed_letter_and_critique_record_sentinels() {
        let llm = ScriptedGenerator::ok(&["New summary.", "New work.", "Languages: **Python**", "New projects."]);
        let result = run_pipeline_with_sections(
            &PipelineInputs::default(),
            job(),
            full_resume(),
            &llm,
            &Profile::default(),
        )
        .await;

        assert_eq!(llm.recorded().len(), 6);
        assert_eq!(result.generated_cover_letter_text.as_deref(), Some(COVER_LETTER_ERROR));
        assert_eq!(result.raw_critique_text.as_deref(), Some(CRITIQUE_ERROR));
        assert!(result.resume_critique.is_none());
        let tailored = result.tailored_resume.unwrap();
        assert_eq!(tailored.summary.as_deref(), Some("New summary."));
        assert_eq!(tailored.projects.as_deref(), Some("New projects."));
        assert_eq!(result.original_resume, Some(full_resume()));
    }

    #[tokio::test]
    async fn test_long_summary_is_compacted_and_critique_parsed() {
        let long_summary = "Built ranking systems at scale for search. ".repeat(15);
        let llm = ScriptedGenerator::ok(&[
            long_summary.as_str(),
            "Dear Hiring Manager,\n\nI build models that ship.",
            r#"{"ats_score": 85, "ats_pass_assessment": "Likely"}"#,
        ]);
        let original = ResumeSections {
            summary: Some("Engineer.".to_string()),
            ..Default::default()
        };
        let result = run_pipeline_with_sections(
            &PipelineInputs::default(),
            job(),
            original,
            &llm,
            &Profile::default(),
        )
        .await;

        assert_eq!(llm.recorded().len(), 3);
        let summary = result.tailored_resume.unwrap().summary.unwrap();
        assert!(summary.chars().count() <= SUMMARY_MAX_CHARS);
        assert!(summary.ends_with("search."));
        assert!(result
            .generated_cover_letter_text
            .unwrap()
            .contains("I build models that ship."));
        assert_eq!(result.resume_critique.unwrap().ats_score, Some(85.0));
        assert!(result.raw_critique_text.unwrap().contains("\"ats_score\""));
    }

    #[tokio::test]
    async fn test_no_narrative_content_skips_letter_and_critique() {
        let llm = ScriptedGenerator::ok(&["Languages: Python, Rust"]);
        let original = ResumeSections {
            technical_skills: Some("Languages: Python".to_string()),
            ..Default::default()
        };
        let result = run_pipeline_with_sections(
            &PipelineInputs::default(),
            job(),
            original,
            &llm,
            &Profile::default(),
        )
        .await;

        assert_eq!(llm.recorded().len(), 1);
        assert!(result.generated_cover_letter_text.is_none());
        assert!(result.raw_critique_text.is_none());
        assert!(result.resume_critique.is_none());
        assert_eq!(
            result.tailored_resume.unwrap().technical_skills.as_deref(),
            Some("Languages: Python, Rust")
        );
    }
}
