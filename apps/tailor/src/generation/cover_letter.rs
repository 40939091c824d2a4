//! Cover letter generation from the tailored resume.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::prompts::{
    cover_letter_prompt, CoverLetterPromptInput, ProjectDetail, COVER_LETTER_MARKER,
};
use crate::llm_client::{GenerationParams, TextGenerator};
use crate::models::job::JobPosting;
use crate::models::profile::Profile;
use crate::models::resume::{ResumeSections, Section};

const COVER_LETTER_TEMPERATURE: f32 = 0.35;
const COVER_LETTER_MAX_TOKENS: u32 = 1500;
const FALLBACK_COMPANY: &str = "the Hiring Company";
const FALLBACK_JOB_TITLE: &str = "the advertised position";
const MAX_SUMMARY_REQUIREMENTS: usize = 5;
const LABEL: &str = "cover letter:";

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Override, else the text after the last " at " or " - " in the title, else a generic name.
pub fn resolve_company(job_title: &str, company_override: Option<&str>) -> String {
    if let Some(company) = company_override.map(str::trim).filter(|c| !c.is_empty()) {
        return company.to_string();
    }

    let lowered = job_title.to_lowercase();
    let derived = if lowered.contains(" at ") {
        lowered.rsplit(" at ").next().map(str::trim)
    } else if job_title.contains(" - ") {
        job_title.rsplit(" - ").next().map(str::trim)
    } else {
        None
    };

    match derived.filter(|c| !c.is_empty()) {
        Some(company) => title_case(company),
        None => {
            warn!("Could not derive a company from '{job_title}', using fallback");
            FALLBACK_COMPANY.to_string()
        }
    }
}

pub fn requirements_summary(requirements: &[String]) -> String {
    if requirements.is_empty() {
        return "Not specified.".to_string();
    }
    let mut summary = requirements
        .iter()
        .take(MAX_SUMMARY_REQUIREMENTS)
        .map(|r| format!("- {r}"))
        .collect::<Vec<_>>()
        .join("\n");
    if requirements.len() > MAX_SUMMARY_REQUIREMENTS {
        summary.push_str("\n- ... and other key qualifications.");
    }
    summary
}

/// Titles of the projects in tailored projects text, paired with known demo links.
pub fn project_details(projects_text: Option<&str>, profile: &Profile) -> Vec<ProjectDetail> {
    let Some(text) = projects_text else {
        return Vec::new();
    };

    split_blank_line_blocks(text)
        .into_iter()
        .filter_map(|block| {
            let first = block.lines().map(str::trim).find(|l| !l.is_empty())?;
            let title = first.trim_start_matches('#').trim();
            let title = title.split('|').next().unwrap_or(title);
            let title = title.replace("**", "").trim().to_string();
            if title.is_empty() {
                return None;
            }
            let url = profile.project_link(&title);
            Some(ProjectDetail { title, url })
        })
        .collect()
}

/// Splits on runs of blank (whitespace-only) lines.
fn split_blank_line_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }
    blocks
}

/// Drops an echoed prompt marker and a leading "Cover Letter:" label.
pub fn clean_cover_letter(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some((_, after)) = text.split_once(COVER_LETTER_MARKER) {
        text = after.trim();
    }
    if text
        .get(..LABEL.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(LABEL))
    {
        text = text[LABEL.len()..].trim();
    }
    text.to_string()
}

/// Generates a cover letter. Returns `Ok(None)` when the resume has nothing to draw from.
pub async fn generate_cover_letter(
    job: &JobPosting,
    tailored: &ResumeSections,
    profile: &Profile,
    master_profile: Option<&str>,
    company_override: Option<&str>,
    llm: &dyn TextGenerator,
) -> Result<Option<String>, AppError> {
    if !tailored.has_narrative_content() {
        warn!("Tailored resume has no summary, experience or projects; skipping cover letter");
        return Ok(None);
    }

    let job_title = match job.job_title.trim() {
        "" => FALLBACK_JOB_TITLE,
        title => title,
    };
    let company = resolve_company(job_title, company_override);
    let requirements = requirements_summary(&job.requirements);
    let keywords = if job.ats_keywords.is_empty() {
        "Not specifically extracted.".to_string()
    } else {
        job.ats_keywords.join(", ")
    };
    let projects = project_details(tailored.get(Section::Projects), profile);
    let contact = &profile.contact;

    let prompt = cover_letter_prompt(&CoverLetterPromptInput {
        candidate_name: &contact.name,
        email: if contact.email.is_empty() { "N/A" } else { &contact.email },
        phone: Some(contact.phone.as_str()),
        linkedin_url: Some(contact.linkedin_url.as_str()),
        job_title,
        company: &company,
        requirements_summary: &requirements,
        keywords: &keywords,
        tailored_summary: tailored.non_empty(Section::Summary),
        tailored_work_experience: tailored.non_empty(Section::WorkExperience),
        tailored_projects: tailored.non_empty(Section::Projects),
        master_profile,
        hiring_manager: None,
        projects: &projects,
    });

    let raw = llm
        .generate_text(
            &prompt,
            GenerationParams::new(COVER_LETTER_TEMPERATURE, COVER_LETTER_MAX_TOKENS),
        )
        .await
        .map_err(|e| AppError::Llm(format!("Cover letter generation failed: {e}")))?;

    let letter = clean_cover_letter(&raw);
    info!(company = %company, chars = letter.chars().count(), "Cover letter generated");
    Ok(Some(letter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::tests::ScriptedGenerator;
    use crate::llm_client::LlmError;
    use crate::models::profile::ContactInfo;
    use std::collections::BTreeMap;

    fn profile() -> Profile {
        let mut links = BTreeMap::new();
        links.insert("Code QA".to_string(), "https://qa.example.app".to_string());
        Profile {
            contact: ContactInfo {
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                ..Default::default()
            },
            project_links: links,
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_company_precedence() {
        assert_eq!(resolve_company("ML Engineer at acme labs", Some(" Initech ")), "Initech");
        assert_eq!(resolve_company("ML Engineer at acme labs", None), "Acme Labs");
        assert_eq!(resolve_company("Data Scientist - globex corp", None), "Globex Corp");
        assert_eq!(resolve_company("Data Scientist", None), "the Hiring Company");
    }

    #[test]
    fn test_requirements_summary_caps_at_five() {
        let reqs: Vec<String> = (1..=7).map(|i| format!("req {i}")).collect();
        let s = requirements_summary(&reqs);
        assert!(s.starts_with("- req 1\n"));
        assert!(!s.contains("req 6"));
        assert!(s.ends_with("\n- ... and other key qualifications."));
        assert_eq!(requirements_summary(&[]), "Not specified.");
    }

    #[test]
    fn test_project_details_extract_titles_and_links() {
        let text = "## **Code QA** | _RAG assistant_\n* built it\n* shipped it\n\n  \n\
                    Text Detector\n* classifier";
        let details = project_details(Some(text), &profile());
        assert_eq!(
            details,
            vec![
                ProjectDetail {
                    title: "Code QA".to_string(),
                    url: Some("https://qa.example.app".to_string()),
                },
                ProjectDetail {
                    title: "Text Detector".to_string(),
                    url: None,
                },
            ]
        );
    }

    #[test]
    fn test_clean_cover_letter_strips_marker_and_label() {
        let raw = "--- BEGIN COVER LETTER ---\nCover Letter: Dear Hiring Team,\n\nBody.";
        assert_eq!(clean_cover_letter(raw), "Dear Hiring Team,\n\nBody.");
        assert_eq!(clean_cover_letter("  Dear team.  "), "Dear team.");
    }

    #[tokio::test]
    async fn test_generate_skips_without_narrative_content() {
        let llm = ScriptedGenerator::ok(&[]);
        let tailored = ResumeSections {
            technical_skills: Some("Languages: Rust".to_string()),
            ..Default::default()
        };
        let out = generate_cover_letter(&JobPosting::default(), &tailored, &profile(), None, None, &llm)
            .await
            .unwrap();
        assert!(out.is_none());
        assert!(llm.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_generate_uses_cover_letter_params() {
        let llm = ScriptedGenerator::ok(&["Dear Hiring Team at Acme,\n\nBody.\n\nSincerely,\n\nAda Lovelace"]);
        let job = JobPosting {
            job_title: "ML Engineer at acme".to_string(),
            ..Default::default()
        };
        let tailored = ResumeSections {
            summary: Some("Engineer.".to_string()),
            ..Default::default()
        };
        let letter = generate_cover_letter(&job, &tailored, &profile(), None, None, &llm)
            .await
            .unwrap()
            .unwrap();
        assert!(letter.starts_with("Dear Hiring Team at Acme"));
        let (prompt, params) = &llm.recorded()[0];
        assert!(prompt.contains("Hiring Team at Acme"));
        assert_eq!(params.max_output_tokens, 1500);
        assert!((params.temperature - 0.35).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_generate_maps_llm_error() {
        let llm = ScriptedGenerator::new(vec![Err(LlmError::EmptyContent)]);
        let tailored = ResumeSections {
            projects: Some("Code QA\n* x".to_string()),
            ..Default::default()
        };
        let err = generate_cover_letter(&JobPosting::default(), &tailored, &profile(), None, None, &llm)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
