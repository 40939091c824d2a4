//! Resume critique: one LLM call scoring the tailored resume against the JD.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::prompts::critique_prompt;
use crate::llm_client::{strip_code_fences, GenerationParams, TextGenerator};
use crate::models::job::JobPosting;
use crate::models::resume::{ResumeCritique, ResumeSections, Section};

const CRITIQUE_TEMPERATURE: f32 = 0.1;
const CRITIQUE_MAX_TOKENS: u32 = 300;
const NO_JD_DETAILS: &str = "Job description details not available.";

static_regex!(score_regex, r"[\d.]+");

/// `## HEADER\ncontent` blocks for the non-empty sections.
pub fn resume_text_for_critique(resume: &ResumeSections) -> String {
    Section::ALL
        .iter()
        .filter_map(|s| {
            resume
                .non_empty(*s)
                .map(|content| format!("## {}\n{}", s.header(), content))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn parse_score(value: &str) -> Option<f64> {
    score_regex()
        .find_iter(value)
        .find_map(|m| m.as_str().parse::<f64>().ok())
        .map(|score| score.clamp(0.0, 100.0))
}

/// Parses `KEY: value` lines. Keys are matched case-insensitively.
pub fn parse_critique_lines(text: &str) -> ResumeCritique {
    let mut critique = ResumeCritique::default();
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().trim_matches('*').trim().to_uppercase();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            "ATS_SCORE" => critique.ats_score = parse_score(value),
            "ATS_PASS" => critique.ats_pass_assessment = Some(value.to_string()),
            "RECRUITER_IMPRESSION" => {
                critique.recruiter_impression_assessment = Some(value.to_string())
            }
            "POTENTIAL_LENGTH_CONCERN" => {
                critique.potential_length_concern = Some(value.to_string())
            }
            "CONTENT_STRUCTURE_AND_CLARITY" => {
                critique.content_structure_and_clarity = Some(value.to_string())
            }
            "FORMATTING_CONSISTENCY_FROM_TEXT" => {
                critique.formatting_consistency_from_text = Some(value.to_string())
            }
            _ => {}
        }
    }
    critique
}

/// JSON first, then the labelled-line format.
pub fn parse_critique(raw: &str) -> ResumeCritique {
    let critique = match serde_json::from_str::<ResumeCritique>(strip_code_fences(raw)) {
        Ok(mut parsed) => {
            parsed.ats_score = parsed.ats_score.map(|s| s.clamp(0.0, 100.0));
            parsed
        }
        Err(_) => parse_critique_lines(raw),
    };
    if critique.is_empty() {
        let preview: String = raw.chars().take(200).collect();
        warn!("Could not parse any structured critique fields. Raw text: {preview}...");
    }
    critique
}

/// Critiques the tailored resume. `Ok(None)` when there is no resume text to judge.
pub async fn critique_resume(
    job: &JobPosting,
    tailored: &ResumeSections,
    candidate_name: &str,
    llm: &dyn TextGenerator,
) -> Result<Option<(String, ResumeCritique)>, AppError> {
    let resume_text = resume_text_for_critique(tailored);
    if resume_text.is_empty() {
        warn!("Tailored resume text is empty, skipping critique");
        return Ok(None);
    }
    let jd_text = if job.requirements.is_empty() {
        NO_JD_DETAILS.to_string()
    } else {
        job.requirements.join("\n")
    };
    let job_title = match job.job_title.trim() {
        "" => "Not specified",
        title => title,
    };

    let prompt = critique_prompt(
        job_title,
        &jd_text,
        &job.ats_keywords,
        &resume_text,
        candidate_name,
    );
    let params = GenerationParams::new(CRITIQUE_TEMPERATURE, CRITIQUE_MAX_TOKENS).json();
    let raw = llm
        .generate_text(&prompt, params)
        .await
        .map_err(|e| AppError::Llm(format!("Resume critique failed: {e}")))?;

    let raw = raw.trim().to_string();
    let critique = parse_critique(&raw);
    info!(ats_score = ?critique.ats_score, "Resume critique generated");
    Ok(Some((raw, critique)))
}

/// Human-readable critique block for logs and the batch email.
pub fn format_critique_text(
    job_title: &str,
    company: &str,
    critique: Option<&ResumeCritique>,
    raw: Option<&str>,
) -> String {
    let mut lines = vec![format!("Critique for: {job_title} at {company}")];
    match critique.filter(|c| !c.is_empty()) {
        Some(c) => {
            if let Some(score) = c.ats_score {
                lines.push(format!("ATS Score: {score}%"));
            }
            let fields = [
                ("ATS Pass", &c.ats_pass_assessment),
                ("Recruiter Impression", &c.recruiter_impression_assessment),
                ("Length", &c.potential_length_concern),
                ("Structure & Clarity", &c.content_structure_and_clarity),
                ("Formatting", &c.formatting_consistency_from_text),
            ];
            for (label, value) in fields {
                if let Some(value) = value {
                    lines.push(format!("{label}: {value}"));
                }
            }
        }
        None => match raw.map(str::trim).filter(|r| !r.is_empty()) {
            Some(raw) => lines.push(raw.to_string()),
            None => lines.push("Critique not available.".to_string()),
        },
    }
    lines.join("\n")
}
