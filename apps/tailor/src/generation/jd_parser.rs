//! JD parser: splits a raw job description into a title and requirement lines,
//! and asks the LLM for the ATS keywords.

use std::collections::HashSet;

use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::generation::prompts::keyword_prompt;
use crate::llm_client::{GenerationParams, TextGenerator};
use crate::models::job::JobPosting;

pub const UNKNOWN_POSITION: &str = "Unknown Position";
pub const MAX_ATS_KEYWORDS: usize = 25;
const KEYWORD_TEMPERATURE: f32 = 0.1;
const KEYWORD_MAX_TOKENS: u32 = 200;
const MIN_KEYWORD_LEN: usize = 3;

/// Terms too generic to be worth screening for.
const GENERIC_STOP_TERMS: &[&str] = &[
    "benefits",
    "connections",
    "check",
    "exp",
    "experience",
    "position",
    "role",
    "company",
    "remote",
    "hybrid",
    "full-time",
    "team",
    "looking",
    "seeking",
    "hiring",
    "responsibilities",
    "qualification",
    "qualifications",
    "preferred",
    "required",
    "industry",
    "media",
    "software",
    "hardware",
    "tv",
    "roku",
    "advertising",
    "platforms",
    "consumer",
    "electronics",
    "digital",
    "entertainment",
    "video",
    "streaming",
];

/// Drops duplicates (case-insensitive), very short or non-alphabetic entries and
/// generic terms. Keeps first occurrences in order, capped at `max`.
pub fn filter_ats_keywords<S: AsRef<str>>(keywords: &[S], max: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for keyword in keywords {
        let k = keyword.as_ref().trim();
        if k.is_empty() {
            continue;
        }
        let lowered = k.to_lowercase();
        if seen.contains(&lowered) {
            continue;
        }
        if !k.chars().any(char::is_alphabetic) || k.chars().count() < MIN_KEYWORD_LEN {
            continue;
        }
        if GENERIC_STOP_TERMS.contains(&lowered.as_str()) {
            continue;
        }
        out.push(k.to_string());
        seen.insert(lowered);
        if out.len() >= max {
            break;
        }
    }
    out
}

/// Title is the first non-empty line; requirements are the remaining lines
/// (or the single line itself when that is all there is).
fn split_title_and_requirements(text: &str) -> (String, Vec<String>) {
    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    let title = lines
        .first()
        .cloned()
        .unwrap_or_else(|| UNKNOWN_POSITION.to_string());
    let requirements = if lines.len() > 1 {
        lines[1..].to_vec()
    } else {
        lines
    };
    (title, requirements)
}

async fn extract_ats_keywords(llm: &dyn TextGenerator, jd_text: &str, job_title: &str) -> Vec<String> {
    let prompt = keyword_prompt(job_title, jd_text);
    let params = GenerationParams::new(KEYWORD_TEMPERATURE, KEYWORD_MAX_TOKENS);

    match llm.generate_text(&prompt, params).await {
        Ok(reply) => {
            let raw: Vec<&str> = reply
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .collect();
            let keywords = filter_ats_keywords(&raw, MAX_ATS_KEYWORDS);
            info!(
                raw = raw.len(),
                kept = keywords.len(),
                "Extracted ATS keywords: {:?}",
                keywords
            );
            keywords
        }
        Err(e) => {
            error!("Failed to extract ATS keywords: {e}");
            Vec::new()
        }
    }
}

/// Analyzes a job description. Empty input is rejected; keyword extraction is best-effort.
pub async fn analyze_job_description(
    jd_text: &str,
    llm: &dyn TextGenerator,
) -> Result<JobPosting, AppError> {
    if jd_text.trim().is_empty() {
        return Err(AppError::Validation(
            "Job description content is empty".to_string(),
        ));
    }

    let (job_title, requirements) = split_title_and_requirements(jd_text);
    let ats_keywords = extract_ats_keywords(llm, jd_text, &job_title).await;

    if ats_keywords.is_empty() {
        warn!("No ATS keywords were extracted for '{job_title}'");
    }
    info!(
        title = %job_title,
        requirements = requirements.len(),
        keywords = ats_keywords.len(),
        "Job description analyzed"
    );

    Ok(JobPosting {
        job_title,
        requirements,
        ats_keywords,
    })
}
