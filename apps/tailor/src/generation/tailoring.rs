//! Section-by-section resume tailoring. Each call sees what was already tailored.

use tracing::{info, warn};

use crate::generation::post_process::clean_section_output;
use crate::generation::prompts::{section_prompt, SectionPromptInput};
use crate::llm_client::{GenerationParams, TextGenerator};
use crate::models::job::JobPosting;
use crate::models::resume::{ResumeSections, Section};

const TAILORING_TEMPERATURE: f32 = 0.15;
const DEFAULT_JOB_TITLE: &str = "the specified position";

/// Optional context shared by every section prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct TailoringContext<'a> {
    pub company: Option<&'a str>,
    pub location_type: Option<&'a str>,
    pub master_profile: Option<&'a str>,
    pub education_fact: Option<&'a str>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TailoringOutcome {
    pub sections: ResumeSections,
    /// `## HEADER\ncontent` blocks for every section, joined by a blank line.
    pub accumulated_text: String,
}

fn accumulation_block(section: Section, content: &str) -> String {
    format!("## {}\n{}", section.header(), content.trim())
}

/// Tailors the four sections in order. A section without original content is copied
/// through; an LLM failure falls back to the original text.
pub async fn tailor_sections(
    original: &ResumeSections,
    job: &JobPosting,
    ctx: &TailoringContext<'_>,
    llm: &dyn TextGenerator,
) -> TailoringOutcome {
    let job_title = if job.job_title.trim().is_empty() {
        DEFAULT_JOB_TITLE
    } else {
        job.job_title.as_str()
    };

    let mut sections = ResumeSections::default();
    let mut blocks: Vec<String> = Vec::with_capacity(Section::ALL.len());

    for section in Section::ALL {
        let Some(source) = original.non_empty(section) else {
            let passthrough = original.get(section).unwrap_or_default().to_string();
            let block_body = if passthrough.is_empty() {
                format!("(No content provided for {})", section.key())
            } else {
                passthrough.clone()
            };
            info!(section = section.key(), "No original content, skipping tailoring");
            blocks.push(accumulation_block(section, &block_body));
            sections.set(section, passthrough);
            continue;
        };

        let previously_tailored = blocks.join("\n\n");
        let prompt = section_prompt(&SectionPromptInput {
            section,
            original: source,
            job_title,
            requirements: &job.requirements,
            ats_keywords: &job.ats_keywords,
            company: ctx.company,
            location_type: ctx.location_type,
            master_profile: ctx.master_profile,
            previously_tailored: Some(previously_tailored.as_str()),
            education_fact: ctx.education_fact,
        });
        let params = GenerationParams::new(TAILORING_TEMPERATURE, section.max_output_tokens());

        let raw = match llm.generate_text(&prompt, params).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    section = section.key(),
                    "Tailoring call failed, keeping original content: {e}"
                );
                source.to_string()
            }
        };

        let cleaned = clean_section_output(section, &raw);
        info!(
            section = section.key(),
            chars = cleaned.chars().count(),
            "Section tailored"
        );
        blocks.push(accumulation_block(section, &cleaned));
        sections.set(section, cleaned);
    }

    TailoringOutcome {
        sections,
        accumulated_text: blocks.join("\n\n").trim().to_string(),
    }
}
