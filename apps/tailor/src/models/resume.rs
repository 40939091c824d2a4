use serde::{Deserialize, Deserializer, Serialize};

use crate::models::job::JobPosting;

/// One of the four resume sections the pipeline reads, tailors and renders.
/// Declaration order is processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Summary,
    WorkExperience,
    TechnicalSkills,
    Projects,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Summary,
        Section::WorkExperience,
        Section::TechnicalSkills,
        Section::Projects,
    ];

    /// Heading text as it appears in a resume and in accumulated tailoring output.
    pub fn header(&self) -> &'static str {
        match self {
            Section::Summary => "SUMMARY",
            Section::WorkExperience => "WORK EXPERIENCE",
            Section::TechnicalSkills => "TECHNICAL SKILLS",
            Section::Projects => "PROJECTS",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Section::Summary => "summary",
            Section::WorkExperience => "work_experience",
            Section::TechnicalSkills => "technical_skills",
            Section::Projects => "projects",
        }
    }

    /// Output token budget for the tailoring call.
    pub fn max_output_tokens(&self) -> u32 {
        match self {
            Section::Summary => 450,
            Section::WorkExperience => 1500,
            Section::TechnicalSkills => 600,
            Section::Projects => 1200,
        }
    }
}

/// Free-text resume sections. `None` means the section was never populated;
/// `Some("")` means its header was not found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeSections {
    pub summary: Option<String>,
    pub work_experience: Option<String>,
    pub technical_skills: Option<String>,
    pub projects: Option<String>,
}

impl ResumeSections {
    pub fn get(&self, section: Section) -> Option<&str> {
        match section {
            Section::Summary => self.summary.as_deref(),
            Section::WorkExperience => self.work_experience.as_deref(),
            Section::TechnicalSkills => self.technical_skills.as_deref(),
            Section::Projects => self.projects.as_deref(),
        }
    }

    pub fn set(&mut self, section: Section, text: String) {
        let slot = match section {
            Section::Summary => &mut self.summary,
            Section::WorkExperience => &mut self.work_experience,
            Section::TechnicalSkills => &mut self.technical_skills,
            Section::Projects => &mut self.projects,
        };
        *slot = Some(text);
    }

    /// Trimmed section text, or `None` when missing or blank.
    pub fn non_empty(&self, section: Section) -> Option<&str> {
        self.get(section).map(str::trim).filter(|s| !s.is_empty())
    }

    /// Cover letter and critique need at least one narrative section to work from.
    pub fn has_narrative_content(&self) -> bool {
        [Section::Summary, Section::WorkExperience, Section::Projects]
            .iter()
            .any(|s| self.non_empty(*s).is_some())
    }

    pub fn is_blank(&self) -> bool {
        Section::ALL.iter().all(|s| self.non_empty(*s).is_none())
    }
}

/// Best-effort assessment extracted from the critique reply. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeCritique {
    #[serde(default, deserialize_with = "score_from_number_or_string")]
    pub ats_score: Option<f64>,
    #[serde(default)]
    pub ats_pass_assessment: Option<String>,
    #[serde(default)]
    pub recruiter_impression_assessment: Option<String>,
    #[serde(default)]
    pub potential_length_concern: Option<String>,
    #[serde(default)]
    pub content_structure_and_clarity: Option<String>,
    #[serde(default)]
    pub formatting_consistency_from_text: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreValue {
    Number(f64),
    Text(String),
}

/// Models sometimes quote the score (`"82"`, `"82%"`). Unparseable text becomes `None`.
fn score_from_number_or_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<ScoreValue>::deserialize(d)? {
        Some(ScoreValue::Number(n)) => Some(n),
        Some(ScoreValue::Text(s)) => s.trim().trim_end_matches('%').trim().parse().ok(),
        None => None,
    })
}

impl ResumeCritique {
    pub fn is_empty(&self) -> bool {
        self == &ResumeCritique::default()
    }
}

/// Aggregate output of one pipeline run. Lives for the run only; `--save-json` persists it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineResult {
    pub job_description: Option<JobPosting>,
    pub original_resume: Option<ResumeSections>,
    pub tailored_resume: Option<ResumeSections>,
    pub accumulated_tailored_text: Option<String>,
    pub generated_cover_letter_text: Option<String>,
    pub resume_critique: Option<ResumeCritique>,
    pub raw_critique_text: Option<String>,
}
