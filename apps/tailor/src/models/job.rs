use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder used by scrapers for fields they could not extract.
pub const NOT_AVAILABLE: &str = "N/A";

/// Analyzed job description: a title line, requirement lines and LLM-extracted keywords.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub job_title: String,
    pub requirements: Vec<String>,
    pub ats_keywords: Vec<String>,
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// A scraped posting as persisted in the consolidated JSON stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "not_available")]
    pub title_from_search: String,
    #[serde(default = "not_available")]
    pub detailed_title: String,
    #[serde(default = "not_available")]
    pub company_name: String,
    #[serde(default = "not_available")]
    pub url: String,
    #[serde(default)]
    pub id_source: String,
    #[serde(default)]
    pub source_platform: String,
    #[serde(default)]
    pub search_source_name: String,
    #[serde(default = "not_available")]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub scraped_timestamp: Option<DateTime<Utc>>,
}

impl JobRecord {
    pub fn new(platform: &str, search_name: &str) -> Self {
        Self {
            id: None,
            title_from_search: not_available(),
            detailed_title: not_available(),
            company_name: not_available(),
            url: not_available(),
            id_source: String::new(),
            source_platform: platform.to_string(),
            search_source_name: search_name.to_string(),
            description: not_available(),
            location: None,
            scraped_timestamp: Some(Utc::now()),
        }
    }

    /// Detailed title when the page yielded one, else the search-card title.
    pub fn title(&self) -> &str {
        if is_missing(&self.detailed_title) {
            &self.title_from_search
        } else {
            &self.detailed_title
        }
    }
}

pub fn is_missing(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v == NOT_AVAILABLE
}

/// Everything produced for one scraped posting, reported in the batch email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedArtifacts {
    pub job_id: String,
    pub job_title: String,
    pub company_name: String,
    pub job_url: String,
    pub source_platform: String,
    pub search_source_name: String,
    pub resume_pdf: Option<PathBuf>,
    pub cover_letter_pdf: Option<PathBuf>,
    pub critique_text: String,
}
