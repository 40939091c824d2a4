//! Relevance filtering for freshly scraped postings.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::job::{is_missing, JobRecord};

const MIN_DESCRIPTION_CHARS: usize = 50;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Keyword lists driving the filter. Loaded from the sources file; every list has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub relevant_keywords: Vec<String>,
    pub software_engineer_terms: Vec<String>,
    pub ai_ml_modifiers: Vec<String>,
    pub excluded_title_fields: Vec<String>,
    pub excluded_seniority: Vec<String>,
    pub excluded_domains: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            relevant_keywords: strings(&[
                "data scientist",
                "machine learning",
                "ml engineer",
                "ai engineer",
            ]),
            software_engineer_terms: strings(&["software engineer", "sde"]),
            ai_ml_modifiers: strings(&["ai", "ml", "machine learning", "data"]),
            excluded_title_fields: strings(&["frontend", "ui developer", "web developer"]),
            excluded_seniority: strings(&["lead", "principal", "director", "manager"]),
            excluded_domains: strings(&["lensa.com", "dice.com", "ziprecruiter.com"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    ExcludedDomain(String),
    Seniority(String),
    GenericSoftwareEngineer,
    ExcludedField(String),
    NoRelevantKeyword,
    DuplicateThisCycle,
    MissingDescription,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    Relevant,
    Rejected(RejectReason),
}

/// Case-insensitive whole-word matcher for one keyword.
fn word_regex(keyword: &str) -> Option<(String, Regex)> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return None;
    }
    match Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword))) {
        Ok(re) => Some((keyword.to_string(), re)),
        Err(e) => {
            warn!(keyword, "Skipping keyword that does not compile: {e}");
            None
        }
    }
}

fn word_regexes(keywords: &[String]) -> Vec<(String, Regex)> {
    keywords.iter().filter_map(|k| word_regex(k)).collect()
}

fn lowered(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Stateful for one cycle: remembers `company|title` pairs it already accepted.
pub struct JobFilter {
    excluded_domains: Vec<String>,
    seniority: Vec<(String, Regex)>,
    software_engineer_terms: Vec<String>,
    ai_ml_modifiers: Vec<String>,
    excluded_fields: Vec<(String, Regex)>,
    relevant: Vec<(String, Regex)>,
    seen_cores: HashSet<String>,
}

impl JobFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            excluded_domains: lowered(&config.excluded_domains),
            seniority: word_regexes(&config.excluded_seniority),
            software_engineer_terms: lowered(&config.software_engineer_terms),
            ai_ml_modifiers: lowered(&config.ai_ml_modifiers),
            excluded_fields: word_regexes(&config.excluded_title_fields),
            relevant: word_regexes(&config.relevant_keywords),
            seen_cores: HashSet::new(),
        }
    }

    fn excluded_domain(&self, url: &str) -> Option<String> {
        if is_missing(url) {
            return None;
        }
        let host = match reqwest::Url::parse(url.trim()) {
            Ok(parsed) => parsed.host_str().unwrap_or_default().to_lowercase(),
            Err(e) => {
                warn!(url, "Could not parse URL for domain check: {e}");
                return None;
            }
        };
        let host = host.trim_start_matches("www.");
        self.excluded_domains
            .iter()
            .find(|d| host.contains(d.as_str()))
            .cloned()
    }

    pub fn evaluate(&mut self, job: &JobRecord) -> FilterDecision {
        let title = job.title().to_lowercase();

        if let Some(domain) = self.excluded_domain(&job.url) {
            return FilterDecision::Rejected(RejectReason::ExcludedDomain(domain));
        }

        if let Some((kw, _)) = self.seniority.iter().find(|(_, re)| re.is_match(&title)) {
            return FilterDecision::Rejected(RejectReason::Seniority(kw.clone()));
        }

        let is_se_title = self
            .software_engineer_terms
            .iter()
            .any(|t| title.contains(t.as_str()));
        if is_se_title {
            let has_modifier = self.ai_ml_modifiers.iter().any(|m| title.contains(m.as_str()));
            if !has_modifier {
                return FilterDecision::Rejected(RejectReason::GenericSoftwareEngineer);
            }
        } else if let Some((kw, _)) = self.excluded_fields.iter().find(|(_, re)| re.is_match(&title)) {
            return FilterDecision::Rejected(RejectReason::ExcludedField(kw.clone()));
        }

        if !self.relevant.is_empty() {
            let combined = format!("{title} {}", job.description.to_lowercase());
            if !self.relevant.iter().any(|(_, re)| re.is_match(&combined)) {
                return FilterDecision::Rejected(RejectReason::NoRelevantKeyword);
            }
        }

        let core = format!(
            "{}|{}",
            job.company_name.trim().to_lowercase(),
            title.trim()
        );
        if self.seen_cores.contains(&core) {
            return FilterDecision::Rejected(RejectReason::DuplicateThisCycle);
        }

        let description = job.description.trim();
        if is_missing(description) || description.chars().count() <= MIN_DESCRIPTION_CHARS {
            return FilterDecision::Rejected(RejectReason::MissingDescription);
        }

        self.seen_cores.insert(core);
        FilterDecision::Relevant
    }

    /// Keeps the relevant jobs, logging why each other one was dropped.
    pub fn select(&mut self, jobs: &[JobRecord]) -> Vec<JobRecord> {
        let mut relevant = Vec::new();
        for job in jobs {
            let id = job.id.as_deref().unwrap_or("N/A");
            match self.evaluate(job) {
                FilterDecision::Relevant => {
                    info!(id, title = %job.title(), company = %job.company_name, "Relevant job added for processing");
                    relevant.push(job.clone());
                }
                FilterDecision::Rejected(RejectReason::MissingDescription) => {
                    warn!(id, title = %job.title(), "Job matched keywords but has insufficient description")
                }
                FilterDecision::Rejected(reason) => {
                    debug!(id, title = %job.title(), ?reason, "Job filtered out")
                }
            }
        }
        relevant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, company: &str, url: &str, description: &str) -> JobRecord {
        let mut j = JobRecord::new("linkedin", "AI Roles");
        j.id = Some(format!("{company}-{title}"));
        j.detailed_title = title.to_string();
        j.company_name = company.to_string();
        j.url = url.to_string();
        j.description = description.to_string();
        j
    }

    fn long_desc() -> String {
        "We need someone with machine learning experience to build production models. ".repeat(2)
    }

    fn rejected(reason: RejectReason) -> FilterDecision {
        FilterDecision::Rejected(reason)
    }

    #[test]
    fn test_excluded_domain() {
        let mut f = JobFilter::new(&FilterConfig::default());
        let j = job("ML Engineer", "Acme", "https://www.dice.com/job/1", &long_desc());
        assert_eq!(f.evaluate(&j), rejected(RejectReason::ExcludedDomain("dice.com".into())));
    }

    #[test]
    fn test_seniority_is_word_bounded() {
        let mut f = JobFilter::new(&FilterConfig::default());
        let lead = job("Lead ML Engineer", "Acme", "https://a.example/1", &long_desc());
        assert_eq!(f.evaluate(&lead), rejected(RejectReason::Seniority("lead".into())));
        // "leadership" is not "lead"
        let ok = job("ML Engineer, leadership track", "Acme", "https://a.example/2", &long_desc());
        assert_eq!(f.evaluate(&ok), FilterDecision::Relevant);
    }

    #[test]
    fn test_software_engineer_needs_modifier() {
        let mut f = JobFilter::new(&FilterConfig::default());
        let generic = job("Software Engineer", "Acme", "https://a.example/1", &long_desc());
        assert_eq!(f.evaluate(&generic), rejected(RejectReason::GenericSoftwareEngineer));
        let ml = job("Software Engineer, ML Platform", "Acme", "https://a.example/2", &long_desc());
        assert_eq!(f.evaluate(&ml), FilterDecision::Relevant);
    }

    #[test]
    fn test_excluded_field_and_relevance() {
        let mut f = JobFilter::new(&FilterConfig::default());
        let frontend = job("Frontend Developer", "Acme", "https://a.example/1", &long_desc());
        assert_eq!(f.evaluate(&frontend), rejected(RejectReason::ExcludedField("frontend".into())));
        let unrelated = job(
            "Account Executive",
            "Acme",
            "https://a.example/2",
            "Sell our products to enterprise customers across the region, every day of the week.",
        );
        assert_eq!(f.evaluate(&unrelated), rejected(RejectReason::NoRelevantKeyword));
    }

    #[test]
    fn test_empty_relevance_list_accepts_everything() {
        let config = FilterConfig {
            relevant_keywords: vec![],
            ..Default::default()
        };
        let mut f = JobFilter::new(&config);
        let j = job("Account Executive", "Acme", "N/A", &"x".repeat(60));
        assert_eq!(f.evaluate(&j), FilterDecision::Relevant);
    }

    #[test]
    fn test_duplicate_core_and_short_description() {
        let mut f = JobFilter::new(&FilterConfig::default());
        let first = job("ML Engineer", "Acme", "https://a.example/1", &long_desc());
        let again = job("ml engineer", "ACME", "https://a.example/2", &long_desc());
        assert_eq!(f.evaluate(&first), FilterDecision::Relevant);
        assert_eq!(f.evaluate(&again), rejected(RejectReason::DuplicateThisCycle));

        let short = job("Data Scientist", "Beta", "https://b.example/1", "machine learning");
        assert_eq!(f.evaluate(&short), rejected(RejectReason::MissingDescription));
        // a rejected short posting does not block a later complete one
        let full = job("Data Scientist", "Beta", "https://b.example/2", &long_desc());
        assert_eq!(f.evaluate(&full), FilterDecision::Relevant);
    }

    #[test]
    fn test_select_keeps_relevant_only() {
        let mut f = JobFilter::new(&FilterConfig::default());
        let jobs = vec![
            job("ML Engineer", "Acme", "https://a.example/1", &long_desc()),
            job("Director of ML", "Acme", "https://a.example/2", &long_desc()),
        ];
        let kept = f.select(&jobs);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].detailed_title, "ML Engineer");
    }
}
