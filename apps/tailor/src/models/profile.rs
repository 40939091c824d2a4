use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Placeholder in a project link that expands to the candidate's GitHub URL.
const GITHUB_PLACEHOLDER: &str = "{github}";

/// Candidate contact block rendered at the top of both documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub name: String,
    pub street_address: String,
    pub city_state_zip: String,
    pub phone: String,
    pub email: String,
    pub linkedin_text: String,
    pub linkedin_url: String,
    pub github_text: String,
    pub github_url: String,
    pub portfolio_text: String,
    pub portfolio_url: String,
    /// Free-form first line under the name, e.g. "City, ST | phone | email".
    pub line1_info: String,
}

impl ContactInfo {
    /// Last whitespace-separated token of the name, used in output filenames.
    pub fn last_name(&self) -> &str {
        self.name.split_whitespace().last().unwrap_or("Candidate")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub degree_line: String,
    pub university_line: String,
    pub dates_line: String,
}

/// Static candidate facts that the tailoring prompts and documents rely on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub contact: ContactInfo,
    pub education: Vec<EducationEntry>,
    /// Sentence stated verbatim to the summary prompt. Derived from `education` when absent.
    pub education_fact: Option<String>,
    /// Exact project title → demo URL. `{github}` expands to `contact.github_url`.
    pub project_links: BTreeMap<String, String>,
}

impl Profile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile file {}", path.display()))?;
        let profile: Profile = serde_json::from_str(&raw)
            .with_context(|| format!("Profile file {} is not valid JSON", path.display()))?;
        anyhow::ensure!(
            !profile.contact.name.trim().is_empty(),
            "Profile file {} has no contact.name",
            path.display()
        );
        Ok(profile)
    }

    pub fn project_link(&self, title: &str) -> Option<String> {
        self.project_links.get(title.trim()).map(|url| {
            url.replace(GITHUB_PLACEHOLDER, self.contact.github_url.trim_end_matches('/'))
        })
    }

    pub fn education_fact(&self) -> Option<String> {
        if let Some(fact) = self.education_fact.as_ref().filter(|f| !f.trim().is_empty()) {
            return Some(fact.clone());
        }
        self.education.first().map(|e| {
            format!(
                "The candidate's most recent education is: {}, {} ({}).",
                e.degree_line, e.university_line, e.dates_line
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Profile {
        let mut links = BTreeMap::new();
        links.insert(
            "Intelligent Building Code QA".to_string(),
            "https://codes.example.app/".to_string(),
        );
        links.insert(
            "AI-Text Discriminator".to_string(),
            "{github}/AI-Content-Filter".to_string(),
        );
        Profile {
            contact: ContactInfo {
                name: "Ada M. Lovelace".to_string(),
                github_url: "https://github.com/ada/".to_string(),
                ..Default::default()
            },
            education: vec![EducationEntry {
                degree_line: "M.S. Computer Science".to_string(),
                university_line: "State University".to_string(),
                dates_line: "2023 - 2025".to_string(),
            }],
            education_fact: None,
            project_links: links,
        }
    }

    #[test]
    fn test_last_name() {
        assert_eq!(sample().contact.last_name(), "Lovelace");
        assert_eq!(ContactInfo::default().last_name(), "Candidate");
    }

    #[test]
    fn test_project_link_expands_github_placeholder() {
        let p = sample();
        assert_eq!(
            p.project_link("AI-Text Discriminator").as_deref(),
            Some("https://github.com/ada/AI-Content-Filter")
        );
        assert_eq!(
            p.project_link("Intelligent Building Code QA").as_deref(),
            Some("https://codes.example.app/")
        );
        assert!(p.project_link("Unknown Project").is_none());
    }

    #[test]
    fn test_education_fact_derived_from_first_entry() {
        let fact = sample().education_fact().unwrap();
        assert!(fact.contains("M.S. Computer Science"));
        assert!(fact.contains("State University"));
    }

    #[test]
    fn test_explicit_education_fact_wins() {
        let mut p = sample();
        p.education_fact = Some("The candidate is pursuing an M.S.".to_string());
        assert_eq!(
            p.education_fact().as_deref(),
            Some("The candidate is pursuing an M.S.")
        );
    }

    #[test]
    fn test_load_rejects_missing_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, r#"{"contact": {"email": "a@b.c"}}"#).unwrap();
        assert!(Profile::load(&path).is_err());

        std::fs::write(&path, r#"{"contact": {"name": "Ada Lovelace"}}"#).unwrap();
        let p = Profile::load(&path).unwrap();
        assert_eq!(p.contact.name, "Ada Lovelace");
        assert!(p.education.is_empty());
    }
}
