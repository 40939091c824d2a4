use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro-001";
pub const DEFAULT_STORAGE_BUCKET: &str = "tailoring-agent";
pub const DEFAULT_TARGET_COMPANY: &str = "TargetCompany";
pub const DEFAULT_YOE: u32 = 4;
pub const DEFAULT_FILENAME_KEYWORD: &str = "AI";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    /// Service-account JSON used for the Drive PDF round-trip. `None` disables conversion.
    pub google_credentials_json: Option<String>,
    pub storage_bucket: String,
    pub s3_endpoint: Option<String>,
    pub aws_region: String,
    pub email_from: Option<String>,
    pub email_to: Option<String>,
    pub scrape_interval_minutes: u64,
    pub data_dir: PathBuf,
    pub profile_path: PathBuf,
    pub sources_path: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let data_dir = PathBuf::from(optional_env("DATA_DIR").unwrap_or_else(|| "data".to_string()));

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")
                .or_else(|_| require_env("GOOGLE_API_KEY"))
                .context("Set 'GEMINI_API_KEY' (or 'GOOGLE_API_KEY')")?,
            gemini_model: optional_env("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            google_credentials_json: optional_env("GOOGLE_CREDENTIALS_JSON_CONTENT"),
            storage_bucket: optional_env("STORAGE_BUCKET")
                .unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_string()),
            s3_endpoint: optional_env("S3_ENDPOINT"),
            aws_region: optional_env("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            email_from: optional_env("EMAIL_FROM"),
            email_to: optional_env("EMAIL_TO"),
            scrape_interval_minutes: parse_interval(optional_env("SCRAPE_INTERVAL_MINUTES"))?,
            profile_path: optional_env("PROFILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("profile.json")),
            sources_path: optional_env("SOURCES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("sources.json")),
            data_dir,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn tailored_documents_dir(&self) -> PathBuf {
        self.data_dir.join("tailored_documents")
    }

    pub fn scraped_jobs_dir(&self) -> PathBuf {
        self.data_dir.join("scraped_jobs")
    }

    pub fn all_jobs_file(&self) -> PathBuf {
        self.scraped_jobs_dir().join("consolidated_all_jobs.json")
    }

    pub fn relevant_jobs_file(&self) -> PathBuf {
        self.scraped_jobs_dir().join("consolidated_relevant_new_jobs.json")
    }
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Returns the variable's value, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_interval(raw: Option<String>) -> Result<u64> {
    let minutes = match raw {
        Some(v) => v
            .parse::<u64>()
            .context("SCRAPE_INTERVAL_MINUTES must be a whole number of minutes")?,
        None => 60,
    };
    anyhow::ensure!(minutes > 0, "SCRAPE_INTERVAL_MINUTES must be greater than zero");
    Ok(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_env_rejects_unset_and_blank() {
        std::env::remove_var("TAILOR_TEST_REQUIRED_UNSET");
        let err = require_env("TAILOR_TEST_REQUIRED_UNSET").unwrap_err();
        assert!(err.to_string().contains("TAILOR_TEST_REQUIRED_UNSET"));

        std::env::set_var("TAILOR_TEST_REQUIRED_BLANK", "   ");
        assert!(require_env("TAILOR_TEST_REQUIRED_BLANK").is_err());

        std::env::set_var("TAILOR_TEST_REQUIRED_SET", "  value ");
        assert_eq!(require_env("TAILOR_TEST_REQUIRED_SET").unwrap(), "value");
    }

    #[test]
    fn test_interval_defaults_to_sixty() {
        assert_eq!(parse_interval(None).unwrap(), 60);
    }

    #[test]
    fn test_interval_parses_value() {
        assert_eq!(parse_interval(Some("15".to_string())).unwrap(), 15);
    }

    #[test]
    fn test_interval_rejects_zero_and_garbage() {
        assert!(parse_interval(Some("0".to_string())).is_err());
        assert!(parse_interval(Some("hourly".to_string())).is_err());
    }

    #[test]
    fn test_scraper_paths_live_under_data_dir() {
        let config = Config {
            gemini_api_key: "k".to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            google_credentials_json: None,
            storage_bucket: DEFAULT_STORAGE_BUCKET.to_string(),
            s3_endpoint: None,
            aws_region: "us-east-1".to_string(),
            email_from: None,
            email_to: None,
            scrape_interval_minutes: 60,
            data_dir: PathBuf::from("/tmp/tailor"),
            profile_path: PathBuf::from("/tmp/tailor/profile.json"),
            sources_path: PathBuf::from("/tmp/tailor/sources.json"),
            rust_log: "info".to_string(),
        };
        assert_eq!(
            config.all_jobs_file(),
            PathBuf::from("/tmp/tailor/scraped_jobs/consolidated_all_jobs.json")
        );
        assert_eq!(
            config.relevant_jobs_file(),
            PathBuf::from("/tmp/tailor/scraped_jobs/consolidated_relevant_new_jobs.json")
        );
        assert_eq!(
            config.tailored_documents_dir(),
            PathBuf::from("/tmp/tailor/tailored_documents")
        );
    }
}
