//! Job sources: the public LinkedIn guest search and local JSON feeds.
//!
//! LinkedIn markup changes often, so extraction tries an ordered list of CSS selectors and
//! is best-effort: a card or page that does not match yields `N/A` fields rather than an error.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use reqwest::Client;
use ::scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::models::job::{is_missing, JobRecord, NOT_AVAILABLE};
use crate::scraper::filters::FilterConfig;
use crate::scraper::job_id::parse_job_id;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const SEARCH_TIMEOUT_SECS: u64 = 25;
const JOB_PAGE_TIMEOUT_SECS: u64 = 30;
const LINKEDIN_BASE: &str = "https://www.linkedin.com";
const MIN_DESCRIPTION_CHARS: usize = 50;
/// Seconds to wait before each job page request.
const DETAIL_DELAY_SECS: (f64, f64) = (3.0, 7.0);

/// One configured search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub platform: String,
    #[serde(default)]
    pub search_name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Contents of the sources file: searches plus filter keyword lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub filters: FilterConfig,
}

impl SourcesFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sources file {}", path.display()))?;
        let file: SourcesFile = serde_json::from_str(&raw)
            .with_context(|| format!("Sources file {} is not valid JSON", path.display()))?;
        file.validate()?;
        Ok(file)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.sources.is_empty(), "No job sources configured");
        for (i, source) in self.sources.iter().enumerate() {
            anyhow::ensure!(
                !source.platform.trim().is_empty(),
                "Source #{} ('{}') is missing 'platform'",
                i + 1,
                source.search_name
            );
            anyhow::ensure!(
                !source.search_name.trim().is_empty(),
                "Source #{} is missing 'search_name'",
                i + 1
            );
            let has_target = source.url.as_deref().is_some_and(|u| !u.trim().is_empty())
                || source.path.is_some();
            anyhow::ensure!(
                has_target,
                "Source '{}' needs a 'url' or a 'path'",
                source.search_name
            );
        }
        Ok(())
    }
}

#[async_trait]
pub trait JobSource: Send + Sync {
    fn name(&self) -> &str;
    fn platform(&self) -> &str;
    /// New postings whose ids are not in `seen_ids`.
    async fn fetch(&self, seen_ids: &HashSet<String>) -> Result<Vec<JobRecord>>;
}

/// Instantiates the configured sources. Unsupported platforms are skipped with an error log.
pub fn build_sources(configs: &[SourceConfig], client: &Client) -> Vec<Box<dyn JobSource>> {
    let mut sources: Vec<Box<dyn JobSource>> = Vec::new();
    for config in configs {
        match (config.platform.as_str(), &config.url, &config.path) {
            ("linkedin", Some(url), _) => sources.push(Box::new(LinkedInGuestSource::new(
                client.clone(),
                &config.search_name,
                url,
            ))),
            (platform, _, Some(path)) => sources.push(Box::new(JsonFeedSource::new(
                platform,
                &config.search_name,
                path.clone(),
            ))),
            (platform, _, _) => error!(
                platform,
                search = %config.search_name,
                "Unsupported platform or missing target; skipping source"
            ),
        }
    }
    sources
}

const JOB_ID_ATTRIBUTE: &str = "data-entity-urn";
const FALLBACK_ID_ATTRIBUTES: [&str; 3] = ["data-job-id", "data-entity-urn", "id"];

static_selectors!(results_list_sel, ["ul.jobs-search__results-list", ".jobs-search__results-list"]);
static_selector!(card_sel, "li");
static_selector!(card_title_sel, "h3.base-search-card__title");
static_selector!(card_link_sel, "a.base-card__full-link");
static_selectors!(card_company_sel, ["h4.base-search-card__subtitle a", "h4.base-search-card__subtitle"]);
static_selector!(card_id_holder_sel, "div.base-search-card");
static_selector!(html_title_sel, "title");
static_selectors!(
    page_title_sel,
    [
        "h1.jobs-unified-top-card__job-title",
        "h1.job-details-jobs-unified-top-card__job-title",
        ".top-card__title",
        "h1",
    ]
);
static_selectors!(
    page_company_sel,
    [
        ".jobs-unified-top-card__company-name a",
        ".jobs-unified-top-card__company-name",
        ".job-details-jobs-unified-top-card__company-name a",
        ".job-details-jobs-unified-top-card__company-name",
        ".topcard__org-name-link",
        ".sub-nav-cta__meta-text",
    ]
);
static_selectors!(
    page_description_sel,
    [
        "div.jobs-description__content div.jobs-box__html-content",
        "div.show-more-less-html__markup",
        "article.jobs-description__container",
        "#job-details",
        r#"section[aria-label*="job description" i]"#,
    ]
);

/// Text nodes of `el`, each trimmed, blanks dropped, one per line. Button labels are skipped.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.descendants()
        .filter(|node| {
            !node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .take_while(|a| a.id() != el.id())
                .any(|a| a.value().name() == "button")
        })
        .filter_map(|node| node.value().as_text().map(|t| t.trim()))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Element text collapsed onto one line.
fn inline_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(root: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .filter_map(|sel| root.select(sel).next())
        .map(inline_text)
        .find(|t| !t.is_empty())
}

fn page_title(doc: &Html) -> String {
    doc.select(html_title_sel())
        .next()
        .map(inline_text)
        .unwrap_or_default()
}

/// Absolute job URL without tracking parameters.
fn normalize_job_url(href: &str) -> String {
    let href = href.trim();
    if href.starts_with("/jobs/view/") {
        let path = href.split('?').next().unwrap_or_default();
        format!("{LINKEDIN_BASE}{path}")
    } else if href.starts_with("http") && href.contains("/jobs/view/") {
        href.split('?').next().unwrap_or_default().to_string()
    } else {
        href.to_string()
    }
}

fn card_raw_id<'a>(card: ElementRef<'a>) -> Option<&'a str> {
    let holder = card.select(card_id_holder_sel()).next()?;
    holder.value().attr(JOB_ID_ATTRIBUTE).or_else(|| {
        FALLBACK_ID_ATTRIBUTES
            .iter()
            .find_map(|attr| holder.value().attr(attr).or_else(|| card.value().attr(attr)))
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobSummary {
    pub id: String,
    pub id_source: String,
    pub title: String,
    pub company: String,
    pub url: String,
}

/// Job cards from a guest search results page.
pub fn parse_search_page(html: &str) -> Vec<JobSummary> {
    let doc = Html::parse_document(html);
    let Some(list) = results_list_sel().iter().find_map(|sel| doc.select(sel).next()) else {
        warn!("No LinkedIn job list container found; the markup may have changed");
        if page_title(&doc).contains("Sign In") {
            error!("LinkedIn search page requires sign in");
        }
        return Vec::new();
    };

    let mut summaries = Vec::new();
    for card in list.select(card_sel()) {
        let title = card
            .select(card_title_sel())
            .next()
            .map(inline_text)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let company =
            first_text(card, card_company_sel()).unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let url = card
            .select(card_link_sel())
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(normalize_job_url)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        if is_missing(&title) || !url.starts_with("http") {
            continue;
        }
        let (id, id_source) = parse_job_id(card_raw_id(card), &url, "linkedin", &title, &company);
        summaries.push(JobSummary {
            id,
            id_source: id_source.to_string(),
            title,
            company,
            url,
        });
    }
    info!(count = summaries.len(), "Parsed LinkedIn job summaries");
    summaries
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPageDetails {
    pub title: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
}

/// Title, company and description text from a job page.
pub fn parse_job_page(html: &str) -> JobPageDetails {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    // Later selectors are tried only while the text found so far is too short.
    let mut description = None;
    for sel in page_description_sel() {
        let Some(el) = doc.select(sel).next() else {
            continue;
        };
        let text = element_text(el);
        if text.is_empty() {
            continue;
        }
        let long_enough = text.chars().count() > MIN_DESCRIPTION_CHARS;
        description = Some(text);
        if long_enough {
            break;
        }
    }

    let description = description.or_else(|| {
        let title = page_title(&doc);
        (title.contains("Sign In") || title.contains("Authwall"))
            .then(|| "Access to LinkedIn job page possibly blocked/requires login.".to_string())
    });

    JobPageDetails {
        title: first_text(root, page_title_sel()),
        company: first_text(root, page_company_sel()),
        description,
    }
}

pub struct LinkedInGuestSource {
    client: Client,
    search_name: String,
    url: String,
}

impl LinkedInGuestSource {
    pub fn new(client: Client, search_name: &str, url: &str) -> Self {
        Self {
            client,
            search_name: search_name.to_string(),
            url: url.to_string(),
        }
    }

    async fn get_html(&self, url: &str, timeout_secs: u64) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .timeout(Duration::from_secs(timeout_secs))
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("Request to {url} returned an error status"))?;
        Ok(response.text().await?)
    }

    fn record_from_summary(&self, summary: &JobSummary) -> JobRecord {
        let mut job = JobRecord::new("linkedin", &self.search_name);
        job.id = Some(summary.id.clone());
        job.id_source = summary.id_source.clone();
        job.title_from_search = summary.title.clone();
        job.detailed_title = summary.title.clone();
        job.company_name = summary.company.clone();
        job.url = summary.url.clone();
        job
    }
}

#[async_trait]
impl JobSource for LinkedInGuestSource {
    fn name(&self) -> &str {
        &self.search_name
    }

    fn platform(&self) -> &str {
        "linkedin"
    }

    async fn fetch(&self, seen_ids: &HashSet<String>) -> Result<Vec<JobRecord>> {
        info!(search = %self.search_name, url = %self.url, "Starting LinkedIn search");
        let html = self.get_html(&self.url, SEARCH_TIMEOUT_SECS).await?;
        let summaries = parse_search_page(&html);
        if summaries.is_empty() {
            warn!(search = %self.search_name, "No job summaries parsed; check the page markup");
            return Ok(Vec::new());
        }

        let mut jobs = Vec::new();
        for summary in summaries {
            if seen_ids.contains(&summary.id) {
                debug!(id = %summary.id, "Job already seen; skipping");
                continue;
            }
            let mut job = self.record_from_summary(&summary);

            let delay = rand::thread_rng().gen_range(DETAIL_DELAY_SECS.0..DETAIL_DELAY_SECS.1);
            tokio::time::sleep(Duration::from_secs_f64(delay)).await;

            match self.get_html(&summary.url, JOB_PAGE_TIMEOUT_SECS).await {
                Ok(page) => {
                    let details = parse_job_page(&page);
                    if let Some(title) = details.title {
                        job.detailed_title = title;
                    }
                    if let Some(company) = details.company {
                        job.company_name = company;
                    }
                    if let Some(description) = details.description {
                        job.description = description;
                    }
                }
                Err(e) => {
                    error!(id = %summary.id, "Error fetching job page: {e:#}");
                    job.description = format!("Error fetching page: {e}");
                }
            }
            info!(id = %summary.id, title = %job.detailed_title, company = %job.company_name, "New LinkedIn job");
            jobs.push(job);
        }
        info!(search = %self.search_name, count = jobs.len(), "LinkedIn search done");
        Ok(jobs)
    }
}

/// Reads postings from a JSON array of job records, e.g. an export from another scraper.
pub struct JsonFeedSource {
    platform: String,
    search_name: String,
    path: PathBuf,
}

impl JsonFeedSource {
    pub fn new(platform: &str, search_name: &str, path: PathBuf) -> Self {
        Self {
            platform: platform.to_string(),
            search_name: search_name.to_string(),
            path,
        }
    }
}

#[async_trait]
impl JobSource for JsonFeedSource {
    fn name(&self) -> &str {
        &self.search_name
    }

    fn platform(&self) -> &str {
        &self.platform
    }

    async fn fetch(&self, seen_ids: &HashSet<String>) -> Result<Vec<JobRecord>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read job feed {}", self.path.display()))?;
        let records: Vec<JobRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("Job feed {} is not a JSON array of jobs", self.path.display()))?;

        let mut jobs = Vec::new();
        for mut job in records {
            if job.id.as_deref().map_or(true, str::is_empty) {
                let (id, source) = parse_job_id(
                    None,
                    &job.url,
                    &self.platform,
                    job.title(),
                    &job.company_name,
                );
                job.id = Some(id);
                job.id_source = source.to_string();
            }
            if job.id.as_ref().is_some_and(|id| seen_ids.contains(id)) {
                continue;
            }
            if job.source_platform.is_empty() {
                job.source_platform = self.platform.clone();
            }
            if job.search_source_name.is_empty() {
                job.search_source_name = self.search_name.clone();
            }
            if is_missing(&job.detailed_title) {
                job.detailed_title = job.title_from_search.clone();
            }
            job.scraped_timestamp.get_or_insert_with(Utc::now);
            jobs.push(job);
        }
        info!(feed = %self.path.display(), count = jobs.len(), "Loaded new jobs from feed");
        Ok(jobs)
    }
}
