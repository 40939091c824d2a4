//! Periodic scrape → filter → tailor → upload → email cycle.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use rand::Rng;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::delivery::email::{batch_body, batch_subject, load_attachments, DeliveredJob, Mailer};
use crate::delivery::storage::{object_key, ArtifactStore};
use crate::llm_client::TextGenerator;
use crate::models::job::{JobRecord, ProcessedArtifacts};
use crate::models::profile::Profile;
use crate::render::drive::DocumentConverter;
use crate::scraper::filters::{FilterConfig, JobFilter};
use crate::scraper::processor::{process_jobs, ProcessorContext};
use crate::scraper::sources::JobSource;
use crate::scraper::store::{load_jobs, merge_and_deduplicate, save_jobs};

/// Pause between two sources, in seconds.
const SOURCE_DELAY_SECS: (f64, f64) = (5.0, 15.0);
const CLEANUP_HOUR: u32 = 0;
const CLEANUP_MINUTE: u32 = 5;

/// Run number within the current day. Resets when the date changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunCounter {
    date: NaiveDate,
    run: u32,
}

impl RunCounter {
    pub fn new(today: NaiveDate) -> Self {
        Self { date: today, run: 0 }
    }

    /// Run number to use for a cycle happening on `today`.
    pub fn current(&mut self, today: NaiveDate) -> u32 {
        if today != self.date {
            info!(previous = %self.date, %today, "New day; resetting run counter");
            self.date = today;
            self.run = 0;
        }
        self.run
    }

    /// Called once a cycle actually attempted processing.
    pub fn advance(&mut self) {
        self.run += 1;
    }
}

/// Next 00:05 strictly after `now`.
pub fn next_cleanup_after(now: NaiveDateTime) -> NaiveDateTime {
    let at = NaiveTime::from_hms_opt(CLEANUP_HOUR, CLEANUP_MINUTE, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date().and_time(at);
    if now < today {
        today
    } else {
        let tomorrow = now.date().succ_opt().unwrap_or(now.date());
        tomorrow.and_time(at)
    }
}

fn random_delay(range: (f64, f64)) -> Duration {
    let secs = if range.1 > range.0 {
        rand::thread_rng().gen_range(range.0..range.1)
    } else {
        range.0
    };
    Duration::from_secs_f64(secs.max(0.0))
}

/// Persistent locations the scheduler reads and writes.
#[derive(Debug, Clone)]
pub struct StatePaths {
    pub all_jobs: PathBuf,
    pub relevant_jobs: PathBuf,
    pub output_dir: PathBuf,
}

impl StatePaths {
    pub fn from_config(config: &Config) -> Self {
        Self {
            all_jobs: config.all_jobs_file(),
            relevant_jobs: config.relevant_jobs_file(),
            output_dir: config.tailored_documents_dir(),
        }
    }
}

/// Deletes both job stores so the next cycle starts from a clean slate.
pub fn cleanup_state_files(paths: &StatePaths) {
    for path in [&paths.all_jobs, &paths.relevant_jobs] {
        match std::fs::remove_file(path) {
            Ok(()) => info!(path = %path.display(), "Deleted state file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => error!(path = %path.display(), "Could not delete state file: {e}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub new_jobs: usize,
    pub relevant_jobs: usize,
    pub processed: usize,
    pub emailed: bool,
}

async fn upload_if_present(store: &dyn ArtifactStore, company: &str, path: Option<&Path>) -> bool {
    let Some(path) = path else {
        return false;
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let key = object_key(company, &file_name, Local::now().naive_local());
    match store.upload(path, &key).await {
        Ok(uri) => {
            info!(%uri, "Artifact uploaded");
            true
        }
        Err(e) => {
            error!(key, code = e.code(), "Artifact upload failed: {e}");
            false
        }
    }
}

/// Uploads every PDF, sends one email for the batch and, once it is sent, removes the local PDFs.
/// Returns whether the email went out.
pub async fn deliver_batch(
    processed: Vec<ProcessedArtifacts>,
    store: Option<&dyn ArtifactStore>,
    mailer: Option<&dyn Mailer>,
    date: NaiveDate,
    run: u32,
) -> bool {
    let mut delivered = Vec::with_capacity(processed.len());
    for artifacts in processed {
        let (resume_uploaded, cover_letter_uploaded) = match store {
            Some(store) => (
                upload_if_present(store, &artifacts.company_name, artifacts.resume_pdf.as_deref()).await,
                upload_if_present(store, &artifacts.company_name, artifacts.cover_letter_pdf.as_deref())
                    .await,
            ),
            None => (false, false),
        };
        delivered.push(DeliveredJob {
            artifacts,
            resume_uploaded,
            cover_letter_uploaded,
        });
    }

    let Some(mailer) = mailer else {
        warn!("No mailer configured; batch email skipped");
        return false;
    };
    if delivered.is_empty() {
        return false;
    }

    let pdfs: Vec<PathBuf> = delivered
        .iter()
        .flat_map(|d| [d.artifacts.resume_pdf.clone(), d.artifacts.cover_letter_pdf.clone()])
        .flatten()
        .collect();
    let attachments = load_attachments(&pdfs).await;
    let subject = batch_subject(date, run);
    let body = batch_body(date, run, &delivered);

    if let Err(e) = mailer.send(&subject, &body, &attachments).await {
        error!(code = e.code(), "Batch email failed; keeping local PDFs: {e}");
        return false;
    }

    for pdf in &pdfs {
        if let Err(e) = tokio::fs::remove_file(pdf).await {
            warn!(path = %pdf.display(), "Could not delete local PDF: {e}");
        }
    }
    true
}

/// Everything one scheduler needs. Built once in `main`.
pub struct Scheduler {
    pub paths: StatePaths,
    pub sources: Vec<Box<dyn JobSource>>,
    pub filters: FilterConfig,
    pub llm: Box<dyn TextGenerator>,
    pub profile: Profile,
    pub converter: Option<Box<dyn DocumentConverter>>,
    pub store: Option<Box<dyn ArtifactStore>>,
    pub mailer: Option<Box<dyn Mailer>>,
    pub base_resume: PathBuf,
    pub master_profile: Option<String>,
    pub keyword: String,
    pub yoe: Option<u32>,
    pub interval: Duration,
    pub source_delay_secs: (f64, f64),
    pub counter: RunCounter,
}

impl Scheduler {
    pub fn default_source_delay() -> (f64, f64) {
        SOURCE_DELAY_SECS
    }

    async fn fetch_new_jobs(&self, seen: &mut HashSet<String>) -> Vec<JobRecord> {
        let mut new_jobs = Vec::new();
        for (i, source) in self.sources.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(random_delay(self.source_delay_secs)).await;
            }
            info!(platform = source.platform(), search = source.name(), "Fetching source");
            match source.fetch(seen).await {
                Ok(jobs) => {
                    for job in &jobs {
                        if let Some(id) = job.id.as_ref() {
                            seen.insert(id.clone());
                        }
                    }
                    info!(search = source.name(), count = jobs.len(), "Source returned new jobs");
                    new_jobs.extend(jobs);
                }
                Err(e) => error!(search = source.name(), "Source failed: {e:#}"),
            }
        }
        new_jobs
    }

    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let started = Local::now();
        info!(at = %started.format("%Y-%m-%d %H:%M:%S"), "Starting scrape cycle");
        let mut report = CycleReport::default();

        let all_jobs = load_jobs(&self.paths.all_jobs);
        let mut seen: HashSet<String> = all_jobs.iter().filter_map(|j| j.id.clone()).collect();

        let new_jobs = self.fetch_new_jobs(&mut seen).await;
        report.new_jobs = new_jobs.len();
        if new_jobs.is_empty() {
            info!("No new jobs this cycle");
            return Ok(report);
        }

        let merged = merge_and_deduplicate(all_jobs, new_jobs.clone());
        save_jobs(&self.paths.all_jobs, &merged)?;

        let relevant = JobFilter::new(&self.filters).select(&new_jobs);
        save_jobs(&self.paths.relevant_jobs, &relevant)?;
        report.relevant_jobs = relevant.len();
        if relevant.is_empty() {
            info!("No relevant new jobs this cycle");
            return Ok(report);
        }

        let today = Local::now().date_naive();
        let run = self.counter.current(today);
        let ctx = ProcessorContext {
            llm: self.llm.as_ref(),
            profile: &self.profile,
            converter: self.converter.as_deref(),
            base_resume: self.base_resume.clone(),
            master_profile: self.master_profile.clone(),
            output_dir: self.paths.output_dir.clone(),
            keyword: self.keyword.clone(),
            yoe: self.yoe,
        };
        let processed = process_jobs(&relevant, &ctx).await;
        self.counter.advance();
        report.processed = processed.len();

        report.emailed = deliver_batch(
            processed,
            self.store.as_deref(),
            self.mailer.as_deref(),
            today,
            run,
        )
        .await;

        let elapsed = Local::now() - started;
        info!(
            seconds = elapsed.num_seconds(),
            new = report.new_jobs,
            relevant = report.relevant_jobs,
            processed = report.processed,
            emailed = report.emailed,
            "Scrape cycle finished"
        );
        Ok(report)
    }

    async fn logged_cycle(&mut self) {
        if let Err(e) = self.run_cycle().await {
            error!("Scrape cycle failed: {e:#}");
        }
    }

    /// Runs a cycle now, then every `interval`, deleting the state files daily at 00:05
    /// local time. Returns on Ctrl-C.
    pub async fn run_forever(&mut self) -> Result<()> {
        info!(minutes = self.interval.as_secs() / 60, "Scheduler started");
        self.logged_cycle().await;

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // the first tick completes immediately; the initial cycle already covered it
        ticker.tick().await;

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            let now = Local::now().naive_local();
            let until_cleanup = (next_cleanup_after(now) - now)
                .to_std()
                .unwrap_or(Duration::ZERO);

            tokio::select! {
                _ = ticker.tick() => self.logged_cycle().await,
                _ = tokio::time::sleep(until_cleanup) => {
                    info!("Daily cleanup of scraper state files");
                    cleanup_state_files(&self.paths);
                }
                result = &mut shutdown => {
                    if let Err(e) = result {
                        error!("Failed to listen for Ctrl-C: {e}");
                    }
                    info!("Shutdown requested; scheduler stopping");
                    break;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::delivery::email::EmailAttachment;
    use crate::llm_client::tests::ScriptedGenerator;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_run_counter_resets_daily() {
        let mut counter = RunCounter::new(date(2025, 3, 7));
        assert_eq!(counter.current(date(2025, 3, 7)), 0);
        counter.advance();
        assert_eq!(counter.current(date(2025, 3, 7)), 1);
        counter.advance();
        assert_eq!(counter.current(date(2025, 3, 8)), 0);
    }

    #[test]
    fn test_next_cleanup_after() {
        let before = date(2025, 3, 7).and_hms_opt(0, 1, 0).unwrap();
        assert_eq!(next_cleanup_after(before), date(2025, 3, 7).and_hms_opt(0, 5, 0).unwrap());
        let after = date(2025, 3, 7).and_hms_opt(0, 5, 0).unwrap();
        assert_eq!(next_cleanup_after(after), date(2025, 3, 8).and_hms_opt(0, 5, 0).unwrap());
        let evening = date(2025, 12, 31).and_hms_opt(22, 0, 0).unwrap();
        assert_eq!(next_cleanup_after(evening), date(2026, 1, 1).and_hms_opt(0, 5, 0).unwrap());
    }

    #[test]
    fn test_random_delay_handles_empty_range() {
        assert_eq!(random_delay((0.0, 0.0)), Duration::ZERO);
        let d = random_delay((1.0, 2.0));
        assert!(d >= Duration::from_secs(1) && d < Duration::from_secs(2));
    }

    #[test]
    fn test_cleanup_state_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StatePaths {
            all_jobs: dir.path().join("all.json"),
            relevant_jobs: dir.path().join("relevant.json"),
            output_dir: dir.path().join("out"),
        };
        std::fs::write(&paths.all_jobs, "[]").unwrap();
        cleanup_state_files(&paths);
        assert!(!paths.all_jobs.exists());
        assert!(!paths.relevant_jobs.exists());
    }

    #[derive(Default)]
    struct RecordingStore {
        keys: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ArtifactStore for RecordingStore {
        async fn upload(&self, local: &Path, key: &str) -> Result<String, AppError> {
            if !local.exists() {
                return Err(AppError::NotFound(local.display().to_string()));
            }
            self.keys.lock().unwrap().push(key.to_string());
            Ok(format!("s3://bucket/{key}"))
        }
    }

    struct RecordingMailer {
        fail: bool,
        sent: Mutex<Vec<(String, String, usize)>>,
    }

    impl RecordingMailer {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(
            &self,
            subject: &str,
            body: &str,
            attachments: &[EmailAttachment],
        ) -> Result<(), AppError> {
            if self.fail {
                return Err(AppError::Email("refused".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_string(), body.to_string(), attachments.len()));
            Ok(())
        }
    }

    fn artifacts(dir: &Path) -> ProcessedArtifacts {
        let resume = dir.join("Resume_Acme_ML_Engineer_AI.pdf");
        std::fs::write(&resume, b"%PDF-1.4").unwrap();
        ProcessedArtifacts {
            job_id: "1".to_string(),
            job_title: "ML Engineer".to_string(),
            company_name: "Acme".to_string(),
            job_url: "https://jobs.example/1".to_string(),
            source_platform: "linkedin".to_string(),
            search_source_name: "AI Roles".to_string(),
            resume_pdf: Some(resume),
            cover_letter_pdf: Some(dir.join("missing.pdf")),
            critique_text: "Critique for: ML Engineer at Acme".to_string(),
        }
    }

    #[tokio::test]
    async fn test_deliver_batch_uploads_emails_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let a = artifacts(dir.path());
        let resume = a.resume_pdf.clone().unwrap();
        let store = RecordingStore::default();
        let mailer = RecordingMailer::new(false);

        let emailed = deliver_batch(
            vec![a],
            Some(&store as &dyn ArtifactStore),
            Some(&mailer as &dyn Mailer),
            date(2025, 3, 7),
            2,
        )
        .await;

        assert!(emailed);
        let keys = store.keys.lock().unwrap().clone();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("tailored_applications/Acme/"));
        let sent = mailer.sent.lock().unwrap().clone();
        assert_eq!(sent[0].0, "Job Apps 2025-03-07 - Run 2");
        assert!(sent[0].1.contains("Resume storage: Uploaded"));
        assert!(sent[0].1.contains("Cover Letter storage: Upload Failed/Skipped"));
        assert_eq!(sent[0].2, 1);
        assert!(!resume.exists());
    }

    #[tokio::test]
    async fn test_failed_email_keeps_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        let a = artifacts(dir.path());
        let resume = a.resume_pdf.clone().unwrap();
        let mailer = RecordingMailer::new(true);
        let emailed = deliver_batch(vec![a], None, Some(&mailer as &dyn Mailer), date(2025, 3, 7), 0).await;
        assert!(!emailed);
        assert!(resume.exists());
    }

    struct FixedSource {
        jobs: Vec<JobRecord>,
    }

    #[async_trait]
    impl JobSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        fn platform(&self) -> &str {
            "linkedin"
        }

        async fn fetch(&self, seen_ids: &HashSet<String>) -> Result<Vec<JobRecord>> {
            Ok(self
                .jobs
                .iter()
                .filter(|j| j.id.as_ref().map_or(true, |id| !seen_ids.contains(id)))
                .cloned()
                .collect())
        }
    }

    fn scraped(id: &str, title: &str) -> JobRecord {
        let mut j = JobRecord::new("linkedin", "fixed");
        j.id = Some(id.to_string());
        j.detailed_title = title.to_string();
        j.company_name = "Acme".to_string();
        j.url = format!("https://www.linkedin.com/jobs/view/{id}");
        j.description = "Machine learning engineer to build and deploy production models at scale.".to_string();
        j
    }

    fn scheduler(dir: &Path, jobs: Vec<JobRecord>) -> Scheduler {
        Scheduler {
            paths: StatePaths {
                all_jobs: dir.join("all.json"),
                relevant_jobs: dir.join("relevant.json"),
                output_dir: dir.join("out"),
            },
            sources: vec![Box::new(FixedSource { jobs })],
            filters: FilterConfig::default(),
            llm: Box::new(ScriptedGenerator::ok(&[])),
            profile: Profile::default(),
            converter: None,
            store: None,
            mailer: None,
            base_resume: dir.join("missing_resume.pdf"),
            master_profile: None,
            keyword: "AI".to_string(),
            yoe: Some(4),
            interval: Duration::from_secs(3600),
            source_delay_secs: (0.0, 0.0),
            counter: RunCounter::new(Local::now().date_naive()),
        }
    }

    #[tokio::test]
    async fn test_run_cycle_persists_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = vec![scraped("1", "ML Engineer"), scraped("2", "Director of Sales")];
        let mut s = scheduler(dir.path(), jobs);

        let report = s.run_cycle().await.unwrap();
        assert_eq!(report.new_jobs, 2);
        assert_eq!(report.relevant_jobs, 1);
        // the base resume is missing, so processing fails and nothing is emailed
        assert_eq!(report.processed, 0);
        assert!(!report.emailed);
        assert_eq!(load_jobs(&s.paths.all_jobs).len(), 2);
        assert_eq!(load_jobs(&s.paths.relevant_jobs).len(), 1);
        assert_eq!(s.counter.current(Local::now().date_naive()), 1);

        // second cycle: everything already seen
        let again = s.run_cycle().await.unwrap();
        assert_eq!(again.new_jobs, 0);
        assert_eq!(s.counter.current(Local::now().date_naive()), 1);
    }
}
