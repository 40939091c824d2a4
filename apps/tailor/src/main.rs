#[macro_use]
mod macros;

mod config;
mod delivery;
mod errors;
mod generation;
mod ingest;
mod llm_client;
mod models;
mod render;
mod scraper;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, DEFAULT_FILENAME_KEYWORD, DEFAULT_TARGET_COMPANY, DEFAULT_YOE};
use crate::delivery::email::{Mailer, SesMailer};
use crate::delivery::storage::{build_s3_client, ArtifactStore, S3ArtifactStore};
use crate::generation::pipeline::{run_pipeline, PipelineInputs};
use crate::ingest::read_text_file;
use crate::llm_client::LlmClient;
use crate::models::profile::Profile;
use crate::models::resume::PipelineResult;
use crate::render::drive::{DocumentConverter, GoogleDriveConverter};
use crate::render::naming::{cover_letter_file_base, resume_file_base};
use crate::render::resume::ResumeLayout;
use crate::render::{render_application, RenderRequest};
use crate::scraper::scheduler::{RunCounter, Scheduler, StatePaths};
use crate::scraper::sources::{build_sources, SourcesFile};

#[derive(Parser)]
#[command(name = "tailor")]
#[command(about = "Tailor a resume and cover letter to a job description, or scrape and tailor on a schedule")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tailor one resume to one job description
    Run {
        /// Base resume PDF
        #[arg(short, long)]
        resume: PathBuf,

        /// Job description text file
        #[arg(short, long)]
        job: PathBuf,

        /// Directory for the generated documents
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Optional master profile text with extra experience to draw from
        #[arg(short, long)]
        master_profile: Option<PathBuf>,

        /// Target company, used in file names and prompts
        #[arg(short, long, default_value = DEFAULT_TARGET_COMPANY)]
        company: String,

        /// Years of experience, used in the resume file name
        #[arg(short, long, default_value_t = DEFAULT_YOE)]
        yoe: u32,

        /// Leading keyword of the output file names
        #[arg(short, long, default_value = DEFAULT_FILENAME_KEYWORD)]
        keyword: String,

        /// Also write the full pipeline result as JSON
        #[arg(long)]
        save_json: bool,

        /// Render the cover letter documents too
        #[arg(long)]
        cover_letter: bool,

        /// Company named in the cover letter (defaults to the one in the job title)
        #[arg(long)]
        cl_company: Option<String>,

        /// Write DOCX files only; skip PDF conversion
        #[arg(long)]
        no_pdf: bool,
    },

    /// Scrape configured job sources and tailor documents for relevant postings
    Scrape {
        /// Base resume PDF used for every posting
        #[arg(short, long)]
        resume: PathBuf,

        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Run { resume, job, .. } = &cli.command {
        require_extension(resume, "pdf", "Resume")?;
        require_extension(job, "txt", "Job description")?;
    }

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tailor v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Run {
            resume,
            job,
            output_dir,
            master_profile,
            company,
            yoe,
            keyword,
            save_json,
            cover_letter,
            cl_company,
            no_pdf,
        } => {
            let args = RunArgs {
                resume,
                job,
                output_dir,
                master_profile,
                company,
                yoe,
                keyword,
                save_json,
                cover_letter,
                cl_company,
                no_pdf,
            };
            run_once(&config, args).await
        }
        Commands::Scrape { resume, once } => {
            require_extension(&resume, "pdf", "Resume")?;
            scrape(&config, resume, once).await
        }
    }
}

struct RunArgs {
    resume: PathBuf,
    job: PathBuf,
    output_dir: PathBuf,
    master_profile: Option<PathBuf>,
    company: String,
    yoe: u32,
    keyword: String,
    save_json: bool,
    cover_letter: bool,
    cl_company: Option<String>,
    no_pdf: bool,
}

fn require_extension(path: &Path, ext: &str, label: &str) -> Result<()> {
    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext));
    anyhow::ensure!(
        matches,
        "{label} must be a .{ext} file: {}",
        path.display()
    );
    Ok(())
}

/// `--cl-company`, else whatever follows " at " in the first JD line, else `--company`.
fn cover_letter_company(cl_company: Option<&str>, jd_text: &str, company: &str) -> String {
    if let Some(explicit) = cl_company.map(str::trim).filter(|c| !c.is_empty()) {
        return explicit.to_string();
    }
    let title = jd_text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or_default();
    title
        .split_once(" at ")
        .map(|(_, rest)| rest.trim())
        .filter(|c| !c.is_empty())
        .unwrap_or(company)
        .to_string()
}

fn critique_verdict(result: &PipelineResult) -> String {
    match result.resume_critique.as_ref().and_then(|c| c.ats_score) {
        Some(score) => format!("ATS Score: {score}%"),
        None => result
            .raw_critique_text
            .clone()
            .unwrap_or_else(|| "Critique not available.".to_string()),
    }
}

fn build_converter(config: &Config, enabled: bool) -> Option<Box<dyn DocumentConverter>> {
    if !enabled {
        return None;
    }
    let Some(credentials) = config.google_credentials_json.as_deref() else {
        warn!("GOOGLE_CREDENTIALS_JSON_CONTENT not set; writing DOCX only");
        return None;
    };
    match GoogleDriveConverter::new(credentials) {
        Ok(converter) => Some(Box::new(converter)),
        Err(e) => {
            error!("Could not initialize Drive converter; writing DOCX only: {e}");
            None
        }
    }
}

async fn run_once(config: &Config, args: RunArgs) -> Result<()> {
    let profile = Profile::load(&config.profile_path)?;
    let llm = LlmClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;
    info!("LLM client initialized (model: {})", llm.model());

    let jd_text = read_text_file(&args.job).await?;
    let master_profile = match &args.master_profile {
        Some(path) => Some(read_text_file(path).await?),
        None => None,
    };
    let cl_company = cover_letter_company(args.cl_company.as_deref(), &jd_text, &args.company);

    let inputs = PipelineInputs {
        resume_path: args.resume.clone(),
        jd_text,
        master_profile,
        company: Some(args.company.clone()),
        location_type: None,
        cover_letter_company: Some(cl_company.clone()),
    };
    let result = run_pipeline(&inputs, &llm, &profile).await.map_err(|e| {
        error!(code = e.code(), "Pipeline failed: {e}");
        e
    })?;
    info!("Critique verdict: {}", critique_verdict(&result));

    let last_name = profile.contact.last_name();
    let resume_base = resume_file_base(&args.keyword, &args.company, last_name, Some(args.yoe));
    let cover_letter_base = cover_letter_file_base(
        &format!("{} Cover Letter", args.keyword),
        &cl_company,
        last_name,
    );

    if args.save_json {
        tokio::fs::create_dir_all(&args.output_dir).await?;
        let path = args.output_dir.join(format!("{resume_base}_results.json"));
        let json = serde_json::to_string_pretty(&result)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Pipeline result saved");
    }

    let Some(tailored) = result.tailored_resume.as_ref() else {
        anyhow::bail!("Pipeline produced no tailored resume");
    };
    let letter = if args.cover_letter {
        result.generated_cover_letter_text.as_deref()
    } else {
        None
    };
    let converter = build_converter(config, !args.no_pdf);
    let request = RenderRequest {
        profile: &profile,
        tailored,
        cover_letter: letter,
        output_dir: &args.output_dir,
        resume_base,
        cover_letter_base,
        layout: ResumeLayout::default(),
    };
    let rendered = render_application(&request, converter.as_deref()).await?;

    for path in [
        &rendered.resume_docx,
        &rendered.resume_pdf,
        &rendered.cover_letter_docx,
        &rendered.cover_letter_pdf,
    ]
    .into_iter()
    .flatten()
    {
        info!(path = %path.display(), "Document ready");
    }
    Ok(())
}

async fn scrape(config: &Config, resume: PathBuf, once: bool) -> Result<()> {
    let sources_file = SourcesFile::load(&config.sources_path)?;
    let profile = Profile::load(&config.profile_path)?;
    let llm = LlmClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;

    let http = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    let sources = build_sources(&sources_file.sources, &http);
    anyhow::ensure!(!sources.is_empty(), "No usable job sources configured");

    let s3 = build_s3_client(config).await;
    let store: Box<dyn ArtifactStore> = Box::new(S3ArtifactStore::new(s3, &config.storage_bucket));
    let mailer = SesMailer::from_config(config)
        .await
        .map(|m| Box::new(m) as Box<dyn Mailer>);

    let mut scheduler = Scheduler {
        paths: StatePaths::from_config(config),
        sources,
        filters: sources_file.filters,
        llm: Box::new(llm),
        profile,
        converter: build_converter(config, true),
        store: Some(store),
        mailer,
        base_resume: resume,
        master_profile: None,
        keyword: DEFAULT_FILENAME_KEYWORD.to_string(),
        yoe: Some(DEFAULT_YOE),
        interval: Duration::from_secs(config.scrape_interval_minutes * 60),
        source_delay_secs: Scheduler::default_source_delay(),
        counter: RunCounter::new(Local::now().date_naive()),
    };

    if once {
        let report = scheduler.run_cycle().await?;
        info!(?report, "Single cycle complete");
        return Ok(());
    }
    scheduler.run_forever().await
}
