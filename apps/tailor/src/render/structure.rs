//! Structural parsers over the LLM's tailored section text.
//!
//! The text is markdown-ish: `**bold**` spans, `|`-separated header lines and `*` bullets.
//! Parsing is best-effort; anything unrecognised is skipped with a warning.

use regex::Regex;
use tracing::warn;

use crate::models::job::NOT_AVAILABLE;

pub const DATES_NOT_AVAILABLE: &str = "Dates N/A";

#[derive(Debug, Clone, PartialEq)]
pub struct WorkEntry {
    pub title: String,
    pub company: String,
    pub location: String,
    pub dates: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillLine {
    pub category: String,
    pub skills: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectEntry {
    pub title: String,
    pub tagline: Option<String>,
    pub bullets: Vec<String>,
}

static_regex!(work_header_re, r"^(?:\*\*)?(.+?)(?:\*\*)?\s*\|\s*(?:\*\*)?(.+?)(?:\*\*)?\s*\|\s*(.+)$");
static_regex!(work_entry_start_re, r"^\s*(?:\*\*)?[A-Z][\w\s.,/&()-]*?\s*(?:\*\*)?\s*\|");
static_regex!(
    date_line_re,
    r"(?i)^(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec|Present|September)[\w\s,–-]+$"
);
static_regex!(
    date_in_location_re,
    r"^(.*?)\b((?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec|Present)[\w\s,–-]+)$"
);
static_regex!(work_section_header_re, r"(?i)^##\s*Work Experience\s*\n+");
static_regex!(skills_section_header_re, r"(?i)^##\s*Technical Skills\s*\n+");
static_regex!(skill_line_re, r"^(?:\*\*)?(.+?)(?:\*\*)?\s*:\s*(.+)$");
static_regex!(
    projects_section_header_re,
    r"(?i)^##\s*(?:Rewritten\s+)?Projects(?:\s+Section)?:?\s*\n+"
);
static_regex!(project_entry_start_re, r"^\s*(?:\*\*)?[A-Z0-9][\w\s()&/-]*?(?:\*\*)?\s*(?:\||$)");
static_regex!(project_title_re, r"^\s*(?:\*\*)?(.+?)(?:\*\*)?\s*(?:\|\s*_(.+?)_)?$");
static_regex!(bold_run_re, r"\*\*([^*]+)\*\*");

/// Splits text into blank-line separated blocks, then glues a block back onto its
/// predecessor unless its first line looks like the start of a new entry.
fn split_entries(text: &str, starts_entry: &Regex) -> Vec<Vec<String>> {
    let mut blocks: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut after_blank = false;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            after_blank = !current.is_empty();
            continue;
        }
        if after_blank && starts_entry.is_match(line) {
            blocks.push(std::mem::take(&mut current));
        }
        after_blank = false;
        current.push(line.to_string());
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn strip_emphasis(line: &str) -> &str {
    line.trim().trim_matches(|c| c == '*' || c == '_').trim()
}

fn bullet_text(line: &str) -> Option<String> {
    line.strip_prefix('*')
        .or_else(|| line.strip_prefix('-'))
        .map(|rest| rest.trim().to_string())
}

/// `**Title** | **Company** | City, ST` blocks, each followed by a dates line and bullets.
pub fn parse_work_experience(text: &str) -> Vec<WorkEntry> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let cleaned = work_section_header_re().replace(trimmed, "");

    split_entries(&cleaned, work_entry_start_re())
        .into_iter()
        .filter_map(|lines| {
            let header = lines.first()?;
            let (title, company, mut location) = match work_header_re().captures(header) {
                Some(caps) => (
                    caps[1].trim().to_string(),
                    caps[2].trim().to_string(),
                    caps[3].trim().to_string(),
                ),
                None => {
                    warn!("Could not parse job header line: '{header}'");
                    let mut parts = header.splitn(2, '|');
                    let title = parts.next().unwrap_or_default().replace("**", "");
                    let company = parts
                        .next()
                        .map(|c| c.replace("**", "").trim().to_string())
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
                    (title.trim().to_string(), company, NOT_AVAILABLE.to_string())
                }
            };

            let mut body_start = 1;
            let mut dates = None;
            if let Some(second) = lines.get(1) {
                let candidate = strip_emphasis(second);
                if date_line_re().is_match(candidate) {
                    dates = Some(candidate.to_string());
                    body_start = 2;
                }
            }
            if dates.is_none() {
                if let Some(caps) = date_in_location_re().captures(&location) {
                    let place = caps[1].trim().trim_end_matches(['|', ' ']).to_string();
                    dates = Some(caps[2].trim().to_string());
                    location = place;
                }
            }
            let dates = dates.unwrap_or_else(|| {
                warn!("Could not parse dates for job: {title} at {company}");
                DATES_NOT_AVAILABLE.to_string()
            });

            let bullets = lines[body_start..]
                .iter()
                .filter_map(|l| bullet_text(l))
                .collect();

            (!title.is_empty()).then_some(WorkEntry {
                title,
                company,
                location,
                dates,
                bullets,
            })
        })
        .collect()
}

/// `Category: skill, **skill**` lines.
pub fn parse_technical_skills(text: &str) -> Vec<SkillLine> {
    let trimmed = text.trim();
    let cleaned = skills_section_header_re().replace(trimmed, "");
    cleaned
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(|line| match skill_line_re().captures(line) {
            Some(caps) => {
                let mut skills = caps[2].trim();
                // `**Category:** skills` leaves the closing marker on the skills side
                if line.starts_with("**") && !caps[1].contains("**") {
                    if let Some(rest) = skills.strip_prefix("**").filter(|r| r.starts_with(' ')) {
                        skills = rest.trim_start();
                    }
                }
                Some(SkillLine {
                    category: caps[1].trim().to_string(),
                    skills: skills.to_string(),
                })
            }
            None => {
                warn!("Could not parse skill line: '{line}'");
                None
            }
        })
        .collect()
}

/// Title lines (`**Name** | _tagline_`) each followed by `*` bullets.
pub fn parse_projects(text: &str) -> Vec<ProjectEntry> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let cleaned = projects_section_header_re().replace(trimmed, "");

    split_entries(&cleaned, project_entry_start_re())
        .into_iter()
        .filter_map(|lines| {
            let header = lines.first()?;
            let (title, tagline) = match project_title_re().captures(header) {
                Some(caps) => {
                    let title = caps[1].trim().to_string();
                    let tagline = caps.get(2).map(|m| m.as_str().trim().to_string());
                    match (tagline, title.split_once('|')) {
                        (Some(t), _) => (title, Some(t)),
                        // tagline without underscores: split on the pipe instead
                        (None, Some((name, rest))) => {
                            let tag = rest.replace(['_', '*'], "").trim().to_string();
                            (
                                name.replace("**", "").trim().to_string(),
                                (!tag.is_empty()).then_some(tag),
                            )
                        }
                        (None, None) => (title.replace("**", ""), None),
                    }
                }
                None => (header.replace("**", "").trim().to_string(), None),
            };

            let bullets = lines[1..]
                .iter()
                .filter_map(|l| l.strip_prefix('*').map(|b| b.trim().to_string()))
                .collect();

            (!title.is_empty()).then_some(ProjectEntry {
                title,
                tagline,
                bullets,
            })
        })
        .collect()
}

/// Splits text on `**bold**` spans. Stray `**` markers are dropped.
pub fn split_bold_runs(text: &str) -> Vec<(String, bool)> {
    let mut runs = Vec::new();
    let mut last = 0;
    for caps in bold_run_re().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            runs.push((text[last..whole.start()].replace("**", ""), false));
        }
        runs.push((caps[1].to_string(), true));
        last = whole.end();
    }
    if last < text.len() {
        runs.push((text[last..].replace("**", ""), false));
    }
    runs.retain(|(t, _)| !t.is_empty());
    runs
}
