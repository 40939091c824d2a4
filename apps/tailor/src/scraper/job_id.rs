//! Stable job ids per platform, so the same posting is recognised across cycles.

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::models::job::is_missing;

const LINKEDIN_URN_PREFIX: &str = "urn:li:jobPosting:";
const FALLBACK_PART_CHARS: usize = 30;

static_regex!(current_job_id_re, r"currentJobId=(\d+)");
static_regex!(view_id_re, r"view/(\d+)/");
static_regex!(jobright_path_re, r"/job/([^/?#]+)");
static_regex!(non_word_run, r"\W+");
static_regex!(unsafe_id_char, r"[^\w\-]");

fn is_long_number(value: &str, min_len: usize) -> bool {
    value.len() > min_len && value.chars().all(|c| c.is_ascii_digit())
}

fn url_path_segments(url: &str) -> Vec<&str> {
    url.split('?').next().unwrap_or_default().split('/').collect()
}

fn linkedin_id(raw: Option<&str>, url: Option<&str>) -> Option<(String, &'static str)> {
    if let Some(raw) = raw {
        if let Some(idx) = raw.find(LINKEDIN_URN_PREFIX) {
            let id = raw[idx..].rsplit(':').next().unwrap_or_default();
            if !id.is_empty() {
                return Some((id.to_string(), "linkedin_urn"));
            }
        }
        if is_long_number(raw, 6) {
            return Some((raw.to_string(), "linkedin_attribute_direct_numeric"));
        }
    }
    let url = url?;
    if let Some(caps) = current_job_id_re().captures(url) {
        return Some((caps[1].to_string(), "linkedin_url_currentJobId"));
    }
    if let Some(caps) = view_id_re().captures(url) {
        return Some((caps[1].to_string(), "linkedin_url_view_id"));
    }
    let last = url_path_segments(url).last().copied().unwrap_or_default();
    is_long_number(last, 8).then(|| (last.to_string(), "linkedin_url_last_segment_numeric"))
}

fn jobright_id(raw: Option<&str>, url: Option<&str>) -> Option<(String, &'static str)> {
    if let Some(url) = url.filter(|u| u.contains("jobright.ai/job/")) {
        if let Some(caps) = jobright_path_re().captures(url) {
            return Some((format!("jr_{}", &caps[1]), "jobright_platform_url_id"));
        }
    }
    raw.map(|r| (format!("jr_dom_{r}"), "jobright_dom_card_id"))
}

fn generic_id(raw: Option<&str>, url: Option<&str>) -> Option<(String, &'static str)> {
    if let Some(raw) = raw {
        let source = if is_long_number(raw, 6) {
            "generic_attribute_numeric"
        } else {
            "generic_attribute_raw"
        };
        return Some((raw.to_string(), source));
    }
    let url = url?;
    for segment in url_path_segments(url).into_iter().rev() {
        if is_long_number(segment, 6) {
            return Some((segment.to_string(), "generic_url_segment_numeric"));
        }
        if let Some((_, tail)) = segment.rsplit_once('-') {
            if is_long_number(tail, 6) {
                return Some((tail.to_string(), "generic_url_segment_slug"));
            }
        }
    }
    None
}

/// First 8 hex chars of the URL's SHA-256.
fn url_hash(url: &str) -> String {
    Sha256::digest(url.as_bytes())
        .iter()
        .take(4)
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn fallback_part(value: &str, fallback: &str) -> String {
    if is_missing(value) {
        return fallback.to_string();
    }
    non_word_run()
        .replace_all(value, "_")
        .chars()
        .take(FALLBACK_PART_CHARS)
        .collect()
}

/// Returns `(id, id_source)`. Platform-specific rules run first, then generic ones,
/// then a constructed id from platform, company, title and a URL hash.
pub fn parse_job_id(
    raw_attr: Option<&str>,
    url: &str,
    platform: &str,
    title: &str,
    company: &str,
) -> (String, &'static str) {
    let raw = raw_attr.map(str::trim).filter(|r| !r.is_empty());
    let url_opt = Some(url.trim()).filter(|u| !is_missing(u));

    let parsed = match platform {
        "linkedin" => linkedin_id(raw, url_opt),
        "jobright" => jobright_id(raw, url_opt),
        _ => None,
    }
    .or_else(|| generic_id(raw, url_opt));

    if let Some(found) = parsed {
        return found;
    }

    let platform_prefix: String = platform.chars().take(3).collect();
    let hash = url_opt.map_or_else(|| "nourl".to_string(), url_hash);
    let constructed = format!(
        "{platform_prefix}_{}_{}_{hash}",
        fallback_part(company, "nocompany"),
        fallback_part(title, "notitle"),
    );
    let id = unsafe_id_char().replace_all(&constructed, "_").into_owned();
    warn!(platform, url, title, id = %id, "No distinct job id found; using constructed id");
    (id, "fallback_constructed_id")
}
