use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::models::job::JobRecord;

/// Missing or unreadable files yield an empty list; the scraper starts fresh.
pub fn load_jobs(path: &Path) -> Vec<JobRecord> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "Job data file not found; starting with an empty list");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), "Could not read job data file: {e}");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<JobRecord>>(&raw) {
        Ok(jobs) => {
            info!(path = %path.display(), count = jobs.len(), "Loaded jobs");
            jobs
        }
        Err(e) => {
            error!(path = %path.display(), "Invalid JSON in job data file: {e}");
            Vec::new()
        }
    }
}

pub fn save_jobs(path: &Path, jobs: &[JobRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(jobs)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), count = jobs.len(), "Saved jobs");
    Ok(())
}

/// Keyed by id with the newest record winning. Records without an id are appended
/// after the keyed ones. First-seen order of ids is kept.
pub fn merge_and_deduplicate(old: Vec<JobRecord>, new: Vec<JobRecord>) -> Vec<JobRecord> {
    let mut keyed: Vec<JobRecord> = Vec::with_capacity(old.len() + new.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut without_id = Vec::new();

    // old records without ids are dropped; nothing can ever match them again
    let old_keyed = old.into_iter().filter(|j| job_key(j).is_some());
    for (job, is_new) in old_keyed.map(|j| (j, false)).chain(new.into_iter().map(|j| (j, true))) {
        let Some(id) = job_key(&job).map(str::to_string) else {
            if is_new {
                warn!(title = %job.title(), "New job has no id; appending without dedupe");
                without_id.push(job);
            }
            continue;
        };
        match index.get(&id) {
            Some(&pos) => keyed[pos] = job,
            None => {
                index.insert(id, keyed.len());
                keyed.push(job);
            }
        }
    }

    keyed.extend(without_id);
    keyed
}

fn job_key(job: &JobRecord) -> Option<&str> {
    job.id.as_deref().filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: Option<&str>, title: &str) -> JobRecord {
        let mut j = JobRecord::new("linkedin", "AI Roles");
        j.id = id.map(str::to_string);
        j.detailed_title = title.to_string();
        j
    }

    #[test]
    fn test_load_missing_or_invalid_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_jobs(&dir.path().join("none.json")).is_empty());
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert!(load_jobs(&bad).is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/all.json");
        save_jobs(&path, &[job(Some("1"), "ML Engineer")]).unwrap();
        let loaded = load_jobs(&path);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].detailed_title, "ML Engineer");
    }

    #[test]
    fn test_merge_replaces_by_id_and_keeps_order() {
        let old = vec![job(Some("1"), "A"), job(Some("2"), "B"), job(None, "orphan")];
        let new = vec![job(Some("2"), "B2"), job(None, "C"), job(Some("3"), "D")];
        let merged = merge_and_deduplicate(old, new);
        let titles: Vec<_> = merged.iter().map(|j| j.detailed_title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B2", "D", "C"]);
    }
}
