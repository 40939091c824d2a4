//! Post-processing of LLM text: section cleanup and length compaction.

use crate::llm_client::strip_code_fences;
use crate::models::resume::Section;

pub const SUMMARY_MAX_CHARS: usize = 450;
pub const COVER_LETTER_MAX_CHARS: usize = 1300;
const PARAGRAPH_MAX_CHARS: usize = 300;
/// A paragraph cut point must sit past this many characters, else the paragraph is hard-cut.
const PARAGRAPH_MIN_CUT: usize = 100;

const SUMMARY_LABELS: &[&str] = &["professional summary", "summary", "responsibilities"];

/// Cleans a tailored section reply: code fences, a stray language-tag line, and
/// (for the summary) a leading label the model was told not to emit.
pub fn clean_section_output(section: Section, raw: &str) -> String {
    let trimmed = raw.trim();
    let mut text = if trimmed.starts_with("```") {
        let inner = strip_code_fences(trimmed);
        drop_tag_line(inner).to_string()
    } else {
        trimmed.to_string()
    };

    if section == Section::Summary {
        text = strip_summary_label(&text).to_string();
    }
    text
}

/// Drops a short first line that carries no alphanumerics (ignoring `_` and `-`).
fn drop_tag_line(text: &str) -> &str {
    let is_tag = |line: &str| {
        let line = line.trim();
        line.chars().count() < 15
            && !line
                .chars()
                .any(|c| c.is_alphanumeric() && c != '_' && c != '-')
    };
    match text.split_once('\n') {
        Some((first, rest)) if is_tag(first) => rest.trim(),
        Some(_) => text,
        None if is_tag(text) => "",
        None => text,
    }
}

fn strip_summary_label(text: &str) -> &str {
    let mut text = text.trim_start();
    for label in SUMMARY_LABELS {
        let Some(head) = text.get(..label.len()) else {
            continue;
        };
        if head.eq_ignore_ascii_case(label) {
            if let Some(rest) = text[label.len()..].trim_start().strip_prefix(':') {
                text = rest.trim_start();
            }
        }
    }
    text.trim()
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Shrinks a summary to at most `max_chars` by keeping whole leading sentences.
/// Falls back to a hard cut when even the first sentence is too long.
pub fn compact_summary(text: &str, max_chars: usize) -> String {
    let t = text.trim();
    if t.chars().count() <= max_chars {
        return t.to_string();
    }

    let flattened = t.replace('\n', " ");
    let mut out = String::new();
    for sentence in flattened.split(". ").map(str::trim).filter(|s| !s.is_empty()) {
        let sentence = sentence.trim_end_matches('.');
        let candidate = if out.is_empty() {
            format!("{sentence}.")
        } else {
            format!("{out} {sentence}.")
        };
        if candidate.chars().count() > max_chars {
            break;
        }
        out = candidate;
    }

    if out.is_empty() {
        truncate_chars(t, max_chars).trim().to_string()
    } else {
        out
    }
}

/// Shrinks a cover letter to at most `max_chars`: every paragraph is cut to ~300 chars at
/// a clause boundary, and paragraphs are kept in order until the budget runs out.
pub fn compact_cover_letter(text: &str, max_chars: usize) -> String {
    let t = text.trim();
    if t.chars().count() <= max_chars {
        return t.to_string();
    }

    let mut kept: Vec<&str> = Vec::new();
    let mut total = 0usize;
    for paragraph in t.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        let cut = trim_paragraph(paragraph);
        let separator = if kept.is_empty() { 0 } else { 2 };
        let len = cut.chars().count();
        if total + separator + len > max_chars {
            break;
        }
        total += separator + len;
        kept.push(cut);
    }
    kept.join("\n\n")
}

fn trim_paragraph(paragraph: &str) -> &str {
    if paragraph.chars().count() <= PARAGRAPH_MAX_CHARS {
        return paragraph;
    }
    let head = truncate_chars(paragraph, PARAGRAPH_MAX_CHARS);
    let boundary = [". ", "; ", ", "]
        .iter()
        .filter_map(|sep| head.rfind(sep))
        .max()
        .filter(|idx| head[..*idx].chars().count() > PARAGRAPH_MIN_CUT);
    match boundary {
        // keep the punctuation, drop the trailing space
        Some(idx) => &head[..=idx],
        None => head,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_fences_and_tag_line() {
        let raw = "```\n---\nLanguages: **Python**, SQL\n```";
        assert_eq!(
            clean_section_output(Section::TechnicalSkills, raw),
            "Languages: **Python**, SQL"
        );
    }

    #[test]
    fn test_clean_keeps_real_first_line_inside_fences() {
        let raw = "```\nML Engineer | Acme | Austin, TX\n* Built things\n```";
        assert_eq!(
            clean_section_output(Section::WorkExperience, raw),
            "ML Engineer | Acme | Austin, TX\n* Built things"
        );
    }

    #[test]
    fn test_clean_strips_summary_labels_case_insensitively() {
        assert_eq!(
            clean_section_output(Section::Summary, "PROFESSIONAL SUMMARY: Engineer with depth."),
            "Engineer with depth."
        );
        assert_eq!(
            clean_section_output(Section::Summary, "summary : Engineer."),
            "Engineer."
        );
    }

    #[test]
    fn test_clean_leaves_labels_in_other_sections() {
        assert_eq!(
            clean_section_output(Section::Projects, "Summary: keep me"),
            "Summary: keep me"
        );
    }

    #[test]
    fn test_compact_summary_short_text_untouched() {
        assert_eq!(compact_summary("  Short one.  ", 450), "Short one.");
    }

    #[test]
    fn test_compact_summary_keeps_whole_sentences() {
        let text = "First sentence is here. Second sentence is also here. Third one pushes over";
        let out = compact_summary(text, 60);
        assert_eq!(out, "First sentence is here. Second sentence is also here.");
        assert!(out.chars().count() <= 60);
    }

    #[test]
    fn test_compact_summary_hard_cuts_single_long_sentence() {
        let text = "a".repeat(500);
        assert_eq!(compact_summary(&text, 450).len(), 450);
    }

    #[test]
    fn test_compact_cover_letter_respects_budget() {
        let para = format!("{}. {}", "x".repeat(150), "y".repeat(200));
        let text = vec![para.clone(), para.clone(), para.clone(), para.clone(), para]
            .join("\n\n");
        let out = compact_cover_letter(&text, 700);
        assert!(out.chars().count() <= 700);
        for p in out.split("\n\n") {
            assert!(p.chars().count() <= 300);
            assert!(p.ends_with('.'));
        }
    }

    #[test]
    fn test_trim_paragraph_hard_cuts_without_late_boundary() {
        let p = "z".repeat(400);
        assert_eq!(trim_paragraph(&p).len(), 300);
    }
}
