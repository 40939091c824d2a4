use crate::models::resume::{ResumeSections, Section};

/// A header occurrence in the source text, as byte offsets.
#[derive(Debug, Clone, Copy)]
struct HeaderMatch {
    section: Section,
    start: usize,
    end: usize,
}

/// Finds every case-insensitive occurrence of the four section headers, in text order.
fn find_headers(text: &str) -> Vec<HeaderMatch> {
    // ASCII uppercasing keeps byte offsets aligned with `text`.
    let upper = text.to_ascii_uppercase();
    let mut matches: Vec<HeaderMatch> = Section::ALL
        .iter()
        .flat_map(|section| {
            let header = section.header();
            upper.match_indices(header).map(move |(start, _)| HeaderMatch {
                section: *section,
                start,
                end: start + header.len(),
            })
        })
        .collect();
    matches.sort_by_key(|m| m.start);
    matches
}

/// Splits extracted resume text into the four sections.
///
/// Each section's content runs from the end of its first header occurrence to the start
/// of the next header occurrence (of any kind) later in the text, or to the end of text.
/// A header that never appears yields `Some("")`.
pub fn split_resume_sections(text: &str) -> ResumeSections {
    let matches = find_headers(text);
    let mut sections = ResumeSections::default();

    for section in Section::ALL {
        let content = matches
            .iter()
            .find(|m| m.section == section)
            .map(|current| {
                let end = matches
                    .iter()
                    .find(|m| m.start > current.start)
                    .map(|next| next.start)
                    .unwrap_or(text.len());
                text[current.end..end].trim().to_string()
            })
            .unwrap_or_default();
        sections.set(section, content);
    }

    sections
}
