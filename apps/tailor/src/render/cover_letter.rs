//! Cover letter document: letterhead, justified body paragraphs, signature block.

use regex::Regex;
use tracing::warn;

use crate::models::profile::Profile;
use crate::render::docx::{Alignment, Document, PageMargins, Paragraph, Run, LINK_COLOR};

const FONT_SIZE_PT: f32 = 11.0;
const NAME_SIZE_PT: f32 = 14.0;
const BODY_PLACEHOLDER: &str =
    "[Cover letter body content was not generated or was stripped with the signature.]";

const MARGINS: PageMargins = PageMargins {
    left: 1.0,
    right: 1.0,
    top: 0.75,
    bottom: 0.75,
};

/// Removes a trailing `Sincerely, <name>` closing; the document adds its own.
pub fn strip_closing(body: &str, name: &str) -> String {
    let trimmed = body.trim();
    if name.trim().is_empty() {
        return trimmed.to_string();
    }
    let pattern = format!(
        r"(?i)\bSincerely,?\s*(?:\n\s*)*{}\s*$",
        regex::escape(name.trim())
    );
    match Regex::new(&pattern) {
        Ok(re) => re.replace(trimmed, "").trim_end().to_string(),
        Err(e) => {
            warn!("Could not build closing pattern: {e}");
            trimmed.to_string()
        }
    }
}

/// Paragraphs separated by blank lines; single newlines inside one become spaces.
pub fn body_paragraphs(body: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }
    paragraphs
}

fn link_run(text: &str) -> Run {
    Run::new(text).color(LINK_COLOR).underline()
}

fn push_text_line(doc: &mut Document, text: &str) {
    if !text.trim().is_empty() {
        doc.push(Paragraph::new().run(Run::new(text.trim())));
    }
}

fn push_link_line(doc: &mut Document, label: &str, url: &str) -> bool {
    if url.trim().is_empty() {
        return false;
    }
    let label = if label.trim().is_empty() { url } else { label };
    let link = doc.link(url.trim(), link_run(label.trim()));
    doc.push(Paragraph::new().inline(link));
    true
}

pub fn build_cover_letter_docx(profile: &Profile, body: &str) -> Document {
    let contact = &profile.contact;
    let mut doc = Document::new(FONT_SIZE_PT, MARGINS);

    doc.push(
        Paragraph::new()
            .align(Alignment::Left)
            .space_after(1.0)
            .run(Run::new(&contact.name).bold().size(NAME_SIZE_PT)),
    );
    push_text_line(&mut doc, &contact.street_address);
    push_text_line(&mut doc, &contact.city_state_zip);
    push_text_line(&mut doc, &contact.phone);
    if !contact.email.trim().is_empty() {
        push_link_line(
            &mut doc,
            &contact.email,
            &format!("mailto:{}", contact.email.trim()),
        );
    }
    if push_link_line(&mut doc, &contact.linkedin_text, &contact.linkedin_url) {
        doc.set_last_space_after(18.0);
    } else {
        doc.push(Paragraph::new().space_after(18.0));
    }

    let stripped = strip_closing(body, &contact.name);
    let paragraphs = body_paragraphs(&stripped);
    if paragraphs.is_empty() {
        doc.push(
            Paragraph::new()
                .space_after(8.0)
                .run(Run::new(BODY_PLACEHOLDER).italic()),
        );
    }
    for paragraph in paragraphs {
        doc.push(
            Paragraph::new()
                .align(Alignment::Justify)
                .space_after(8.0)
                .run(Run::new(paragraph)),
        );
    }

    doc.push(Paragraph::new().space_before(12.0).run(Run::new("Sincerely,")));
    doc.push(Paragraph::new());
    doc.push(Paragraph::new().space_before(2.0).run(Run::new(&contact.name)));
    push_text_line(&mut doc, &contact.phone);
    if !contact.email.trim().is_empty() {
        push_link_line(
            &mut doc,
            &contact.email,
            &format!("mailto:{}", contact.email.trim()),
        );
    }
    push_link_line(&mut doc, &contact.github_text, &contact.github_url);
    push_link_line(&mut doc, &contact.portfolio_text, &contact.portfolio_url);

    doc
}
