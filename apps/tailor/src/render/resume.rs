//! Builds the one-page resume document from the profile and the tailored sections.

use serde::{Deserialize, Serialize};

use crate::models::profile::Profile;
use crate::models::resume::{ResumeSections, Section};
use crate::render::docx::{Alignment, Document, PageMargins, Paragraph, Run, LINK_COLOR};
use crate::render::structure::{
    parse_projects, parse_technical_skills, parse_work_experience, split_bold_runs,
};

const EMPTY_SECTION: &str = "N/A";
const EDUCATION_HEADER: &str = "EDUCATION";

/// Page parameters for the resume. Defaults fit a dense single US-letter page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeLayout {
    pub font_size_pt: f32,
    pub name_size_pt: f32,
    pub line_spacing: f32,
    pub margins: PageMargins,
    /// Right tab stop carrying the dates, in inches from the left margin.
    pub date_tab_in: f32,
}

impl Default for ResumeLayout {
    fn default() -> Self {
        Self {
            font_size_pt: 10.0,
            name_size_pt: 16.0,
            line_spacing: 1.15,
            margins: PageMargins {
                left: 0.51,
                right: 0.51,
                top: 0.13,
                bottom: 0.06,
            },
            date_tab_in: 7.4,
        }
    }
}

pub fn build_resume_docx(
    profile: &Profile,
    tailored: &ResumeSections,
    layout: &ResumeLayout,
) -> Document {
    let mut doc = Document::new(layout.font_size_pt, layout.margins);
    doc.line_spacing = layout.line_spacing;

    add_contact_block(&mut doc, profile, layout);

    for section in Section::ALL {
        add_section_header(&mut doc, section.header());
        let Some(content) = tailored.non_empty(section) else {
            doc.push(Paragraph::new().space_after(6.0).run(Run::new(EMPTY_SECTION)));
            continue;
        };
        match section {
            Section::Summary => add_summary(&mut doc, content, layout),
            Section::WorkExperience => add_work_experience(&mut doc, content, layout),
            Section::TechnicalSkills => add_skills(&mut doc, content),
            Section::Projects => add_projects(&mut doc, content, profile, layout),
        }
    }

    if !profile.education.is_empty() {
        add_section_header(&mut doc, EDUCATION_HEADER);
        for entry in &profile.education {
            doc.push(
                Paragraph::new()
                    .right_tab(layout.date_tab_in)
                    .space_after(6.0)
                    .run(Run::new(&entry.degree_line).bold())
                    .run(Run::new(format!(", {}", entry.university_line)))
                    .run(Run::new(format!("\t{}", entry.dates_line)).italic()),
            );
        }
    }

    doc
}

fn add_contact_block(doc: &mut Document, profile: &Profile, layout: &ResumeLayout) {
    let contact = &profile.contact;
    doc.push(
        Paragraph::new()
            .align(Alignment::Center)
            .space_after(3.0)
            .run(Run::new(&contact.name).bold().size(layout.name_size_pt)),
    );

    if !contact.line1_info.trim().is_empty() {
        let mut line = Paragraph::new().align(Alignment::Center).space_after(1.0);
        let email = contact.email.trim();
        match contact.line1_info.split_once(email).filter(|_| !email.is_empty()) {
            Some((before, after)) => {
                let link = doc.link(&format!("mailto:{email}"), link_run(email));
                line = line.run(Run::new(before)).inline(link).run(Run::new(after));
            }
            None => line = line.run(Run::new(&contact.line1_info)),
        }
        doc.push(line);
    }

    let links = [
        (&contact.linkedin_text, &contact.linkedin_url),
        (&contact.github_text, &contact.github_url),
        (&contact.portfolio_text, &contact.portfolio_url),
    ];
    let mut line = Paragraph::new().align(Alignment::Center).space_after(18.0);
    let mut first = true;
    for (text, url) in links {
        if url.trim().is_empty() {
            continue;
        }
        if !first {
            line = line.run(Run::new(" | "));
        }
        first = false;
        let label = if text.trim().is_empty() { url } else { text };
        let link = doc.link(url, link_run(label));
        line = line.inline(link);
    }
    if !first {
        doc.push(line);
    }
}

fn link_run(text: &str) -> Run {
    Run::new(text).color(LINK_COLOR).underline()
}

fn add_section_header(doc: &mut Document, title: &str) {
    doc.push(
        Paragraph::new()
            .space_before(6.0)
            .space_after(4.0)
            .bottom_border()
            .keep_with_next()
            .run(Run::new(title.to_uppercase()).bold().size(10.0)),
    );
}

fn bold_runs(text: &str) -> Vec<Run> {
    split_bold_runs(text)
        .into_iter()
        .map(|(segment, bold)| Run::new(segment).bold_if(bold))
        .collect()
}

fn add_summary(doc: &mut Document, content: &str, layout: &ResumeLayout) {
    let text = content.split_whitespace().collect::<Vec<_>>().join(" ");
    doc.push(
        Paragraph::new()
            .align(Alignment::Justify)
            .line_spacing(layout.line_spacing)
            .space_after(6.0)
            .runs(bold_runs(&text)),
    );
}

fn add_work_experience(doc: &mut Document, content: &str, layout: &ResumeLayout) {
    let entries = parse_work_experience(content);
    if entries.is_empty() {
        add_plain_lines(doc, content);
        return;
    }
    for entry in entries {
        doc.push(
            Paragraph::new()
                .right_tab(layout.date_tab_in)
                .space_after(2.0)
                .keep_with_next()
                .run(Run::new(&entry.title).bold())
                .run(Run::new(" | "))
                .run(Run::new(&entry.company).bold())
                .run(Run::new(" | "))
                .run(Run::new(&entry.location).italic())
                .run(Run::new(format!("\t{}", entry.dates)).italic()),
        );
        for bullet in &entry.bullets {
            doc.push(
                Paragraph::new()
                    .bullet()
                    .align(Alignment::Justify)
                    .line_spacing(layout.line_spacing)
                    .space_after(2.0)
                    .runs(bold_runs(bullet)),
            );
        }
        doc.set_last_space_after(6.0);
    }
}

fn add_skills(doc: &mut Document, content: &str) {
    let lines = parse_technical_skills(content);
    if lines.is_empty() {
        add_plain_lines(doc, content);
        return;
    }
    for line in lines {
        doc.push(
            Paragraph::new()
                .space_after(2.0)
                .run(Run::new(format!("{}: ", line.category)).bold())
                .runs(bold_runs(&line.skills)),
        );
    }
    doc.set_last_space_after(6.0);
}

fn add_projects(doc: &mut Document, content: &str, profile: &Profile, layout: &ResumeLayout) {
    let entries = parse_projects(content);
    if entries.is_empty() {
        add_plain_lines(doc, content);
        return;
    }
    for entry in entries {
        let mut header = Paragraph::new().space_after(2.0).keep_with_next();
        match profile.project_link(&entry.title) {
            Some(url) => {
                let run = Run::new(&entry.title).bold().color(LINK_COLOR);
                let link = doc.link(&url, run);
                header = header.inline(link);
            }
            None => header = header.run(Run::new(&entry.title).bold()),
        }
        if let Some(tagline) = &entry.tagline {
            header = header
                .run(Run::new(" | "))
                .run(Run::new(tagline).italic());
        }
        doc.push(header);
        for bullet in &entry.bullets {
            doc.push(
                Paragraph::new()
                    .bullet()
                    .align(Alignment::Justify)
                    .line_spacing(layout.line_spacing)
                    .space_after(2.0)
                    .runs(bold_runs(bullet)),
            );
        }
        doc.set_last_space_after(6.0);
    }
}

/// Unstructured section text: one paragraph per non-empty line.
fn add_plain_lines(doc: &mut Document, content: &str) {
    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.strip_prefix("* ").or_else(|| line.strip_prefix("- ")) {
            Some(bullet) => doc.push(Paragraph::new().bullet().space_after(2.0).runs(bold_runs(bullet))),
            None => doc.push(Paragraph::new().space_after(2.0).runs(bold_runs(line))),
        }
    }
}
