//! Minimal WordprocessingML writer: paragraphs of runs, hyperlinks, bullets and page
//! margins, packaged as a `.docx` zip.

use std::io::{Cursor, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const DEFAULT_FONT: &str = "Times New Roman";
pub const LINK_COLOR: &str = "0563C1";
const TWIPS_PER_INCH: f32 = 1440.0;
const TWIPS_PER_POINT: f32 = 20.0;
const LINE_UNITS_SINGLE: f32 = 240.0;
const BULLET_NUM_ID: u32 = 1;

/// Reserved relationship ids in `word/_rels/document.xml.rels`; hyperlinks follow.
const STYLES_REL_ID: &str = "rId1";
const NUMBERING_REL_ID: &str = "rId2";
const FIRST_HYPERLINK_REL: usize = 3;

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const STYLES_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const NUMBERING_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
const HYPERLINK_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    fn as_xml(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }
}

/// A formatted text run. A `\t` in the text becomes a tab character.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Font size in points.
    pub size: Option<f32>,
    /// RGB hex without the leading `#`.
    pub color: Option<String>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn bold_if(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn italic_if(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn size(mut self, points: f32) -> Self {
        self.size = Some(points);
        self
    }

    pub fn color(mut self, hex: &str) -> Self {
        self.color = Some(hex.trim_start_matches('#').to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Run(Run),
    /// External hyperlink; `rel_id` comes from `Document::link`.
    Hyperlink { rel_id: String, run: Run },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub inlines: Vec<Inline>,
    pub alignment: Option<Alignment>,
    /// Points.
    pub space_before: Option<f32>,
    /// Points.
    pub space_after: Option<f32>,
    /// Multiple of single line spacing, e.g. `1.15`.
    pub line_spacing: Option<f32>,
    /// Right-aligned tab stop, in inches from the left margin.
    pub right_tab: Option<f32>,
    pub bottom_border: bool,
    pub bullet: bool,
    pub keep_with_next: bool,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(mut self, run: Run) -> Self {
        self.inlines.push(Inline::Run(run));
        self
    }

    pub fn runs(mut self, runs: impl IntoIterator<Item = Run>) -> Self {
        self.inlines.extend(runs.into_iter().map(Inline::Run));
        self
    }

    pub fn inline(mut self, inline: Inline) -> Self {
        self.inlines.push(inline);
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn space_before(mut self, points: f32) -> Self {
        self.space_before = Some(points);
        self
    }

    pub fn space_after(mut self, points: f32) -> Self {
        self.space_after = Some(points);
        self
    }

    pub fn line_spacing(mut self, multiple: f32) -> Self {
        self.line_spacing = Some(multiple);
        self
    }

    pub fn right_tab(mut self, inches: f32) -> Self {
        self.right_tab = Some(inches);
        self
    }

    pub fn bottom_border(mut self) -> Self {
        self.bottom_border = true;
        self
    }

    pub fn bullet(mut self) -> Self {
        self.bullet = true;
        self
    }

    pub fn keep_with_next(mut self) -> Self {
        self.keep_with_next = true;
        self
    }

    /// Concatenated run text, mostly for tests and logging.
    pub fn text(&self) -> String {
        self.inlines
            .iter()
            .map(|i| match i {
                Inline::Run(r) | Inline::Hyperlink { run: r, .. } => r.text.as_str(),
            })
            .collect()
    }
}

/// Page margins in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageMargins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for PageMargins {
    fn default() -> Self {
        Self {
            left: 1.0,
            right: 1.0,
            top: 1.0,
            bottom: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
    pub margins: PageMargins,
    /// Default font size in points.
    pub font_size: f32,
    /// Default line spacing multiple.
    pub line_spacing: f32,
    hyperlinks: Vec<String>,
}

impl Document {
    pub fn new(font_size: f32, margins: PageMargins) -> Self {
        Self {
            paragraphs: Vec::new(),
            margins,
            font_size,
            line_spacing: 1.15,
            hyperlinks: Vec::new(),
        }
    }

    pub fn push(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    /// Registers an external link target and returns a hyperlink inline for it.
    pub fn link(&mut self, url: &str, run: Run) -> Inline {
        let rel_id = format!("rId{}", FIRST_HYPERLINK_REL + self.hyperlinks.len());
        self.hyperlinks.push(url.to_string());
        Inline::Hyperlink { rel_id, run }
    }

    pub fn hyperlink_targets(&self) -> &[String] {
        &self.hyperlinks
    }

    /// Sets the spacing after the most recently added paragraph.
    pub fn set_last_space_after(&mut self, points: f32) {
        if let Some(last) = self.paragraphs.last_mut() {
            last.space_after = Some(points);
        }
    }

    pub fn document_xml(&self) -> Result<Vec<u8>, DocxError> {
        let mut w = new_part()?;
        open(&mut w, "w:document", &[("xmlns:w", WORDML_NS), ("xmlns:r", RELATIONSHIPS_NS)])?;
        open(&mut w, "w:body", &[])?;
        for p in &self.paragraphs {
            write_paragraph(&mut w, p)?;
        }
        open(&mut w, "w:sectPr", &[])?;
        empty(&mut w, "w:pgSz", &[("w:w", "12240"), ("w:h", "15840")])?;
        let m = self.margins;
        empty(
            &mut w,
            "w:pgMar",
            &[
                ("w:top", inches_to_twips(m.top).to_string().as_str()),
                ("w:right", inches_to_twips(m.right).to_string().as_str()),
                ("w:bottom", inches_to_twips(m.bottom).to_string().as_str()),
                ("w:left", inches_to_twips(m.left).to_string().as_str()),
                ("w:header", "720"),
                ("w:footer", "720"),
                ("w:gutter", "0"),
            ],
        )?;
        close(&mut w, "w:sectPr")?;
        close(&mut w, "w:body")?;
        close(&mut w, "w:document")?;
        Ok(finish_part(w))
    }

    fn styles_xml(&self) -> Result<Vec<u8>, DocxError> {
        let size = half_points(self.font_size).to_string();
        let mut w = new_part()?;
        open(&mut w, "w:styles", &[("xmlns:w", WORDML_NS)])?;

        open(&mut w, "w:docDefaults", &[])?;
        open(&mut w, "w:rPrDefault", &[])?;
        open(&mut w, "w:rPr", &[])?;
        empty(&mut w, "w:rFonts", &font_attrs(DEFAULT_FONT))?;
        empty(&mut w, "w:sz", &[("w:val", size.as_str())])?;
        empty(&mut w, "w:szCs", &[("w:val", size.as_str())])?;
        close(&mut w, "w:rPr")?;
        close(&mut w, "w:rPrDefault")?;
        open(&mut w, "w:pPrDefault", &[])?;
        open(&mut w, "w:pPr", &[])?;
        empty(&mut w, "w:widowControl", &[])?;
        empty(
            &mut w,
            "w:spacing",
            &[
                ("w:before", "0"),
                ("w:after", "0"),
                ("w:line", line_units(self.line_spacing).to_string().as_str()),
                ("w:lineRule", "auto"),
            ],
        )?;
        close(&mut w, "w:pPr")?;
        close(&mut w, "w:pPrDefault")?;
        close(&mut w, "w:docDefaults")?;

        open(
            &mut w,
            "w:style",
            &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")],
        )?;
        empty(&mut w, "w:name", &[("w:val", "Normal")])?;
        empty(&mut w, "w:qFormat", &[])?;
        close(&mut w, "w:style")?;

        open(&mut w, "w:style", &[("w:type", "character"), ("w:styleId", "Hyperlink")])?;
        empty(&mut w, "w:name", &[("w:val", "Hyperlink")])?;
        open(&mut w, "w:rPr", &[])?;
        empty(&mut w, "w:color", &[("w:val", LINK_COLOR)])?;
        empty(&mut w, "w:u", &[("w:val", "single")])?;
        close(&mut w, "w:rPr")?;
        close(&mut w, "w:style")?;

        close(&mut w, "w:styles")?;
        Ok(finish_part(w))
    }

    fn relationships_xml(&self) -> Result<Vec<u8>, DocxError> {
        let mut w = new_part()?;
        open(&mut w, "Relationships", &[("xmlns", PACKAGE_RELS_NS)])?;
        empty(
            &mut w,
            "Relationship",
            &[("Id", STYLES_REL_ID), ("Type", STYLES_REL_TYPE), ("Target", "styles.xml")],
        )?;
        empty(
            &mut w,
            "Relationship",
            &[("Id", NUMBERING_REL_ID), ("Type", NUMBERING_REL_TYPE), ("Target", "numbering.xml")],
        )?;
        for (idx, url) in self.hyperlinks.iter().enumerate() {
            let id = format!("rId{}", FIRST_HYPERLINK_REL + idx);
            empty(
                &mut w,
                "Relationship",
                &[
                    ("Id", id.as_str()),
                    ("Type", HYPERLINK_REL_TYPE),
                    ("Target", strip_control_chars(url).as_str()),
                    ("TargetMode", "External"),
                ],
            )?;
        }
        close(&mut w, "Relationships")?;
        Ok(finish_part(w))
    }

    /// Serializes the document as `.docx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts: [(&str, Vec<u8>); 6] = [
            ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes().to_vec()),
            ("_rels/.rels", PACKAGE_RELS_XML.as_bytes().to_vec()),
            ("word/document.xml", self.document_xml()?),
            ("word/styles.xml", self.styles_xml()?),
            ("word/numbering.xml", NUMBERING_XML.as_bytes().to_vec()),
            ("word/_rels/document.xml.rels", self.relationships_xml()?),
        ];
        for (name, content) in parts {
            zip.start_file(name, options)?;
            zip.write_all(&content)?;
        }

        Ok(zip.finish()?.into_inner())
    }

    pub fn write_to(&self, path: &Path) -> Result<(), DocxError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

// Single-level bullet list, 0.25in hanging indent.
const NUMBERING_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="•"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="360" w:hanging="360"/></w:pPr><w:rPr><w:rFonts w:ascii="Symbol" w:hAnsi="Symbol" w:hint="default"/></w:rPr></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#;

fn inches_to_twips(inches: f32) -> u32 {
    (inches * TWIPS_PER_INCH).round() as u32
}

fn points_to_twips(points: f32) -> u32 {
    (points * TWIPS_PER_POINT).round() as u32
}

fn half_points(points: f32) -> u32 {
    (points * 2.0).round() as u32
}

fn line_units(multiple: f32) -> u32 {
    (multiple * LINE_UNITS_SINGLE).round() as u32
}

/// XML 1.0 forbids most control characters, so they are dropped before writing.
fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| (c as u32) >= 0x20 || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

fn new_part() -> Result<XmlWriter, DocxError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(writer)
}

fn finish_part(writer: XmlWriter) -> Vec<u8> {
    writer.into_inner().into_inner()
}

fn element<'a>(name: &'a str, attrs: &[(&str, &str)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for &attr in attrs {
        start.push_attribute(attr);
    }
    start
}

fn open(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<(), DocxError> {
    w.write_event(Event::Start(element(name, attrs)))?;
    Ok(())
}

fn empty(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<(), DocxError> {
    w.write_event(Event::Empty(element(name, attrs)))?;
    Ok(())
}

fn close(w: &mut XmlWriter, name: &str) -> Result<(), DocxError> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn font_attrs(font: &str) -> [(&str, &str); 4] {
    [("w:ascii", font), ("w:hAnsi", font), ("w:cs", font), ("w:eastAsia", font)]
}

fn write_paragraph(w: &mut XmlWriter, p: &Paragraph) -> Result<(), DocxError> {
    open(w, "w:p", &[])?;
    open(w, "w:pPr", &[])?;
    if p.keep_with_next {
        empty(w, "w:keepNext", &[])?;
    }
    empty(w, "w:widowControl", &[])?;
    if p.bullet {
        open(w, "w:numPr", &[])?;
        empty(w, "w:ilvl", &[("w:val", "0")])?;
        empty(w, "w:numId", &[("w:val", BULLET_NUM_ID.to_string().as_str())])?;
        close(w, "w:numPr")?;
    }
    if p.bottom_border {
        open(w, "w:pBdr", &[])?;
        empty(
            w,
            "w:bottom",
            &[("w:val", "single"), ("w:sz", "4"), ("w:space", "1"), ("w:color", "444444")],
        )?;
        close(w, "w:pBdr")?;
    }
    if let Some(tab) = p.right_tab {
        open(w, "w:tabs", &[])?;
        empty(w, "w:tab", &[("w:val", "right"), ("w:pos", inches_to_twips(tab).to_string().as_str())])?;
        close(w, "w:tabs")?;
    }

    let mut spacing: Vec<(&str, String)> = Vec::new();
    if let Some(before) = p.space_before {
        spacing.push(("w:before", points_to_twips(before).to_string()));
    }
    if let Some(after) = p.space_after {
        spacing.push(("w:after", points_to_twips(after).to_string()));
    }
    if let Some(line) = p.line_spacing {
        spacing.push(("w:line", line_units(line).to_string()));
        spacing.push(("w:lineRule", "auto".to_string()));
    }
    if !spacing.is_empty() {
        let attrs: Vec<(&str, &str)> = spacing.iter().map(|(k, v)| (*k, v.as_str())).collect();
        empty(w, "w:spacing", &attrs)?;
    }
    if let Some(alignment) = p.alignment {
        empty(w, "w:jc", &[("w:val", alignment.as_xml())])?;
    }
    close(w, "w:pPr")?;

    for inline in &p.inlines {
        match inline {
            Inline::Run(run) => write_run(w, run)?,
            Inline::Hyperlink { rel_id, run } => {
                open(w, "w:hyperlink", &[("r:id", rel_id.as_str()), ("w:history", "1")])?;
                write_run(w, run)?;
                close(w, "w:hyperlink")?;
            }
        }
    }
    close(w, "w:p")
}

fn write_run(w: &mut XmlWriter, run: &Run) -> Result<(), DocxError> {
    open(w, "w:r", &[])?;
    open(w, "w:rPr", &[])?;
    empty(w, "w:rFonts", &font_attrs(DEFAULT_FONT))?;
    if run.bold {
        empty(w, "w:b", &[])?;
    }
    if run.italic {
        empty(w, "w:i", &[])?;
    }
    if let Some(color) = &run.color {
        empty(w, "w:color", &[("w:val", color.as_str())])?;
    }
    if let Some(size) = run.size {
        let hp = half_points(size).to_string();
        empty(w, "w:sz", &[("w:val", hp.as_str())])?;
        empty(w, "w:szCs", &[("w:val", hp.as_str())])?;
    }
    if run.underline {
        empty(w, "w:u", &[("w:val", "single")])?;
    }
    close(w, "w:rPr")?;

    for (idx, segment) in run.text.split('\t').enumerate() {
        if idx > 0 {
            empty(w, "w:tab", &[])?;
        }
        if !segment.is_empty() {
            open(w, "w:t", &[("xml:space", "preserve")])?;
            w.write_event(Event::Text(BytesText::new(&strip_control_chars(segment))))?;
            close(w, "w:t")?;
        }
    }
    close(w, "w:r")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn sample() -> Document {
        let mut doc = Document::new(10.0, PageMargins::default());
        let link = doc.link("https://example.com/?a=1&b=2", Run::new("Site").underline());
        doc.push(
            Paragraph::new()
                .align(Alignment::Center)
                .space_after(3.0)
                .run(Run::new("Ada & <Co>").bold().size(16.0))
                .inline(link),
        );
        doc.push(Paragraph::new().bullet().right_tab(7.4).run(Run::new("Role\tJan 2020")));
        doc
    }

    fn as_text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    fn assert_well_formed(xml: &str) {
        let mut reader = quick_xml::Reader::from_str(xml);
        loop {
            match reader.read_event() {
                Ok(quick_xml::events::Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("malformed XML at {}: {e}", reader.buffer_position()),
            }
        }
    }

    #[test]
    fn test_strip_control_chars() {
        assert_eq!(strip_control_chars("bell\u{7}"), "bell");
        assert_eq!(strip_control_chars("a\tb\nc"), "a\tb\nc");
    }

    #[test]
    fn test_document_xml_contains_formatting() {
        let xml = as_text(sample().document_xml().unwrap());
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(xml.contains("Ada &amp; &lt;Co&gt;"));
        assert!(xml.contains(r#"<w:sz w:val="32"/>"#));
        assert!(xml.contains(r#"<w:jc w:val="center"/>"#));
        assert!(xml.contains(r#"<w:spacing w:after="60"/>"#));
        assert!(xml.contains(r#"<w:hyperlink r:id="rId3""#));
        assert!(xml.contains(r#"<w:numId w:val="1"/>"#));
        assert!(xml.contains(r#"<w:tab w:val="right" w:pos="10656"/>"#));
        assert!(xml.contains("<w:tab/>"));
        assert!(xml.contains(r#"w:left="1440""#));
        assert_well_formed(&xml);
    }

    #[test]
    fn test_markup_in_text_and_attributes_is_escaped() {
        let mut doc = Document::new(10.0, PageMargins::default());
        doc.push(Paragraph::new().run(Run::new("R&D <ML> \"lead\"\u{1}").color("#AA\"BB")));
        let xml = as_text(doc.document_xml().unwrap());
        assert!(xml.contains("R&amp;D &lt;ML&gt;"));
        assert!(!xml.contains("<ML>"));
        assert!(!xml.contains('\u{1}'));
        assert!(xml.contains(r#"<w:color w:val="AA&quot;BB"/>"#));
        assert_well_formed(&xml);
    }

    #[test]
    fn test_styles_part_sets_default_font_and_size() {
        let xml = as_text(sample().styles_xml().unwrap());
        assert!(xml.contains(r#"w:ascii="Times New Roman""#));
        assert!(xml.contains(r#"<w:sz w:val="20"/>"#));
        assert!(xml.contains(r#"w:line="276""#));
        assert!(xml.contains(r#"<w:color w:val="0563C1"/>"#));
        assert_well_formed(&xml);
    }

    #[test]
    fn test_hyperlinks_get_sequential_relationships() {
        let mut doc = sample();
        let second = doc.link("mailto:a@b.c", Run::new("a@b.c"));
        assert!(matches!(second, Inline::Hyperlink { ref rel_id, .. } if rel_id == "rId4"));
        let rels = as_text(doc.relationships_xml().unwrap());
        assert_well_formed(&rels);
        assert!(rels.contains(r#"Id="rId3""#));
        assert!(rels.contains("https://example.com/?a=1&amp;b=2"));
        assert!(rels.contains(r#"Target="mailto:a@b.c" TargetMode="External""#));
    }

    #[test]
    fn test_to_bytes_produces_docx_package() {
        let bytes = sample().to_bytes().unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/styles.xml",
            "word/numbering.xml",
            "word/_rels/document.xml.rels",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing {name}");
        }
        let mut document = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut document)
            .unwrap();
        assert!(document.contains("Jan 2020"));
    }

    #[test]
    fn test_write_to_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.docx");
        sample().write_to(&path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
