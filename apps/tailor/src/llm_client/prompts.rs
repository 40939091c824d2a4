// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Keyword emphasis rule shared by every resume section prompt.
pub const BOLDING_INSTRUCTION: &str = "\
    KEYWORD EMPHASIS: In the text you write for this section, wrap 2-4 of the most impactful \
    keywords or phrases in double asterisks, preferring terms from the ATS KEYWORDS or the KEY \
    REQUIREMENTS, e.g. 'built a **machine learning** model for **predictive analytics**'. \
    Never bold section titles, category labels or sub-headers.";

/// Reminder appended to every section prompt: the whole resume targets a single page.
pub const ONE_PAGE_REMINDER: &str = "\
    ONE-PAGE RULE: All sections together must fit on a single page. Keep this section tight \
    and respect every length and bullet limit given above.";

/// General rules applied to every tailored section. Replace `{section}` before sending.
pub const GENERAL_SECTION_RULES: &str = r#"GENERAL RULES (apply to every resume section):
1. Goal: using the MASTER PROFILE (if given), the ORIGINAL CONTENT, the TARGET JOB TITLE, the KEY REQUIREMENTS and the ATS KEYWORDS, rewrite the {section} section so a recruiter immediately sees why the candidate fits this kind of role. Prefer quantified achievements.
2. ATS alignment: weave the relevant keywords in naturally. Aim for strong keyword relevance (an ATS score above 80%) without stuffing or repetition.
3. Follow every section-specific instruction on length, format, content and tone exactly.
4. Readability: avoid leaving one or two orphan words on the last line of a paragraph or bullet when a small rephrase fixes it.
5. Use keywords in the {section} section itself, especially ones the source material under-emphasizes."#;

/// Bolding guidance specific to cover letters.
pub const COVER_LETTER_BOLDING: &str = "\
    KEYWORD BOLDING: In the body paragraphs, wrap 2-4 of the most relevant skills or experiences \
    that match the key requirements or ATS keywords in double asterisks. Use it sparingly; never \
    bold whole sentences, the salutation or the closing.";

static_regex!(placeholder_re, r"\{(\w+)\}");

/// Replaces every `{key}` occurrence in `template` with its value in a single pass.
/// Inserted values are never rescanned; unknown placeholders are left as they are.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    placeholder_re()
        .replace_all(template, |caps: &regex::Captures| {
            let key = &caps[1];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map_or_else(|| caps[0].to_string(), |(_, v)| v.to_string())
        })
        .into_owned()
}
