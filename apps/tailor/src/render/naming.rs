//! Output file names for rendered documents.

const DEFAULT_COMPANY: &str = "TargetCompany";
const UNKNOWN_COMPANY: &str = "UnknownCompany";
const UNKNOWN_TITLE: &str = "UnknownTitle";
const SCRAPED_COMPANY_CHARS: usize = 25;
const SCRAPED_TITLE_CHARS: usize = 30;

static_regex!(non_word_run, r"\W+");
static_regex!(unsafe_file_char, r"[^\w.\-]");
static_regex!(unsafe_drive_char, r"[^\w\-]");

fn sanitize_file_base(base: &str) -> String {
    unsafe_file_char().replace_all(base, "_").into_owned()
}

fn company_token(company: &str) -> String {
    let token = non_word_run().replace_all(company, "").into_owned();
    if token.is_empty() {
        DEFAULT_COMPANY.to_string()
    } else {
        token
    }
}

/// `{keyword}_{Company}_{LastName}_{yoe}YOE`, with `X` for an unknown yoe.
pub fn resume_file_base(keyword: &str, company: &str, last_name: &str, yoe: Option<u32>) -> String {
    let yoe = yoe.map_or_else(|| "X".to_string(), |y| y.to_string());
    sanitize_file_base(&format!(
        "{keyword}_{}_{last_name}_{yoe}YOE",
        company_token(company)
    ))
}

/// `{keyword}_{Company}_{LastName}`.
pub fn cover_letter_file_base(keyword: &str, company: &str, last_name: &str) -> String {
    sanitize_file_base(&format!("{keyword}_{}_{last_name}", company_token(company)))
}

fn scraped_part(value: &str, max_chars: usize, fallback: &str) -> String {
    let replaced = non_word_run().replace_all(value, "_");
    let truncated: String = replaced.chars().take(max_chars).collect();
    let part = truncated.trim_matches('_');
    if part.is_empty() {
        fallback.to_string()
    } else {
        part.to_string()
    }
}

/// Keyword prefix for documents produced by the scraper:
/// `{prefix}_{company}_{title}` plus `_{keyword}` when given.
pub fn scraped_file_base(prefix: &str, company: &str, title: &str, keyword: Option<&str>) -> String {
    let company = scraped_part(company, SCRAPED_COMPANY_CHARS, UNKNOWN_COMPANY);
    let title = scraped_part(title, SCRAPED_TITLE_CHARS, UNKNOWN_TITLE);
    match keyword.filter(|k| !k.is_empty()) {
        Some(keyword) => format!("{prefix}_{company}_{title}_{keyword}"),
        None => format!("{prefix}_{company}_{title}"),
    }
}

/// Name prefix for the temporary Drive files.
pub fn sanitize_drive_prefix(base: &str) -> String {
    unsafe_drive_char().replace_all(base, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_file_base() {
        assert_eq!(
            resume_file_base("AI", "Scale AI, Inc.", "Lovelace", Some(4)),
            "AI_ScaleAIInc_Lovelace_4YOE"
        );
        assert_eq!(
            resume_file_base("AI Eng", "", "Lovelace", None),
            "AI_Eng_TargetCompany_Lovelace_XYOE"
        );
    }

    #[test]
    fn test_cover_letter_file_base() {
        assert_eq!(
            cover_letter_file_base("CoverLetter", "Open-AI", "Lovelace"),
            "CoverLetter_OpenAI_Lovelace"
        );
    }

    #[test]
    fn test_scraped_file_base_truncates_and_falls_back() {
        assert_eq!(
            scraped_file_base("Resume", "Acme Corp.", "Senior ML Engineer (Remote)", Some("AI")),
            "Resume_Acme_Corp_Senior_ML_Engineer_Remote_AI"
        );
        let long = "A".repeat(40);
        let base = scraped_file_base("CoverLetter", &long, "!!!", None);
        assert_eq!(base, format!("CoverLetter_{}_UnknownTitle", "A".repeat(25)));
    }

    #[test]
    fn test_sanitize_drive_prefix() {
        assert_eq!(sanitize_drive_prefix("AI_Acme_Lovelace.v2 (1)"), "AI_Acme_Lovelace_v2__1_");
    }
}
