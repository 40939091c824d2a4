// Prompt templates for the generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{
    fill_template, BOLDING_INSTRUCTION, COVER_LETTER_BOLDING, GENERAL_SECTION_RULES,
    ONE_PAGE_REMINDER,
};
use crate::models::resume::Section;

pub const NO_REQUIREMENTS: &str = "No specific requirements provided.";
pub const NO_KEYWORDS: &str = "No specific ATS keywords identified.";
pub const COVER_LETTER_MARKER: &str = "--- BEGIN COVER LETTER ---";

/// ATS keyword extraction. Replace `{job_title}` and `{jd_text}` before sending.
pub const KEYWORD_PROMPT_TEMPLATE: &str = r#"You identify the keywords an Applicant Tracking System screens for, specialising in Machine Learning, Data Science and AI roles.

Analyze the job description below for the role "{job_title}" and list the 15-20 most important, specific keywords an ATS would be configured to match.

Prioritize these categories:
1. Programming languages and core data libraries (Python, SQL, R, Pandas, NumPy).
2. ML frameworks and specialised libraries (PyTorch, TensorFlow, scikit-learn, Hugging Face, XGBoost).
3. ML concepts and techniques (NLP, computer vision, time series, A/B testing, feature engineering, model deployment, monitoring).
4. Named algorithms and architectures when stressed (gradient boosting, CNN, Transformers, BERT).
5. MLOps, data engineering and big data (MLflow, Kubeflow, Spark, Kafka, Snowflake, BigQuery, Docker, Kubernetes).
6. Cloud AI services (SageMaker, Vertex AI, Azure ML).
7. Degrees or domain expertise only when listed as hard requirements.

Output rules:
- Use the exact phrases and acronyms from the posting where possible.
- Hard skills and technologies only; skip generic soft skills.
- 15-20 keywords, at most 25 if more are clearly relevant.
- Return ONLY a comma-separated list. No numbering, bullets, categories or commentary.

Job Description:
---
{jd_text}
---

Comma-separated ATS keywords:"#;

const SECTION_PROMPT_TEMPLATE: &str = r#"You are an expert technical resume writer. Rewrite one section of a candidate's resume so it is tailored to a target role. Showcase the candidate's fit for the role, not the company.
{master_profile_block}
{previous_block}
{general_rules}

Objective: rewrite the candidate's {section} section.

Original content for {section}:
```
{original}
```
Target job title (the resume is tailored FOR this type of role): "{job_title}"
Key requirements from the job description:
{requirements}
ATS keywords to prioritize in this section: `{keywords}`
Company from the job description (context only, never mention it in the summary): {company}
Work arrangement from the job description (context only, never mention it in the summary): {location_type}

{section_rules}

{bolding}

{one_page}

Output ONLY the rewritten {section} text."#;

const SUMMARY_RULES: &str = r#"SUMMARY RULES:
- 3-4 lines, between 350 and 450 characters in total.
- Never mention the company, its products or mission, the exact target job title, the location or the work arrangement. Write a strong general summary for this TYPE of role.
- Education must be stated accurately: {education_fact}
- Lead with years of experience and core specialisation, then 2-3 quantified strengths drawn from the source material.
- Do not prefix the text with a label such as "Summary:"."#;

const WORK_EXPERIENCE_RULES: &str = r#"WORK EXPERIENCE RULES:
- Include every role from the original content, most recent first. Never move an achievement to a different role.
- Bullet limits per role:
  - AI/ML Engineer: exactly 4 bullets, each 120-160 characters.
  - Data Consultant: 2 bullets, each at most 100 characters.
  - Digital Transformation Developer: 2 bullets, each at most 120 characters.
  - Any other role: 2-3 bullets, each at most 150 characters.
- Format every role exactly as:
**Job Title** | **Company Name** | City, State
Month YYYY - Month YYYY
* Bullet starting with a strong action verb, quantified where possible
- Separate roles with one blank line. No section header."#;

const TECHNICAL_SKILLS_RULES: &str = r#"TECHNICAL SKILLS RULES:
- 4-5 category lines, each under 110 characters.
- Format each line as: Category Name: **Skill**, Skill, Skill
- Never bold the category name. Bold only the skills most relevant to the role.
- Order skills by relevance to the ATS keywords. Do not invent skills the candidate lacks."#;

const PROJECTS_RULES: &str = r###"PROJECTS RULES:
- Keep the projects from the original content, most relevant first.
- Format every project as a title line, optionally followed by " | _short tagline_", then exactly 2 bullets:
Project Title | _Tagline_
* Bullet under 170 characters
* Bullet under 170 characters
- Keep project titles unchanged so their links still resolve. Use "Q&A" rather than "question answering".
- Separate projects with one blank line. No "##" headers."###;

/// Cover letter prompt. Every `{placeholder}` is filled by `cover_letter_prompt`.
const COVER_LETTER_TEMPLATE: &str = r#"You are an expert career strategist and cover letter writer. Write a personalised, human-sounding, one-page cover letter for {candidate_name}.

The first paragraph must be a "10-second hook": name the position ({job_title}) and state a specific value proposition that makes a recruiter keep reading.

CANDIDATE CONTACT (reference only):
{contact}
{profile_sources}
{project_details}

{bolding}

TARGET ROLE:
- Job title: {job_title}
- Company: {company}
- Key requirements: {requirements}
- ATS keywords to address: {keywords}

WRITING INSTRUCTIONS:
1. Salutation: address the letter to "{salutation}".
2. Opening paragraph: the hook described above.
3. Body: 2-3 substantial paragraphs of 3-5 sentences. Each covers 1-2 concrete achievements from the candidate material: the situation, the candidate's actions, the technologies used and the quantified result, tied to the requirements or keywords.
4. Projects may be discussed, but NEVER put a URL in the body. Saying details are in the portfolio is fine.
5. If {company} is a real, specific company, include 1-2 genuine sentences about why that company appeals. If it is generic, express enthusiasm for the field and the challenges of the role instead. Never output placeholders such as "[company detail]".
6. Closing paragraph: restate interest and ask for an interview.
7. End with "Sincerely," then one blank line, then "{candidate_name}". Nothing after the name.

AVOID: dates, restating the resume line by line, clichés, invented skills, a "Cover Letter:" heading, any placeholder or instruction text.

Output ONLY the letter: salutation, body and closing.

{marker}
"#;

const CRITIQUE_TEMPLATE: &str = r#"You review resumes with the precision of an ATS, the eye of a senior recruiter and the care of a proofreader.
Evaluate the TAILORED RESUME for {candidate_name} against the job description for "{job_title}".

Job title: {job_title}
Job description:
```
{jd_text}
```
ATS keywords from the job description: {keywords}
Tailored resume (text only, you cannot see the final layout):
```
{resume_text}
```

Respond with a JSON object containing exactly these fields:
{
  "ats_score": <number 0-100 based on keyword alignment and relevance>,
  "ats_pass_assessment": "<likely to pass / borderline / needs keyword work, with a short reason>",
  "recruiter_impression_assessment": "<overall impact on a human recruiter>",
  "potential_length_concern": "<whether the amount of text fits one page>",
  "content_structure_and_clarity": "<organisation, clarity, awkward phrases to fix>",
  "formatting_consistency_from_text": "<textual inconsistencies that imply formatting issues>"
}

If you cannot produce JSON, answer with one line per item instead:
ATS_SCORE: 85
ATS_PASS: ...
RECRUITER_IMPRESSION: ...
POTENTIAL_LENGTH_CONCERN: ...
CONTENT_STRUCTURE_AND_CLARITY: ...
FORMATTING_CONSISTENCY_FROM_TEXT: ...

Keep every assessment concise and actionable."#;

pub fn keyword_prompt(job_title: &str, jd_text: &str) -> String {
    fill_template(
        KEYWORD_PROMPT_TEMPLATE,
        &[("job_title", job_title), ("jd_text", jd_text)],
    )
}

pub fn format_requirements(requirements: &[String]) -> String {
    if requirements.is_empty() {
        return NO_REQUIREMENTS.to_string();
    }
    requirements
        .iter()
        .map(|r| format!("- {r}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_keywords(keywords: &[String]) -> String {
    if keywords.is_empty() {
        NO_KEYWORDS.to_string()
    } else {
        keywords.join(", ")
    }
}

/// Inputs for one section tailoring prompt.
#[derive(Debug, Clone, Copy)]
pub struct SectionPromptInput<'a> {
    pub section: Section,
    pub original: &'a str,
    pub job_title: &'a str,
    pub requirements: &'a [String],
    pub ats_keywords: &'a [String],
    pub company: Option<&'a str>,
    pub location_type: Option<&'a str>,
    pub master_profile: Option<&'a str>,
    pub previously_tailored: Option<&'a str>,
    pub education_fact: Option<&'a str>,
}

fn optional_block(label: &str, body: Option<&str>) -> String {
    match body.map(str::trim).filter(|b| !b.is_empty()) {
        Some(body) => format!("---\n{label}:\n{body}\n---"),
        None => String::new(),
    }
}

pub fn section_prompt(input: &SectionPromptInput<'_>) -> String {
    let header = input.section.header();
    let original = match input.original.trim() {
        "" => format!(
            "No original content was provided for {header}. Rely on the master profile if available."
        ),
        text => text.to_string(),
    };

    let section_rules = match input.section {
        Section::Summary => fill_template(
            SUMMARY_RULES,
            &[(
                "education_fact",
                input
                    .education_fact
                    .unwrap_or("state only the degrees present in the source material."),
            )],
        ),
        Section::WorkExperience => WORK_EXPERIENCE_RULES.to_string(),
        Section::TechnicalSkills => TECHNICAL_SKILLS_RULES.to_string(),
        Section::Projects => PROJECTS_RULES.to_string(),
    };

    let master_profile_block = optional_block(
        "CANDIDATE MASTER PROFILE (primary source for skills, experience and achievements)",
        input.master_profile,
    );
    let previous_block = optional_block(
        "PREVIOUSLY TAILORED SECTIONS (context and keyword consistency only, do not repeat them)",
        input.previously_tailored,
    );
    let general_rules = fill_template(GENERAL_SECTION_RULES, &[("section", header)]);
    let requirements = format_requirements(input.requirements);
    let keywords = format_keywords(input.ats_keywords);

    fill_template(
        SECTION_PROMPT_TEMPLATE,
        &[
            ("master_profile_block", &master_profile_block),
            ("previous_block", &previous_block),
            ("general_rules", &general_rules),
            ("section_rules", &section_rules),
            ("bolding", BOLDING_INSTRUCTION),
            ("one_page", ONE_PAGE_REMINDER),
            ("original", &original),
            ("job_title", input.job_title),
            ("requirements", &requirements),
            ("keywords", &keywords),
            ("company", input.company.unwrap_or("Not specified")),
            ("location_type", input.location_type.unwrap_or("Not specified")),
            ("section", header),
        ],
    )
}

/// A project title paired with its demo link, when one is known.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDetail {
    pub title: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CoverLetterPromptInput<'a> {
    pub candidate_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub linkedin_url: Option<&'a str>,
    pub job_title: &'a str,
    pub company: &'a str,
    pub requirements_summary: &'a str,
    pub keywords: &'a str,
    pub tailored_summary: Option<&'a str>,
    pub tailored_work_experience: Option<&'a str>,
    pub tailored_projects: Option<&'a str>,
    pub master_profile: Option<&'a str>,
    pub hiring_manager: Option<&'a str>,
    pub projects: &'a [ProjectDetail],
}

pub fn cover_letter_prompt(input: &CoverLetterPromptInput<'_>) -> String {
    let mut contact = format!("Candidate Email: {}", input.email);
    if let Some(phone) = input.phone.filter(|p| !p.trim().is_empty()) {
        contact.push_str(&format!("\nCandidate Phone: {phone}"));
    }
    if let Some(linkedin) = input.linkedin_url.filter(|l| !l.trim().is_empty()) {
        contact.push_str(&format!("\nCandidate LinkedIn: {linkedin}"));
    }

    let sources = [
        ("MASTER PROFILE (primary source of truth)", input.master_profile),
        ("TAILORED RESUME SUMMARY", input.tailored_summary),
        ("TAILORED WORK EXPERIENCE", input.tailored_work_experience),
        ("TAILORED PROJECTS", input.tailored_projects),
    ];
    let mut profile_sources: String = sources
        .iter()
        .filter_map(|(label, body)| {
            body.map(str::trim)
                .filter(|b| !b.is_empty())
                .map(|b| format!("\n--- CANDIDATE {label} ---\n{b}\n--- END ---"))
        })
        .collect();
    if profile_sources.is_empty() {
        profile_sources =
            "\nCandidate material is incomplete. Work from whatever details are available."
                .to_string();
    }

    let project_details = if input.projects.is_empty() {
        String::new()
    } else {
        let lines: Vec<String> = input
            .projects
            .iter()
            .map(|p| match &p.url {
                Some(url) => format!("- Project: {} (has a demo at {url})", p.title),
                None => format!("- Project: {} (no demo URL)", p.title),
            })
            .collect();
        format!(
            "\n--- KEY PROJECTS (background only, never put these URLs in the letter) ---\n{}\n--- END ---",
            lines.join("\n")
        )
    };

    let salutation = match input.hiring_manager.filter(|h| !h.trim().is_empty()) {
        Some(name) => name.to_string(),
        None => format!("Hiring Team at {}", input.company),
    };

    fill_template(
        COVER_LETTER_TEMPLATE,
        &[
            ("contact", &contact),
            ("profile_sources", &profile_sources),
            ("project_details", &project_details),
            ("bolding", COVER_LETTER_BOLDING),
            ("salutation", &salutation),
            ("requirements", input.requirements_summary),
            ("keywords", input.keywords),
            ("marker", COVER_LETTER_MARKER),
            ("job_title", input.job_title),
            ("company", input.company),
            ("candidate_name", input.candidate_name),
        ],
    )
}

pub fn critique_prompt(
    job_title: &str,
    jd_text: &str,
    keywords: &[String],
    resume_text: &str,
    candidate_name: &str,
) -> String {
    let keywords = if keywords.is_empty() {
        "Not specifically provided.".to_string()
    } else {
        keywords.join(", ")
    };
    fill_template(
        CRITIQUE_TEMPLATE,
        &[
            ("candidate_name", candidate_name),
            ("job_title", job_title),
            ("jd_text", jd_text),
            ("keywords", &keywords),
            ("resume_text", resume_text),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_keyword_prompt_contains_title_and_jd() {
        let p = keyword_prompt("ML Engineer", "We need PyTorch.");
        assert!(p.contains("\"ML Engineer\""));
        assert!(p.contains("We need PyTorch."));
        assert!(!p.contains("{jd_text}"));
    }

    #[test]
    fn test_section_prompt_includes_title_keywords_and_rules() {
        let reqs = strings(&["3+ years Python", "Deploy models"]);
        let kws = strings(&["PyTorch", "MLflow"]);
        let p = section_prompt(&SectionPromptInput {
            section: Section::Summary,
            original: "Engineer with 4 years.",
            job_title: "Senior ML Engineer",
            requirements: &reqs,
            ats_keywords: &kws,
            company: Some("Acme"),
            location_type: None,
            master_profile: None,
            previously_tailored: None,
            education_fact: Some("The candidate holds an M.S."),
        });
        assert!(p.contains("Senior ML Engineer"));
        assert!(p.contains("PyTorch, MLflow"));
        assert!(p.contains("- 3+ years Python\n- Deploy models"));
        assert!(p.contains("350 and 450 characters"));
        assert!(p.contains("The candidate holds an M.S."));
        assert!(!p.contains("CANDIDATE MASTER PROFILE"));
        assert!(!p.contains("{section}"));
    }

    #[test]
    fn test_projects_prompt_keeps_quoted_header_rule() {
        let p = section_prompt(&SectionPromptInput {
            section: Section::Projects,
            original: "Ranker | _Search_\n* Built it\n* Shipped it",
            job_title: "ML Engineer",
            requirements: &[],
            ats_keywords: &[],
            company: None,
            location_type: None,
            master_profile: None,
            previously_tailored: None,
            education_fact: None,
        });
        assert!(p.contains("PROJECTS RULES:"));
        assert!(p.contains("No \"##\" headers."));
        assert!(p.contains("Use \"Q&A\" rather than"));
    }

    #[test]
    fn test_section_prompt_defaults_for_empty_inputs() {
        let p = section_prompt(&SectionPromptInput {
            section: Section::TechnicalSkills,
            original: "  ",
            job_title: "Data Scientist",
            requirements: &[],
            ats_keywords: &[],
            company: None,
            location_type: None,
            master_profile: Some("Master facts"),
            previously_tailored: Some("## SUMMARY\nDone"),
            education_fact: None,
        });
        assert!(p.contains(NO_REQUIREMENTS));
        assert!(p.contains(NO_KEYWORDS));
        assert!(p.contains("No original content was provided for TECHNICAL SKILLS"));
        assert!(p.contains("Master facts"));
        assert!(p.contains("## SUMMARY\nDone"));
        assert!(p.contains("under 110 characters"));
    }

    #[test]
    fn test_cover_letter_prompt_salutation_and_projects() {
        let projects = vec![
            ProjectDetail {
                title: "Code QA".to_string(),
                url: Some("https://qa.example.app".to_string()),
            },
            ProjectDetail {
                title: "Text Detector".to_string(),
                url: None,
            },
        ];
        let input = CoverLetterPromptInput {
            candidate_name: "Ada Lovelace",
            email: "ada@example.com",
            phone: Some("555-0100"),
            linkedin_url: None,
            job_title: "ML Engineer",
            company: "Acme",
            requirements_summary: "- Python",
            keywords: "PyTorch, SQL",
            tailored_summary: Some("Summary text"),
            tailored_work_experience: None,
            tailored_projects: None,
            master_profile: None,
            hiring_manager: None,
            projects: &projects,
        };
        let p = cover_letter_prompt(&input);
        assert!(p.contains("Hiring Team at Acme"));
        assert!(p.contains("Candidate Phone: 555-0100"));
        assert!(!p.contains("Candidate LinkedIn"));
        assert!(p.contains("Code QA (has a demo at https://qa.example.app)"));
        assert!(p.contains("Text Detector (no demo URL)"));
        assert!(p.contains("PyTorch, SQL"));
        assert!(p.trim_end().ends_with(COVER_LETTER_MARKER));

        let named = cover_letter_prompt(&CoverLetterPromptInput {
            hiring_manager: Some("Dr. Grace Hopper"),
            ..input
        });
        assert!(named.contains("\"Dr. Grace Hopper\""));
    }

    #[test]
    fn test_critique_prompt_lists_labels_and_keywords() {
        let p = critique_prompt(
            "ML Engineer",
            "- Python",
            &strings(&["PyTorch", "Spark"]),
            "## SUMMARY\nText",
            "Ada",
        );
        for label in [
            "ATS_SCORE",
            "ATS_PASS",
            "RECRUITER_IMPRESSION",
            "POTENTIAL_LENGTH_CONCERN",
            "CONTENT_STRUCTURE_AND_CLARITY",
            "FORMATTING_CONSISTENCY_FROM_TEXT",
        ] {
            assert!(p.contains(label), "missing {label}");
        }
        assert!(p.contains("PyTorch, Spark"));
        assert!(p.contains("ML Engineer"));
    }
}
