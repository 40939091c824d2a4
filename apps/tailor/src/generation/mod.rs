// Generation: JD analysis, section tailoring, cover letter and critique.
// All LLM calls go through llm_client. Nothing here talks to the Gemini API directly.

pub mod cover_letter;
pub mod critique;
pub mod jd_parser;
pub mod pipeline;
pub mod post_process;
pub mod prompts;
pub mod tailoring;
