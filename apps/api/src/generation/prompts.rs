// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{NO_PREAMBLE_RULE, PLAIN_TEXT_RULE};

/// Model used for cover letter generation.
pub const COVER_LETTER_MODEL: &str = "meta-llama/llama-3-8b-instruct";
pub const COVER_LETTER_TEMPERATURE: f32 = 0.7;
pub const COVER_LETTER_APP_TITLE: &str = "CoverLetterGenerator";

/// Model used for ATS scoring. Low temperature keeps the bare number stable.
pub const ATS_MODEL: &str = "qwen/qwen3-coder:free";
pub const ATS_TEMPERATURE: f32 = 0.2;
pub const ATS_APP_TITLE: &str = "ATSScoreChecker";

/// Cover letter prompt template.
/// Replace: {tone}, {word_limit}, {plain_text_rule}, {no_preamble_rule}.
/// Resume and job description are appended after the template, never substituted.
const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"You are a professional cover letter writer.

Your ONLY task is to write a clean, well-structured cover letter using the resume and job description below. The cover letter MUST follow these rules:

Rules:
- Use a {tone} tone.
- The letter MUST be exactly {word_limit} words long. Treat {word_limit} as a target to hit, not a maximum.
- {no_preamble_rule}
- {plain_text_rule}
- Write the greeting (e.g. "Dear Hiring Manager,") exactly once. Do NOT repeat it.
- ONLY return the cover letter itself as plain text.
- Close the letter with the candidate's name, phone number and email address, but ONLY those that appear in the resume. Never invent contact details.

Infer the company name and job title from the job description. If a company name is found, use it. Otherwise, say "your organization". If a job title is found, mention it once in a natural way.

---

"#;

/// ATS scoring prompt template. The resume is appended after it.
const ATS_SCORE_PROMPT_TEMPLATE: &str = r#"You are a world-class Applicant Tracking System (ATS) used by top companies.

Your task is to evaluate the following resume and return an ATS compatibility score based on the following criteria:

- Overall structure and readability
- Keyword relevance for common job roles (backend, frontend, fullstack, data, devops, etc.)
- Presence of key sections (contact info, skills, experience, education)
- Format and clarity
- Use of action words and measurable results

Return ONLY a numeric score from 0 to 100. No text, no explanation, no formatting. The score should reflect how well this resume would perform in modern ATS systems.

"#;

/// Builds the cover letter instruction. Caller-supplied values are embedded verbatim,
/// with the resume and job description last so their contents are never re-templated.
pub fn build_cover_letter_prompt(
    tone: &str,
    word_limit: u32,
    resume_text: &str,
    job_description: &str,
) -> String {
    let head = COVER_LETTER_PROMPT_TEMPLATE
        .replace("{tone}", tone)
        .replace("{word_limit}", &word_limit.to_string())
        .replace("{plain_text_rule}", PLAIN_TEXT_RULE)
        .replace("{no_preamble_rule}", NO_PREAMBLE_RULE);

    format!("{head}Resume:\n{resume_text}\n\nJob Description:\n{job_description}")
}

/// Builds the ATS scoring instruction with the resume appended verbatim.
pub fn build_ats_prompt(resume_text: &str) -> String {
    format!("{ATS_SCORE_PROMPT_TEMPLATE}Resume:\n{resume_text}")
}
