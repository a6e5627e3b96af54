//! JD Parser — pulls a company name and job title out of a free-text job description.
//!
//! Pure regex heuristics, no LLM call. `None` is an expected answer on unstructured
//! input and is never an error.

use std::sync::LazyLock;

use regex::Regex;

/// "at Acme Corp" / "@ Acme Corp". `at` must be a whole word so "great Team" does not match.
static COMPANY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\bat|@)\s+([A-Z][A-Za-z0-9&.\- ]+)").expect("company pattern is valid")
});

/// "position of X" / "role as X" / "job X". Keyword is case-insensitive, the phrase
/// itself must start with a capital letter.
static JOB_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?i:position|role|job)\s+(?:(?i:of|as)\s+)?([A-Z][A-Za-z0-9_ ]{2,})")
        .expect("job title pattern is valid")
});

/// Best-effort signals extracted from a job description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedMetadata {
    pub company_name: Option<String>,
    pub job_title: Option<String>,
}

/// Runs both extractions independently.
pub fn extract_metadata(job_description: &str) -> ExtractedMetadata {
    ExtractedMetadata {
        company_name: extract_company_name(job_description),
        job_title: extract_job_title(job_description),
    }
}

pub fn extract_company_name(job_description: &str) -> Option<String> {
    first_capture(&COMPANY, job_description)
}

pub fn extract_job_title(job_description: &str) -> Option<String> {
    first_capture(&JOB_TITLE, job_description)
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
