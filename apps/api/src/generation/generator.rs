//! Cover Letter Generation — orchestrates the full generation pipeline.
//!
//! Flow: validate → build prompt → LLM call (bounded retry) → normalize →
//!       ensure salutation → return letter.
//!
//! All state lives inside a single `generate` call. Nothing is cached between
//! attempts or between requests.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::generation::jd_parser::{extract_metadata, ExtractedMetadata};
use crate::generation::normalizer::{is_salutation, normalize};
use crate::generation::prompts::{
    build_cover_letter_prompt, COVER_LETTER_APP_TITLE, COVER_LETTER_MODEL,
    COVER_LETTER_TEMPERATURE,
};
use crate::generation::retry::{RetryError, RetryPolicy};
use crate::llm_client::{ChatRequest, CompletionTransport, LlmError, CALL_TIMEOUT};
use crate::models::cover_letter::{CoverLetter, GenerationRequest};

const GENERIC_SALUTATION: &str = "Dear Hiring Manager,";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid request: {0}")]
    Invalid(String),

    #[error(transparent)]
    Upstream(#[from] RetryError),
}

/// Generates tailored cover letters through a completion endpoint.
#[derive(Clone)]
pub struct CoverLetterGenerator {
    transport: Arc<dyn CompletionTransport>,
    policy: RetryPolicy,
    call_timeout: Duration,
}

impl CoverLetterGenerator {
    pub fn new(transport: Arc<dyn CompletionTransport>) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
            call_timeout: CALL_TIMEOUT,
        }
    }

    /// Runs the whole pipeline for one request.
    ///
    /// Every attempt sends the identical prompt. An attempt fails on transport errors,
    /// timeouts, malformed responses, or a completion that cleans down to nothing.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<CoverLetter, GenerationError> {
        request
            .validate()
            .map_err(|msg| GenerationError::Invalid(msg.to_string()))?;

        let metadata = extract_metadata(&request.job_description);
        debug!(
            "JD metadata: company={:?} title={:?}",
            metadata.company_name, metadata.job_title
        );

        let prompt = build_cover_letter_prompt(
            &request.tone,
            request.word_limit,
            &request.resume_text,
            &request.job_description,
        );
        let chat = ChatRequest::user(
            COVER_LETTER_MODEL,
            COVER_LETTER_TEMPERATURE,
            COVER_LETTER_APP_TITLE,
            prompt,
        );

        debug!("Cover letter prompt built: {} chars", chat.prompt().len());

        let chat = &chat;
        let cleaned = self.policy.run(move |_| self.attempt(chat)).await?;

        let body = ensure_salutation(cleaned, &metadata);
        info!(
            "Cover letter generated: {} words (target {})",
            body.split_whitespace().count(),
            request.word_limit
        );

        Ok(CoverLetter { body })
    }

    /// One remote call, bounded by the call timeout, followed by normalization.
    async fn attempt(&self, chat: &ChatRequest) -> Result<String, LlmError> {
        let completion = tokio::time::timeout(self.call_timeout, self.transport.complete(chat))
            .await
            .map_err(|_| LlmError::Timeout)??;

        let cleaned = normalize(&completion.raw_text);
        if cleaned.is_empty() {
            return Err(LlmError::MissingContent);
        }
        Ok(cleaned)
    }
}

/// Salutation used when the model's letter does not open with one.
pub fn fallback_salutation(metadata: &ExtractedMetadata) -> String {
    match &metadata.company_name {
        Some(company) => format!("Dear Hiring Manager at {company},"),
        None => GENERIC_SALUTATION.to_string(),
    }
}

/// Prepends a synthesized salutation unless the letter already starts with "dear".
pub fn ensure_salutation(letter: String, metadata: &ExtractedMetadata) -> String {
    if is_salutation(&letter) {
        letter
    } else {
        format!("{}\n\n{letter}", fallback_salutation(metadata))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
