//! ATS Scoring — asks the completion endpoint for a 0–100 compatibility score.
//!
//! Single attempt, no retry. A timeout is reported separately from every other
//! failure so callers can decide to try again themselves.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use thiserror::Error;
use tracing::info;

use crate::generation::prompts::{build_ats_prompt, ATS_APP_TITLE, ATS_MODEL, ATS_TEMPERATURE};
use crate::llm_client::{ChatRequest, CompletionTransport, LlmError, CALL_TIMEOUT};
use crate::models::cover_letter::{AtsScore, ScoringRequest};

/// First standalone 1–3 digit number in the response.
static SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{1,3})\b").expect("score pattern is valid"));

#[derive(Debug, Error)]
pub enum AtsError {
    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("LLM API timed out while scoring the resume")]
    Timeout,

    #[error("No numeric score found in response: {0}")]
    NoNumericScore(String),

    #[error("{0}")]
    Upstream(LlmError),
}

impl From<LlmError> for AtsError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout => AtsError::Timeout,
            other => AtsError::Upstream(other),
        }
    }
}

/// Scores resumes for ATS compatibility.
#[derive(Clone)]
pub struct AtsScorer {
    transport: Arc<dyn CompletionTransport>,
    call_timeout: Duration,
}

impl AtsScorer {
    pub fn new(transport: Arc<dyn CompletionTransport>) -> Self {
        Self {
            transport,
            call_timeout: CALL_TIMEOUT,
        }
    }

    pub async fn score(&self, request: &ScoringRequest) -> Result<AtsScore, AtsError> {
        if request.resume_text.trim().is_empty() {
            return Err(AtsError::Invalid("resume text cannot be empty".to_string()));
        }

        let chat = ChatRequest::user(
            ATS_MODEL,
            ATS_TEMPERATURE,
            ATS_APP_TITLE,
            build_ats_prompt(&request.resume_text),
        );

        let completion = tokio::time::timeout(self.call_timeout, self.transport.complete(&chat))
            .await
            .map_err(|_| AtsError::Timeout)??;

        let score = parse_score(&completion.raw_text)?;
        info!("ATS score computed: {}", score.value());
        Ok(score)
    }
}

/// Extracts the first 1–3 digit number from free text and clamps it to 0..=100.
pub fn parse_score(text: &str) -> Result<AtsScore, AtsError> {
    let text = text.trim();
    SCORE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .map(AtsScore::clamped)
        .ok_or_else(|| AtsError::NoNumericScore(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::{ScriptedTransport, Step};

    fn scoring_request() -> ScoringRequest {
        ScoringRequest {
            resume_text: "Jane Roe\nSkills: Rust, Go\nExperience: 5 years".to_string(),
        }
    }

    #[test]
    fn test_parse_score_bare_number() {
        assert_eq!(parse_score("  78\n").unwrap().value(), 78);
    }

    #[test]
    fn test_parse_score_first_number_in_prose() {
        assert_eq!(parse_score("Score: 85/100").unwrap().value(), 85);
    }

    #[test]
    fn test_parse_score_clamps_high_values() {
        assert_eq!(parse_score("I'd give it 150").unwrap().value(), 100);
    }

    #[test]
    fn test_parse_score_skips_longer_numbers() {
        assert_eq!(parse_score("In 2024 this rates 64").unwrap().value(), 64);
    }

    #[test]
    fn test_parse_score_always_in_range() {
        for raw in ["0", "7", "42", "100", "101", "999", "score 555 of 100"] {
            let score = parse_score(raw).unwrap().value();
            assert!(score <= 100, "{raw} produced {score}");
        }
    }

    #[test]
    fn test_parse_score_without_number_keeps_text() {
        let err = parse_score("  An excellent resume!  ").unwrap_err();
        assert!(matches!(&err, AtsError::NoNumericScore(text) if text == "An excellent resume!"));
        assert!(err.to_string().contains("An excellent resume!"));
    }

    #[tokio::test]
    async fn test_score_single_call_with_scoring_model() {
        let transport = Arc::new(ScriptedTransport::replying("91"));
        let scorer = AtsScorer::new(transport.clone());

        let score = scorer.score(&scoring_request()).await.unwrap();

        assert_eq!(score.value(), 91);
        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, ATS_MODEL);
        assert_eq!(requests[0].app_title, "ATSScoreChecker");
        assert!((requests[0].temperature - 0.2).abs() < f32::EPSILON);
        assert!(requests[0].prompt().ends_with("Experience: 5 years"));
    }

    #[tokio::test]
    async fn test_score_does_not_retry_failures() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Step::Malformed,
            Step::Reply("80".to_string()),
        ]));
        let err = AtsScorer::new(transport.clone())
            .score(&scoring_request())
            .await
            .unwrap_err();
        assert!(matches!(err, AtsError::Upstream(LlmError::Parse(_))));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_timeout_is_distinct() {
        let transport = Arc::new(ScriptedTransport::new(vec![Step::Timeout]));
        let err = AtsScorer::new(transport).score(&scoring_request()).await.unwrap_err();
        assert!(matches!(err, AtsError::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_endpoint_times_out_after_thirty_seconds() {
        let transport = Arc::new(ScriptedTransport::new(vec![Step::Hang]));
        let start = tokio::time::Instant::now();
        let err = AtsScorer::new(transport).score(&scoring_request()).await.unwrap_err();
        assert!(matches!(err, AtsError::Timeout));
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_other_upstream_failure_is_generic() {
        let transport = Arc::new(ScriptedTransport::new(vec![Step::Fail("quota".to_string())]));
        let err = AtsScorer::new(transport).score(&scoring_request()).await.unwrap_err();
        assert!(matches!(err, AtsError::Upstream(LlmError::Api { status: 500, .. })));
        assert!(err.to_string().contains("quota"));
    }

    #[tokio::test]
    async fn test_empty_resume_is_rejected_without_call() {
        let transport = Arc::new(ScriptedTransport::replying("50"));
        let err = AtsScorer::new(transport.clone())
            .score(&ScoringRequest {
                resume_text: " ".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AtsError::Invalid(_)));
        assert_eq!(transport.calls(), 0);
    }
}
