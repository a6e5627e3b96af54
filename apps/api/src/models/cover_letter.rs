use serde::Serialize;

pub const DEFAULT_TONE: &str = "professional";
pub const DEFAULT_WORD_LIMIT: u32 = 300;

/// Everything the generation pipeline needs for one letter.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub resume_text: String,
    pub job_description: String,
    pub tone: String,
    pub word_limit: u32,
}

impl GenerationRequest {
    /// Rejects requests that can never produce a useful letter.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.resume_text.trim().is_empty() {
            return Err("resume text cannot be empty");
        }
        if self.job_description.trim().is_empty() {
            return Err("job_description cannot be empty");
        }
        if self.word_limit == 0 {
            return Err("word_limit must be greater than zero");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringRequest {
    pub resume_text: String,
}

/// Final, cleaned letter. Always opens with a salutation line.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverLetter {
    pub body: String,
}

/// ATS compatibility score, always within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AtsScore(u8);

impl AtsScore {
    pub const MAX: u8 = 100;

    /// Clamps any parsed number into the valid range.
    pub fn clamped(raw: u32) -> Self {
        Self(raw.min(Self::MAX as u32) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub cover_letter: String,
}

#[derive(Debug, Serialize)]
pub struct AtsScoreResponse {
    pub ats_score: AtsScore,
}
