//! Axum route handlers for the cover letter and ATS scoring API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::documents::extract_text_from_resume;
use crate::errors::AppError;
use crate::models::cover_letter::{
    AtsScoreResponse, CoverLetterResponse, GenerationRequest, ScoringRequest, DEFAULT_TONE,
    DEFAULT_WORD_LIMIT,
};
use crate::routes::MAX_UPLOAD_BYTES;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Multipart form
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct UploadForm {
    resume: Option<(String, Bytes)>,
    job_description: Option<String>,
    tone: Option<String>,
    word_limit: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "resume" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await.map_err(invalid_multipart)?;
                    form.resume = Some((filename, bytes));
                }
                "job_description" => {
                    form.job_description = Some(field.text().await.map_err(invalid_multipart)?)
                }
                "tone" => form.tone = Some(field.text().await.map_err(invalid_multipart)?),
                "word_limit" => {
                    form.word_limit = Some(field.text().await.map_err(invalid_multipart)?)
                }
                _ => {}
            }
        }

        Ok(form)
    }

    fn word_limit(&self) -> Result<u32, AppError> {
        match self.word_limit.as_deref().map(str::trim) {
            None | Some("") => Ok(DEFAULT_WORD_LIMIT),
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or_else(|| {
                    AppError::Validation(format!("word_limit must be a positive integer, got '{raw}'"))
                }),
        }
    }

    fn tone(&self) -> String {
        self.tone
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TONE)
            .to_string()
    }

    /// Extracts resume text off the async executor. Unsupported or empty documents are input errors.
    async fn resume_text(&mut self) -> Result<String, AppError> {
        let (filename, bytes) = self
            .resume
            .take()
            .ok_or_else(|| AppError::Validation("resume file is required".to_string()))?;

        let text = tokio::task::spawn_blocking(move || extract_text_from_resume(&filename, &bytes))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in resume extraction: {e}")))??;

        Ok(text)
    }
}

fn invalid_multipart(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge(format!(
            "upload exceeds the {} MB limit",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        ));
    }
    AppError::Validation(format!("invalid multipart body: {}", e.body_text()))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/generate
///
/// Multipart: `resume` (PDF/DOCX), `job_description`, optional `tone` and `word_limit`.
/// Returns the cleaned cover letter.
pub async fn handle_generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let mut form = UploadForm::read(multipart).await?;

    let job_description = form
        .job_description
        .take()
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("job_description cannot be empty".to_string()))?;
    let word_limit = form.word_limit()?;
    let tone = form.tone();
    let resume_text = form.resume_text().await?;

    info!("Generating cover letter: tone={tone}, word_limit={word_limit}");

    let request = GenerationRequest {
        resume_text,
        job_description,
        tone,
        word_limit,
    };
    let letter = state.generator.generate(&request).await?;

    Ok(Json(CoverLetterResponse {
        cover_letter: letter.body,
    }))
}

/// POST /api/v1/ats-score
///
/// Multipart: `resume` (PDF/DOCX). Returns a single 0–100 score.
pub async fn handle_ats_score(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AtsScoreResponse>, AppError> {
    let mut form = UploadForm::read(multipart).await?;
    let resume_text = form.resume_text().await?;

    let ats_score = state.ats.score(&ScoringRequest { resume_text }).await?;

    Ok(Json(AtsScoreResponse { ats_score }))
}
