use std::sync::Arc;

use crate::config::Config;
use crate::generation::ats_scoring::AtsScorer;
use crate::generation::generator::CoverLetterGenerator;
use crate::llm_client::{CompletionTransport, LlmClient};

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Holds no per-request data. Both pipelines share one transport, which itself
/// opens a fresh HTTP client per call.
#[derive(Clone)]
pub struct AppState {
    pub generator: CoverLetterGenerator,
    pub ats: AtsScorer,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_transport(Arc::new(LlmClient::new(config.llm.clone())))
    }

    /// Builds state around any transport. Tests inject a fake endpoint here.
    pub fn with_transport(transport: Arc<dyn CompletionTransport>) -> Self {
        Self {
            generator: CoverLetterGenerator::new(transport.clone()),
            ats: AtsScorer::new(transport),
        }
    }
}
