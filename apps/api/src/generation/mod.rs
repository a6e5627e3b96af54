// Cover letter generation and ATS scoring.
// All LLM calls go through llm_client — no direct HTTP calls here.

pub mod ats_scoring;
pub mod generator;
pub mod handlers;
pub mod jd_parser;
pub mod normalizer;
pub mod prompts;
pub mod retry;
