// Shared prompt fragments.
// Each pipeline that needs LLM calls defines its own prompts alongside it;
// this file contains the formatting rules every pipeline repeats.

/// Forbids markdown so the normalizer has as little as possible to strip.
pub const PLAIN_TEXT_RULE: &str =
    "Do NOT include markdown, bullet points, bold or italic markers, or formatting tags.";

/// Forbids the chatty lead-in models like to emit before the real answer.
pub const NO_PREAMBLE_RULE: &str = "Do NOT write any introduction or comments like \
    \"Here is your cover letter.\" No preambles, no notes, no explanations.";
