//! Text Normalizer — turns a raw completion into a clean, plain-text letter body.
//!
//! Two stages, both idempotent:
//! 1. `clean_output`: strip emphasis markers, drop "here is the cover letter" lines,
//!    keep only the first salutation line.
//! 2. `clean_cover_letter`: strip leading preamble lines, drop blank lines,
//!    drop exact duplicate lines (first occurrence wins).

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));

static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("italic pattern is valid"));

/// Leading boilerplate a model emits before the letter. Matches one whole line and never
/// crosses a line break.
static PREAMBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        ^(?:
            here [^\S\n]+ (?:is|are) \b [^\n]*? \b cover [^\S\n]+ letter \b
          | below [^\S\n]+ (?:is|are) \b [^\n]*? \b cover [^\S\n]+ letter \b
          | based [^\S\n]+ on [^\S\n]+ the [^\S\n]+ (?:provided [^\S\n]+)?
            (?:resume|job [^\S\n]+ description) \b
        )
        [^\n]* (?:\n|$)",
    )
    .expect("preamble pattern is valid")
});

const PREAMBLE_LINE_MARKER: &str = "here is the cover letter";

/// Runs both cleanup stages in order.
pub fn normalize(raw: &str) -> String {
    clean_cover_letter(&clean_output(raw))
}

/// Returns true when a line opens with "dear" (case-insensitive, ignoring indentation).
pub fn is_salutation(line: &str) -> bool {
    line.trim_start()
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("dear"))
}

/// Stage 1: emphasis stripping, preamble-line removal, salutation collapse.
pub fn clean_output(text: &str) -> String {
    let text = BOLD.replace_all(text, "$1");
    let text = ITALIC.replace_all(&text, "$1");

    let mut seen_salutation = false;
    let mut kept = Vec::new();

    for line in text.trim().split('\n') {
        if line.to_lowercase().contains(PREAMBLE_LINE_MARKER) {
            continue;
        }
        if is_salutation(line) {
            if seen_salutation {
                continue;
            }
            seen_salutation = true;
        }
        kept.push(line);
    }

    kept.join("\n").trim().to_string()
}

/// Stage 2: preamble paragraphs, blank lines and exact duplicates.
pub fn clean_cover_letter(text: &str) -> String {
    let body = strip_leading_preamble(text);

    let mut seen = HashSet::new();
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Removes preamble lines from the start of the text until the first line is real content.
fn strip_leading_preamble(mut text: &str) -> &str {
    loop {
        text = text.trim_start();
        match PREAMBLE.find(text) {
            Some(m) if m.end() > 0 => text = &text[m.end()..],
            _ => return text,
        }
    }
}
