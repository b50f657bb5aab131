//! Structural markdown detection.
//!
//! Pasted text is scored line by line for markdown structure; prose with
//! the occasional asterisk stays below the threshold, real markdown
//! clears it comfortably. The threshold is tunable by the caller.

use std::sync::LazyLock;

use regex::Regex;

/// Default score a paste must reach to be treated as markdown.
pub const DEFAULT_DETECT_THRESHOLD: f32 = 0.25;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#{1,6}\s+\S").unwrap());
static LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}(?:[-*+]|\d{1,3}[.)])\s+\S").unwrap());
static QUOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s{0,3}>\s?").unwrap());
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s{0,3}(?:```|~~~)").unwrap());
static INLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[^\]]+\]\([^)]+\)|\*\*[^*]+\*\*|__[^_]+__|`[^`]+`|!\[[^\]]*\]\(").unwrap()
});

/// Average structural score per non-empty line.
pub fn markdown_score(text: &str) -> f32 {
    let mut lines = 0u32;
    let mut score = 0f32;
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        lines += 1;
        if HEADING_RE.is_match(line) || FENCE_RE.is_match(line) {
            score += 2.0;
        } else if LIST_RE.is_match(line) || QUOTE_RE.is_match(line) {
            score += 1.0;
        }
        // Inline structure counts fractionally, capped per line so one
        // link-heavy line cannot carry a whole paste.
        let inline = INLINE_RE.find_iter(line).count() as f32;
        score += (inline * 0.5).min(1.0);
    }
    if lines == 0 {
        return 0.0;
    }
    score / lines as f32
}

pub fn looks_like_markdown(text: &str) -> bool {
    markdown_score(text) >= DEFAULT_DETECT_THRESHOLD
}
