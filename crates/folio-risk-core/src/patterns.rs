//! Shared text patterns.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Markdown code fence wrapping a whole response, with an optional
    /// language tag (```` ```json ````). Captures the body.
    pub static ref CODE_FENCE_PATTERN: Regex = Regex::new(
        r"(?s)\A\s*```[A-Za-z0-9_+-]*[ \t]*\r?\n?(?P<body>.*?)\r?\n?[ \t]*```\s*\z"
    ).unwrap();
}

/// Strip a markdown code fence wrapping the whole text, if present.
///
/// Returns the trimmed text unchanged when there is no enclosing fence.
/// A fence preceded or followed by prose is deliberately not extracted: such
/// a response is not a bare JSON object and the caller treats it as
/// unparseable.
pub fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE_PATTERN.captures(text) {
        Some(caps) => caps.name("body").map_or("", |m| m.as_str()).trim(),
        None => text.trim(),
    }
}
