//! Whitespace normalisation applied before rendering.
//!
//! Markdown pasted from chat clients and word processors often carries
//! Windows line endings, zero-width characters and long runs of blank lines.
//! These survive parsing and end up as stray characters or empty lines in
//! the Telegram message. The rules here are deterministic and content
//! preserving.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so the per-line rules see `\n` only.
//! Invisible characters go before trimming, otherwise a line ending in
//! `" \u{200B}"` keeps its trailing space.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all normalisation rules in order.
///
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, …)
/// 3. Trim trailing whitespace per line
/// 4. Collapse runs of 3+ blank lines down to one
pub fn normalize(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    collapse_blank_lines(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}', '\u{2060}', '\u{00AD}',
        ],
        "",
    )
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").into_owned()
}

// ── Tests ────────────────────────────────────────────────────────────────────
