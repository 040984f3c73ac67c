//! MarkdownV2 escaping.
//!
//! See <https://core.telegram.org/bots/api#markdownv2-style>.

/// Escape every MarkdownV2 reserved character with a backslash.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for ch in text.chars() {
        if is_reserved(ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Escape the destination part of an inline link: `(`, `)` and `\`.
pub fn escape_link_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len() + 4);
    for ch in url.chars() {
        if matches!(ch, '\\' | '(' | ')') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn is_reserved(ch: char) -> bool {
    matches!(
        ch,
        '\\' | '*'
            | '_'
            | '['
            | ']'
            | '('
            | ')'
            | '~'
            | '`'
            | '>'
            | '#'
            | '+'
            | '-'
            | '='
            | '|'
            | '{'
            | '}'
            | '.'
            | '!'
    )
}
