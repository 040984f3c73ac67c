//! Token measurement and split-point search for chunked output.
//!
//! All lengths are byte lengths and every returned index is a char boundary.

/// Byte length of the leading whitespace run.
pub fn leading_whitespace_len(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

/// Byte length of the first whitespace-delimited word, ignoring leading
/// whitespace.
pub fn first_word_len(text: &str) -> usize {
    let rest = text.trim_start();
    rest.find(char::is_whitespace).unwrap_or(rest.len())
}

/// If `text` starts with an escaped inline link `[...](...)`, its byte length.
///
/// Backslash escapes are skipped so `\]` and `\)` never terminate the link.
pub fn link_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'[') {
        return None;
    }

    let mut i = 1;
    let mut found_mid = false;
    while i + 1 < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b']' if bytes[i + 1] == b'(' => {
                found_mid = true;
                i += 2;
                break;
            }
            _ => i += 1,
        }
    }
    if !found_mid {
        return None;
    }

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b')' => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// If `text` starts with a bare `http://` / `https://` URL, its byte length.
pub fn url_len(text: &str) -> Option<usize> {
    if text.starts_with("http://") || text.starts_with("https://") {
        Some(first_word_len(text))
    } else {
        None
    }
}

/// Length of the leading token (whitespace plus first word, link or URL) and
/// whether it must not be split.
pub fn leading_token(text: &str) -> (usize, bool) {
    let ws = leading_whitespace_len(text);
    let rest = &text[ws..];
    if let Some(len) = link_len(rest).or_else(|| url_len(rest)) {
        return (ws + len, true);
    }
    (ws + first_word_len(rest), false)
}

/// Where to cut `text` so the first part fits in `limit` bytes.
///
/// Returns `(cut, skip)`: emit `text[..cut]`, continue from `text[cut + skip..]`.
/// The cut lands on the last whitespace at or before `limit` that lies past
/// the leading `token`. That whitespace char is consumed. Without such a
/// whitespace the cut falls right after the token, which must fit.
pub fn split_point(text: &str, limit: usize, token: usize) -> (usize, usize) {
    if text.len() <= limit {
        return (text.len(), 0);
    }
    let mut last_ws = None;
    for (idx, ch) in text.char_indices() {
        if idx > limit {
            break;
        }
        if idx > 0 && idx >= token && ch.is_whitespace() {
            last_ws = Some((idx, ch.len_utf8()));
        }
    }
    last_ws.unwrap_or((token, 0))
}

/// Largest char boundary at or below `idx`, but at least one whole char.
pub fn hard_cut(text: &str, idx: usize) -> usize {
    let mut cut = idx.min(text.len());
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    if cut == 0 {
        cut = text.chars().next().map_or(0, char::len_utf8);
    }
    cut
}
