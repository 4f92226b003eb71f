//! Helpers for putting caller-supplied identifiers (game ids, category keys)
//! into log lines. Games pass these strings straight through, so they are
//! escaped and capped before they reach the log.

use std::fmt::Write;

/// Longest identifier echoed into a log line before it is cut with an ellipsis.
const MAX_IDENT_PREVIEW: usize = 64;

/// Escape a string for single-line logging: backslash, `\n`, `\r` and `\t` are
/// spelled out, other control characters become `\xNN`, and anything past
/// [`MAX_IDENT_PREVIEW`] characters is replaced by `…`.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_IDENT_PREVIEW) + 4);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_IDENT_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Render an optional category key for logs.
pub fn category_label(category: Option<&str>) -> String {
    match category {
        Some(c) => escape_log(c),
        None => "-".to_string(),
    }
}
