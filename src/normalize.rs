//! Translation phases 1 and 2: trigraph substitution and line splicing.
//!
//! Both passes run before tokenization. Splicing physically removes
//! backslash-newline pairs but repays the removed newlines at the next real
//! line break, so line numbers reported downstream match the original file.

/// The nine standard trigraphs, `??` + key -> replacement.
fn trigraph(c: char) -> Option<char> {
    match c {
        '=' => Some('#'),
        '/' => Some('\\'),
        '\'' => Some('^'),
        '(' => Some('['),
        ')' => Some(']'),
        '!' => Some('|'),
        '<' => Some('{'),
        '>' => Some('}'),
        '-' => Some('~'),
        _ => None,
    }
}

/// Replace every `??X` trigraph with its single-character translation.
/// Text without trigraphs passes through unchanged.
pub fn translate_trigraphs(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '?' && i + 2 < chars.len() && chars[i + 1] == '?' {
            if let Some(rep) = trigraph(chars[i + 2]) {
                out.push(rep);
                i += 3;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Remove backslash-newline splices, keeping a "line debt" that is repaid at
/// the next real newline: a line ending in `\` is joined with its successor,
/// and the swallowed newline is re-emitted after the joined line so later
/// diagnostics still count lines the way the un-spliced file does.
///
/// A trailing splice with no newline after it simply drops the pair, matching
/// the per-character scan this mirrors.
pub fn splice_lines(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut line_debt = 0usize;
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' && i + 1 < chars.len() && chars[i + 1] == '\n' {
            i += 2;
            line_debt += 1;
        } else if chars[i] == '\n' {
            for _ in 0..=line_debt {
                out.push('\n');
            }
            line_debt = 0;
            i += 1;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// Run both passes in order.
pub fn normalize(source: &str) -> String {
    splice_lines(&translate_trigraphs(source))
}
