//! Phase 3: tokenization of normalized source text.
//!
//! This is deliberately minimal C/C++ lexing, just enough structure to find
//! `#include` directives. Rules are tried in a fixed priority order at each
//! offset and the first match wins; every byte of input must be claimed by
//! some rule or the whole run aborts.

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Comment,
    BlockComment,
    RawString,
    Identifier,
    Number,
    String,
    Char,
    Directive,
    Punctuation,
    Newline,
    Whitespace,
}

impl TokenKind {
    /// Kinds that never reach downstream consumers. They still advance the
    /// line counter and claim their span of input.
    fn is_ignored(self) -> bool {
        matches!(
            self,
            TokenKind::Comment | TokenKind::BlockComment | TokenKind::Whitespace
        )
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// Semantic value: string literals are stripped of their quotes, the
    /// `%:` digraph is normalized to `#`, newlines carry no text.
    pub text: String,
    /// 1-based line in the original (un-spliced) file.
    pub line: u32,
    /// Byte offset of the token start in the normalized text. Angle-bracket
    /// include paths are re-extracted from the raw text at this offset.
    pub pos: usize,
}

#[derive(Debug, Error)]
pub enum LexError {
    #[error("no lexical rule matches input at line {line}, offset {offset}: `{excerpt}`")]
    NoMatch {
        line: u32,
        offset: usize,
        excerpt: String,
    },
    #[error("unterminated raw string literal at line {line}, offset {offset}")]
    UnterminatedRawString { line: u32, offset: usize },
}

enum Matcher {
    Pattern(Regex),
    /// `R"delim( ... )delim"`. The closing delimiter must repeat the opening
    /// one, which is a backreference and therefore hand-scanned.
    RawString,
}

struct Rule {
    kind: TokenKind,
    matcher: Matcher,
}

/// Immutable rule table, compiled once and passed to every file scan.
pub struct Lexer {
    rules: Vec<Rule>,
}

/// A matched span before value extraction. `scan` keeps ignored kinds so the
/// concatenated spans always reconstruct the input exactly.
struct RawMatch {
    kind: TokenKind,
    start: usize,
    end: usize,
    line: u32,
}

impl Lexer {
    pub fn new() -> Self {
        let pattern = |kind, pat: &str| Rule {
            kind,
            matcher: Matcher::Pattern(
                Regex::new(&format!(r"\A(?:{pat})")).expect("valid lexer rule pattern"),
            ),
        };
        // Priority order matters: first rule matching at the offset wins.
        let rules = vec![
            pattern(TokenKind::Comment, r"//[^\n]*"),
            pattern(TokenKind::BlockComment, r"(?s)/\*.*?\*/"),
            Rule {
                kind: TokenKind::RawString,
                matcher: Matcher::RawString,
            },
            pattern(TokenKind::Identifier, r"[a-zA-Z_$][a-zA-Z0-9_$]*"),
            pattern(TokenKind::Number, r"[0-9](?:[eEpP][+\-]|[0-9a-zA-Z_.'])*"),
            pattern(TokenKind::String, r#""(?:\\.|[^"\\])*""#),
            pattern(TokenKind::Char, r"'(?:\\.|[^'\\])'"),
            pattern(TokenKind::Directive, r"(?:#|%:)[a-z]+"),
            pattern(TokenKind::Punctuation, r"[,.<>?/=;:~!#%^&*\-+|(){}\[\]]"),
            pattern(TokenKind::Newline, r"\n"),
            pattern(TokenKind::Whitespace, r"[^\S\n]+"),
        ];
        Self { rules }
    }

    /// Tokenize normalized text, dropping comments and whitespace.
    pub fn tokenize(&self, text: &str) -> Result<Vec<Token>, LexError> {
        let matches = self.scan(text)?;
        let mut tokens = Vec::with_capacity(matches.len());
        for m in matches {
            if m.kind.is_ignored() {
                continue;
            }
            let raw = &text[m.start..m.end];
            let value = match m.kind {
                // capture the content, not the quotes
                TokenKind::String => raw[1..raw.len() - 1].to_string(),
                // the only digraph this tool understands
                TokenKind::Directive => {
                    if let Some(rest) = raw.strip_prefix("%:") {
                        format!("#{rest}")
                    } else {
                        raw.to_string()
                    }
                }
                TokenKind::Newline => String::new(),
                _ => raw.to_string(),
            };
            tokens.push(Token {
                kind: m.kind,
                text: value,
                line: m.line,
                pos: m.start,
            });
        }
        Ok(tokens)
    }

    /// Scan every span of the input, ignored kinds included.
    fn scan(&self, text: &str) -> Result<Vec<RawMatch>, LexError> {
        let mut matches = Vec::new();
        let mut i = 0usize;
        let mut line = 1u32;
        while i < text.len() {
            let rest = &text[i..];
            let Some((kind, len)) = self.match_at(rest, line, i)? else {
                return Err(LexError::NoMatch {
                    line,
                    offset: i,
                    excerpt: excerpt_around(text, i),
                });
            };
            let end = i + len;
            matches.push(RawMatch {
                kind,
                start: i,
                end,
                line,
            });
            match kind {
                TokenKind::Newline => line += 1,
                // multi-line spans emit no newline tokens, so count their
                // embedded newlines here to keep later lines aligned
                TokenKind::BlockComment | TokenKind::RawString => {
                    line += text[i..end].matches('\n').count() as u32;
                }
                _ => {}
            }
            i = end;
        }
        Ok(matches)
    }

    /// Try each rule in priority order at the start of `rest`; return the
    /// first match as (kind, byte length).
    fn match_at(
        &self,
        rest: &str,
        line: u32,
        offset: usize,
    ) -> Result<Option<(TokenKind, usize)>, LexError> {
        for rule in &self.rules {
            match &rule.matcher {
                Matcher::Pattern(re) => {
                    if let Some(m) = re.find(rest) {
                        return Ok(Some((rule.kind, m.end())));
                    }
                }
                Matcher::RawString => {
                    if let Some(len) = scan_raw_string(rest, line, offset)? {
                        return Ok(Some((rule.kind, len)));
                    }
                }
            }
        }
        Ok(None)
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static::lazy_static! {
    /// Opening of a raw string literal: `R"delim(` with a delimiter of up to
    /// 16 characters, none of which may be a parenthesis, backslash or space.
    static ref RAW_STRING_OPEN: Regex =
        Regex::new(r#"\AR"([^()\\\s]{0,16})\("#).expect("valid raw string open pattern");
}

/// Match a raw string literal at the start of `rest`. Returns `Ok(None)` when
/// `rest` does not open one, and an error when one opens but its delimiter
/// never reappears.
fn scan_raw_string(rest: &str, line: u32, offset: usize) -> Result<Option<usize>, LexError> {
    let Some(caps) = RAW_STRING_OPEN.captures(rest) else {
        return Ok(None);
    };
    let open = caps.get(0).map(|m| m.end()).unwrap_or(0);
    let delim = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let closer = format!("){delim}\"");
    match rest[open..].find(&closer) {
        Some(at) => Ok(Some(open + at + closer.len())),
        None => Err(LexError::UnterminatedRawString { line, offset }),
    }
}

/// A short window of text around a failure offset, for diagnostics.
fn excerpt_around(text: &str, offset: usize) -> String {
    let mut start = offset.saturating_sub(5);
    let mut end = (offset + 20).min(text.len());
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    text[start..end].replace('\n', "\\n")
}
