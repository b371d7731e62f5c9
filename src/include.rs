//! `#include` extraction from a token stream.
//!
//! The stream is consumed front to back. Statements are assumed to occupy
//! exactly one logical line, and a directive is only honored when it is the
//! first meaningful token of its line; anything else on a line is discarded
//! up to the newline. A directive appearing mid-line is therefore swallowed
//! with the rest of its line, never parsed; standard C forbids that shape
//! anyway, and this tool stays permissive about it.

use std::fmt;
use thiserror::Error;

use crate::lexer::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeForm {
    /// `#include "path"`
    Quoted,
    /// `#include <path>`
    Angle,
}

#[derive(Debug, Clone)]
pub struct IncludeSpec {
    /// Literal spec text as it appears in the source; escapes are never
    /// interpreted.
    pub path: String,
    pub form: IncludeForm,
    pub line: u32,
}

impl fmt::Display for IncludeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.form {
            IncludeForm::Quoted => write!(f, "\"{}\"", self.path),
            IncludeForm::Angle => write!(f, "<{}>", self.path),
        }
    }
}

/// Everything harvested from one file's token stream.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Ordered as encountered; duplicates preserved.
    pub includes: Vec<IncludeSpec>,
    /// `#include SOME_MACRO` occurrences as (name, line). Macro expansion is
    /// out of scope, so these are skipped; the caller decides how to warn.
    pub macro_includes: Vec<(String, u32)>,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("expected token following #include directive on line {line}, found nothing")]
    TruncatedDirective { line: u32 },
    #[error("expected newline after #include directive on line {line}")]
    ExpectedNewline { line: u32 },
    #[error("unexpected end of file in #include directive on line {line}")]
    UnexpectedEof { line: u32 },
    #[error("unexpected newline in #include directive on line {line}")]
    UnexpectedNewline { line: u32 },
    #[error("unsupported token sequence after #include directive on line {line}: {found}")]
    UnsupportedShape { line: u32, found: String },
    #[error("internal error: token stream ended before the `>` of the include on line {line}")]
    ResyncEof { line: u32 },
    #[error("internal error: newline token inside the include on line {line}")]
    ResyncNewline { line: u32 },
}

/// Walk `tokens` (as produced by the lexer from `content`) and collect every
/// include directive. `content` is the normalized text the tokens were lexed
/// from; angle-bracket paths are re-extracted from it because the token
/// stream mangles paths like `<sys/stat.h>` into punctuation soup.
pub fn extract_includes(tokens: &[Token], content: &str) -> Result<Extraction, ParseError> {
    let mut out = Extraction::default();
    let mut i = 0usize;
    while i < tokens.len() {
        let tok = &tokens[i];
        i += 1;
        if tok.kind == TokenKind::Directive && tok.text == "#include" {
            i = parse_include(tokens, i, tok.line, content, &mut out)?;
        } else if tok.kind != TokenKind::Newline {
            // consume the rest of the statement line, newline included
            while i < tokens.len() {
                let t = &tokens[i];
                i += 1;
                if t.kind == TokenKind::Newline {
                    break;
                }
            }
        }
    }
    Ok(out)
}

/// Parse the argument of one `#include` starting at token index `i`; returns
/// the index just past the directive's trailing newline.
fn parse_include(
    tokens: &[Token],
    mut i: usize,
    line: u32,
    content: &str,
    out: &mut Extraction,
) -> Result<usize, ParseError> {
    let Some(arg) = tokens.get(i) else {
        return Err(ParseError::TruncatedDirective { line });
    };
    match arg.kind {
        TokenKind::String => {
            let path = arg.text.clone();
            i += 1;
            i = expect_newline(tokens, i, line)?;
            out.includes.push(IncludeSpec {
                path,
                form: IncludeForm::Quoted,
                line,
            });
            Ok(i)
        }
        TokenKind::Punctuation if arg.text == "<" => {
            // tokens between the brackets can be anything, so the path comes
            // from the raw text just past the `<`
            let start = arg.pos + 1;
            i += 1;
            let bytes = content.as_bytes();
            let mut end = start;
            loop {
                if end >= bytes.len() {
                    return Err(ParseError::UnexpectedEof { line });
                }
                match bytes[end] {
                    b'>' => break,
                    b'\n' => return Err(ParseError::UnexpectedNewline { line }),
                    _ => end += 1,
                }
            }
            let path = content[start..end].to_string();
            // resync the token stream to the closing `>`; hitting a newline
            // here means the raw scan and the stream disagree
            loop {
                let Some(t) = tokens.get(i) else {
                    return Err(ParseError::ResyncEof { line });
                };
                i += 1;
                if t.kind == TokenKind::Punctuation && t.text == ">" {
                    break;
                }
                if t.kind == TokenKind::Newline {
                    return Err(ParseError::ResyncNewline { line });
                }
            }
            i = expect_newline(tokens, i, line)?;
            out.includes.push(IncludeSpec {
                path,
                form: IncludeForm::Angle,
                line,
            });
            Ok(i)
        }
        TokenKind::Identifier => {
            // macro-indirected include; skipped, reported to the caller
            out.macro_includes.push((arg.text.clone(), line));
            i += 1;
            while i < tokens.len() {
                let t = &tokens[i];
                i += 1;
                if t.kind == TokenKind::Newline {
                    break;
                }
            }
            Ok(i)
        }
        _ => Err(ParseError::UnsupportedShape {
            line,
            found: format!("{:?} `{}`", arg.kind, arg.text),
        }),
    }
}

fn expect_newline(tokens: &[Token], i: usize, line: u32) -> Result<usize, ParseError> {
    match tokens.get(i) {
        Some(t) if t.kind == TokenKind::Newline => Ok(i + 1),
        _ => Err(ParseError::ExpectedNewline { line }),
    }
}
