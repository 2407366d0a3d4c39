use crate::analyze::lang::LanguageParser;
use crate::types::{Extraction, SymbolName};
use once_cell::sync::Lazy;
use regex::Regex;

/// Include-directive extraction for C, C++ and their headers.
pub struct CParser;

static INCLUDE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*#[ \t]*include[ \t]*(?:"([^"\n]+)"|<([^>\n]+)>)"#).unwrap()
});

impl LanguageParser for CParser {
    fn extract(&self, content: &str) -> Extraction {
        let code = strip_comments_and_literals(content);
        let mut extraction = Extraction::default();

        for cap in INCLUDE_PATTERN.captures_iter(&code) {
            let target = cap.get(1).or_else(|| cap.get(2)).map(|m| m.as_str());
            if let Some(name) = target.and_then(include_basename) {
                extraction.require(SymbolName::new(name));
            }
        }

        extraction
    }
}

/// `"../inc/grid.h"` and `<grid.h>` both name `grid.h`.
pub(crate) fn include_basename(target: &str) -> Option<&str> {
    target
        .trim()
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Literal(char),
}

/// Blanks comments and literal contents while keeping line structure.
///
/// Literals inside preprocessor directives are kept so `#include "x.h"`
/// survives; everywhere else their contents are dropped.
fn strip_comments_and_literals(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut state = State::Code;
    let mut at_line_start = true;
    let mut in_directive = false;
    let mut chars = content.chars().peekable();
    // last raw character, whether or not it reached `out`
    let mut prev = '\0';

    while let Some(ch) = chars.next() {
        let before = std::mem::replace(&mut prev, ch);
        if ch == '\n' {
            out.push('\n');
            // backslash-newline keeps a directive, comment or literal going
            let spliced = before == '\\';
            if !spliced {
                in_directive = false;
                at_line_start = true;
            }
            if matches!(state, State::LineComment | State::Literal(_)) && !spliced {
                state = State::Code;
            }
            continue;
        }

        match state {
            State::Code => match ch {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push(' ');
                    state = State::BlockComment;
                }
                '"' | '\'' => {
                    out.push(ch);
                    state = State::Literal(ch);
                    at_line_start = false;
                }
                _ => {
                    if at_line_start && !ch.is_whitespace() {
                        in_directive = ch == '#';
                        at_line_start = false;
                    }
                    out.push(ch);
                }
            },
            State::LineComment => {}
            State::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                }
            }
            State::Literal(quote) => {
                if ch == '\\' {
                    prev = ' ';
                    if let Some(escaped) = chars.next() {
                        if in_directive {
                            out.push(ch);
                            out.push(escaped);
                        }
                        if escaped == '\n' {
                            out.push('\n');
                        }
                    }
                } else if ch == quote {
                    out.push(ch);
                    state = State::Code;
                } else if in_directive {
                    out.push(ch);
                }
            }
        }
    }

    out
}
