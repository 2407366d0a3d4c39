use crate::analyze::lang::LanguageParser;
use crate::types::{Extraction, SymbolName};
use once_cell::sync::Lazy;
use regex::Regex;

/// Statement layout of a Fortran source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceForm {
    /// Punched-card layout: labels in 1-5, continuation mark in 6, code in 7-72.
    Fixed,
    /// Fortran 90 layout with `&` continuations.
    Free,
}

pub struct FortranParser {
    form: SourceForm,
}

/// Text past this column is ignored in fixed form.
const FIXED_FORM_LAST_COLUMN: usize = 72;

/// Modules supplied by the compiler itself.
const INTRINSIC_MODULES: &[&str] = &[
    "iso_c_binding",
    "iso_fortran_env",
    "ieee_arithmetic",
    "ieee_exceptions",
    "ieee_features",
];

// module name  (but not "module procedure foo")
static MODULE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*module\s+([a-z_][a-z0-9_]*)\s*$").unwrap());

static PROGRAM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*program\s+([a-z_][a-z0-9_]*)\s*$").unwrap());

// submodule (ancestor[:parent]) name
static SUBMODULE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*submodule\s*\(\s*([a-z_][a-z0-9_]*)\s*(?::\s*([a-z_][a-z0-9_]*)\s*)?\)\s*([a-z_][a-z0-9_]*)\s*$")
        .unwrap()
});

// use [, intrinsic | , non_intrinsic] [::] name [, list]
static USE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*use\b\s*(?:,\s*(intrinsic|non_intrinsic)\s*)?(?:::)?\s*([a-z_][a-z0-9_]*)\s*(,.*)?$")
        .unwrap()
});

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

impl FortranParser {
    pub const fn new(form: SourceForm) -> Self {
        Self { form }
    }
}

impl LanguageParser for FortranParser {
    fn extract(&self, content: &str) -> Extraction {
        let statements = match self.form {
            SourceForm::Fixed => fixed_form_statements(content),
            SourceForm::Free => free_form_statements(content),
        };

        let mut extraction = Extraction::default();
        for statement in &statements {
            scan_statement(statement, &mut extraction);
        }
        extraction
    }
}

fn scan_statement(statement: &str, extraction: &mut Extraction) {
    if let Some(cap) = MODULE_PATTERN.captures(statement) {
        extraction.define(SymbolName::new(&cap[1]));
        return;
    }

    if let Some(cap) = PROGRAM_PATTERN.captures(statement) {
        extraction.define(SymbolName::new(&cap[1]));
        return;
    }

    if let Some(cap) = SUBMODULE_PATTERN.captures(statement) {
        let ancestor = &cap[1];
        extraction.require(SymbolName::new(ancestor));
        if let Some(parent) = cap.get(2) {
            extraction.require(submodule_symbol(ancestor, parent.as_str()));
        }
        extraction.define(submodule_symbol(ancestor, &cap[3]));
        return;
    }

    if let Some(cap) = USE_PATTERN.captures(statement) {
        let nature = cap.get(1).map(|m| m.as_str().to_ascii_lowercase());
        if nature.as_deref() == Some("intrinsic") {
            return;
        }

        let name = SymbolName::new(&cap[2]);
        let explicit_non_intrinsic = nature.is_some();
        if explicit_non_intrinsic || !INTRINSIC_MODULES.contains(&name.as_str()) {
            extraction.require(name);
        }

        let rest = cap.get(3).map(|m| m.as_str()).unwrap_or("");
        for extra in comma_listed_modules(rest) {
            extraction.require(SymbolName::new(extra));
        }
    }
}

/// Submodules live in their ancestor's namespace: `ancestor:name`.
fn submodule_symbol(ancestor: &str, name: &str) -> SymbolName {
    SymbolName::new(&format!("{}:{}", ancestor, name))
}

/// Bare identifiers after the module name in a `use` statement.
///
/// `use a, b, c` is accepted as three requirements. Renames (`x => y`) are
/// skipped and an `only:` list ends the scan.
fn comma_listed_modules(rest: &str) -> Vec<&str> {
    let mut names = Vec::new();

    for item in rest.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let lower = item.to_ascii_lowercase();
        if let Some(after) = lower.strip_prefix("only") {
            if after.trim_start().starts_with(':') {
                break;
            }
        }
        if item.contains("=>") {
            continue;
        }
        if IDENTIFIER.is_match(item) {
            names.push(item);
        }
    }

    names
}

/// Removes comment text and the contents of character literals from one line.
///
/// Quote characters are kept so statement shapes survive; doubled quotes are
/// escapes. `quote` carries an unterminated literal into the next line.
fn scrub(line: &str, quote: &mut Option<char>) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match *quote {
            Some(q) => {
                if ch == q {
                    if chars.peek() == Some(&q) {
                        chars.next();
                    } else {
                        *quote = None;
                        out.push(ch);
                    }
                }
            }
            None => match ch {
                '!' => break,
                '\'' | '"' => {
                    *quote = Some(ch);
                    out.push(ch);
                }
                _ => out.push(ch),
            },
        }
    }

    out
}

fn split_statements(buffer: &mut String, statements: &mut Vec<String>) {
    for piece in buffer.split(';') {
        let piece = piece.trim();
        if !piece.is_empty() {
            statements.push(piece.to_string());
        }
    }
    buffer.clear();
}

fn free_form_statements(content: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote = None;
    let mut continuing = false;

    for line in content.lines() {
        let mut body = line;
        if continuing {
            if let Some(rest) = body.trim_start().strip_prefix('&') {
                body = rest;
            }
        } else if body.trim_start().starts_with('#') {
            continue;
        }

        let scrubbed = scrub(body, &mut quote);
        if quote.is_some() {
            if body.trim_end().ends_with('&') {
                current.push_str(&scrubbed);
                continuing = true;
                continue;
            }
            // without `&` an open literal ends with its line
            log::warn!("unterminated character literal: {}", line.trim());
            quote = None;
        }

        let code = scrubbed.trim_end();
        if let Some(head) = code.strip_suffix('&') {
            current.push_str(head);
            continuing = true;
            continue;
        }

        // comment lines may sit between continued lines
        if continuing && code.trim().is_empty() {
            continue;
        }

        current.push_str(code);
        continuing = false;
        split_statements(&mut current, &mut statements);
    }

    split_statements(&mut current, &mut statements);
    statements
}

fn fixed_form_statements(content: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote = None;

    for line in content.lines() {
        if is_fixed_form_comment(line) {
            continue;
        }

        let (continuation, body) = split_fixed_columns(line);
        if !continuation {
            if body.trim().is_empty() {
                continue;
            }
            split_statements(&mut current, &mut statements);
            quote = None;
        }

        current.push_str(&scrub(&body, &mut quote));
    }

    split_statements(&mut current, &mut statements);
    statements
}

fn is_fixed_form_comment(line: &str) -> bool {
    match line.chars().next() {
        None => true,
        Some('c' | 'C' | '*' | '!' | 'd' | 'D' | '#') => true,
        Some(_) => {
            // '!' anywhere but the continuation column starts a comment line
            match line.char_indices().find(|(_, c)| *c != ' ') {
                Some((idx, '!')) => idx != 5,
                Some(_) => false,
                None => true,
            }
        }
    }
}

/// Splits a fixed-form line into (is continuation, statement field).
fn split_fixed_columns(line: &str) -> (bool, String) {
    // DEC tab format: label, TAB, then code (a leading digit marks a continuation)
    let tab = line
        .char_indices()
        .take(6)
        .find(|(_, c)| *c == '\t')
        .map(|(i, _)| i);

    if let Some(i) = tab {
        let rest = &line[i + 1..];
        let width = FIXED_FORM_LAST_COLUMN - 6;
        return match rest.chars().next() {
            Some('1'..='9') => (true, rest.chars().skip(1).take(width - 1).collect()),
            _ => (false, rest.chars().take(width).collect()),
        };
    }

    let columns: Vec<char> = line.chars().take(FIXED_FORM_LAST_COLUMN).collect();
    let marker = columns.get(5).copied().unwrap_or(' ');
    let continuation = marker != ' ' && marker != '0';
    let body = columns.iter().skip(6).collect();
    (continuation, body)
}
