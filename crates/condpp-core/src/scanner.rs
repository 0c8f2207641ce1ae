//! Directive scanning.
//!
//! Directives are whole lines of the form `<ws>*//#<tag>[<ws>+<predicate>]`.
//! Anything else, including `//#ifdef` or `//#endifx`, is ordinary text.

use std::sync::LazyLock;

use regex::{CaptureMatches, Regex};
use thiserror::Error;

use crate::directive::{Directive, DirectiveTag};

static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[\t ]*//#(if|elif|else|endif)(?:[\t ]+(.*?))?[\t ]*\r?$")
        .expect("directive pattern is valid")
});

/// Malformed directive lines
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Missing predicate for {tag} at offset {offset}")]
    MissingPredicate { tag: DirectiveTag, offset: usize },

    #[error("Unexpected predicate '{text}' for {tag} at offset {offset}")]
    UnexpectedPredicate {
        tag: DirectiveTag,
        offset: usize,
        text: String,
    },
}

/// Finds directive lines in source order
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectiveScanner;

impl DirectiveScanner {
    pub fn new() -> Self {
        Self
    }

    /// Lazily yield directives in source order, validating each as it is reached
    pub fn directives<'t>(&self, text: &'t str) -> Directives<'t> {
        Directives {
            captures: DIRECTIVE_RE.captures_iter(text),
        }
    }

    /// Collect every directive, failing on the first malformed one
    pub fn scan(&self, text: &str) -> Result<Vec<Directive>, ScanError> {
        self.directives(text).collect()
    }
}

/// Iterator returned by [`DirectiveScanner::directives`]
pub struct Directives<'t> {
    captures: CaptureMatches<'static, 't>,
}

impl Iterator for Directives<'_> {
    type Item = Result<Directive, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        let caps = self.captures.next()?;
        let whole = caps.get(0)?;
        let tag = caps.get(1).and_then(|m| DirectiveTag::from_keyword(m.as_str()))?;
        let predicate = caps
            .get(2)
            .map(|m| m.as_str().trim_end())
            .filter(|p| !p.is_empty());

        let offset = whole.start();
        let checked = match (tag.takes_predicate(), predicate) {
            (true, None) => Err(ScanError::MissingPredicate { tag, offset }),
            (false, Some(text)) => Err(ScanError::UnexpectedPredicate {
                tag,
                offset,
                text: text.to_string(),
            }),
            (_, predicate) => Ok(Directive {
                tag,
                predicate: predicate.map(str::to_string),
                start: offset,
                // a CR before the newline stays with the text that follows
                end: whole.end() - usize::from(whole.as_str().ends_with('\r')),
            }),
        };
        Some(checked)
    }
}
