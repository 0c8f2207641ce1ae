use thiserror::Error;

use crate::directive::DirectiveTag;
use crate::predicate::PredicateError;
use crate::scanner::ScanError;

/// Fatal preprocessing errors. Every variant aborts the whole call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreprocessError {
    #[error("Missing predicate for {tag} at offset {offset}")]
    MissingPredicate { tag: DirectiveTag, offset: usize },

    #[error("Unexpected predicate '{text}' for {tag} at offset {offset}")]
    UnexpectedPredicate {
        tag: DirectiveTag,
        offset: usize,
        text: String,
    },

    #[error("Unexpected {tag} at offset {offset} without a matching //#if")]
    UnexpectedDirective { tag: DirectiveTag, offset: usize },

    #[error("Unexpected end of input: {open_blocks} unclosed block(s), innermost //#if at offset {offset}")]
    UnterminatedBlock { open_blocks: usize, offset: usize },

    #[error("Invalid predicate \"{predicate}\" at offset {offset}: {source}")]
    PredicateEvaluation {
        predicate: String,
        offset: usize,
        #[source]
        source: PredicateError,
    },
}

impl PreprocessError {
    /// Byte offset of the directive that caused the error
    pub fn offset(&self) -> usize {
        match self {
            Self::MissingPredicate { offset, .. }
            | Self::UnexpectedPredicate { offset, .. }
            | Self::UnexpectedDirective { offset, .. }
            | Self::UnterminatedBlock { offset, .. }
            | Self::PredicateEvaluation { offset, .. } => *offset,
        }
    }
}

impl From<ScanError> for PreprocessError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::MissingPredicate { tag, offset } => Self::MissingPredicate { tag, offset },
            ScanError::UnexpectedPredicate { tag, offset, text } => {
                Self::UnexpectedPredicate { tag, offset, text }
            }
        }
    }
}

/// 1-based line and column (in characters) of a byte offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    /// Locate `offset` in `text`. Offsets past the end clamp to the end.
    pub fn locate(text: &str, offset: usize) -> Self {
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &text[..offset];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        Self {
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate() {
        let text = "ab\ncdé\nf";
        assert_eq!(SourceLocation::locate(text, 0), SourceLocation { line: 1, column: 1 });
        assert_eq!(SourceLocation::locate(text, 3), SourceLocation { line: 2, column: 1 });
        // 'é' is two bytes; the offset after it is column 4
        assert_eq!(SourceLocation::locate(text, 7), SourceLocation { line: 2, column: 4 });
        assert_eq!(SourceLocation::locate(text, 100), SourceLocation { line: 3, column: 2 });
    }

    #[test]
    fn test_scan_errors_convert() {
        let err: PreprocessError = ScanError::MissingPredicate {
            tag: DirectiveTag::Elif,
            offset: 9,
        }
        .into();
        assert_eq!(err.offset(), 9);
        assert_eq!(err.to_string(), "Missing predicate for //#elif at offset 9");
    }

    #[test]
    fn test_predicate_error_message_uses_original_text() {
        let err = PreprocessError::PredicateEvaluation {
            predicate: "MODE = 1".to_string(),
            offset: 4,
            source: PredicateError::syntax("expected infix"),
        };
        assert_eq!(
            err.to_string(),
            "Invalid predicate \"MODE = 1\" at offset 4: Syntax error: expected infix"
        );
    }
}
