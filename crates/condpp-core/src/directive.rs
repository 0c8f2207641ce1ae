use std::fmt;

/// The four conditional directive keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveTag {
    If,
    Elif,
    Else,
    Endif,
}

impl DirectiveTag {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "if" => Some(Self::If),
            "elif" => Some(Self::Elif),
            "else" => Some(Self::Else),
            "endif" => Some(Self::Endif),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Elif => "elif",
            Self::Else => "else",
            Self::Endif => "endif",
        }
    }

    /// `if` and `elif` require a predicate, `else` and `endif` forbid one
    pub fn takes_predicate(self) -> bool {
        matches!(self, Self::If | Self::Elif)
    }
}

impl fmt::Display for DirectiveTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "//#{}", self.keyword())
    }
}

/// One directive line found in the source.
///
/// `start..end` covers the whole line from its leading whitespace up to, but
/// not including, the line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub tag: DirectiveTag,
    pub predicate: Option<String>,
    pub start: usize,
    pub end: usize,
}

impl Directive {
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}
