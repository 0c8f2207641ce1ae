//! Predicate evaluation for `//#if` and `//#elif` directives.
//!
//! A predicate is evaluated in two steps. First every identifier that names an
//! environment variable is replaced by a quoted string literal holding its
//! value, so a value can never be read as operators or code. The resulting
//! text is then parsed by a small `pest` grammar and evaluated over
//! [`Expr`] nodes. Identifiers left over after substitution are errors.

mod ast;
mod errors;
mod eval;
mod parser;

pub use ast::{BinaryOp, Expr, UnaryOp, Value};
pub use errors::PredicateError;
pub use parser::parse_predicate;

use crate::environment::Environment;

/// Evaluates predicates against one environment
#[derive(Debug, Clone, Copy)]
pub struct PredicateEvaluator<'env> {
    env: &'env Environment,
}

impl<'env> PredicateEvaluator<'env> {
    pub fn new(env: &'env Environment) -> Self {
        Self { env }
    }

    /// Substitute, parse and evaluate `predicate`, coercing the result to a boolean
    pub fn evaluate(&self, predicate: &str) -> Result<bool, PredicateError> {
        let substituted = substitute(predicate.trim(), self.env);
        let expr = parse_predicate(&substituted)?;
        Ok(expr.eval()?.is_truthy())
    }
}

/// Evaluate `predicate` against `env`
pub fn evaluate(predicate: &str, env: &Environment) -> Result<bool, PredicateError> {
    PredicateEvaluator::new(env).evaluate(predicate)
}

/// Replace identifiers found in `env` with quoted, escaped string literals.
///
/// Word runs that start with a digit and text inside quoted literals are
/// copied untouched.
pub fn substitute(predicate: &str, env: &Environment) -> String {
    let mut out = String::with_capacity(predicate.len());
    let mut chars = predicate.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c == '"' || c == '\'' {
            out.push(c);
            let mut escaped = false;
            for (_, inner) in chars.by_ref() {
                out.push(inner);
                if escaped {
                    escaped = false;
                } else if inner == '\\' {
                    escaped = true;
                } else if inner == c {
                    break;
                }
            }
        } else if is_word_char(c) {
            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if !is_word_char(next) {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }

            let word = &predicate[start..end];
            match env.get(word) {
                Some(value) if !c.is_ascii_digit() => push_string_literal(&mut out, value),
                _ => out.push_str(word),
            }
        } else {
            out.push(c);
        }
    }

    out
}

fn is_word_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

fn push_string_literal(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment {
        Environment::from_pairs([("MODE", "release"), ("FFMPEG", "static"), ("N", "3")])
    }

    #[test]
    fn test_environment_substitution() {
        assert!(evaluate(r#"MODE == "release""#, &env()).unwrap());
        assert!(!evaluate(r#"MODE == "debug""#, &env()).unwrap());
        assert!(evaluate(r#"MODE == "release" && FFMPEG != "none""#, &env()).unwrap());
    }

    #[test]
    fn test_unknown_identifier_is_an_error() {
        assert_eq!(
            evaluate(r#"TARGET == "linux""#, &env()),
            Err(PredicateError::unknown_identifier("TARGET"))
        );
    }

    #[test]
    fn test_substituted_values_are_inert() {
        let env = Environment::from_pairs([("EVIL", r#"" || true || ""#), ("PATHISH", "C:\\tmp\n")]);
        assert!(!evaluate(r#"EVIL == "x""#, &env).unwrap());
        assert!(evaluate("PATHISH == \"C:\\\\tmp\\n\"", &env).unwrap());
    }

    #[test]
    fn test_substitute_skips_string_literals_and_numbers() {
        assert_eq!(
            substitute(r#"MODE == "MODE" || 1N == N"#, &env()),
            r#""release" == "MODE" || 1N == "3""#
        );
        assert_eq!(substitute(r#"'it\'s MODE'"#, &env()), r#"'it\'s MODE'"#);
    }

    #[test]
    fn test_numeric_comparison_against_environment() {
        assert!(evaluate("N >= 2", &env()).unwrap());
        assert!(evaluate("N == 3", &env()).unwrap());
        assert!(!evaluate("N > 3", &env()).unwrap());
    }

    #[test]
    fn test_result_is_coerced_to_boolean() {
        assert!(evaluate("MODE", &env()).unwrap());
        assert!(!evaluate(r#""""#, &env()).unwrap());
        assert!(!evaluate("0", &env()).unwrap());
    }

    #[test]
    fn test_literal_keywords_pass_through() {
        let empty = Environment::new();
        assert!(evaluate("true", &empty).unwrap());
        assert!(!evaluate("  false  ", &empty).unwrap());
        assert!(evaluate("!false && (true || false)", &empty).unwrap());
    }
}
