use std::sync::LazyLock;

use pest::error::LineColLocation;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::Parser;
use pest_derive::Parser;

use super::ast::{BinaryOp, Expr, UnaryOp, Value};
use super::errors::PredicateError;

#[derive(Parser)]
#[grammar = "predicate/predicate.pest"]
pub struct PredicateParser;

/// Loosest binding first
static PRATT: LazyLock<PrattParser<Rule>> = LazyLock::new(|| {
    PrattParser::new()
        .op(Op::infix(Rule::or, Assoc::Left))
        .op(Op::infix(Rule::and, Assoc::Left))
        .op(Op::infix(Rule::eq, Assoc::Left)
            | Op::infix(Rule::ne, Assoc::Left)
            | Op::infix(Rule::strict_eq, Assoc::Left)
            | Op::infix(Rule::strict_ne, Assoc::Left))
        .op(Op::infix(Rule::lt, Assoc::Left)
            | Op::infix(Rule::le, Assoc::Left)
            | Op::infix(Rule::gt, Assoc::Left)
            | Op::infix(Rule::ge, Assoc::Left))
        .op(Op::prefix(Rule::not))
});

/// Parse predicate text into an expression tree
pub fn parse_predicate(input: &str) -> Result<Expr, PredicateError> {
    let mut pairs = PredicateParser::parse(Rule::predicate, input).map_err(|e| {
        let column = match e.line_col {
            LineColLocation::Pos((_, col)) | LineColLocation::Span((_, col), _) => col,
        };
        PredicateError::syntax(format!("{} at column {column}", e.variant.message()))
    })?;

    let expr = pairs
        .next()
        .and_then(|predicate| predicate.into_inner().next())
        .ok_or_else(|| PredicateError::syntax("empty predicate"))?;

    build_expr(expr.into_inner())
}

fn build_expr(pairs: Pairs<'_, Rule>) -> Result<Expr, PredicateError> {
    PRATT
        .map_primary(build_primary)
        .map_prefix(|op, operand| match op.as_rule() {
            Rule::not => Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand?),
            }),
            rule => Err(unexpected(rule)),
        })
        .map_infix(|left, op, right| {
            Ok(Expr::Binary {
                op: binary_op(op.as_rule())?,
                left: Box::new(left?),
                right: Box::new(right?),
            })
        })
        .parse(pairs)
}

fn build_primary(pair: Pair<'_, Rule>) -> Result<Expr, PredicateError> {
    match pair.as_rule() {
        Rule::boolean => Ok(Expr::Literal(Value::Bool(pair.as_str() == "true"))),
        Rule::number => pair
            .as_str()
            .parse::<f64>()
            .map(|n| Expr::Literal(Value::Number(n)))
            .map_err(|e| PredicateError::syntax(format!("invalid number '{}': {e}", pair.as_str()))),
        Rule::string => {
            let inner = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            Ok(Expr::Literal(Value::Str(unescape(inner))))
        }
        Rule::identifier => Ok(Expr::Identifier(pair.as_str().to_string())),
        Rule::expr => build_expr(pair.into_inner()),
        rule => Err(unexpected(rule)),
    }
}

fn binary_op(rule: Rule) -> Result<BinaryOp, PredicateError> {
    let op = match rule {
        Rule::or => BinaryOp::Or,
        Rule::and => BinaryOp::And,
        Rule::eq => BinaryOp::Equal,
        Rule::ne => BinaryOp::NotEqual,
        Rule::strict_eq => BinaryOp::StrictEqual,
        Rule::strict_ne => BinaryOp::StrictNotEqual,
        Rule::lt => BinaryOp::Less,
        Rule::le => BinaryOp::LessEqual,
        Rule::gt => BinaryOp::Greater,
        Rule::ge => BinaryOp::GreaterEqual,
        rule => return Err(unexpected(rule)),
    };
    Ok(op)
}

fn unexpected(rule: Rule) -> PredicateError {
    PredicateError::syntax(format!("unexpected {rule:?}"))
}

/// Resolve backslash escapes inside a string literal body
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_str(s: &str) -> Box<Expr> {
        Box::new(Expr::Literal(Value::Str(s.to_string())))
    }

    #[test]
    fn test_parse_boolean_literals() {
        assert_eq!(parse_predicate("true").unwrap(), Expr::Literal(Value::Bool(true)));
        assert_eq!(parse_predicate(" false ").unwrap(), Expr::Literal(Value::Bool(false)));
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        assert_eq!(
            parse_predicate("trueish").unwrap(),
            Expr::Identifier("trueish".to_string())
        );
    }

    #[test]
    fn test_parse_string_escapes() {
        assert_eq!(
            parse_predicate(r#""a\"b\\c""#).unwrap(),
            Expr::Literal(Value::Str("a\"b\\c".to_string()))
        );
        assert_eq!(
            parse_predicate("'it\\'s'").unwrap(),
            Expr::Literal(Value::Str("it's".to_string()))
        );
        assert_eq!(parse_predicate(r#""""#).unwrap(), Expr::Literal(Value::Str(String::new())));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse_predicate("a || b && c").unwrap();
        match expr {
            Expr::Binary { op: BinaryOp::Or, right, .. } => {
                assert!(matches!(*right, Expr::Binary { op: BinaryOp::And, .. }));
            }
            other => panic!("Expected Or at the root, got {other:?}"),
        }
    }

    #[test]
    fn test_equality_binds_tighter_than_and() {
        let expr = parse_predicate(r#""x" == "x" && "y" != "z""#).unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(Expr::Binary {
                    op: BinaryOp::Equal,
                    left: lit_str("x"),
                    right: lit_str("x"),
                }),
                right: Box::new(Expr::Binary {
                    op: BinaryOp::NotEqual,
                    left: lit_str("y"),
                    right: lit_str("z"),
                }),
            }
        );
    }

    #[test]
    fn test_not_and_parentheses() {
        let expr = parse_predicate("!(true || false)").unwrap();
        match expr {
            Expr::Unary { op: UnaryOp::Not, operand } => {
                assert!(matches!(*operand, Expr::Binary { op: BinaryOp::Or, .. }));
            }
            other => panic!("Expected Not, got {other:?}"),
        }
    }

    #[test]
    fn test_strict_and_relational_operators() {
        assert!(matches!(
            parse_predicate("1 === 1").unwrap(),
            Expr::Binary { op: BinaryOp::StrictEqual, .. }
        ));
        assert!(matches!(
            parse_predicate("1 !== 2").unwrap(),
            Expr::Binary { op: BinaryOp::StrictNotEqual, .. }
        ));
        assert!(matches!(
            parse_predicate("2 >= 1.5").unwrap(),
            Expr::Binary { op: BinaryOp::GreaterEqual, .. }
        ));
    }

    #[test]
    fn test_syntax_errors() {
        for bad in ["", "==", "true &&", "(true", "a = b", "\"open"] {
            assert!(
                matches!(parse_predicate(bad), Err(PredicateError::Syntax { .. })),
                "expected syntax error for {bad:?}"
            );
        }
    }
}
