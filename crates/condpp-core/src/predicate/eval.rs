use std::cmp::Ordering;

use super::ast::{BinaryOp, Expr, UnaryOp, Value};
use super::errors::PredicateError;

impl Expr {
    /// Evaluate the expression. Identifiers still present at this point were
    /// not provided by the environment and are reported as unknown.
    pub fn eval(&self) -> Result<Value, PredicateError> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Identifier(name) => Err(PredicateError::unknown_identifier(name)),
            Expr::Unary { op: UnaryOp::Not, operand } => Ok(Value::Bool(!operand.eval()?.is_truthy())),
            Expr::Binary { op: BinaryOp::And, left, right } => {
                let left = left.eval()?;
                if left.is_truthy() {
                    right.eval()
                } else {
                    Ok(left)
                }
            }
            Expr::Binary { op: BinaryOp::Or, left, right } => {
                let left = left.eval()?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    right.eval()
                }
            }
            Expr::Binary { op, left, right } => {
                let left = left.eval()?;
                let right = right.eval()?;
                compare(*op, &left, &right).map(Value::Bool)
            }
        }
    }
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<bool, PredicateError> {
    let result = match op {
        BinaryOp::Equal => loose_equals(left, right),
        BinaryOp::NotEqual => !loose_equals(left, right),
        BinaryOp::StrictEqual => left == right,
        BinaryOp::StrictNotEqual => left != right,
        BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
            // NaN compares false under every relational operator
            let Some(ordering) = order(op, left, right)? else {
                return Ok(false);
            };
            match op {
                BinaryOp::Less => ordering == Ordering::Less,
                BinaryOp::LessEqual => ordering != Ordering::Greater,
                BinaryOp::Greater => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }
        }
        BinaryOp::And => left.is_truthy() && right.is_truthy(),
        BinaryOp::Or => left.is_truthy() || right.is_truthy(),
    };
    Ok(result)
}

fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Str(s), Value::Number(n)) | (Value::Number(n), Value::Str(s)) => {
            numeric(s).is_some_and(|parsed| parsed == *n)
        }
        _ => left == right,
    }
}

fn order(op: BinaryOp, left: &Value, right: &Value) -> Result<Option<Ordering>, PredicateError> {
    let mismatch = || PredicateError::type_mismatch(op.symbol(), left.type_name(), right.type_name());
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(a.partial_cmp(b)),
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::Str(s), Value::Number(n)) => Ok(numeric(s).ok_or_else(mismatch)?.partial_cmp(n)),
        (Value::Number(n), Value::Str(s)) => Ok(n.partial_cmp(&numeric(s).ok_or_else(mismatch)?)),
        _ => Err(mismatch()),
    }
}

fn numeric(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::super::parser::parse_predicate;
    use super::*;

    fn eval(src: &str) -> Result<Value, PredicateError> {
        parse_predicate(src)?.eval()
    }

    #[test]
    fn test_string_equality() {
        assert_eq!(eval(r#""release" == "release""#).unwrap(), Value::Bool(true));
        assert_eq!(eval(r#""release" != "debug""#).unwrap(), Value::Bool(true));
        assert_eq!(eval(r#""a" == 'b'"#).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_logical_operators_yield_deciding_operand() {
        assert_eq!(eval(r#""" || "fallback""#).unwrap(), Value::Str("fallback".to_string()));
        assert_eq!(eval(r#""x" && 0"#).unwrap(), Value::Number(0.0));
        assert_eq!(eval("!0").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_short_circuit_skips_unknown_identifiers() {
        assert_eq!(eval("false && MISSING").unwrap(), Value::Bool(false));
        assert_eq!(eval("true || MISSING").unwrap(), Value::Bool(true));
        assert_eq!(
            eval("true && MISSING"),
            Err(PredicateError::unknown_identifier("MISSING"))
        );
    }

    #[test]
    fn test_loose_and_strict_equality() {
        assert_eq!(eval(r#""20" == 20"#).unwrap(), Value::Bool(true));
        assert_eq!(eval(r#""20" === 20"#).unwrap(), Value::Bool(false));
        assert_eq!(eval(r#""abc" == 0"#).unwrap(), Value::Bool(false));
        assert_eq!(eval(r#""true" == true"#).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_relational_operators() {
        assert_eq!(eval("2 > 1").unwrap(), Value::Bool(true));
        assert_eq!(eval(r#""20" >= 18"#).unwrap(), Value::Bool(true));
        assert_eq!(eval(r#""abc" < "abd""#).unwrap(), Value::Bool(true));
        assert_eq!(eval("1 <= 1").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_relational_type_mismatch() {
        assert_eq!(
            eval("true < 1"),
            Err(PredicateError::type_mismatch("<", "boolean", "number"))
        );
        assert!(matches!(
            eval(r#""abc" > 1"#),
            Err(PredicateError::TypeMismatch { .. })
        ));
    }
}
