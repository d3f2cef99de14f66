//! Operator semantics
//!
//! `+` is overloaded: when either operand is a string the result is the
//! concatenation of the textual forms of both operands; otherwise numeric
//! addition. Relational operators compare numbers numerically, strings
//! lexicographically, and coerce mixed operands to numbers (NaN makes the
//! comparison false). `==` compares same-type values, number/string pairs
//! numerically, and everything else is unequal.

use crate::compiler::lexer::token_kind::FluxoTokenKind;
use crate::runtime::value::Value;
use std::cmp::Ordering;

/// Apply a non-short-circuit binary operator; errors are plain messages
/// the evaluator wraps with a position
pub fn apply_binary(op: FluxoTokenKind, left: &Value, right: &Value) -> Result<Value, String> {
    match op {
        FluxoTokenKind::Plus => Ok(add(left, right)),
        FluxoTokenKind::Minus => arithmetic(op, left, right, |a, b| a - b),
        FluxoTokenKind::Asterisk => arithmetic(op, left, right, |a, b| a * b),
        FluxoTokenKind::Slash => arithmetic(op, left, right, |a, b| a / b),
        FluxoTokenKind::Percent => arithmetic(op, left, right, |a, b| a % b),
        FluxoTokenKind::DoubleEqual => Ok(Value::Bool(loose_eq(left, right))),
        FluxoTokenKind::ExclamationEqual => Ok(Value::Bool(!loose_eq(left, right))),
        FluxoTokenKind::LessThan => relational(left, right, Ordering::is_lt),
        FluxoTokenKind::GreaterThan => relational(left, right, Ordering::is_gt),
        FluxoTokenKind::LessThanEqual => relational(left, right, Ordering::is_le),
        FluxoTokenKind::GreaterThanEqual => relational(left, right, Ordering::is_ge),
        _ => Err(format!("Unsupported binary operator '{}'", op.symbol())),
    }
}

/// Apply a unary operator
pub fn apply_unary(op: FluxoTokenKind, operand: &Value) -> Result<Value, String> {
    match op {
        FluxoTokenKind::Minus => match operand {
            Value::Number(n) => Ok(Value::Number(-n)),
            other => Err(format!("Cannot negate a {}", other.type_name())),
        },
        FluxoTokenKind::Exclamation => Ok(Value::Bool(!operand.is_truthy())),
        _ => Err(format!("Unsupported unary operator '{}'", op.symbol())),
    }
}

/// The `+` overload
fn add(left: &Value, right: &Value) -> Value {
    if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
        Value::string(format!("{}{}", left, right))
    } else {
        Value::Number(left.coerce_number() + right.coerce_number())
    }
}

fn arithmetic(
    op: FluxoTokenKind,
    left: &Value,
    right: &Value,
    f: impl Fn(f64, f64) -> f64,
) -> Result<Value, String> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(*a, *b))),
        _ => Err(format!(
            "Cannot apply '{}' to {} and {}",
            op.symbol(),
            left.type_name(),
            right.type_name()
        )),
    }
}

fn relational(
    left: &Value,
    right: &Value,
    pick: impl Fn(Ordering) -> bool,
) -> Result<Value, String> {
    Ok(Value::Bool(compare(left, right).map(pick).unwrap_or(false)))
}

/// Ordering of two values; `None` when incomparable (NaN involved)
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.as_ref().cmp(b.as_ref())),
        _ => left.coerce_number().partial_cmp(&right.coerce_number()),
    }
}

/// Loose equality used by `==` / `!=`
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Str(_)) => *a == right.coerce_number(),
        (Value::Str(_), Value::Number(b)) => left.coerce_number() == *b,
        _ => left == right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Value {
        Value::string(text)
    }

    fn n(value: f64) -> Value {
        Value::Number(value)
    }

    fn plus(a: &Value, b: &Value) -> Value {
        apply_binary(FluxoTokenKind::Plus, a, b).unwrap()
    }

    #[test]
    fn test_numeric_addition() {
        assert_eq!(plus(&n(2.0), &n(3.0)), n(5.0));
    }

    #[test]
    fn test_string_concatenation_wins() {
        assert_eq!(plus(&s("I'm "), &s("Taylor")), s("I'm Taylor"));
        assert_eq!(plus(&s("n = "), &n(5.0)), s("n = 5"));
        assert_eq!(plus(&n(5.0), &s(" apples")), s("5 apples"));
        assert_eq!(plus(&s("x: "), &Value::Null), s("x: null"));
    }

    #[test]
    fn test_arithmetic_type_errors() {
        let err = apply_binary(FluxoTokenKind::Minus, &s("a"), &n(1.0)).unwrap_err();
        assert!(err.contains("'-'"));
        assert!(err.contains("string"));
    }

    #[test]
    fn test_relational_numbers_and_strings() {
        assert_eq!(
            apply_binary(FluxoTokenKind::LessThan, &n(1.0), &n(2.0)).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            apply_binary(FluxoTokenKind::LessThan, &s("apple"), &s("banana")).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_relational_mixed_coerces_to_number() {
        assert_eq!(
            apply_binary(FluxoTokenKind::GreaterThan, &s("10"), &n(9.0)).unwrap(),
            Value::Bool(true)
        );
        // Non-numeric string coerces to NaN: every comparison is false
        assert_eq!(
            apply_binary(FluxoTokenKind::LessThan, &s("abc"), &n(9.0)).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            apply_binary(FluxoTokenKind::GreaterThanEqual, &s("abc"), &n(9.0)).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_loose_equality() {
        assert!(loose_eq(&n(5.0), &s("5")));
        assert!(loose_eq(&s("5"), &n(5.0)));
        assert!(!loose_eq(&n(5.0), &s("six")));
        assert!(loose_eq(&Value::Null, &Value::Null));
        assert!(!loose_eq(&Value::Null, &n(0.0)));
    }

    #[test]
    fn test_unary() {
        assert_eq!(apply_unary(FluxoTokenKind::Minus, &n(3.0)).unwrap(), n(-3.0));
        assert_eq!(
            apply_unary(FluxoTokenKind::Exclamation, &Value::Bool(false)).unwrap(),
            Value::Bool(true)
        );
        assert!(apply_unary(FluxoTokenKind::Minus, &s("x")).is_err());
    }

    #[test]
    fn test_division_by_zero_is_infinity() {
        assert_eq!(
            apply_binary(FluxoTokenKind::Slash, &n(1.0), &n(0.0)).unwrap(),
            n(f64::INFINITY)
        );
    }
}
