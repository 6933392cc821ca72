//! Binary and unary operator evaluation.
//!
//! Operators pattern-match on the operand kind pair; there is no
//! implicit coercion except the documented `+` string rule. Division by
//! zero follows IEEE-754 (`inf`/`NaN`) and never aborts.

use nexus_ir::{BinaryOp, Span, StringInterner, UnaryOp};

use crate::error::{EvalResult, RuntimeError};
use crate::Value;

/// Evaluate a strict binary operator over already-evaluated operands.
pub fn eval_binary(
    op: BinaryOp,
    lhs: &Value,
    rhs: &Value,
    span: Span,
    interner: &StringInterner,
) -> EvalResult {
    match op {
        BinaryOp::Add => eval_add(lhs, rhs, span, interner),
        BinaryOp::Sub => arithmetic(op, lhs, rhs, span, |a, b| a - b),
        BinaryOp::Mul => arithmetic(op, lhs, rhs, span, |a, b| a * b),
        // IEEE semantics: x/0 is inf, 0/0 is NaN.
        BinaryOp::Div => arithmetic(op, lhs, rhs, span, |a, b| a / b),
        BinaryOp::Eq => Ok(Value::Bool(lhs.eq_value(rhs))),
        BinaryOp::NotEq => Ok(Value::Bool(!lhs.eq_value(rhs))),
        BinaryOp::Lt => relational(op, lhs, rhs, span, |o| o == std::cmp::Ordering::Less),
        BinaryOp::LtEq => relational(op, lhs, rhs, span, |o| o != std::cmp::Ordering::Greater),
        BinaryOp::Gt => relational(op, lhs, rhs, span, |o| o == std::cmp::Ordering::Greater),
        BinaryOp::GtEq => relational(op, lhs, rhs, span, |o| o != std::cmp::Ordering::Less),
    }
}

/// Evaluate a unary operator.
pub fn eval_unary(op: UnaryOp, operand: &Value, span: Span) -> EvalResult {
    match op {
        UnaryOp::Neg => match operand {
            Value::Number(n) => Ok(Value::Number(-n)),
            other => Err(RuntimeError::type_error(
                format!("operator '-' requires a number, got {}", other.kind_name()),
                span,
            )),
        },
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
    }
}

/// `+`: numeric addition, or concatenation when either operand is a
/// string (the other side goes through the string-conversion rule).
fn eval_add(lhs: &Value, rhs: &Value, span: Span, interner: &StringInterner) -> EvalResult {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::Str(_), _) | (_, Value::Str(_)) => {
            let mut out = lhs.stringify(interner);
            out.push_str(&rhs.stringify(interner));
            Ok(Value::string(out))
        }
        _ => Err(binary_type_error(BinaryOp::Add, lhs, rhs, span)),
    }
}

fn arithmetic(
    op: BinaryOp,
    lhs: &Value,
    rhs: &Value,
    span: Span,
    apply: fn(f64, f64) -> f64,
) -> EvalResult {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(apply(*a, *b))),
        _ => Err(binary_type_error(op, lhs, rhs, span)),
    }
}

/// Relational operators: number pairs numerically, string pairs
/// lexicographically. NaN comparisons are false in every direction.
fn relational(
    op: BinaryOp,
    lhs: &Value,
    rhs: &Value,
    span: Span,
    accept: fn(std::cmp::Ordering) -> bool,
) -> EvalResult {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => {
            Ok(Value::Bool(a.partial_cmp(b).is_some_and(accept)))
        }
        (Value::Str(a), Value::Str(b)) => Ok(Value::Bool(accept(a.as_str().cmp(b.as_str())))),
        _ => Err(binary_type_error(op, lhs, rhs, span)),
    }
}

fn binary_type_error(op: BinaryOp, lhs: &Value, rhs: &Value, span: Span) -> RuntimeError {
    RuntimeError::type_error(
        format!(
            "operator '{}' cannot be applied to {} and {}",
            op.as_symbol(),
            lhs.kind_name(),
            rhs.kind_name()
        ),
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult {
        let interner = StringInterner::new();
        eval_binary(op, lhs, rhs, Span::DUMMY, &interner)
    }

    #[test]
    fn test_numeric_arithmetic() {
        assert!(matches!(binary(BinaryOp::Add, &num(1.0), &num(1.0)), Ok(Value::Number(n)) if n == 2.0));
        assert!(matches!(binary(BinaryOp::Sub, &num(5.0), &num(3.0)), Ok(Value::Number(n)) if n == 2.0));
        assert!(matches!(binary(BinaryOp::Mul, &num(4.0), &num(2.5)), Ok(Value::Number(n)) if n == 10.0));
        assert!(matches!(binary(BinaryOp::Div, &num(20.0), &num(4.0)), Ok(Value::Number(n)) if n == 5.0));
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        match binary(BinaryOp::Div, &num(1.0), &num(0.0)) {
            Ok(Value::Number(n)) => assert!(n.is_infinite() && n > 0.0),
            other => panic!("expected inf, got {other:?}"),
        }
        match binary(BinaryOp::Div, &num(0.0), &num(0.0)) {
            Ok(Value::Number(n)) => assert!(n.is_nan()),
            other => panic!("expected NaN, got {other:?}"),
        }
    }

    #[test]
    fn test_string_concatenation() {
        let interner = StringInterner::new();
        let out = eval_binary(
            BinaryOp::Add,
            &Value::string("x = "),
            &num(5.0),
            Span::DUMMY,
            &interner,
        );
        match out {
            Ok(Value::Str(s)) => assert_eq!(&**s, "x = 5"),
            other => panic!("expected string, got {other:?}"),
        }

        // Coercion applies on either side.
        let out = eval_binary(BinaryOp::Add, &num(5.0), &Value::string("!"), Span::DUMMY, &interner);
        match out {
            Ok(Value::Str(s)) => assert_eq!(&**s, "5!"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn test_add_type_error() {
        assert!(binary(BinaryOp::Add, &Value::Bool(true), &num(1.0)).is_err());
        assert!(binary(BinaryOp::Add, &Value::Null, &Value::Null).is_err());
    }

    #[test]
    fn test_equality_never_throws() {
        assert!(matches!(
            binary(BinaryOp::Eq, &Value::Null, &num(0.0)),
            Ok(Value::Bool(false))
        ));
        assert!(matches!(
            binary(BinaryOp::NotEq, &Value::string("a"), &Value::Bool(true)),
            Ok(Value::Bool(true))
        ));
        assert!(matches!(
            binary(BinaryOp::Eq, &Value::Null, &Value::Null),
            Ok(Value::Bool(true))
        ));
    }

    #[test]
    fn test_relational_numbers_and_strings() {
        assert!(matches!(binary(BinaryOp::Lt, &num(1.0), &num(2.0)), Ok(Value::Bool(true))));
        assert!(matches!(binary(BinaryOp::GtEq, &num(2.0), &num(2.0)), Ok(Value::Bool(true))));
        assert!(matches!(
            binary(BinaryOp::Lt, &Value::string("apple"), &Value::string("banana")),
            Ok(Value::Bool(true))
        ));
        // Mixed kinds are a type error, not a silent false.
        assert!(binary(BinaryOp::Lt, &num(1.0), &Value::string("2")).is_err());
    }

    #[test]
    fn test_relational_nan_is_false() {
        assert!(matches!(
            binary(BinaryOp::Lt, &num(f64::NAN), &num(1.0)),
            Ok(Value::Bool(false))
        ));
        assert!(matches!(
            binary(BinaryOp::GtEq, &num(f64::NAN), &num(1.0)),
            Ok(Value::Bool(false))
        ));
    }

    #[test]
    fn test_unary() {
        assert!(matches!(eval_unary(UnaryOp::Neg, &num(3.0), Span::DUMMY), Ok(Value::Number(n)) if n == -3.0));
        assert!(matches!(
            eval_unary(UnaryOp::Not, &Value::Null, Span::DUMMY),
            Ok(Value::Bool(true))
        ));
        assert!(matches!(
            eval_unary(UnaryOp::Not, &num(0.0), Span::DUMMY),
            Ok(Value::Bool(false))
        ));
        assert!(eval_unary(UnaryOp::Neg, &Value::string("x"), Span::DUMMY).is_err());
    }
}
