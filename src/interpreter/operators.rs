//! Operator semantics over runtime values.
//!
//! Every function here is pure: it takes operand values and returns a value
//! or an [`OperatorError`]. The evaluator attaches source spans.

use std::rc::Rc;

use thiserror::Error;

use crate::error::{RuntimeError, ScriptError, TypeError};
use crate::interpreter::value::Value;
use crate::span::Span;

pub type OperatorResult = Result<Value, OperatorError>;

/// Largest list or string (in elements or bytes) an operator may build.
pub(crate) const MAX_SEQUENCE_LENGTH: usize = 1 << 26;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OperatorError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("modulo by zero")]
    ModuloByZero,

    #[error("unsupported operand types for {operator}: {left} and {right}")]
    Unsupported {
        operator: &'static str,
        left: String,
        right: String,
    },

    #[error("negative shift count")]
    NegativeShift,

    #[error("result of {0} is too large")]
    TooLarge(&'static str),
}

impl OperatorError {
    fn unsupported(operator: &'static str, left: &Value, right: &Value) -> Self {
        Self::Unsupported {
            operator,
            left: left.type_name(),
            right: right.type_name(),
        }
    }

    /// Attach a location.
    pub fn at(self, span: Span) -> ScriptError {
        match self {
            Self::DivisionByZero => RuntimeError::division_by_zero(span).into(),
            Self::ModuloByZero => RuntimeError::ModuloByZero(span).into(),
            Self::Unsupported {
                operator,
                left,
                right,
            } => TypeError::unsupported_operand(operator, left, right, span).into(),
            Self::NegativeShift => RuntimeError::new("Negative shift count", span).into(),
            Self::TooLarge(operator) => {
                RuntimeError::new(format!("Result of '{}' is too large", operator), span).into()
            }
        }
    }
}

/// Numeric proxy of a value for arithmetic. Strings only coerce when
/// `strings` is set (size comparisons).
fn size(value: &Value, strings: bool) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::None => Some(0.0),
        Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::List(items) => Some(items.borrow().len() as f64),
        Value::Dictionary(map) => Some(map.borrow().len() as f64),
        Value::String(s) if strings => Some(s.chars().count() as f64),
        _ => None,
    }
}

fn numeric_operands(
    operator: &'static str,
    left: &Value,
    right: &Value,
) -> Result<(f64, f64), OperatorError> {
    match (size(left, false), size(right, false)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(OperatorError::unsupported(operator, left, right)),
    }
}

fn integer_operands(
    operator: &'static str,
    left: &Value,
    right: &Value,
) -> Result<(i64, i64), OperatorError> {
    let (a, b) = numeric_operands(operator, left, right)?;
    Ok((a as i64, b as i64))
}

fn bool_digit(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

pub fn add(left: &Value, right: &Value) -> OperatorResult {
    match (left, right) {
        (Value::None, Value::String(s)) | (Value::String(s), Value::None) => {
            Ok(Value::String(s.clone()))
        }
        (Value::List(a), Value::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (Value::List(a), scalar) => {
            let mut items = a.borrow().clone();
            items.push(scalar.clone());
            Ok(Value::list(items))
        }
        (scalar, Value::List(b)) => {
            let mut items = Vec::with_capacity(b.borrow().len() + 1);
            items.push(scalar.clone());
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (Value::Dictionary(a), Value::Dictionary(b)) => {
            let mut merged = a.borrow().clone();
            for (key, value) in b.borrow().iter() {
                merged.insert(key.clone(), value.clone());
            }
            Ok(Value::dict(merged))
        }
        (Value::String(s), Value::Boolean(b)) => {
            Ok(Value::String(format!("{}{}", s, bool_digit(*b))))
        }
        (Value::Boolean(b), Value::String(s)) => {
            Ok(Value::String(format!("{}{}", bool_digit(*b), s)))
        }
        (Value::String(_), Value::Number(_) | Value::String(_))
        | (Value::Number(_), Value::String(_)) => Ok(Value::String(format!("{}{}", left, right))),
        _ => {
            let (a, b) = numeric_operands("+", left, right)?;
            Ok(Value::Number(a + b))
        }
    }
}

pub fn subtract(left: &Value, right: &Value) -> OperatorResult {
    let (a, b) = numeric_operands("-", left, right)?;
    Ok(Value::Number(a - b))
}

/// Repetition count for `unit`-sized pieces; non-positive counts give zero.
fn repeat_count(n: f64, unit: usize) -> Result<usize, OperatorError> {
    if unit == 0 || !(n.is_finite() && n >= 1.0) {
        return Ok(0);
    }
    let count = n.trunc().min(MAX_SEQUENCE_LENGTH as f64) as usize;
    match unit.checked_mul(count) {
        Some(total) if total <= MAX_SEQUENCE_LENGTH => Ok(count),
        _ => Err(OperatorError::TooLarge("*")),
    }
}

pub fn multiply(left: &Value, right: &Value) -> OperatorResult {
    match (left, right) {
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => {
            Ok(Value::String(s.repeat(repeat_count(*n, s.len())?)))
        }
        (Value::List(items), Value::Number(n)) | (Value::Number(n), Value::List(items)) => {
            let items = items.borrow();
            let count = repeat_count(*n, items.len())?;
            let mut repeated = Vec::with_capacity(items.len() * count);
            for _ in 0..count {
                repeated.extend(items.iter().cloned());
            }
            Ok(Value::list(repeated))
        }
        _ => {
            let (a, b) = numeric_operands("*", left, right)?;
            Ok(Value::Number(a * b))
        }
    }
}

pub fn divide(left: &Value, right: &Value) -> OperatorResult {
    let (a, b) = numeric_operands("/", left, right)?;
    if b == 0.0 {
        return Err(OperatorError::DivisionByZero);
    }
    Ok(Value::Number(a / b))
}

/// Floored modulo: the result takes the sign of the divisor.
pub fn modulo(left: &Value, right: &Value) -> OperatorResult {
    let (a, b) = numeric_operands("%", left, right)?;
    if b == 0.0 {
        return Err(OperatorError::ModuloByZero);
    }
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        Ok(Value::Number(r + b))
    } else {
        Ok(Value::Number(r))
    }
}

pub fn power(left: &Value, right: &Value) -> OperatorResult {
    let (a, b) = numeric_operands("**", left, right)?;
    Ok(Value::Number(a.powf(b)))
}

fn is_sized(value: &Value) -> bool {
    matches!(
        value,
        Value::List(_) | Value::Dictionary(_) | Value::String(_)
    )
}

fn ordering_operands(
    operator: &'static str,
    left: &Value,
    right: &Value,
) -> Result<(f64, f64), OperatorError> {
    let sized = is_sized(left) || is_sized(right);
    match (size(left, sized), size(right, sized)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(OperatorError::unsupported(operator, left, right)),
    }
}

pub fn less(left: &Value, right: &Value) -> OperatorResult {
    let (a, b) = ordering_operands("<", left, right)?;
    Ok(Value::Boolean(a < b))
}

pub fn less_equal(left: &Value, right: &Value) -> OperatorResult {
    let (a, b) = ordering_operands("<=", left, right)?;
    Ok(Value::Boolean(a <= b))
}

pub fn greater(left: &Value, right: &Value) -> OperatorResult {
    let (a, b) = ordering_operands(">", left, right)?;
    Ok(Value::Boolean(a > b))
}

pub fn greater_equal(left: &Value, right: &Value) -> OperatorResult {
    let (a, b) = ordering_operands(">=", left, right)?;
    Ok(Value::Boolean(a >= b))
}

/// Structural equality for data, identity for everything else.
pub fn equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::None, Value::None) => true,
        (Value::None, Value::Number(n)) | (Value::Number(n), Value::None) => *n == 0.0,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            s.trim().parse::<f64>().is_ok_and(|parsed| parsed == *n)
        }
        (Value::Number(n), Value::Boolean(b)) | (Value::Boolean(b), Value::Number(n)) => {
            *n == if *b { 1.0 } else { 0.0 }
        }
        (Value::String(s), Value::Boolean(b)) | (Value::Boolean(b), Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .is_ok_and(|parsed| parsed == if *b { 1.0 } else { 0.0 }),
        (Value::List(a), Value::List(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            let (a, b) = (a.borrow(), b.borrow());
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| equals(x, y))
        }
        (Value::Dictionary(a), Value::Dictionary(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            let (a, b) = (a.borrow(), b.borrow());
            a.len() == b.len()
                && a
                    .iter()
                    .zip(b.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && equals(va, vb))
        }
        (Value::Function(a), Value::Function(b)) => {
            Rc::ptr_eq(&a.decl, &b.decl) && a.closure == b.closure
        }
        (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(a, b),
        (Value::NativeMethod(a), Value::NativeMethod(b)) => {
            Rc::ptr_eq(&a.function, &b.function) && equals(&a.receiver, &b.receiver)
        }
        (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
        (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
        (Value::Enum(a), Value::Enum(b)) => Rc::ptr_eq(a, b),
        (Value::Tag(a), Value::Tag(b)) => Rc::ptr_eq(a, b),
        (Value::Html(a), Value::Html(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

pub fn bit_and(left: &Value, right: &Value) -> OperatorResult {
    let (a, b) = integer_operands("&", left, right)?;
    Ok(Value::Number((a & b) as f64))
}

pub fn bit_or(left: &Value, right: &Value) -> OperatorResult {
    let (a, b) = integer_operands("|", left, right)?;
    Ok(Value::Number((a | b) as f64))
}

pub fn bit_xor(left: &Value, right: &Value) -> OperatorResult {
    let (a, b) = integer_operands("^", left, right)?;
    Ok(Value::Number((a ^ b) as f64))
}

pub fn shift_left(left: &Value, right: &Value) -> OperatorResult {
    let (a, b) = integer_operands("<<", left, right)?;
    if b < 0 {
        return Err(OperatorError::NegativeShift);
    }
    let shifted = u32::try_from(b)
        .ok()
        .and_then(|b| a.checked_shl(b))
        .unwrap_or(0);
    Ok(Value::Number(shifted as f64))
}

pub fn shift_right(left: &Value, right: &Value) -> OperatorResult {
    let (a, b) = integer_operands(">>", left, right)?;
    if b < 0 {
        return Err(OperatorError::NegativeShift);
    }
    let shifted = u32::try_from(b)
        .ok()
        .and_then(|b| a.checked_shr(b))
        .unwrap_or(if a < 0 { -1 } else { 0 });
    Ok(Value::Number(shifted as f64))
}

pub fn negate(operand: &Value) -> OperatorResult {
    match size(operand, false) {
        Some(n) => Ok(Value::Number(-n)),
        None => Err(OperatorError::unsupported("-", &Value::None, operand)),
    }
}

pub fn bit_not(operand: &Value) -> OperatorResult {
    match size(operand, false) {
        Some(n) => Ok(Value::Number(!(n as i64) as f64)),
        None => Err(OperatorError::unsupported("~", &Value::None, operand)),
    }
}

pub fn not(operand: &Value) -> Value {
    Value::Boolean(!operand.is_true())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::value::new_dict_map;
    use pretty_assertions::assert_eq;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    fn list(items: &[f64]) -> Value {
        Value::list(items.iter().map(|n| Value::Number(*n)).collect())
    }

    fn dict(pairs: &[(&str, f64)]) -> Value {
        let mut map = new_dict_map();
        for (k, v) in pairs {
            map.insert(k.to_string(), Value::Number(*v));
        }
        Value::dict(map)
    }

    #[test]
    fn test_list_concatenation_preserves_order() {
        let joined = add(&list(&[1.0, 2.0]), &list(&[3.0])).unwrap();
        assert_eq!(joined.to_string(), "[1, 2, 3]");
        assert_eq!(add(&list(&[1.0]), &num(2.0)).unwrap().to_string(), "[1, 2]");
        assert_eq!(add(&num(0.0), &list(&[1.0])).unwrap().to_string(), "[0, 1]");
    }

    #[test]
    fn test_dict_merge_right_wins() {
        let merged = add(
            &dict(&[("a", 1.0), ("b", 2.0)]),
            &dict(&[("b", 3.0), ("c", 4.0)]),
        )
        .unwrap();
        assert_eq!(merged.to_string(), r#"{"a": 1, "b": 3, "c": 4}"#);
    }

    #[test]
    fn test_string_addition() {
        let s = Value::string("n=");
        assert_eq!(add(&s, &num(3.0)).unwrap().to_string(), "n=3");
        assert_eq!(add(&s, &Value::Boolean(true)).unwrap().to_string(), "n=1");
        assert_eq!(add(&Value::None, &s).unwrap().to_string(), "n=");
        assert!(add(&s, &dict(&[])).is_err());
    }

    #[test]
    fn test_size_coercion_in_arithmetic() {
        assert_eq!(add(&num(1.0), &Value::None).unwrap().as_number(), Some(1.0));
        assert_eq!(add(&num(1.0), &Value::Boolean(true)).unwrap().as_number(), Some(2.0));
        assert_eq!(subtract(&list(&[1.0, 2.0, 3.0]), &num(1.0)).unwrap().as_number(), Some(2.0));
        assert_eq!(power(&num(5.0), &Value::None).unwrap().as_number(), Some(1.0));
        assert!(matches!(
            subtract(&Value::string("abc"), &num(1.0)),
            Err(OperatorError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_repetition() {
        assert_eq!(multiply(&Value::string("ab"), &num(3.0)).unwrap().to_string(), "ababab");
        assert_eq!(multiply(&num(-1.0), &Value::string("ab")).unwrap().to_string(), "");
        assert_eq!(
            multiply(&list(&[1.0, 2.0]), &num(2.0)).unwrap().to_string(),
            "[1, 2, 1, 2]"
        );
        assert_eq!(multiply(&Value::string(""), &num(1e300)).unwrap().to_string(), "");
    }

    #[test]
    fn test_oversized_repetition_is_an_error() {
        let huge = num(1e300);
        assert_eq!(
            multiply(&list(&[1.0, 2.0]), &huge).unwrap_err(),
            OperatorError::TooLarge("*")
        );
        assert_eq!(
            multiply(&Value::string("ab"), &huge).unwrap_err(),
            OperatorError::TooLarge("*")
        );
        assert_eq!(
            multiply(&huge, &Value::string("ab")).unwrap_err(),
            OperatorError::TooLarge("*")
        );
        assert_eq!(multiply(&Value::list(vec![]), &huge).unwrap().to_string(), "[]");
    }

    #[test]
    fn test_division_and_floored_modulo() {
        assert_eq!(divide(&num(1.0), &num(0.0)).unwrap_err(), OperatorError::DivisionByZero);
        assert_eq!(modulo(&num(1.0), &Value::None).unwrap_err(), OperatorError::ModuloByZero);
        assert_eq!(modulo(&num(-7.0), &num(3.0)).unwrap().as_number(), Some(2.0));
        assert_eq!(modulo(&num(7.0), &num(-3.0)).unwrap().as_number(), Some(-2.0));
    }

    #[test]
    fn test_size_comparisons() {
        assert_eq!(less(&list(&[1.0]), &list(&[1.0, 2.0])).unwrap().as_bool(), Some(true));
        assert_eq!(greater(&Value::string("abc"), &num(2.0)).unwrap().as_bool(), Some(true));
        assert_eq!(less(&Value::None, &Value::None).unwrap().as_bool(), Some(false));
        assert_eq!(less_equal(&Value::None, &Value::None).unwrap().as_bool(), Some(true));
    }

    #[test]
    fn test_equality_rules() {
        assert!(equals(&Value::None, &num(0.0)));
        assert!(equals(&num(0.0), &Value::None));
        assert!(!equals(&Value::None, &Value::string("str")));
        assert!(equals(&num(3.0), &Value::string("3")));
        assert!(equals(&Value::Boolean(true), &num(1.0)));
        assert!(equals(&Value::Boolean(true), &Value::string("1")));
        assert!(equals(&Value::string("0"), &Value::Boolean(false)));
        assert!(!equals(&Value::Boolean(true), &Value::string("true")));
        assert!(equals(&list(&[1.0, 2.0]), &list(&[1.0, 2.0])));
        assert!(!equals(&dict(&[("a", 1.0), ("b", 2.0)]), &dict(&[("b", 2.0), ("a", 1.0)])));
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(bit_and(&num(6.0), &num(3.0)).unwrap().as_number(), Some(2.0));
        assert_eq!(bit_or(&num(6.0), &num(3.0)).unwrap().as_number(), Some(7.0));
        assert_eq!(bit_xor(&num(6.0), &num(3.0)).unwrap().as_number(), Some(5.0));
        assert_eq!(shift_left(&num(1.0), &num(4.0)).unwrap().as_number(), Some(16.0));
        assert_eq!(shift_right(&num(-16.0), &num(2.0)).unwrap().as_number(), Some(-4.0));
        assert_eq!(bit_not(&num(0.0)).unwrap().as_number(), Some(-1.0));
        assert_eq!(shift_left(&num(1.0), &num(-1.0)).unwrap_err(), OperatorError::NegativeShift);
    }
}
