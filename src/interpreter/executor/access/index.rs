//! Index and slice access (xs[i], xs[a:b], s[i], d[key]).

use crate::error::{RuntimeError, TypeError};
use crate::interpreter::executor::{Interpreter, RuntimeResult};
use crate::interpreter::operators::MAX_SEQUENCE_LENGTH;
use crate::interpreter::value::{format_number, Value};
use crate::span::Span;

/// Dictionary key for `value`: strings as-is, numbers in display form.
pub(crate) fn dict_key(value: &Value, span: Span) -> RuntimeResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(format_number(*n)),
        other => Err(TypeError::new(
            format!("{} cannot be used as a dictionary key", other.type_name()),
            span,
        )
        .into()),
    }
}

pub(crate) fn integer_index(index: &Value, span: Span) -> RuntimeResult<i64> {
    match index {
        Value::Number(n) if n.fract() == 0.0 => Ok(*n as i64),
        other => Err(TypeError::new(
            format!("Index must be an integer, found {}", other.repr()),
            span,
        )
        .into()),
    }
}

/// Resolve a possibly negative index against `length`.
pub(crate) fn resolve_index(index: i64, length: usize, span: Span) -> RuntimeResult<usize> {
    let resolved = if index < 0 {
        length as i64 + index
    } else {
        index
    };
    if resolved < 0 || resolved >= length as i64 {
        return Err(RuntimeError::index_out_of_bounds(index, length, span).into());
    }
    Ok(resolved as usize)
}

/// Clamp slice bounds; negative bounds count from the end.
fn slice_bounds(
    start: Option<&Value>,
    end: Option<&Value>,
    length: usize,
    span: Span,
) -> RuntimeResult<(usize, usize)> {
    let clamp = |bound: i64| -> usize {
        let bound = if bound < 0 { length as i64 + bound } else { bound };
        bound.clamp(0, length as i64) as usize
    };
    let start = match start {
        Some(Value::None) | None => 0,
        Some(value) => clamp(integer_index(value, span)?),
    };
    let end = match end {
        Some(Value::None) | None => length,
        Some(value) => clamp(integer_index(value, span)?),
    };
    Ok((start, end.max(start)))
}

fn not_indexable(value: &Value, span: Span) -> crate::error::ScriptError {
    TypeError::new(format!("'{}' is not indexable", value.type_name()), span).into()
}

impl Interpreter {
    /// Read `object[index]`.
    pub(crate) fn get_index(
        &self,
        object: &Value,
        index: &Value,
        span: Span,
    ) -> RuntimeResult<Value> {
        match object {
            Value::List(items) => {
                let items = items.borrow();
                let i = resolve_index(integer_index(index, span)?, items.len(), span)?;
                Ok(items[i].clone())
            }
            Value::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                let i = resolve_index(integer_index(index, span)?, chars.len(), span)?;
                Ok(Value::String(chars[i].to_string()))
            }
            Value::Dictionary(map) => {
                let key = dict_key(index, span)?;
                Ok(map.borrow().get(&key).cloned().unwrap_or(Value::None))
            }
            other => Err(not_indexable(other, span)),
        }
    }

    /// Read `object[start:end]`.
    pub(crate) fn get_slice(
        &self,
        object: &Value,
        start: Option<&Value>,
        end: Option<&Value>,
        span: Span,
    ) -> RuntimeResult<Value> {
        match object {
            Value::List(items) => {
                let items = items.borrow();
                let (from, to) = slice_bounds(start, end, items.len(), span)?;
                Ok(Value::list(items[from..to].to_vec()))
            }
            Value::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                let (from, to) = slice_bounds(start, end, chars.len(), span)?;
                Ok(Value::String(chars[from..to].iter().collect()))
            }
            other => Err(not_indexable(other, span)),
        }
    }

    /// `object[index] = value`. Lists grow with none padding when written
    /// past the end.
    pub(crate) fn set_index(
        &self,
        object: &Value,
        index: &Value,
        value: Value,
        span: Span,
    ) -> RuntimeResult<()> {
        match object {
            Value::List(items) => {
                let mut items = items.borrow_mut();
                let raw = integer_index(index, span)?;
                if raw >= items.len() as i64 {
                    let padded = usize::try_from(raw)
                        .ok()
                        .filter(|len| *len < MAX_SEQUENCE_LENGTH)
                        .ok_or_else(|| {
                            RuntimeError::new(format!("Index {} is too large", raw), span)
                        })?;
                    items.resize(padded, Value::None);
                    items.push(value);
                    return Ok(());
                }
                let i = resolve_index(raw, items.len(), span)?;
                items[i] = value;
                Ok(())
            }
            Value::Dictionary(map) => {
                let key = dict_key(index, span)?;
                map.borrow_mut().insert(key, value);
                Ok(())
            }
            Value::String(_) => Err(TypeError::new("Strings are immutable", span).into()),
            other => Err(not_indexable(other, span)),
        }
    }

    /// `del object[index]`.
    pub(crate) fn delete_index(
        &self,
        object: &Value,
        index: &Value,
        span: Span,
    ) -> RuntimeResult<()> {
        match object {
            Value::List(items) => {
                let mut items = items.borrow_mut();
                let i = resolve_index(integer_index(index, span)?, items.len(), span)?;
                items.remove(i);
                Ok(())
            }
            Value::Dictionary(map) => {
                let key = dict_key(index, span)?;
                match map.borrow_mut().shift_remove(&key) {
                    Some(_) => Ok(()),
                    None => Err(RuntimeError::new(format!("Key '{}' not found", key), span).into()),
                }
            }
            other => Err(not_indexable(other, span)),
        }
    }

    /// `del object[start:end]`.
    pub(crate) fn delete_slice(
        &self,
        object: &Value,
        start: Option<&Value>,
        end: Option<&Value>,
        span: Span,
    ) -> RuntimeResult<()> {
        match object {
            Value::List(items) => {
                let mut items = items.borrow_mut();
                let (from, to) = slice_bounds(start, end, items.len(), span)?;
                items.drain(from..to);
                Ok(())
            }
            other => Err(not_indexable(other, span)),
        }
    }
}
