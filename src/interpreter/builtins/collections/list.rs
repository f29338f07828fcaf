//! List methods.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::interpreter::environment::ContextId;
use crate::interpreter::executor::access::index::{integer_index, resolve_index};
use crate::interpreter::executor::{Interpreter, RuntimeResult};
use crate::interpreter::operators;
use crate::interpreter::value::{NativeParam, Value};
use crate::span::Span;

use super::{method, MethodTable};
use crate::interpreter::builtins::{string_arg, type_mismatch};

fn receiver(
    interp: &Interpreter,
    ctx: ContextId,
    span: Span,
) -> RuntimeResult<Rc<RefCell<Vec<Value>>>> {
    match interp.arg(ctx, "self") {
        Value::List(items) => Ok(items),
        other => Err(type_mismatch("self", "list", &other, span)),
    }
}

pub(crate) fn register_list_methods(table: &mut MethodTable) {
    // append(...values) - Add values to the end, in order
    method(table, "append", vec![NativeParam::rest("values")], |interp, ctx, span| {
        let items = receiver(interp, ctx, span)?;
        if let Value::List(values) = interp.arg(ctx, "values") {
            let values = values.borrow().clone();
            items.borrow_mut().extend(values);
        }
        Ok(Value::None)
    });

    // pop(index?) - Remove and return the last element, or the one at index
    method(
        table,
        "pop",
        vec![NativeParam::optional("index", Value::None)],
        |interp, ctx, span| {
            let items = receiver(interp, ctx, span)?;
            let mut items = items.borrow_mut();
            let position = match interp.arg(ctx, "index") {
                Value::None if items.is_empty() => {
                    return Err(RuntimeError::new("pop from empty list", span).into())
                }
                Value::None => items.len() - 1,
                index => resolve_index(integer_index(&index, span)?, items.len(), span)?,
            };
            Ok(items.remove(position))
        },
    );

    // insert(index, value) - Insert before index; out of range clamps
    method(
        table,
        "insert",
        vec![NativeParam::required("index"), NativeParam::required("value")],
        |interp, ctx, span| {
            let items = receiver(interp, ctx, span)?;
            let index = integer_index(&interp.arg(ctx, "index"), span)?;
            let mut items = items.borrow_mut();
            let length = items.len() as i64;
            let position = if index < 0 { length + index } else { index };
            items.insert(position.clamp(0, length) as usize, interp.arg(ctx, "value"));
            Ok(Value::None)
        },
    );

    // index_of(value) - Position of the first equal element, or -1
    method(table, "index_of", vec![NativeParam::required("value")], |interp, ctx, span| {
        let items = receiver(interp, ctx, span)?;
        let needle = interp.arg(ctx, "value");
        let position = items
            .borrow()
            .iter()
            .position(|item| operators::equals(item, &needle));
        Ok(Value::Number(position.map_or(-1.0, |p| p as f64)))
    });

    // contains(value)
    method(table, "contains", vec![NativeParam::required("value")], |interp, ctx, span| {
        let items = receiver(interp, ctx, span)?;
        let needle = interp.arg(ctx, "value");
        let found = items.borrow().iter().any(|item| operators::equals(item, &needle));
        Ok(Value::Boolean(found))
    });

    // join(separator = "") - Display forms joined into a string
    method(
        table,
        "join",
        vec![NativeParam::optional("separator", Value::string(""))],
        |interp, ctx, span| {
            let items = receiver(interp, ctx, span)?;
            let separator = string_arg(interp, ctx, "separator", span)?;
            let joined = items
                .borrow()
                .iter()
                .map(|item| item.to_string())
                .collect::<Vec<_>>()
                .join(&separator);
            Ok(Value::String(joined))
        },
    );

    // reverse() - In place
    method(table, "reverse", Vec::new(), |interp, ctx, span| {
        receiver(interp, ctx, span)?.borrow_mut().reverse();
        Ok(Value::None)
    });
}

#[cfg(test)]
mod tests {
    use crate::interpreter::executor::Interpreter;
    use pretty_assertions::assert_eq;

    fn eval(source: &str) -> String {
        let mut interp = Interpreter::new();
        let result = interp.run(source, "<test>").unwrap();
        result.last().map(|v| v.repr()).unwrap_or_default()
    }

    #[test]
    fn test_append_mutates_shared_list() {
        assert_eq!(eval("var a = [1]\nvar b = a\nb.append(2, 3)\na"), "[1, 2, 3]");
    }

    #[test]
    fn test_pop_and_insert() {
        assert_eq!(eval("var a = [1, 2, 3]\na.pop()"), "3");
        assert_eq!(eval("var a = [1, 2, 3]\na.pop(0)\na"), "[2, 3]");
        assert_eq!(eval("var a = [1, 3]\na.insert(1, 2)\na"), "[1, 2, 3]");
        assert_eq!(eval("var a = [1]\na.insert(10, 2)\na"), "[1, 2]");
    }

    #[test]
    fn test_pop_empty_list_fails() {
        let mut interp = Interpreter::new();
        let err = interp.run("[].pop()", "<test>").unwrap_err();
        assert!(err.to_string().contains("pop from empty list"));
    }

    #[test]
    fn test_search_and_join() {
        assert_eq!(eval(r#"["a", "b"].index_of("b")"#), "1");
        assert_eq!(eval(r#"["a", "b"].index_of("z")"#), "-1");
        assert_eq!(eval("[1, [2]].contains([2])"), "true");
        assert_eq!(eval(r#"[1, "x", none].join("-")"#), r#""1-x-none""#);
    }

    #[test]
    fn test_reverse_in_place() {
        assert_eq!(eval("var a = [1, 2, 3]\na.reverse()\na"), "[3, 2, 1]");
    }
}
