//! Built-in functions for Lumen.
//!
//! Natives are registered into the root context. Each one declares its
//! parameters so the regular invocation protocol validates and binds the
//! arguments; the callback reads them back by name.

use std::rc::Rc;

use crate::error::{RuntimeError, ScriptError, TypeError};
use crate::interpreter::environment::{ContextId, Environment};
use crate::interpreter::executor::{Interpreter, RuntimeResult};
use crate::interpreter::value::{NativeFunction, NativeParam, Value};
use crate::span::Span;

pub mod collections;
pub mod html;
pub mod strings;
pub mod types;

pub use collections::NativeMethods;

/// Define a native function in the root context of `env`.
pub(crate) fn define_native<F>(
    env: &mut Environment,
    name: &str,
    params: Vec<NativeParam>,
    callback: F,
) where
    F: Fn(&mut Interpreter, ContextId, Span) -> RuntimeResult<Value> + 'static,
{
    let root = env.root();
    env.define(
        root,
        name,
        Value::NativeFunction(Rc::new(NativeFunction::new(name, params, callback))),
    );
}

/// Argument `name` as a number.
pub(crate) fn number_arg(
    interp: &Interpreter,
    ctx: ContextId,
    name: &str,
    span: Span,
) -> RuntimeResult<f64> {
    match interp.arg(ctx, name) {
        Value::Number(n) => Ok(n),
        other => Err(type_mismatch(name, "number", &other, span)),
    }
}

/// Argument `name` as a string.
pub(crate) fn string_arg(
    interp: &Interpreter,
    ctx: ContextId,
    name: &str,
    span: Span,
) -> RuntimeResult<String> {
    match interp.arg(ctx, name) {
        Value::String(s) => Ok(s),
        other => Err(type_mismatch(name, "string", &other, span)),
    }
}

pub(crate) fn type_mismatch(name: &str, expected: &str, found: &Value, span: Span) -> ScriptError {
    TypeError::mismatch(name, expected, found.type_name(), span).into()
}

/// Register all built-in functions in the given environment.
pub fn register_builtins(env: &mut Environment) {
    // print(...values) - Display forms joined by spaces
    define_native(env, "print", vec![NativeParam::rest("values")], |interp, ctx, _span| {
        let line = match interp.arg(ctx, "values") {
            Value::List(values) => values
                .borrow()
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" "),
            other => other.to_string(),
        };
        interp.write_line(line);
        Ok(Value::None)
    });

    // len(value) - Characters, elements, keys or children
    define_native(env, "len", vec![NativeParam::required("value")], |interp, ctx, span| {
        let length = match interp.arg(ctx, "value") {
            Value::String(s) => s.chars().count(),
            Value::List(items) => items.borrow().len(),
            Value::Dictionary(map) => map.borrow().len(),
            Value::Html(node) => node.children.len(),
            other => {
                return Err(TypeError::new(
                    format!("len() is not defined for {}", other.type_name()),
                    span,
                )
                .into())
            }
        };
        Ok(Value::Number(length as f64))
    });

    // range(start, end?, step?) - range(n) counts from 0 up to n
    define_native(
        env,
        "range",
        vec![
            NativeParam::required("start"),
            NativeParam::optional("end", Value::None),
            NativeParam::optional("step", Value::Number(1.0)),
        ],
        |interp, ctx, span| {
            let first = number_arg(interp, ctx, "start", span)?;
            let (start, end) = match interp.arg(ctx, "end") {
                Value::None => (0.0, first),
                Value::Number(end) => (first, end),
                other => return Err(type_mismatch("end", "number", &other, span)),
            };
            let step = number_arg(interp, ctx, "step", span)?;
            if step == 0.0 {
                return Err(RuntimeError::new("range() step cannot be zero", span).into());
            }
            let mut values = Vec::new();
            let mut current = start;
            while (step > 0.0 && current < end) || (step < 0.0 && current > end) {
                values.push(Value::Number(current));
                current += step;
            }
            Ok(Value::list(values))
        },
    );

    // exit(code = 0) - Stop the program
    define_native(
        env,
        "exit",
        vec![NativeParam::optional("code", Value::Number(0.0))],
        |interp, ctx, span| {
            let code = number_arg(interp, ctx, "code", span)?;
            tracing::debug!(code, "exit requested");
            interp.exit_requested = Some(code as i32);
            Ok(Value::None)
        },
    );

    types::register_type_builtins(env);
    html::register_html_builtins(env);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn eval(source: &str) -> Value {
        let mut interp = Interpreter::new();
        let result = interp.run(source, "<test>").unwrap();
        result.last().cloned().unwrap_or(Value::None)
    }

    #[test]
    fn test_print_joins_display_forms() {
        let mut interp = Interpreter::new();
        let output = interp.capture_output();
        interp.run(r#"print("a", 1, [2, "b"], none)"#, "<test>").unwrap();
        assert_eq!(output.borrow().clone(), vec![r#"a 1 [2, "b"] none"#.to_string()]);
    }

    #[test]
    fn test_len() {
        assert_eq!(eval(r#"len("héllo")"#).as_number(), Some(5.0));
        assert_eq!(eval("len([1, 2, 3])").as_number(), Some(3.0));
        assert_eq!(eval(r#"len({"a": 1})"#).as_number(), Some(1.0));
    }

    #[test]
    fn test_range_forms() {
        assert_eq!(eval("range(3)").to_string(), "[0, 1, 2]");
        assert_eq!(eval("range(1, 4)").to_string(), "[1, 2, 3]");
        assert_eq!(eval("range(5, 0, -2)").to_string(), "[5, 3, 1]");
    }

    #[test]
    fn test_native_arity_is_checked() {
        let mut interp = Interpreter::new();
        let err = interp.run("len(1, 2)", "<test>").unwrap_err();
        assert!(err.to_string().contains("Too many arguments for 'len'"));
        let err = interp.run("len()", "<test>").unwrap_err();
        assert!(err.to_string().contains("missing 'value'"));
    }

    #[test]
    fn test_exit_stops_the_program() {
        let mut interp = Interpreter::new();
        let output = interp.capture_output();
        let result = interp
            .run("print(1)\nexit(3)\nprint(2)", "<test>")
            .unwrap();
        assert_eq!(result.exit_code(), Some(3));
        assert_eq!(output.borrow().len(), 1);
    }
}
