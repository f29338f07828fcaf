//! Type conversion built-in functions.
//!
//! Provides functions for converting between types and inspecting type information.

use crate::error::RuntimeError;
use crate::interpreter::environment::Environment;
use crate::interpreter::value::{NativeParam, Value};

use super::define_native;

/// Register all type conversion built-in functions.
pub fn register_type_builtins(env: &mut Environment) {
    // type(value) - Kind name, or the class name for instances
    define_native(env, "type", vec![NativeParam::required("value")], |interp, ctx, _span| {
        Ok(Value::String(interp.arg(ctx, "value").type_name()))
    });

    // str(value) - Display form
    define_native(env, "str", vec![NativeParam::required("value")], |interp, ctx, _span| {
        Ok(Value::String(interp.arg(ctx, "value").to_string()))
    });

    // repr(value) - Literal form
    define_native(env, "repr", vec![NativeParam::required("value")], |interp, ctx, _span| {
        Ok(Value::String(interp.arg(ctx, "value").repr()))
    });

    // num(value) - Convert to number
    define_native(env, "num", vec![NativeParam::required("value")], |interp, ctx, span| {
        match interp.arg(ctx, "value") {
            Value::Number(n) => Ok(Value::Number(n)),
            Value::Boolean(b) => Ok(Value::Number(if b { 1.0 } else { 0.0 })),
            Value::None => Ok(Value::Number(0.0)),
            Value::String(s) => s
                .trim()
                .replace('_', "")
                .parse::<f64>()
                .map(Value::Number)
                .map_err(|_| {
                    RuntimeError::new(format!("cannot convert '{}' to number", s), span).into()
                }),
            other => Err(RuntimeError::new(
                format!("cannot convert {} to number", other.type_name()),
                span,
            )
            .into()),
        }
    });

    // copy(value) - New container, shared elements
    define_native(env, "copy", vec![NativeParam::required("value")], |interp, ctx, _span| {
        Ok(interp.arg(ctx, "value").copy())
    });

    // deep_copy(value) - Recursive copy of lists and dictionaries
    define_native(
        env,
        "deep_copy",
        vec![NativeParam::required("value")],
        |interp, ctx, _span| Ok(interp.arg(ctx, "value").deep_copy()),
    );
}
