//! String methods.
//!
//! Strings are immutable; every method returns a new value.

use crate::interpreter::environment::ContextId;
use crate::interpreter::executor::{Interpreter, RuntimeResult};
use crate::interpreter::value::{NativeParam, Value};
use crate::span::Span;

use super::collections::{method, MethodTable};
use super::{string_arg, type_mismatch};

fn receiver(interp: &Interpreter, ctx: ContextId, span: Span) -> RuntimeResult<String> {
    match interp.arg(ctx, "self") {
        Value::String(s) => Ok(s),
        other => Err(type_mismatch("self", "string", &other, span)),
    }
}

pub(crate) fn register_string_methods(table: &mut MethodTable) {
    method(table, "upper", Vec::new(), |interp, ctx, span| {
        Ok(Value::String(receiver(interp, ctx, span)?.to_uppercase()))
    });

    method(table, "lower", Vec::new(), |interp, ctx, span| {
        Ok(Value::String(receiver(interp, ctx, span)?.to_lowercase()))
    });

    method(table, "trim", Vec::new(), |interp, ctx, span| {
        Ok(Value::string(receiver(interp, ctx, span)?.trim()))
    });

    // split(separator?) - Whitespace runs when no separator is given
    method(
        table,
        "split",
        vec![NativeParam::optional("separator", Value::None)],
        |interp, ctx, span| {
            let text = receiver(interp, ctx, span)?;
            let parts: Vec<Value> = match interp.arg(ctx, "separator") {
                Value::None => text.split_whitespace().map(Value::string).collect(),
                Value::String(separator) if separator.is_empty() => {
                    text.chars().map(|c| Value::String(c.to_string())).collect()
                }
                Value::String(separator) => {
                    text.split(separator.as_str()).map(Value::string).collect()
                }
                other => return Err(type_mismatch("separator", "string", &other, span)),
            };
            Ok(Value::list(parts))
        },
    );

    method(table, "contains", vec![NativeParam::required("text")], |interp, ctx, span| {
        let text = receiver(interp, ctx, span)?;
        let needle = string_arg(interp, ctx, "text", span)?;
        Ok(Value::Boolean(text.contains(needle.as_str())))
    });

    // replace(from, to) - Every occurrence
    method(
        table,
        "replace",
        vec![NativeParam::required("from"), NativeParam::required("to")],
        |interp, ctx, span| {
            let text = receiver(interp, ctx, span)?;
            let from = string_arg(interp, ctx, "from", span)?;
            let to = string_arg(interp, ctx, "to", span)?;
            Ok(Value::String(text.replace(from.as_str(), &to)))
        },
    );

    method(table, "starts_with", vec![NativeParam::required("prefix")], |interp, ctx, span| {
        let text = receiver(interp, ctx, span)?;
        let prefix = string_arg(interp, ctx, "prefix", span)?;
        Ok(Value::Boolean(text.starts_with(prefix.as_str())))
    });

    method(table, "ends_with", vec![NativeParam::required("suffix")], |interp, ctx, span| {
        let text = receiver(interp, ctx, span)?;
        let suffix = string_arg(interp, ctx, "suffix", span)?;
        Ok(Value::Boolean(text.ends_with(suffix.as_str())))
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
    fn test_case_and_trim() {
        assert_eq!(eval(r#""Abc".upper()"#), r#""ABC""#);
        assert_eq!(eval(r#""Abc".lower()"#), r#""abc""#);
        assert_eq!(eval(r#""  x  ".trim()"#), r#""x""#);
    }

    #[test]
    fn test_split() {
        assert_eq!(eval(r#""a  b c".split()"#), r#"["a", "b", "c"]"#);
        assert_eq!(eval(r#""a,b".split(",")"#), r#"["a", "b"]"#);
        assert_eq!(eval(r#""ab".split("")"#), r#"["a", "b"]"#);
    }

    #[test]
    fn test_search_and_replace() {
        assert_eq!(eval(r#""hello".contains("ell")"#), "true");
        assert_eq!(eval(r#""hello".starts_with("he")"#), "true");
        assert_eq!(eval(r#""hello".ends_with("x")"#), "false");
        assert_eq!(eval(r#""a-b-c".replace("-", "+")"#), r#""a+b+c""#);
    }

    #[test]
    fn test_argument_types_are_checked() {
        let mut interp = Interpreter::new();
        let err = interp.run(r#""a".contains(1)"#, "<test>").unwrap_err();
        assert!(err.to_string().contains("Expected string for 'text'"));
    }
}
