//! Dictionary methods.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::interpreter::builtins::type_mismatch;
use crate::interpreter::environment::ContextId;
use crate::interpreter::executor::access::index::dict_key;
use crate::interpreter::executor::{Interpreter, RuntimeResult};
use crate::interpreter::value::{DictMap, NativeParam, Value};
use crate::span::Span;

use super::{method, MethodTable};

fn receiver(
    interp: &Interpreter,
    ctx: ContextId,
    span: Span,
) -> RuntimeResult<Rc<RefCell<DictMap>>> {
    match interp.arg(ctx, "self") {
        Value::Dictionary(map) => Ok(map),
        other => Err(type_mismatch("self", "dictionary", &other, span)),
    }
}

pub(crate) fn register_dict_methods(table: &mut MethodTable) {
    // keys() - In insertion order
    method(table, "keys", Vec::new(), |interp, ctx, span| {
        let map = receiver(interp, ctx, span)?;
        let keys = map.borrow().keys().cloned().map(Value::String).collect();
        Ok(Value::list(keys))
    });

    // values() - In insertion order
    method(table, "values", Vec::new(), |interp, ctx, span| {
        let map = receiver(interp, ctx, span)?;
        let values = map.borrow().values().cloned().collect();
        Ok(Value::list(values))
    });

    // has(key)
    method(table, "has", vec![NativeParam::required("key")], |interp, ctx, span| {
        let map = receiver(interp, ctx, span)?;
        let key = dict_key(&interp.arg(ctx, "key"), span)?;
        let found = map.borrow().contains_key(&key);
        Ok(Value::Boolean(found))
    });

    // get(key, default = none)
    method(
        table,
        "get",
        vec![
            NativeParam::required("key"),
            NativeParam::optional("default", Value::None),
        ],
        |interp, ctx, span| {
            let map = receiver(interp, ctx, span)?;
            let key = dict_key(&interp.arg(ctx, "key"), span)?;
            let value = map.borrow().get(&key).cloned();
            Ok(value.unwrap_or_else(|| interp.arg(ctx, "default")))
        },
    );

    // remove(key) - Remove and return; order of the rest is kept
    method(table, "remove", vec![NativeParam::required("key")], |interp, ctx, span| {
        let map = receiver(interp, ctx, span)?;
        let key = dict_key(&interp.arg(ctx, "key"), span)?;
        let removed = map.borrow_mut().shift_remove(&key);
        removed.ok_or_else(|| RuntimeError::new(format!("Key '{}' not found", key), span).into())
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
    fn test_keys_and_values_keep_insertion_order() {
        assert_eq!(eval(r#"{"b": 1, "a": 2}.keys()"#), r#"["b", "a"]"#);
        assert_eq!(eval(r#"{"b": 1, "a": 2}.values()"#), "[1, 2]");
    }

    #[test]
    fn test_has_get_remove() {
        assert_eq!(eval(r#"{"a": 1}.has("a")"#), "true");
        assert_eq!(eval(r#"{"a": 1}.get("b", 5)"#), "5");
        assert_eq!(
            eval("var d = {\"a\": 1, \"b\": 2, \"c\": 3}\nd.remove(\"b\")\nd"),
            r#"{"a": 1, "c": 3}"#
        );
    }

    #[test]
    fn test_remove_missing_key_fails() {
        let mut interp = Interpreter::new();
        let err = interp.run(r#"{"a": 1}.remove("z")"#, "<test>").unwrap_err();
        assert!(err.to_string().contains("Key 'z' not found"));
    }
}
