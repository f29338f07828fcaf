//! Native methods of lists, dictionaries and strings.
//!
//! `value.method` on a built-in value resolves here and yields a native
//! method bound to the receiver. Inside the callback the receiver is the
//! `self` argument.

pub mod dict;
pub mod list;

use std::rc::Rc;

use ahash::AHashMap;

use crate::interpreter::environment::ContextId;
use crate::interpreter::executor::{Interpreter, RuntimeResult};
use crate::interpreter::value::{NativeFunction, NativeParam, Value};
use crate::span::Span;

use super::strings;

pub(crate) type MethodTable = AHashMap<&'static str, Rc<NativeFunction>>;

/// Method tables per receiver kind.
pub struct NativeMethods {
    list: MethodTable,
    dict: MethodTable,
    string: MethodTable,
}

impl Default for NativeMethods {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeMethods {
    pub fn new() -> Self {
        let mut list = MethodTable::new();
        list::register_list_methods(&mut list);
        let mut dict = MethodTable::new();
        dict::register_dict_methods(&mut dict);
        let mut string = MethodTable::new();
        strings::register_string_methods(&mut string);
        Self { list, dict, string }
    }

    /// The native method `name` for `receiver`, if its kind has one.
    pub fn lookup(&self, receiver: &Value, name: &str) -> Option<Rc<NativeFunction>> {
        let table = match receiver {
            Value::List(_) => &self.list,
            Value::Dictionary(_) => &self.dict,
            Value::String(_) => &self.string,
            _ => return None,
        };
        table.get(name).cloned()
    }
}

/// Add a method to `table`.
pub(crate) fn method<F>(
    table: &mut MethodTable,
    name: &'static str,
    params: Vec<NativeParam>,
    callback: F,
) where
    F: Fn(&mut Interpreter, ContextId, Span) -> RuntimeResult<Value> + 'static,
{
    table.insert(name, Rc::new(NativeFunction::new(name, params, callback)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::value::new_dict_map;

    #[test]
    fn test_lookup_by_receiver_kind() {
        let methods = NativeMethods::new();
        assert!(methods.lookup(&Value::list(vec![]), "append").is_some());
        assert!(methods.lookup(&Value::dict(new_dict_map()), "keys").is_some());
        assert!(methods.lookup(&Value::string("a"), "upper").is_some());
        assert!(methods.lookup(&Value::string("a"), "append").is_none());
        assert!(methods.lookup(&Value::Number(1.0), "upper").is_none());
    }
}
