//! List and dictionary literal evaluation.

use crate::ast::Expr;
use crate::interpreter::environment::ContextId;
use crate::interpreter::value::{new_dict_map, Value};

use super::access::index::dict_key;
use super::{Evaluated, Interpreter, RuntimeResult};

impl Interpreter {
    pub(crate) fn evaluate_list(
        &mut self,
        items: &[Expr],
        ctx: ContextId,
    ) -> RuntimeResult<Evaluated> {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            values.push(propagate!(self.evaluate(item, ctx)?));
        }
        Ok(Evaluated::normal(Value::list(values)))
    }

    pub(crate) fn evaluate_dict(
        &mut self,
        pairs: &[(Expr, Expr)],
        ctx: ContextId,
    ) -> RuntimeResult<Evaluated> {
        let mut map = new_dict_map();
        for (key_expr, value_expr) in pairs {
            let key = propagate!(self.evaluate(key_expr, ctx)?);
            let key = dict_key(&key, key_expr.span)?;
            let value = propagate!(self.evaluate(value_expr, ctx)?);
            map.insert(key, value);
        }
        Ok(Evaluated::normal(Value::dict(map)))
    }
}
