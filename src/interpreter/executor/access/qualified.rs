//! Static access with `::` (Class::member, Enum::VARIANT).

use crate::ast::Expr;
use crate::error::RuntimeError;
use crate::interpreter::environment::ContextId;
use crate::interpreter::executor::{Evaluated, Interpreter, RuntimeResult};
use crate::interpreter::value::Value;
use crate::span::Span;

impl Interpreter {
    pub(crate) fn evaluate_qualified_name(
        &mut self,
        qualifier: &Expr,
        name: &str,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<Evaluated> {
        let owner = propagate!(self.evaluate(qualifier, ctx)?);
        Ok(Evaluated::normal(self.get_qualified(&owner, name, ctx, span)?))
    }

    pub(crate) fn get_qualified(
        &self,
        owner: &Value,
        name: &str,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<Value> {
        match owner {
            Value::Class(class) => self.get_static(class, name, ctx, span),
            Value::Enum(def) => def
                .variants
                .get(name)
                .map(|ordinal| Value::Number(*ordinal as f64))
                .ok_or_else(|| RuntimeError::no_such_member(&def.name, name, span).into()),
            other => Err(RuntimeError::new(
                format!("'{}' has no static members", other.type_name()),
                span,
            )
            .into()),
        }
    }

    pub(crate) fn set_qualified(
        &self,
        owner: &Value,
        name: &str,
        value: Value,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<()> {
        match owner {
            Value::Class(class) => self.set_static(class, name, value, ctx, span),
            other => Err(RuntimeError::new(
                format!("Cannot assign static member '{}' on {}", name, other.type_name()),
                span,
            )
            .into()),
        }
    }
}
