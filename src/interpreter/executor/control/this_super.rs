//! self and super keyword evaluation.

use crate::error::{RuntimeError, ScriptError};
use crate::interpreter::environment::ContextId;
use crate::interpreter::executor::{Evaluated, Interpreter, RuntimeResult};
use crate::interpreter::executor::access::member::bind_method;
use crate::interpreter::value::{MemberKind, Value};
use crate::span::Span;

impl Interpreter {
    /// Evaluate 'self' expression.
    pub(crate) fn evaluate_self(&mut self, ctx: ContextId, span: Span) -> RuntimeResult<Evaluated> {
        self.env
            .get(ctx, "self")
            .map(Evaluated::normal)
            .ok_or_else(|| RuntimeError::new("'self' used outside of a method", span).into())
    }

    /// Evaluate `super` (the parent's version of the running method) or
    /// `super.name` (a parent member), bound to the current instance.
    pub(crate) fn evaluate_super(
        &mut self,
        name: Option<&str>,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<Evaluated> {
        let frame = self.env.frame_of(ctx).cloned().ok_or_else(|| {
            ScriptError::from(RuntimeError::new("'super' used outside of a method", span))
        })?;
        let parent = frame.owner.parent.clone().ok_or_else(|| {
            ScriptError::from(RuntimeError::new(
                format!("'{}' has no parent class", frame.owner.name),
                span,
            ))
        })?;
        let member = name.unwrap_or(frame.member.as_str());

        let instance = match self.env.get(ctx, "self") {
            Some(Value::Instance(instance)) => instance,
            _ => return Ok(Evaluated::normal(self.get_static(&parent, member, ctx, span)?)),
        };

        if name.is_some() {
            let value = self.instance_member(&instance, &parent, member, false, ctx, span)?;
            return Ok(Evaluated::normal(value));
        }

        match parent.find_member(member) {
            Some((declaring, found)) => match &found.kind {
                MemberKind::Method(decl) if !found.is_static => {
                    self.check_access(declaring, found.visibility, member, ctx, span)?;
                    Ok(Evaluated::normal(bind_method(&instance, declaring, decl)))
                }
                _ => Err(RuntimeError::not_callable(format!("super.{}", member), span).into()),
            },
            None => Err(RuntimeError::no_such_member(&parent.name, member, span).into()),
        }
    }
}
