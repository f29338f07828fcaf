//! Variable access, assignment and deletion.

use crate::ast::{BinaryOp, Expr, ExprKind};
use crate::error::{ParserError, ScriptError};
use crate::interpreter::environment::ContextId;
use crate::span::Span;

use super::operators::apply_binary;
use super::{Evaluated, Interpreter, RuntimeResult};

impl Interpreter {
    /// Evaluate variable access expressions.
    pub(crate) fn evaluate_variable(
        &mut self,
        name: &str,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<Evaluated> {
        Ok(Evaluated::normal(self.env.lookup(ctx, name, span)?))
    }

    /// `x = v` declares in the current context; `x op= v` modifies the
    /// nearest existing binding. Member, index and static targets store in
    /// place.
    pub(crate) fn evaluate_assign(
        &mut self,
        target: &Expr,
        operator: Option<BinaryOp>,
        value: &Expr,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<Evaluated> {
        match &target.kind {
            ExprKind::Variable(name) => {
                let rhs = propagate!(self.evaluate(value, ctx)?);
                match operator {
                    None => {
                        self.env.declare(ctx, name, rhs.clone(), None, span)?;
                        Ok(Evaluated::normal(rhs))
                    }
                    Some(op) => {
                        let current = self.env.lookup(ctx, name, target.span)?;
                        let updated = apply_binary(op, &current, &rhs, span)?;
                        self.env.assign(ctx, name, updated.clone(), span)?;
                        Ok(Evaluated::normal(updated))
                    }
                }
            }

            ExprKind::Member { object, name, .. } => {
                let receiver = propagate!(self.evaluate(object, ctx)?);
                let rhs = propagate!(self.evaluate(value, ctx)?);
                let updated = match operator {
                    None => rhs,
                    Some(op) => {
                        let current = self.get_member(receiver.clone(), name, ctx, target.span)?;
                        apply_binary(op, &current, &rhs, span)?
                    }
                };
                self.set_member(&receiver, name, updated.clone(), ctx, span)?;
                Ok(Evaluated::normal(updated))
            }

            ExprKind::Index { object, index, .. } => {
                let receiver = propagate!(self.evaluate(object, ctx)?);
                let index = propagate!(self.evaluate(index, ctx)?);
                let rhs = propagate!(self.evaluate(value, ctx)?);
                let updated = match operator {
                    None => rhs,
                    Some(op) => {
                        let current = self.get_index(&receiver, &index, target.span)?;
                        apply_binary(op, &current, &rhs, span)?
                    }
                };
                self.set_index(&receiver, &index, updated.clone(), span)?;
                Ok(Evaluated::normal(updated))
            }

            ExprKind::QualifiedName { qualifier, name } => {
                let owner = propagate!(self.evaluate(qualifier, ctx)?);
                let rhs = propagate!(self.evaluate(value, ctx)?);
                let updated = match operator {
                    None => rhs,
                    Some(op) => {
                        let current = self.get_qualified(&owner, name, ctx, target.span)?;
                        apply_binary(op, &current, &rhs, span)?
                    }
                };
                self.set_qualified(&owner, name, updated.clone(), ctx, span)?;
                Ok(Evaluated::normal(updated))
            }

            _ => Err(ScriptError::from(ParserError::invalid_assignment_target(
                target.span,
            ))),
        }
    }

    /// `del name`, `del xs[i]`, `del xs[a:b]`, `del d[key]`.
    pub(crate) fn delete_target(
        &mut self,
        target: &Expr,
        ctx: ContextId,
    ) -> RuntimeResult<Evaluated> {
        match &target.kind {
            ExprKind::Variable(name) => {
                self.env.delete(ctx, name, target.span)?;
            }
            ExprKind::Index { object, index, .. } => {
                let receiver = propagate!(self.evaluate(object, ctx)?);
                let index = propagate!(self.evaluate(index, ctx)?);
                self.delete_index(&receiver, &index, target.span)?;
            }
            ExprKind::Slice {
                object, start, end, ..
            } => {
                let receiver = propagate!(self.evaluate(object, ctx)?);
                let start = match start {
                    Some(e) => Some(propagate!(self.evaluate(e, ctx)?)),
                    None => None,
                };
                let end = match end {
                    Some(e) => Some(propagate!(self.evaluate(e, ctx)?)),
                    None => None,
                };
                self.delete_slice(&receiver, start.as_ref(), end.as_ref(), target.span)?;
            }
            _ => {
                return Err(ScriptError::from(ParserError::general(
                    "Can only delete a name, an index or a slice",
                    target.span,
                )))
            }
        }
        Ok(Evaluated::none())
    }
}
