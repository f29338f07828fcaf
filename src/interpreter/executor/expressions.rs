//! Expression evaluation.
//!
//! `evaluate` is the dispatch point; each kind of node is handled by a
//! focused method in a sibling module. Postfix chains (`.`, `[]`, `()`)
//! go through [`Interpreter::chain_link`] so a `?.` can short-circuit
//! everything after it.

use crate::ast::{Expr, ExprKind};
use crate::interpreter::environment::ContextId;
use crate::interpreter::value::Value;

use super::{Evaluated, Interpreter, RuntimeResult, Signal};

impl Interpreter {
    /// Evaluate an expression.
    pub(crate) fn evaluate(&mut self, expr: &Expr, ctx: ContextId) -> RuntimeResult<Evaluated> {
        match &expr.kind {
            // Literals
            ExprKind::Number(n) => Ok(Evaluated::normal(Value::Number(*n))),
            ExprKind::String(s) => Ok(Evaluated::normal(Value::String(s.clone()))),
            ExprKind::Bool(b) => Ok(Evaluated::normal(Value::Boolean(*b))),
            ExprKind::None => Ok(Evaluated::none()),
            ExprKind::List(items) => self.evaluate_list(items, ctx),
            ExprKind::Dict(pairs) => self.evaluate_dict(pairs, ctx),

            // Names
            ExprKind::Variable(name) => self.evaluate_variable(name, ctx, expr.span),
            ExprKind::SelfRef => self.evaluate_self(ctx, expr.span),
            ExprKind::Super(name) => self.evaluate_super(name.as_deref(), ctx, expr.span),

            // Chains break at parentheses
            ExprKind::Grouping(inner) => self.evaluate(inner, ctx),

            // Operators
            ExprKind::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, *operator, right, ctx, expr.span),
            ExprKind::Unary { operator, operand } => {
                self.evaluate_unary(*operator, operand, ctx, expr.span)
            }
            ExprKind::LogicalAnd { left, right } => self.evaluate_logical_and(left, right, ctx),
            ExprKind::LogicalOr { left, right } => self.evaluate_logical_or(left, right, ctx),

            // Postfix chains
            ExprKind::Call { .. }
            | ExprKind::Member { .. }
            | ExprKind::Index { .. }
            | ExprKind::Slice { .. } => {
                Ok(self.chain_link(expr, ctx)?.unwrap_or_else(Evaluated::none))
            }

            ExprKind::QualifiedName { qualifier, name } => {
                self.evaluate_qualified_name(qualifier, name, ctx, expr.span)
            }

            ExprKind::New {
                class_expr,
                arguments,
            } => self.evaluate_new(class_expr, arguments, ctx, expr.span),

            ExprKind::Assign {
                target,
                operator,
                value,
            } => self.evaluate_assign(target, *operator, value, ctx, expr.span),

            ExprKind::Function(decl) => Ok(Evaluated::normal(self.make_function(decl, ctx))),

            // Control flow
            ExprKind::If {
                cases,
                else_branch,
                propagate,
            } => self.evaluate_if(cases, else_branch.as_deref(), *propagate, ctx),
            ExprKind::For {
                variable,
                start,
                end,
                step,
                body,
            } => self.evaluate_for(
                variable,
                start.as_deref(),
                end,
                step.as_deref(),
                body,
                ctx,
                expr.span,
            ),
            ExprKind::Foreach {
                first,
                second,
                iterable,
                body,
            } => self.evaluate_foreach(first, second.as_deref(), iterable, body, ctx, expr.span),
            ExprKind::While { condition, body } => self.evaluate_while(condition, body, ctx),
            ExprKind::Switch {
                subject,
                cases,
                default,
            } => self.evaluate_switch(subject, cases, default.as_deref(), ctx),
        }
    }

    /// Evaluate one link of a postfix chain. `None` means a `?.` earlier in
    /// the chain met a none receiver and the whole chain yields none.
    pub(crate) fn chain_link(
        &mut self,
        expr: &Expr,
        ctx: ContextId,
    ) -> RuntimeResult<Option<Evaluated>> {
        match &expr.kind {
            ExprKind::Member {
                object,
                name,
                optional,
            } => {
                let Some(receiver) = self.chain_link(object, ctx)? else {
                    return Ok(None);
                };
                let receiver = propagate!(receiver, Some);
                if *optional && receiver.is_none() {
                    return Ok(None);
                }
                let value = self.get_member(receiver, name, ctx, expr.span)?;
                Ok(Some(Evaluated::normal(value)))
            }

            ExprKind::Index {
                object,
                index,
                optional,
            } => {
                let Some(receiver) = self.chain_link(object, ctx)? else {
                    return Ok(None);
                };
                let receiver = propagate!(receiver, Some);
                if *optional && receiver.is_none() {
                    return Ok(None);
                }
                let index = propagate!(self.evaluate(index, ctx)?, Some);
                let value = self.get_index(&receiver, &index, expr.span)?;
                Ok(Some(Evaluated::normal(value)))
            }

            ExprKind::Slice {
                object,
                start,
                end,
                optional,
            } => {
                let Some(receiver) = self.chain_link(object, ctx)? else {
                    return Ok(None);
                };
                let receiver = propagate!(receiver, Some);
                if *optional && receiver.is_none() {
                    return Ok(None);
                }
                let start = match start {
                    Some(e) => Some(propagate!(self.evaluate(e, ctx)?, Some)),
                    None => None,
                };
                let end = match end {
                    Some(e) => Some(propagate!(self.evaluate(e, ctx)?, Some)),
                    None => None,
                };
                let value = self.get_slice(&receiver, start.as_ref(), end.as_ref(), expr.span)?;
                Ok(Some(Evaluated::normal(value)))
            }

            ExprKind::Call {
                callee,
                arguments,
                optional,
            } => {
                let Some(callee_value) = self.chain_link(callee, ctx)? else {
                    return Ok(None);
                };
                let callee_value = propagate!(callee_value, Some);
                if *optional && callee_value.is_none() {
                    return Ok(None);
                }
                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(propagate!(self.evaluate(argument, ctx)?, Some));
                }
                let value = self.call_value(callee_value, args, expr.span)?;
                if let Some(code) = self.exit_requested {
                    return Ok(Some(Evaluated::with_signal(Value::None, Signal::Exit(code))));
                }
                Ok(Some(Evaluated::normal(value)))
            }

            _ => Ok(Some(self.evaluate(expr, ctx)?)),
        }
    }
}
