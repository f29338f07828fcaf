//! Statement execution.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::*;
use crate::interpreter::environment::ContextId;
use crate::interpreter::value::{EnumDef, Value};

use super::{Evaluated, Interpreter, RuntimeResult, Signal};

impl Interpreter {
    /// Execute a statement.
    pub(crate) fn execute(&mut self, stmt: &Stmt, ctx: ContextId) -> RuntimeResult<Evaluated> {
        match &stmt.kind {
            StmtKind::Expression(expr) => self.evaluate(expr, ctx),

            StmtKind::Var {
                name,
                declared_type,
                initializer,
            } => {
                let value = match initializer {
                    Some(init) => propagate!(self.evaluate(init, ctx)?),
                    None => Value::None,
                };
                self.env
                    .declare(ctx, name, value.clone(), declared_type.clone(), stmt.span)?;
                Ok(Evaluated::normal(value))
            }

            StmtKind::Const { name, value } => {
                let value = propagate!(self.evaluate(value, ctx)?);
                self.env
                    .define_constant(ctx, name, value.clone(), stmt.span)?;
                Ok(Evaluated::normal(value))
            }

            StmtKind::Block(statements) => self.execute_sequence(statements, ctx),

            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => propagate!(self.evaluate(expr, ctx)?),
                    None => Value::None,
                };
                Ok(Evaluated::with_signal(value, Signal::Return))
            }

            StmtKind::Break => Ok(Evaluated::with_signal(Value::None, Signal::Break)),

            StmtKind::Continue => Ok(Evaluated::with_signal(Value::None, Signal::Continue)),

            StmtKind::Delete(target) => self.delete_target(target, ctx),

            StmtKind::Function(decl) => {
                let function = self.make_function(decl, ctx);
                self.env
                    .declare(ctx, &decl.name, function.clone(), None, stmt.span)?;
                Ok(Evaluated::normal(function))
            }

            StmtKind::Class(decl) => {
                let class = propagate!(self.define_class(decl, ctx)?);
                self.env
                    .declare(ctx, &decl.name, class.clone(), None, stmt.span)?;
                Ok(Evaluated::normal(class))
            }

            StmtKind::Enum(decl) => {
                let mut variants = IndexMap::with_hasher(ahash::RandomState::new());
                for (ordinal, variant) in decl.variants.iter().enumerate() {
                    variants.insert(variant.clone(), ordinal);
                }
                let value = Value::Enum(Rc::new(EnumDef {
                    name: decl.name.clone(),
                    variants,
                }));
                self.env
                    .declare(ctx, &decl.name, value.clone(), None, stmt.span)?;
                Ok(Evaluated::normal(value))
            }
        }
    }

    /// Run statements in order in `ctx`. The value is the list of every
    /// statement's value; a signal stops the sequence and is passed up.
    pub(crate) fn execute_sequence(
        &mut self,
        statements: &[Stmt],
        ctx: ContextId,
    ) -> RuntimeResult<Evaluated> {
        let mut values = Vec::with_capacity(statements.len());
        for stmt in statements {
            let evaluated = self.execute(stmt, ctx)?;
            if evaluated.is_interrupted() {
                return Ok(evaluated);
            }
            // exit() reached through a getter, setter or constructor
            if let Some(code) = self.exit_requested {
                return Ok(Evaluated::with_signal(Value::None, Signal::Exit(code)));
            }
            values.push(evaluated.value);
        }
        Ok(Evaluated::normal(Value::list(values)))
    }
}
