//! Lexical scopes stored in an arena.
//!
//! Every scope is a [`Context`] addressed by a [`ContextId`]. Calls and
//! instantiations push a child whose parent is the callee's defining
//! context. Slots of call contexts nothing captured are recycled on return.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::TypeAnnotation;
use crate::error::{RuntimeError, TypeError};
use crate::interpreter::executor::RuntimeResult;
use crate::interpreter::value::{value_matches_type, ClassDef, Value};
use crate::span::Span;

/// Handle to a context in the [`Environment`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(usize);

impl ContextId {
    pub const ROOT: ContextId = ContextId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// One named slot of a symbol table.
#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    pub declared_type: Option<TypeAnnotation>,
    pub constant: bool,
}

impl Binding {
    fn variable(value: Value, declared_type: Option<TypeAnnotation>) -> Self {
        Self {
            value,
            declared_type,
            constant: false,
        }
    }
}

pub type SymbolTable = IndexMap<String, Binding, ahash::RandomState>;

/// The method a context is executing, used for visibility checks and `super`.
#[derive(Debug, Clone)]
pub struct MethodFrame {
    pub owner: Rc<ClassDef>,
    pub member: String,
}

/// A lexical scope.
#[derive(Debug)]
pub struct Context {
    pub name: String,
    pub parent: Option<ContextId>,
    pub table: SymbolTable,
    pub frame: Option<MethodFrame>,
    captured: bool,
}

impl Context {
    fn new(name: String, parent: Option<ContextId>) -> Self {
        Self {
            name,
            parent,
            table: SymbolTable::with_hasher(ahash::RandomState::new()),
            frame: None,
            captured: false,
        }
    }
}

/// Arena of contexts. The root context has id 0 and is never released.
#[derive(Debug)]
pub struct Environment {
    contexts: Vec<Context>,
    free: Vec<usize>,
    type_checks: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        let mut root = Context::new("<program>".to_string(), None);
        root.captured = true;
        Self {
            contexts: vec![root],
            free: Vec::new(),
            type_checks: true,
        }
    }

    pub fn set_type_checks(&mut self, enabled: bool) {
        self.type_checks = enabled;
    }

    pub fn type_checks(&self) -> bool {
        self.type_checks
    }

    pub fn root(&self) -> ContextId {
        ContextId::ROOT
    }

    /// Create a child context of `parent`.
    pub fn push_child(&mut self, name: impl Into<String>, parent: ContextId) -> ContextId {
        let context = Context::new(name.into(), Some(parent));
        match self.free.pop() {
            Some(slot) => {
                self.contexts[slot] = context;
                ContextId(slot)
            }
            None => {
                self.contexts.push(context);
                ContextId(self.contexts.len() - 1)
            }
        }
    }

    pub fn set_frame(&mut self, ctx: ContextId, frame: MethodFrame) {
        self.contexts[ctx.0].frame = Some(frame);
    }

    /// Nearest method frame in the chain starting at `ctx`.
    pub fn frame_of(&self, ctx: ContextId) -> Option<&MethodFrame> {
        let mut current = Some(ctx);
        while let Some(id) = current {
            let context = &self.contexts[id.0];
            if let Some(frame) = &context.frame {
                return Some(frame);
            }
            current = context.parent;
        }
        None
    }

    pub fn name(&self, ctx: ContextId) -> &str {
        &self.contexts[ctx.0].name
    }

    pub fn parent(&self, ctx: ContextId) -> Option<ContextId> {
        self.contexts[ctx.0].parent
    }

    /// Keep `ctx` and every ancestor alive: something outlives the call that
    /// created it (a closure, a class or an instance).
    pub fn mark_captured(&mut self, ctx: ContextId) {
        let mut current = Some(ctx);
        while let Some(id) = current {
            let context = &mut self.contexts[id.0];
            if context.captured {
                break;
            }
            context.captured = true;
            current = context.parent;
        }
    }

    /// Recycle `ctx` unless it was captured.
    pub fn release(&mut self, ctx: ContextId) {
        let context = &mut self.contexts[ctx.0];
        if context.captured {
            return;
        }
        context.table.clear();
        context.frame = None;
        context.parent = None;
        self.free.push(ctx.0);
        tracing::trace!(context = ctx.0, "released context");
    }

    /// Contexts currently holding state.
    pub fn live_contexts(&self) -> usize {
        self.contexts.len() - self.free.len()
    }

    /// Table in the chain of `ctx` that owns `name`.
    fn owner_of(&self, ctx: ContextId, name: &str) -> Option<ContextId> {
        let mut current = Some(ctx);
        while let Some(id) = current {
            let context = &self.contexts[id.0];
            if context.table.contains_key(name) {
                return Some(id);
            }
            current = context.parent;
        }
        None
    }

    fn root_of(&self, ctx: ContextId) -> ContextId {
        let mut current = ctx;
        while let Some(parent) = self.contexts[current.0].parent {
            current = parent;
        }
        current
    }

    fn check_type(
        &self,
        name: &str,
        value: &Value,
        declared_type: Option<&TypeAnnotation>,
        span: Span,
    ) -> RuntimeResult<()> {
        if !self.type_checks {
            return Ok(());
        }
        match declared_type {
            Some(ty) if !value.is_none() && !value_matches_type(value, ty) => {
                Err(TypeError::mismatch(name, ty.to_string(), value.type_name(), span).into())
            }
            _ => Ok(()),
        }
    }

    /// Bind `name` in the table of `ctx`, shadowing outer bindings. Rebinding
    /// a name that already carries a declared type keeps and checks it.
    /// None satisfies every declared type.
    pub fn declare(
        &mut self,
        ctx: ContextId,
        name: &str,
        value: Value,
        declared_type: Option<TypeAnnotation>,
        span: Span,
    ) -> RuntimeResult<()> {
        let declared_type = match self.contexts[ctx.0].table.get(name) {
            Some(existing) if existing.constant => {
                return Err(RuntimeError::ConstantReassignment(name.to_string(), span).into());
            }
            Some(existing) if declared_type.is_none() => existing.declared_type.clone(),
            _ => declared_type,
        };
        self.check_type(name, &value, declared_type.as_ref(), span)?;
        self.contexts[ctx.0]
            .table
            .insert(name.to_string(), Binding::variable(value, declared_type));
        Ok(())
    }

    /// Bind without checks; used for parameters, `self` and builtins.
    pub fn define(&mut self, ctx: ContextId, name: &str, value: Value) {
        self.contexts[ctx.0]
            .table
            .insert(name.to_string(), Binding::variable(value, None));
    }

    /// Bind a constant in the root-most table reachable from `ctx`.
    pub fn define_constant(
        &mut self,
        ctx: ContextId,
        name: &str,
        value: Value,
        span: Span,
    ) -> RuntimeResult<()> {
        let root = self.root_of(ctx);
        let table = &mut self.contexts[root.0].table;
        if table.get(name).is_some_and(|b| b.constant) {
            return Err(RuntimeError::ConstantReassignment(name.to_string(), span).into());
        }
        table.insert(
            name.to_string(),
            Binding {
                value,
                declared_type: None,
                constant: true,
            },
        );
        Ok(())
    }

    pub fn get(&self, ctx: ContextId, name: &str) -> Option<Value> {
        let owner = self.owner_of(ctx, name)?;
        self.contexts[owner.0].table.get(name).map(|b| b.value.clone())
    }

    /// Like [`Environment::get`] but fails with "undefined identifier".
    pub fn lookup(&self, ctx: ContextId, name: &str, span: Span) -> RuntimeResult<Value> {
        self.get(ctx, name)
            .ok_or_else(|| RuntimeError::undefined_variable(name, span).into())
    }

    /// Replace the value of the nearest existing binding of `name`.
    pub fn assign(
        &mut self,
        ctx: ContextId,
        name: &str,
        value: Value,
        span: Span,
    ) -> RuntimeResult<()> {
        let owner = self
            .owner_of(ctx, name)
            .ok_or_else(|| RuntimeError::undefined_variable(name, span))?;
        let binding = &self.contexts[owner.0].table[name];
        if binding.constant {
            return Err(RuntimeError::ConstantReassignment(name.to_string(), span).into());
        }
        self.check_type(name, &value, binding.declared_type.as_ref(), span)?;
        if let Some(binding) = self.contexts[owner.0].table.get_mut(name) {
            binding.value = value;
        }
        Ok(())
    }

    /// Remove the nearest existing binding of `name`.
    pub fn delete(&mut self, ctx: ContextId, name: &str, span: Span) -> RuntimeResult<()> {
        let owner = self
            .owner_of(ctx, name)
            .ok_or_else(|| RuntimeError::undefined_variable(name, span))?;
        let table = &mut self.contexts[owner.0].table;
        if table.get(name).is_some_and(|b| b.constant) {
            return Err(RuntimeError::ConstantReassignment(name.to_string(), span).into());
        }
        table.shift_remove(name);
        Ok(())
    }

    /// Names bound directly in `ctx`, in declaration order.
    pub fn names(&self, ctx: ContextId) -> Vec<String> {
        self.contexts[ctx.0].table.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ScriptError};
    use pretty_assertions::assert_eq;

    fn span() -> Span {
        Span::default()
    }

    fn number(env: &Environment, ctx: ContextId, name: &str) -> Option<f64> {
        env.get(ctx, name).and_then(|v| v.as_number())
    }

    #[test]
    fn test_lookup_walks_outward() {
        let mut env = Environment::new();
        let root = env.root();
        env.define(root, "x", Value::Number(1.0));
        let child = env.push_child("f", root);
        assert_eq!(number(&env, child, "x"), Some(1.0));
        assert!(env.lookup(child, "missing", span()).is_err());
    }

    #[test]
    fn test_declare_shadows_and_assign_modifies_owner() {
        let mut env = Environment::new();
        let root = env.root();
        env.define(root, "x", Value::Number(1.0));
        let child = env.push_child("f", root);

        env.assign(child, "x", Value::Number(2.0), span()).unwrap();
        assert_eq!(number(&env, root, "x"), Some(2.0));

        env.declare(child, "x", Value::Number(3.0), None, span()).unwrap();
        assert_eq!(number(&env, child, "x"), Some(3.0));
        assert_eq!(number(&env, root, "x"), Some(2.0));
    }

    #[test]
    fn test_assign_without_owner_fails() {
        let mut env = Environment::new();
        let root = env.root();
        let err: ScriptError = env
            .assign(root, "nope", Value::None, span())
            .unwrap_err();
        assert!(err.to_string().contains("Undefined identifier 'nope'"));
    }

    #[test]
    fn test_constants_live_in_root_and_reject_assignment() {
        let mut env = Environment::new();
        let root = env.root();
        let child = env.push_child("f", root);
        env.define_constant(child, "LIMIT", Value::Number(10.0), span())
            .unwrap();
        assert_eq!(env.names(root), vec!["LIMIT".to_string()]);
        assert!(env.assign(child, "LIMIT", Value::None, span()).is_err());
        assert!(env.declare(root, "LIMIT", Value::None, None, span()).is_err());
    }

    #[test]
    fn test_declared_type_is_enforced() {
        let mut env = Environment::new();
        let root = env.root();
        let ty = TypeAnnotation::from_name("number", span());
        env.declare(root, "n", Value::Number(1.0), Some(ty), span())
            .unwrap();

        let err = env
            .assign(root, "n", Value::string("x"), span())
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Type(_)));
        let err = env
            .declare(root, "n", Value::string("x"), None, span())
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Type(_)));

        env.set_type_checks(false);
        env.assign(root, "n", Value::string("x"), span()).unwrap();
    }

    #[test]
    fn test_delete_removes_nearest_binding() {
        let mut env = Environment::new();
        let root = env.root();
        env.define(root, "x", Value::Number(1.0));
        let child = env.push_child("f", root);
        env.delete(child, "x", span()).unwrap();
        assert!(env.get(root, "x").is_none());
        assert!(env.delete(child, "x", span()).is_err());
    }

    #[test]
    fn test_release_recycles_uncaptured_slots() {
        let mut env = Environment::new();
        let root = env.root();
        let call = env.push_child("f", root);
        env.define(call, "tmp", Value::Number(1.0));
        assert_eq!(env.live_contexts(), 2);
        env.release(call);
        assert_eq!(env.live_contexts(), 1);

        let reused = env.push_child("g", root);
        assert_eq!(reused, call);
        assert!(env.get(reused, "tmp").is_none());

        env.mark_captured(reused);
        env.release(reused);
        assert_eq!(env.live_contexts(), 2);
    }

    #[test]
    fn test_root_is_never_released() {
        let mut env = Environment::new();
        env.release(ContextId::ROOT);
        assert_eq!(env.live_contexts(), 1);
    }
}
