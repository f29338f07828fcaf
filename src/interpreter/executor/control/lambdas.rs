//! Function values: named declarations and anonymous functions.

use std::rc::Rc;

use crate::ast::FunctionDecl;
use crate::interpreter::environment::ContextId;
use crate::interpreter::executor::Interpreter;
use crate::interpreter::value::{UserFunction, Value};

impl Interpreter {
    /// Close `decl` over `ctx`. The context is kept alive from now on.
    pub(crate) fn make_function(&mut self, decl: &Rc<FunctionDecl>, ctx: ContextId) -> Value {
        self.env.mark_captured(ctx);
        Value::Function(Rc::new(UserFunction {
            name: decl.name.clone(),
            decl: decl.clone(),
            closure: ctx,
            owner: None,
        }))
    }
}
