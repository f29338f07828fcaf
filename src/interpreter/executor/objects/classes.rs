//! Class definition and instantiation.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{ClassDecl, Expr, MemberDeclKind};
use crate::error::{RuntimeError, ScriptError};
use crate::interpreter::environment::{ContextId, MethodFrame};
use crate::interpreter::executor::access::member::bind_method;
use crate::interpreter::executor::{Evaluated, Interpreter, RuntimeResult};
use crate::interpreter::value::{
    new_dict_map, Accessor, ClassDef, ClassInstance, Member, MemberKind, UserFunction, Value,
};
use crate::span::Span;

impl Interpreter {
    /// Build a class from its declaration in `ctx`. Static properties are
    /// initialized here, in declaration order.
    pub(crate) fn define_class(
        &mut self,
        decl: &ClassDecl,
        ctx: ContextId,
    ) -> RuntimeResult<Evaluated> {
        let parent = match &decl.superclass {
            Some(expr) => match propagate!(self.evaluate(expr, ctx)?) {
                Value::Class(class) => Some(class),
                other => {
                    return Err(RuntimeError::new(
                        format!(
                            "'{}' cannot extend {}: not a class",
                            decl.name,
                            other.type_name()
                        ),
                        expr.span,
                    )
                    .into())
                }
            },
            None => None,
        };

        let mut members = IndexMap::with_hasher(ahash::RandomState::new());
        let mut getters = IndexMap::with_hasher(ahash::RandomState::new());
        let mut setters = IndexMap::with_hasher(ahash::RandomState::new());
        for member in &decl.members {
            match &member.kind {
                MemberDeclKind::Property {
                    declared_type,
                    initializer,
                } => {
                    members.insert(
                        member.name.clone(),
                        Member {
                            visibility: member.visibility,
                            is_static: member.is_static,
                            kind: MemberKind::Property {
                                declared_type: declared_type.clone(),
                                initializer: initializer.clone().map(Rc::new),
                            },
                        },
                    );
                }
                MemberDeclKind::Method(function) => {
                    members.insert(
                        member.name.clone(),
                        Member {
                            visibility: member.visibility,
                            is_static: member.is_static,
                            kind: MemberKind::Method(function.clone()),
                        },
                    );
                }
                MemberDeclKind::Getter(function) => {
                    getters.insert(
                        member.name.clone(),
                        Accessor {
                            visibility: member.visibility,
                            function: function.clone(),
                        },
                    );
                }
                MemberDeclKind::Setter(function) => {
                    setters.insert(
                        member.name.clone(),
                        Accessor {
                            visibility: member.visibility,
                            function: function.clone(),
                        },
                    );
                }
            }
        }

        self.env.mark_captured(ctx);
        let class = Rc::new(ClassDef {
            name: decl.name.clone(),
            parent,
            members,
            getters,
            setters,
            context: ctx,
            statics: RefCell::new(new_dict_map()),
            span: decl.span,
        });

        // Statics, with the class itself as method owner
        let init_ctx = self.env.push_child(format!("{}::<static>", class.name), ctx);
        self.env.set_frame(
            init_ctx,
            MethodFrame {
                owner: class.clone(),
                member: "<static>".to_string(),
            },
        );
        let result = self.initialize_statics(&class, init_ctx);
        self.env.release(init_ctx);
        result?;

        tracing::trace!(class = %class.name, "defined class");
        Ok(Evaluated::normal(Value::Class(class)))
    }

    fn initialize_statics(
        &mut self,
        class: &Rc<ClassDef>,
        init_ctx: ContextId,
    ) -> RuntimeResult<()> {
        for (name, member) in &class.members {
            if !member.is_static {
                continue;
            }
            let value = match &member.kind {
                MemberKind::Property {
                    declared_type,
                    initializer,
                } => {
                    let value = match initializer {
                        Some(expr) => self.evaluate(expr, init_ctx)?.value,
                        None => Value::None,
                    };
                    if let Some(ty) = declared_type {
                        self.check_property_type(name, &value, ty, class.span)?;
                    }
                    value
                }
                MemberKind::Method(decl) => Value::Function(Rc::new(UserFunction {
                    name: decl.name.clone(),
                    decl: decl.clone(),
                    closure: class.context,
                    owner: Some(class.clone()),
                })),
            };
            class.statics.borrow_mut().insert(name.clone(), value);
        }
        Ok(())
    }

    /// Evaluate class instantiation: new Class(arguments)
    pub(crate) fn evaluate_new(
        &mut self,
        class_expr: &Expr,
        arguments: &[Expr],
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<Evaluated> {
        let class = match propagate!(self.evaluate(class_expr, ctx)?) {
            Value::Class(class) => class,
            other => {
                return Err(RuntimeError::new(
                    format!("expected a class after 'new', got {}", other.type_name()),
                    class_expr.span,
                )
                .into())
            }
        };

        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(propagate!(self.evaluate(argument, ctx)?));
        }

        let instance = self.instantiate(&class, args, span)?;
        Ok(Evaluated::normal(instance))
    }

    /// Create an instance: a captured context under the class's defining
    /// context with `self` bound, every property of the chain pre-seeded with
    /// none, initializers run parent-first, then `__init`.
    pub(crate) fn instantiate(
        &mut self,
        class: &Rc<ClassDef>,
        args: Vec<Value>,
        span: Span,
    ) -> RuntimeResult<Value> {
        tracing::trace!(class = %class.name, args = args.len(), "instantiate");

        let instance_ctx = self
            .env
            .push_child(format!("<{} instance>", class.name), class.context);
        self.env.mark_captured(instance_ctx);

        let lineage = class.lineage();
        let mut fields = new_dict_map();
        for ancestor in &lineage {
            for (name, member) in &ancestor.members {
                if !member.is_static && matches!(member.kind, MemberKind::Property { .. }) {
                    fields.insert(name.clone(), Value::None);
                }
            }
        }

        let instance = Rc::new(ClassInstance {
            class: class.clone(),
            fields: RefCell::new(fields),
            context: instance_ctx,
        });
        self.env
            .define(instance_ctx, "self", Value::Instance(instance.clone()));

        for ancestor in &lineage {
            self.initialize_properties(&instance, ancestor)?;
        }

        match class.find_member("__init") {
            Some((owner, Member {
                kind: MemberKind::Method(decl),
                is_static: false,
                ..
            })) => {
                let init = bind_method(&instance, owner, decl);
                self.call_value(init, args, span)?;
            }
            _ if !args.is_empty() => {
                return Err(ScriptError::from(RuntimeError::too_many_arguments(
                    format!("new {}", class.name),
                    0,
                    args.len(),
                    span,
                )))
            }
            _ => {}
        }

        Ok(Value::Instance(instance))
    }

    /// Run the property initializers `class` declares, with `class` as the
    /// executing owner so private members are reachable.
    fn initialize_properties(
        &mut self,
        instance: &Rc<ClassInstance>,
        class: &Rc<ClassDef>,
    ) -> RuntimeResult<()> {
        let has_initializers = class.members.values().any(|member| {
            !member.is_static
                && matches!(
                    member.kind,
                    MemberKind::Property {
                        initializer: Some(_),
                        ..
                    }
                )
        });
        if !has_initializers {
            return Ok(());
        }

        let init_ctx = self
            .env
            .push_child(format!("{}::<init>", class.name), instance.context);
        self.env.set_frame(
            init_ctx,
            MethodFrame {
                owner: class.clone(),
                member: "<init>".to_string(),
            },
        );

        let mut result = Ok(());
        for (name, member) in &class.members {
            if member.is_static {
                continue;
            }
            if let MemberKind::Property {
                declared_type,
                initializer: Some(initializer),
            } = &member.kind
            {
                let value = match self.evaluate(initializer, init_ctx) {
                    Ok(evaluated) => evaluated.value,
                    Err(e) => {
                        result = Err(e);
                        break;
                    }
                };
                if let Some(ty) = declared_type {
                    if let Err(e) = self.check_property_type(name, &value, ty, initializer.span) {
                        result = Err(e);
                        break;
                    }
                }
                instance.fields.borrow_mut().insert(name.clone(), value);
            }
        }

        self.env.release(init_ctx);
        result
    }
}
