//! Member access (obj.field, obj.method) and member assignment.

use std::rc::Rc;

use crate::ast::{FunctionDecl, Visibility};
use crate::error::{RuntimeError, ScriptError, TypeError};
use crate::interpreter::environment::ContextId;
use crate::interpreter::executor::{Interpreter, RuntimeResult};
use crate::interpreter::value::{
    value_matches_type, ClassDef, ClassInstance, MemberKind, NativeMethod, UserFunction, Value,
};
use crate::span::Span;

/// A method of `owner` bound to `instance`: its closure is the instance
/// context, so `self` resolves to the instance.
pub(crate) fn bind_method(
    instance: &Rc<ClassInstance>,
    owner: &Rc<ClassDef>,
    decl: &Rc<FunctionDecl>,
) -> Value {
    Value::Function(Rc::new(UserFunction {
        name: decl.name.clone(),
        decl: decl.clone(),
        closure: instance.context,
        owner: Some(owner.clone()),
    }))
}

impl Interpreter {
    /// Enforce `visibility` of `member` declared on `declaring` for code
    /// running in `ctx`.
    pub(crate) fn check_access(
        &self,
        declaring: &Rc<ClassDef>,
        visibility: Visibility,
        member: &str,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<()> {
        let allowed = match visibility {
            Visibility::Public => true,
            Visibility::Private => self
                .env
                .frame_of(ctx)
                .is_some_and(|frame| Rc::ptr_eq(&frame.owner, declaring)),
            Visibility::Protected => self
                .env
                .frame_of(ctx)
                .is_some_and(|frame| frame.owner.is_subclass_of(declaring)),
        };
        if allowed {
            Ok(())
        } else {
            Err(RuntimeError::IllegalAccess {
                visibility: visibility.to_string(),
                class: declaring.name.clone(),
                member: member.to_string(),
                span,
            }
            .into())
        }
    }

    /// Read `receiver.name`.
    pub(crate) fn get_member(
        &mut self,
        receiver: Value,
        name: &str,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<Value> {
        match &receiver {
            Value::Instance(instance) => {
                let class = instance.class.clone();
                self.instance_member(instance, &class, name, true, ctx, span)
            }
            Value::Class(class) => self.get_static(class, name, ctx, span),
            Value::Enum(def) => def
                .variants
                .get(name)
                .map(|ordinal| Value::Number(*ordinal as f64))
                .ok_or_else(|| RuntimeError::no_such_member(&def.name, name, span).into()),
            Value::Dictionary(map) => {
                if let Some(value) = map.borrow().get(name) {
                    return Ok(value.clone());
                }
                self.native_method(&receiver, name, span)
            }
            Value::Tag(tag) => match name {
                "name" => Ok(Value::string(tag.name.clone())),
                "classes" => Ok(Value::list(
                    tag.classes.iter().cloned().map(Value::String).collect(),
                )),
                "id" => Ok(tag.id.clone().map_or(Value::None, Value::String)),
                "attributes" => Ok(Value::dict(tag.attributes.clone())),
                _ => Err(RuntimeError::no_such_member("tag", name, span).into()),
            },
            Value::Html(node) => match name {
                "name" => Ok(Value::string(node.name.clone())),
                "classes" => Ok(Value::list(
                    node.classes.iter().cloned().map(Value::String).collect(),
                )),
                "id" => Ok(node.id.clone().map_or(Value::None, Value::String)),
                "attributes" => Ok(Value::dict(node.attributes.clone())),
                "children" => Ok(Value::list(node.children.clone())),
                _ => Err(RuntimeError::no_such_member("html", name, span).into()),
            },
            _ => self.native_method(&receiver, name, span),
        }
    }

    fn native_method(&self, receiver: &Value, name: &str, span: Span) -> RuntimeResult<Value> {
        match self.methods.lookup(receiver, name) {
            Some(function) => Ok(Value::NativeMethod(Rc::new(NativeMethod {
                receiver: receiver.clone(),
                function,
            }))),
            None => Err(RuntimeError::no_such_member(receiver.type_name(), name, span).into()),
        }
    }

    /// Resolve `name` on `instance`, searching the class chain from `start`.
    /// Order: own fields, getters, methods.
    pub(crate) fn instance_member(
        &mut self,
        instance: &Rc<ClassInstance>,
        start: &Rc<ClassDef>,
        name: &str,
        include_fields: bool,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<Value> {
        if include_fields {
            let field = instance.fields.borrow().get(name).cloned();
            if let Some(value) = field {
                if let Some((declaring, member)) = start.find_member(name) {
                    self.check_access(declaring, member.visibility, name, ctx, span)?;
                }
                return Ok(value);
            }
        }

        if let Some((declaring, accessor)) = start.find_getter(name) {
            self.check_access(declaring, accessor.visibility, name, ctx, span)?;
            let getter = bind_method(instance, declaring, &accessor.function);
            return self.call_value(getter, Vec::new(), span);
        }

        if let Some((declaring, member)) = start.find_member(name) {
            if let (MemberKind::Method(decl), false) = (&member.kind, member.is_static) {
                self.check_access(declaring, member.visibility, name, ctx, span)?;
                return Ok(bind_method(instance, declaring, decl));
            }
            if !include_fields {
                if let MemberKind::Property { .. } = member.kind {
                    self.check_access(declaring, member.visibility, name, ctx, span)?;
                    let field = instance.fields.borrow().get(name).cloned();
                    return Ok(field.unwrap_or(Value::None));
                }
            }
        }

        Err(RuntimeError::no_such_member(&start.name, name, span).into())
    }

    /// Read a static member of `class` or one of its ancestors.
    pub(crate) fn get_static(
        &self,
        class: &Rc<ClassDef>,
        name: &str,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<Value> {
        let (holder, value) = class.find_static(name).ok_or_else(|| {
            ScriptError::from(RuntimeError::no_such_member(&class.name, name, span))
        })?;
        if let Some(member) = holder.members.get(name) {
            self.check_access(&holder, member.visibility, name, ctx, span)?;
        }
        Ok(value)
    }

    /// Write a static member. Existing statics are updated on the class that
    /// holds them; new names are added to `class`.
    pub(crate) fn set_static(
        &self,
        class: &Rc<ClassDef>,
        name: &str,
        value: Value,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<()> {
        let holder = match class.find_static(name) {
            Some((holder, _)) => holder,
            None => class.clone(),
        };
        if let Some(member) = holder.members.get(name) {
            self.check_access(&holder, member.visibility, name, ctx, span)?;
            if let MemberKind::Property {
                declared_type: Some(ty),
                ..
            } = &member.kind
            {
                self.check_property_type(name, &value, ty, span)?;
            }
        }
        holder.statics.borrow_mut().insert(name.to_string(), value);
        Ok(())
    }

    pub(crate) fn check_property_type(
        &self,
        name: &str,
        value: &Value,
        declared_type: &crate::ast::TypeAnnotation,
        span: Span,
    ) -> RuntimeResult<()> {
        if self.options.type_checks && !value.is_none() && !value_matches_type(value, declared_type)
        {
            return Err(TypeError::mismatch(
                name,
                declared_type.to_string(),
                value.type_name(),
                span,
            )
            .into());
        }
        Ok(())
    }

    /// Write `receiver.name = value`.
    pub(crate) fn set_member(
        &mut self,
        receiver: &Value,
        name: &str,
        value: Value,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<()> {
        match receiver {
            Value::Instance(instance) => self.set_instance_member(instance, name, value, ctx, span),
            Value::Class(class) => self.set_static(class, name, value, ctx, span),
            Value::Dictionary(map) => {
                map.borrow_mut().insert(name.to_string(), value);
                Ok(())
            }
            other => Err(RuntimeError::new(
                format!("Cannot set member '{}' on {}", name, other.type_name()),
                span,
            )
            .into()),
        }
    }

    /// Order: declared or existing field, setter, getter (read-only), new field.
    fn set_instance_member(
        &mut self,
        instance: &Rc<ClassInstance>,
        name: &str,
        value: Value,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<()> {
        let class = instance.class.clone();
        let has_field = instance.fields.borrow().contains_key(name);
        if has_field {
            if let Some((declaring, member)) = class.find_member(name) {
                self.check_access(declaring, member.visibility, name, ctx, span)?;
                if let MemberKind::Property {
                    declared_type: Some(ty),
                    ..
                } = &member.kind
                {
                    self.check_property_type(name, &value, ty, span)?;
                }
            }
            instance.fields.borrow_mut().insert(name.to_string(), value);
            return Ok(());
        }

        if let Some((declaring, accessor)) = class.find_setter(name) {
            self.check_access(declaring, accessor.visibility, name, ctx, span)?;
            let setter = bind_method(instance, declaring, &accessor.function);
            self.call_value(setter, vec![value], span)?;
            return Ok(());
        }

        if class.find_getter(name).is_some() {
            return Err(RuntimeError::new(
                format!("Property '{}' of '{}' is read-only", name, class.name),
                span,
            )
            .into());
        }

        instance.fields.borrow_mut().insert(name.to_string(), value);
        Ok(())
    }
}
