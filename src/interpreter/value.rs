//! Runtime values for the Lumen interpreter.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{FunctionDecl, TypeAnnotation, TypeKind, Visibility};
use crate::interpreter::builtins::html::html_escape;
use crate::interpreter::environment::ContextId;
use crate::interpreter::executor::{Interpreter, RuntimeResult};
use crate::span::Span;

/// Insertion-ordered map backing dictionaries, fields and statics.
pub type DictMap = IndexMap<String, Value, ahash::RandomState>;

pub fn new_dict_map() -> DictMap {
    IndexMap::with_hasher(ahash::RandomState::new())
}

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    None,
    /// Shared, mutable list; assignment aliases.
    List(Rc<RefCell<Vec<Value>>>),
    /// Shared, insertion-ordered string-keyed map.
    Dictionary(Rc<RefCell<DictMap>>),
    /// User-defined function, lambda or bound method.
    Function(Rc<UserFunction>),
    /// Host function.
    NativeFunction(Rc<NativeFunction>),
    /// Host function bound to a receiver (`xs.append`).
    NativeMethod(Rc<NativeMethod>),
    Class(Rc<ClassDef>),
    Instance(Rc<ClassInstance>),
    Enum(Rc<EnumDef>),
    /// Component definition created by `tag(...)`.
    Tag(Rc<TagDef>),
    /// Rendered node created by `html(...)` or by calling a tag.
    Html(Rc<HtmlNode>),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn dict(map: DictMap) -> Value {
        Value::Dictionary(Rc::new(RefCell::new(map)))
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::String(s.into())
    }

    /// Name of this value's kind as reported by `type()` and in errors.
    pub fn type_name(&self) -> String {
        match self {
            Value::Number(_) => "number".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Boolean(_) => "bool".to_string(),
            Value::None => "none".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Dictionary(_) => "dict".to_string(),
            Value::Function(_) | Value::NativeFunction(_) | Value::NativeMethod(_) => {
                "function".to_string()
            }
            Value::Class(_) => "class".to_string(),
            Value::Instance(instance) => instance.class.name.clone(),
            Value::Enum(_) => "enum".to_string(),
            Value::Tag(_) => "tag".to_string(),
            Value::Html(_) => "html".to_string(),
        }
    }

    /// Truthiness: zero, empty containers, empty strings, false and none are false.
    pub fn is_true(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
            Value::None => false,
            Value::List(items) => !items.borrow().is_empty(),
            Value::Dictionary(map) => !map.borrow().is_empty(),
            _ => true,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Function(_)
                | Value::NativeFunction(_)
                | Value::NativeMethod(_)
                | Value::Class(_)
                | Value::Tag(_)
        )
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// A snapshot of the list's elements.
    pub fn as_list(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items.borrow().clone()),
            _ => None,
        }
    }

    /// Copy semantics of the `copy()` builtin: scalars are duplicated, lists
    /// and dictionaries get a new container holding the same elements, every
    /// other kind is shared.
    pub fn copy(&self) -> Value {
        match self {
            Value::List(items) => Value::list(items.borrow().clone()),
            Value::Dictionary(map) => Value::dict(map.borrow().clone()),
            other => other.clone(),
        }
    }

    /// Like [`Value::copy`] but recurses into nested lists and dictionaries.
    pub fn deep_copy(&self) -> Value {
        match self {
            Value::List(items) => {
                Value::list(items.borrow().iter().map(Value::deep_copy).collect())
            }
            Value::Dictionary(map) => {
                let mut copied = new_dict_map();
                for (key, value) in map.borrow().iter() {
                    copied.insert(key.clone(), value.deep_copy());
                }
                Value::dict(copied)
            }
            other => other.clone(),
        }
    }

    /// Literal form: strings are quoted, everything else matches `Display`.
    pub fn repr(&self) -> String {
        match self {
            Value::String(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }

    /// Convert to the host data model for native interop. Instances become
    /// objects tagged with `__class__`; callables become descriptive strings.
    pub fn to_host(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9.0e15 {
                    Json::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number)
                }
            }
            Value::String(s) => Json::String(s.clone()),
            Value::Boolean(b) => Json::Bool(*b),
            Value::None => Json::Null,
            Value::List(items) => Json::Array(items.borrow().iter().map(Value::to_host).collect()),
            Value::Dictionary(map) => Json::Object(
                map.borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_host()))
                    .collect(),
            ),
            Value::Instance(instance) => {
                let mut object = serde_json::Map::new();
                object.insert("__class__".to_string(), Json::String(instance.class.name.clone()));
                for (k, v) in instance.fields.borrow().iter() {
                    object.insert(k.clone(), v.to_host());
                }
                Json::Object(object)
            }
            Value::Html(node) => Json::String(node.to_string()),
            other => Json::String(other.to_string()),
        }
    }

    /// Inverse of [`Value::to_host`] for data kinds.
    pub fn from_host(json: &serde_json::Value) -> Value {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::None,
            Json::Bool(b) => Value::Boolean(*b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::list(items.iter().map(Value::from_host).collect()),
            Json::Object(object) => {
                let mut map = new_dict_map();
                for (k, v) in object {
                    map.insert(k.clone(), Value::from_host(v));
                }
                Value::dict(map)
            }
        }
    }
}

/// Display form of a number: integral values print without a fraction.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "nan".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::None => write!(f, "none"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item.repr())?;
                }
                write!(f, "]")
            }
            Value::Dictionary(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", key, value.repr())?;
                }
                write!(f, "}}")
            }
            Value::Function(func) => match &func.owner {
                Some(owner) => write!(f, "<method {}.{}>", owner.name, func.name),
                None => write!(f, "<function {}>", func.name),
            },
            Value::NativeFunction(native) => write!(f, "<native function {}>", native.name),
            Value::NativeMethod(method) => write!(
                f,
                "<native method {}.{}>",
                method.receiver.type_name(),
                method.function.name
            ),
            Value::Class(class) => write!(f, "<class {}>", class.name),
            Value::Instance(instance) => write!(f, "<{} instance>", instance.class.name),
            Value::Enum(def) => write!(f, "<enum {}>", def.name),
            Value::Tag(tag) => write!(f, "<tag {}>", tag.name),
            Value::Html(node) => write!(f, "{}", node),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name(), self.repr())
    }
}

/// Check a value against a declared type. Builtin names are matched
/// case-insensitively; any other name must be the instance's class or one
/// of its ancestors.
pub fn value_matches_type(value: &Value, expected: &TypeAnnotation) -> bool {
    match &expected.kind {
        TypeKind::Any | TypeKind::Dynamic => true,
        TypeKind::Named(name) => match name.to_lowercase().as_str() {
            "number" | "num" | "int" | "float" => matches!(value, Value::Number(_)),
            "string" | "str" => matches!(value, Value::String(_)),
            "bool" | "boolean" => matches!(value, Value::Boolean(_)),
            "none" => matches!(value, Value::None),
            "list" => matches!(value, Value::List(_)),
            "dict" | "dictionary" => matches!(value, Value::Dictionary(_)),
            "function" => matches!(
                value,
                Value::Function(_) | Value::NativeFunction(_) | Value::NativeMethod(_)
            ),
            "class" => matches!(value, Value::Class(_)),
            "enum" => matches!(value, Value::Enum(_)),
            "tag" => matches!(value, Value::Tag(_)),
            "html" => matches!(value, Value::Html(_)),
            _ => match value {
                Value::Instance(instance) => instance.class.is_a(name),
                _ => false,
            },
        },
    }
}

/// A user-defined function value. Methods are bound by creating a copy
/// whose closure is the instance context.
#[derive(Debug)]
pub struct UserFunction {
    pub name: String,
    pub decl: Rc<FunctionDecl>,
    pub closure: ContextId,
    /// Declaring class, for methods and accessors.
    pub owner: Option<Rc<ClassDef>>,
}

impl UserFunction {
    pub fn span(&self) -> Span {
        self.decl.span
    }
}

/// Host callback. Arguments are read from the call context by parameter name.
pub type NativeCallback = Rc<dyn Fn(&mut Interpreter, ContextId, Span) -> RuntimeResult<Value>>;

/// One parameter of a native function.
#[derive(Debug, Clone)]
pub struct NativeParam {
    pub name: String,
    pub default: Option<Value>,
    pub optional: bool,
    pub rest: bool,
}

impl NativeParam {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            optional: false,
            rest: false,
        }
    }

    pub fn optional(name: impl Into<String>, default: Value) -> Self {
        Self {
            name: name.into(),
            default: Some(default),
            optional: true,
            rest: false,
        }
    }

    pub fn rest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            optional: false,
            rest: true,
        }
    }
}

/// A native/builtin function.
pub struct NativeFunction {
    pub name: String,
    pub params: Vec<NativeParam>,
    pub callback: NativeCallback,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, params: Vec<NativeParam>, callback: F) -> Self
    where
        F: Fn(&mut Interpreter, ContextId, Span) -> RuntimeResult<Value> + 'static,
    {
        Self {
            name: name.into(),
            params,
            callback: Rc::new(callback),
        }
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// A native function bound to the value it was looked up on.
#[derive(Debug)]
pub struct NativeMethod {
    pub receiver: Value,
    pub function: Rc<NativeFunction>,
}

/// A property or method of a class.
#[derive(Debug, Clone)]
pub struct Member {
    pub visibility: Visibility,
    pub is_static: bool,
    pub kind: MemberKind,
}

#[derive(Debug, Clone)]
pub enum MemberKind {
    Property {
        declared_type: Option<TypeAnnotation>,
        initializer: Option<Rc<crate::ast::Expr>>,
    },
    Method(Rc<FunctionDecl>),
}

/// A getter or setter.
#[derive(Debug, Clone)]
pub struct Accessor {
    pub visibility: Visibility,
    pub function: Rc<FunctionDecl>,
}

/// A class definition. Instances are [`ClassInstance`]s.
#[derive(Debug)]
pub struct ClassDef {
    pub name: String,
    pub parent: Option<Rc<ClassDef>>,
    /// Properties and methods declared directly on this class.
    pub members: IndexMap<String, Member, ahash::RandomState>,
    pub getters: IndexMap<String, Accessor, ahash::RandomState>,
    pub setters: IndexMap<String, Accessor, ahash::RandomState>,
    /// Context the class was defined in; parent of every instance context.
    pub context: ContextId,
    pub statics: RefCell<DictMap>,
    pub span: Span,
}

impl ClassDef {
    /// Find a property or method on this class or its ancestors, together with
    /// the class declaring it.
    pub fn find_member<'a>(
        self: &'a Rc<Self>,
        name: &str) -> Option<(&'a Rc<ClassDef>,
        &'a Member,
    ) > {
        let mut current = self;
        loop {
            if let Some(member) = current.members.get(name) {
                return Some((current, member));
            }
            current = current.parent.as_ref()?;
        }
    }

    pub fn find_getter<'a>(
        self: &'a Rc<Self>,
        name: &str) -> Option<(&'a Rc<ClassDef>,
        &'a Accessor,
    ) > {
        let mut current = self;
        loop {
            if let Some(accessor) = current.getters.get(name) {
                return Some((current, accessor));
            }
            current = current.parent.as_ref()?;
        }
    }

    pub fn find_setter<'a>(
        self: &'a Rc<Self>,
        name: &str) -> Option<(&'a Rc<ClassDef>,
        &'a Accessor,
    ) > {
        let mut current = self;
        loop {
            if let Some(accessor) = current.setters.get(name) {
                return Some((current, accessor));
            }
            current = current.parent.as_ref()?;
        }
    }

    /// The class that holds static `name`, searching ancestors.
    pub fn find_static(self: &Rc<Self>, name: &str) -> Option<(Rc<ClassDef>, Value)> {
        let mut current = self.clone();
        loop {
            if let Some(value) = current.statics.borrow().get(name) {
                return Some((current.clone(), value.clone()));
            }
            let parent = current.parent.clone()?;
            current = parent;
        }
    }

    /// Root-first list of this class and its ancestors.
    pub fn lineage(self: &Rc<Self>) -> Vec<Rc<ClassDef>> {
        let mut chain = vec![self.clone()];
        let mut current = self.parent.clone();
        while let Some(class) = current {
            current = class.parent.clone();
            chain.push(class);
        }
        chain.reverse();
        chain
    }

    /// True if this class is `other` or inherits from it.
    pub fn is_subclass_of(self: &Rc<Self>, other: &Rc<ClassDef>) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if Rc::ptr_eq(class, other) {
                return true;
            }
            current = class.parent.as_ref();
        }
        false
    }

    /// True if this class or an ancestor is named `name`.
    pub fn is_a(&self, name: &str) -> bool {
        self.name == name || self.parent.as_ref().is_some_and(|p| p.is_a(name))
    }
}

/// An instance: its own field map plus the context `self` is bound in.
#[derive(Debug)]
pub struct ClassInstance {
    pub class: Rc<ClassDef>,
    pub fields: RefCell<DictMap>,
    pub context: ContextId,
}

/// enum Color { RED, GREEN } maps each name to its ordinal.
#[derive(Debug)]
pub struct EnumDef {
    pub name: String,
    pub variants: IndexMap<String, usize, ahash::RandomState>,
}

/// UI component definition.
#[derive(Debug)]
pub struct TagDef {
    pub name: String,
    pub classes: Vec<String>,
    pub id: Option<String>,
    pub attributes: DictMap,
}

/// Rendered UI node.
#[derive(Debug)]
pub struct HtmlNode {
    pub name: String,
    pub classes: Vec<String>,
    pub id: Option<String>,
    pub attributes: DictMap,
    pub children: Vec<Value>,
}

impl fmt::Display for HtmlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        if let Some(id) = &self.id {
            write!(f, " id=\"{}\"", html_escape(id))?;
        }
        if !self.classes.is_empty() {
            write!(f, " class=\"{}\"", html_escape(&self.classes.join(" ")))?;
        }
        for (key, value) in &self.attributes {
            write!(f, " {}=\"{}\"", key, html_escape(&value.to_string()))?;
        }
        write!(f, ">")?;
        for child in &self.children {
            match child {
                Value::Html(node) => write!(f, "{}", node)?,
                Value::None => {}
                other => write!(f, "{}", html_escape(&other.to_string()))?,
            }
        }
        write!(f, "</{}>", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ty(name: &str) -> TypeAnnotation {
        TypeAnnotation::from_name(name, Span::default())
    }

    #[test]
    fn test_truthiness_is_total() {
        let falsy = [
            Value::Number(0.0),
            Value::string(""),
            Value::list(vec![]),
            Value::dict(new_dict_map()),
            Value::None,
            Value::Boolean(false),
        ];
        for value in &falsy {
            assert!(!value.is_true(), "{:?} should be false", value);
        }
        let truthy = [
            Value::Number(-1.0),
            Value::string("a"),
            Value::list(vec![Value::None]),
            Value::Boolean(true),
        ];
        for value in &truthy {
            assert!(value.is_true(), "{:?} should be true", value);
        }
    }

    #[test]
    fn test_number_display() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-0.5).to_string(), "-0.5");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "inf");
    }

    #[test]
    fn test_display_vs_repr() {
        let list = Value::list(vec![Value::string("a"), Value::Number(1.0), Value::None]);
        assert_eq!(list.to_string(), r#"["a", 1, none]"#);
        assert_eq!(Value::string("hi").to_string(), "hi");
        assert_eq!(Value::string("hi").repr(), "\"hi\"");
    }

    #[test]
    fn test_copy_is_shallow_and_deep_copy_recurses() {
        let inner = Value::list(vec![Value::Number(1.0)]);
        let outer = Value::list(vec![inner.clone()]);

        let shallow = outer.copy();
        let deep = outer.deep_copy();
        if let Value::List(items) = &inner {
            items.borrow_mut().push(Value::Number(2.0));
        }

        assert_eq!(shallow.to_string(), "[[1, 2]]");
        assert_eq!(deep.to_string(), "[[1]]");
        if let (Value::List(a), Value::List(b)) = (&outer, &shallow) {
            assert!(!Rc::ptr_eq(a, b));
        }
    }

    #[test]
    fn test_host_round_trip() {
        let json = serde_json::json!({"name": "lumen", "tags": [1, 2.5, null, true]});
        let value = Value::from_host(&json);
        assert_eq!(value.to_string(), r#"{"name": "lumen", "tags": [1, 2.5, none, true]}"#);
        assert_eq!(value.to_host(), json);
    }

    #[test]
    fn test_value_matches_type_case_insensitive() {
        assert!(value_matches_type(&Value::Number(1.0), &ty("Number")));
        assert!(value_matches_type(&Value::string("x"), &ty("STRING")));
        assert!(!value_matches_type(&Value::string("x"), &ty("number")));
        assert!(value_matches_type(&Value::None, &ty("dynamic")));
        assert!(value_matches_type(&Value::list(vec![]), &ty("any")));
    }

    #[test]
    fn test_html_rendering_escapes_text() {
        let mut attributes = new_dict_map();
        attributes.insert("href".to_string(), Value::string("/a?b=1&c=2"));
        let node = HtmlNode {
            name: "a".to_string(),
            classes: vec!["link".to_string(), "big".to_string()],
            id: None,
            attributes,
            children: vec![Value::string("<click>")],
        };
        assert_eq!(
            node.to_string(),
            r#"<a class="link big" href="/a?b=1&amp;c=2">&lt;click&gt;</a>"#
        );
    }
}
