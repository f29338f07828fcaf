//! UI templating: `tag` and `html` builtins, plus HTML escaping.
//!
//! A tag is a reusable component definition; calling it (or `html`)
//! produces a rendered node whose display form is markup.

use std::rc::Rc;

use crate::interpreter::environment::{ContextId, Environment};
use crate::interpreter::executor::calls::function::render_tag;
use crate::interpreter::executor::{Interpreter, RuntimeResult};
use crate::interpreter::value::{new_dict_map, DictMap, NativeParam, TagDef, Value};
use crate::span::Span;

use super::{define_native, string_arg, type_mismatch};

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Class names from a list of strings or one space-separated string.
fn class_list(value: Value, span: Span) -> RuntimeResult<Vec<String>> {
    match value {
        Value::None => Ok(Vec::new()),
        Value::String(s) => Ok(s.split_whitespace().map(str::to_string).collect()),
        Value::List(items) => items
            .borrow()
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(type_mismatch("classes", "list of strings", other, span)),
            })
            .collect(),
        other => Err(type_mismatch("classes", "list", &other, span)),
    }
}

fn attributes_arg(interp: &Interpreter, ctx: ContextId, span: Span) -> RuntimeResult<DictMap> {
    match interp.arg(ctx, "attributes") {
        Value::None => Ok(new_dict_map()),
        Value::Dictionary(map) => Ok(map.borrow().clone()),
        other => Err(type_mismatch("attributes", "dictionary", &other, span)),
    }
}

pub fn register_html_builtins(env: &mut Environment) {
    // tag(name, classes = [], id?, attributes = {}) - Component definition
    define_native(
        env,
        "tag",
        vec![
            NativeParam::required("name"),
            NativeParam::optional("classes", Value::list(Vec::new())),
            NativeParam::optional("id", Value::None),
            NativeParam::optional("attributes", Value::None),
        ],
        |interp, ctx, span| {
            let name = string_arg(interp, ctx, "name", span)?;
            let classes = class_list(interp.arg(ctx, "classes"), span)?;
            let id = match interp.arg(ctx, "id") {
                Value::None => None,
                Value::String(id) => Some(id),
                other => return Err(type_mismatch("id", "string", &other, span)),
            };
            let attributes = attributes_arg(interp, ctx, span)?;
            Ok(Value::Tag(Rc::new(TagDef {
                name,
                classes,
                id,
                attributes,
            })))
        },
    );

    // html(name, attributes = {}, ...children) - Rendered node; "class" and
    // "id" attributes are lifted out
    define_native(
        env,
        "html",
        vec![
            NativeParam::required("name"),
            NativeParam::optional("attributes", Value::None),
            NativeParam::rest("children"),
        ],
        |interp, ctx, span| {
            let name = string_arg(interp, ctx, "name", span)?;
            let mut attributes = attributes_arg(interp, ctx, span)?;
            let classes = match attributes.shift_remove("class") {
                Some(value) => class_list(value, span)?,
                None => Vec::new(),
            };
            let id = attributes.shift_remove("id").map(|id| id.to_string());
            let children = match interp.arg(ctx, "children") {
                Value::List(items) => items.borrow().clone(),
                _ => Vec::new(),
            };
            let tag = TagDef {
                name,
                classes,
                id,
                attributes,
            };
            Ok(render_tag(&tag, children))
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(source: &str) -> String {
        let mut interp = Interpreter::new();
        let result = interp.run(source, "<test>").unwrap();
        result.last().map(|v| v.to_string()).unwrap_or_default()
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_calling_a_tag_renders_children() {
        let source = r#"
var button = tag("button", ["btn", "primary"], "ok", {"type": "submit"})
button("Save", ["<now>"])
"#;
        assert_eq!(
            render(source),
            r#"<button id="ok" class="btn primary" type="submit">Save&lt;now&gt;</button>"#
        );
    }

    #[test]
    fn test_html_nests_nodes() {
        let source =
            r#"html("ul", {"class": "menu"}, html("li", none, "a"), html("li", none, "b"))"#;
        assert_eq!(
            render(source),
            r#"<ul class="menu"><li>a</li><li>b</li></ul>"#
        );
    }

    #[test]
    fn test_tag_fields_are_readable() {
        assert_eq!(render(r#"tag("p", "lead note").classes"#), r#"["lead", "note"]"#);
        assert_eq!(render(r#"len(html("p", none, 1, 2))"#), "2");
    }
}
