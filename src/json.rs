//! JSON descriptors.
//!
//! Descriptors can be written as plain JSON:
//!
//! ```json
//! ["ul.menu", [
//!     "li.item Home",
//!     { "tag": "li.item", "as": "last", "attr": { "data-x": 1 }, "innerHTML": "About" },
//!     null
//! ]]
//! ```
//!
//! Falsy values (`null`, `false`, `0`, `""`) are empty descriptors. Event handlers have no JSON
//! form.

use crate::backend::Backend;
use crate::build::BuildOptions;
use crate::descriptor::{Descriptor, Node};
use crate::selector;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors when reading JSON descriptors or options.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("field `{field}` must be {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },

    #[error("event handlers cannot be described in JSON")]
    EventsUnsupported,
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn invalid(field: &str, expected: &'static str) -> JsonError {
    JsonError::InvalidField {
        field: field.to_string(),
        expected,
    }
}

/// Reads attribute and style values the way the DOM stringifies them.
fn scalar(field: &str, value: &Value) -> Result<Option<String>, JsonError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(_) | Value::Object(_) => Err(invalid(field, "a string, number or boolean")),
    }
}

fn string_map(
    field: &str,
    value: &Value,
) -> Result<Option<BTreeMap<String, String>>, JsonError> {
    match value {
        Value::Null => Ok(None),
        Value::Object(entries) => {
            let mut map = BTreeMap::new();
            for (key, value) in entries {
                if let Some(value) = scalar(&format!("{}.{}", field, key), value)? {
                    map.insert(key.clone(), value);
                }
            }
            Ok(Some(map))
        }
        _ => Err(invalid(field, "an object")),
    }
}

fn optional_string(
    object: &Map<String, Value>,
    field: &str,
) -> Result<Option<String>, JsonError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(field, "a string")),
    }
}

/// Anything but an array means no children.
fn children<B: Backend>(value: Option<&Value>) -> Result<Vec<Descriptor<B>>, JsonError> {
    match value {
        Some(Value::Array(items)) => items.iter().map(Descriptor::<B>::from_json).collect(),
        _ => Ok(Vec::new()),
    }
}

fn has_text(tag: Option<&str>) -> bool {
    tag.and_then(|tag| selector::parse(tag).text)
        .map_or(false, |text| !text.is_empty())
}

fn node<B: Backend>(object: &Map<String, Value>) -> Result<Node<B>, JsonError> {
    if object.get("events").map_or(false, |events| !events.is_null()) {
        return Err(JsonError::EventsUnsupported);
    }

    let tag = optional_string(object, "tag")?;

    // falsy markup only fills in for a tag without text
    let markup = match object.get("innerHTML") {
        Some(value) if is_falsy(value) && has_text(tag.as_deref()) => None,
        Some(value) => scalar("innerHTML", value)?,
        None => None,
    };

    Ok(Node {
        tag,
        attr: match object.get("attr") {
            Some(value) => string_map("attr", value)?,
            None => None,
        },
        markup,
        style: match object.get("style") {
            Some(value) => string_map("style", value)?.unwrap_or_default(),
            None => BTreeMap::new(),
        },
        events: Vec::new(),
        children: children(object.get("children"))?,
        name: optional_string(object, "as")?,
    })
}

impl<B: Backend> Descriptor<B> {
    /// Reads a descriptor from a JSON value.
    ///
    /// Arrays are pairs: the first entry is the head and the second the children. A missing or
    /// non-array second entry means no children; an empty array is a node with no fields.
    /// Any other truthy value (`true`, non-zero numbers) is a node with no fields as well.
    pub fn from_json(value: &Value) -> Result<Self, JsonError> {
        if is_falsy(value) {
            return Ok(Descriptor::Empty);
        }

        match value {
            Value::Null => Ok(Descriptor::Empty),
            Value::String(tag) => Ok(Descriptor::Tag(tag.clone())),
            Value::Array(items) => match items.first() {
                None => Ok(Descriptor::Node(Node::default())),
                Some(head) => {
                    let head = Descriptor::from_json(head)?;
                    Ok(Descriptor::Pair(Box::new(head), children(items.get(1))?))
                }
            },
            Value::Object(object) => Ok(Descriptor::Node(node(object)?)),
            Value::Bool(_) | Value::Number(_) => Ok(Descriptor::Node(Node::default())),
        }
    }

    /// Parses JSON text into a descriptor.
    pub fn from_json_str(text: &str) -> Result<Self, JsonError> {
        let value: Value = serde_json::from_str(text)?;
        Descriptor::from_json(&value)
    }
}

impl BuildOptions {
    /// Reads options from a JSON object. Missing keys keep their defaults.
    ///
    /// ```json
    /// { "default_tag": "span", "implicit_binding": false }
    /// ```
    pub fn from_json(value: &Value) -> Result<Self, JsonError> {
        let object = match value {
            Value::Object(object) => object,
            _ => return Err(invalid("options", "an object")),
        };

        let mut options = BuildOptions::default();
        if let Some(tag) = optional_string(object, "default_tag")? {
            options.default_tag = tag;
        }
        match object.get("implicit_binding") {
            None | Some(Value::Null) => (),
            Some(Value::Bool(enabled)) => options.implicit_binding = *enabled,
            Some(_) => return Err(invalid("implicit_binding", "a boolean")),
        }
        Ok(options)
    }
}

#[cfg(test)]
type TestDescriptor = Descriptor<crate::memory::Document<()>>;

#[test]
fn test_falsy_values() {
    use serde_json::json;

    for value in &[json!(null), json!(false), json!(0), json!(0.0), json!("")] {
        assert!(TestDescriptor::from_json(value).unwrap().is_empty(), "{}", value);
    }
}

#[test]
fn test_invalid_values() {
    use serde_json::json;

    assert!(matches!(
        TestDescriptor::from_json(&json!({ "tag": 3 })),
        Err(JsonError::InvalidField { ref field, .. }) if field == "tag"
    ));
    assert!(matches!(
        TestDescriptor::from_json(&json!({ "attr": { "x": [1] } })),
        Err(JsonError::InvalidField { ref field, .. }) if field == "attr.x"
    ));
    assert!(matches!(
        TestDescriptor::from_json(&json!({ "events": { "click": "f" } })),
        Err(JsonError::EventsUnsupported)
    ));
    assert!(matches!(
        TestDescriptor::from_json_str("{ nope"),
        Err(JsonError::Syntax(_))
    ));
}

#[test]
fn test_truthy_scalars_are_default_nodes() {
    use serde_json::json;

    for value in &[json!(true), json!(5), json!(-0.5)] {
        match TestDescriptor::from_json(value).unwrap() {
            Descriptor::Node(node) => {
                assert!(node.tag.is_none(), "{}", value);
                assert!(node.children.is_empty());
            }
            other => panic!("expected a node, got {:?}", other),
        }
    }

    match TestDescriptor::from_json(&json!(["ul", [5]])).unwrap() {
        Descriptor::Pair(_, children) => {
            assert_eq!(children.len(), 1);
            assert!(matches!(children[0], Descriptor::Node(ref node) if node.tag.is_none()));
        }
        other => panic!("expected a pair, got {:?}", other),
    }
}

#[test]
fn test_non_array_children_are_ignored() {
    use serde_json::json;

    for children in &[json!(5), json!("li"), json!({ "tag": "li" }), json!(true)] {
        match TestDescriptor::from_json(&json!({ "tag": "ul", "children": children })).unwrap() {
            Descriptor::Node(node) => assert!(node.children.is_empty(), "{}", children),
            other => panic!("expected a node, got {:?}", other),
        }
        match TestDescriptor::from_json(&json!(["ul", children])).unwrap() {
            Descriptor::Pair(_, pair_children) => assert!(pair_children.is_empty()),
            other => panic!("expected a pair, got {:?}", other),
        }
    }
}

#[test]
fn test_falsy_markup_keeps_tag_text() {
    use crate::normalize::explicit;
    use serde_json::json;

    let options = BuildOptions::default();
    let markup = |value: serde_json::Value| match TestDescriptor::from_json(&value).unwrap() {
        Descriptor::Node(node) => explicit(node, &options).markup,
        other => panic!("expected a node, got {:?}", other),
    };

    for inner in &[json!(0), json!(false), json!(null), json!("")] {
        let value = json!({ "tag": "span hello", "innerHTML": inner });
        assert_eq!(markup(value).as_deref(), Some("hello"), "{}", inner);
    }
    assert_eq!(markup(json!({ "tag": "span hello", "innerHTML": 7 })).as_deref(), Some("7"));

    // without tag text, falsy values are still stringified and assigned
    assert_eq!(markup(json!({ "tag": "span", "innerHTML": 0 })).as_deref(), Some("0"));
    assert_eq!(markup(json!({ "innerHTML": false })).as_deref(), Some("false"));
    assert_eq!(markup(json!({ "tag": "span", "innerHTML": null })), None);
}

#[test]
fn test_object_fields() {
    use serde_json::json;

    let value = json!({
        "tag": "a.link",
        "attr": { "href": "/", "tabindex": 1, "hidden": false, "skip": null },
        "style": { "opacity": 0.5 },
        "innerHTML": "home",
        "as": "home",
        "children": [null, "span"],
    });
    let node = match TestDescriptor::from_json(&value).unwrap() {
        Descriptor::Node(node) => node,
        other => panic!("expected a node, got {:?}", other),
    };
    let attr = node.attr.unwrap();
    assert_eq!(attr.get("href").map(String::as_str), Some("/"));
    assert_eq!(attr.get("tabindex").map(String::as_str), Some("1"));
    assert_eq!(attr.get("hidden").map(String::as_str), Some("false"));
    assert!(!attr.contains_key("skip"));
    assert_eq!(node.style.get("opacity").map(String::as_str), Some("0.5"));
    assert_eq!(node.markup.as_deref(), Some("home"));
    assert_eq!(node.name.as_deref(), Some("home"));
    assert_eq!(node.children.len(), 2);
    assert!(node.children[0].is_empty());
}

#[test]
fn test_arrays() {
    use serde_json::json;

    match TestDescriptor::from_json(&json!([])).unwrap() {
        Descriptor::Node(node) => assert!(node.tag.is_none()),
        other => panic!("expected a node, got {:?}", other),
    }
    match TestDescriptor::from_json(&json!(["ul", ["li", "li"]])).unwrap() {
        Descriptor::Pair(head, children) => {
            assert!(matches!(*head, Descriptor::Tag(ref tag) if tag == "ul"));
            assert_eq!(children.len(), 2);
        }
        other => panic!("expected a pair, got {:?}", other),
    }
    match TestDescriptor::from_json(&json!(["p", "not children"])).unwrap() {
        Descriptor::Pair(_, children) => assert!(children.is_empty()),
        other => panic!("expected a pair, got {:?}", other),
    }
}

#[test]
fn test_options() {
    use serde_json::json;

    let options = BuildOptions::from_json(&json!({ "default_tag": "span" })).unwrap();
    assert_eq!(options.default_tag, "span");
    assert!(options.implicit_binding);

    let options = BuildOptions::from_json(&json!({ "implicit_binding": false })).unwrap();
    assert_eq!(options.default_tag, "div");
    assert!(!options.implicit_binding);

    assert!(BuildOptions::from_json(&json!([])).is_err());
    assert!(BuildOptions::from_json(&json!({ "implicit_binding": "no" })).is_err());
}
