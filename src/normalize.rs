//! Reduces canonical nodes to their explicit form.

use crate::backend::Backend;
use crate::build::BuildOptions;
use crate::descriptor::{Descriptor, Node};
use crate::events::EventHandler;
use crate::selector;
use std::collections::BTreeMap;

/// A node with its shorthand tag resolved: a plain tag name and independent fields.
pub struct Explicit<B: Backend> {
    pub tag: String,
    pub attr: Option<BTreeMap<String, String>>,
    pub markup: Option<String>,
    pub style: BTreeMap<String, String>,
    pub events: Vec<(String, EventHandler<B::Event>)>,
    pub children: Vec<Descriptor<B>>,
    pub name: Option<String>,
}

impl<B: Backend> Explicit<B> {
    /// The first token of the class attribute, used for implicit scope bindings.
    pub fn leading_class(&self) -> Option<&str> {
        let class = self.attr.as_ref()?.get("class")?;
        class.split(' ').next()
    }
}

/// Resolves the shorthand in `node.tag` and merges it with the node’s explicit fields.
///
/// - Non-empty text after the tag becomes markup unless the node has non-empty markup of its own.
/// - Shorthand classes and ids are written into a copy of the node’s attributes, so other
///   attributes survive but `class` and `id` are replaced.
/// - An empty name counts as no name.
pub fn explicit<B: Backend>(node: Node<B>, options: &BuildOptions) -> Explicit<B> {
    let Node {
        tag,
        mut attr,
        markup,
        style,
        events,
        children,
        name,
    } = node;

    let mut parsed_markup = None;
    let tag = match tag.as_deref() {
        None | Some("") => options.default_tag.clone(),
        Some(tag) => {
            let sel = selector::parse(tag);
            parsed_markup = sel.text.filter(|text| !text.is_empty()).map(str::to_string);

            if sel.has_fragments() {
                let attr = attr.get_or_insert_with(BTreeMap::new);
                if let Some(classes) = sel.class_list() {
                    attr.insert("class".to_string(), classes);
                }
                if let Some(id) = sel.id {
                    attr.insert("id".to_string(), id.to_string());
                }
            }

            if sel.tag.is_empty() {
                options.default_tag.clone()
            } else {
                sel.tag.to_string()
            }
        }
    };

    let markup = match (parsed_markup, markup) {
        (_, Some(markup)) if !markup.is_empty() => Some(markup),
        (Some(parsed), _) => Some(parsed),
        (None, markup) => markup,
    };

    Explicit {
        tag,
        attr,
        markup,
        style,
        events,
        children,
        name: name.filter(|name| !name.is_empty()),
    }
}

#[cfg(test)]
type TestNode = Node<crate::memory::Document<()>>;

#[cfg(test)]
fn attr_of<B: Backend>(explicit: &Explicit<B>, name: &str) -> Option<String> {
    explicit.attr.as_ref()?.get(name).cloned()
}

#[test]
fn test_default_tag() {
    let options = BuildOptions::default();
    let exp = explicit(TestNode::new(), &options);
    assert_eq!(exp.tag, "div");
    assert!(exp.attr.is_none());
    assert!(exp.markup.is_none());

    let exp = explicit(TestNode::new().tag(".card"), &options);
    assert_eq!(exp.tag, "div");
    assert_eq!(attr_of(&exp, "class").as_deref(), Some("card"));

    let options = BuildOptions {
        default_tag: "section".to_string(),
        ..BuildOptions::default()
    };
    assert_eq!(explicit(TestNode::new().tag("#x"), &options).tag, "section");
}

#[test]
fn test_plain_tag_has_no_attr() {
    let exp = explicit(TestNode::new().tag("span"), &BuildOptions::default());
    assert_eq!(exp.tag, "span");
    assert!(exp.attr.is_none());
    assert!(exp.markup.is_none());
    assert_eq!(exp.leading_class(), None);
}

#[test]
fn test_shorthand_merges_with_attr() {
    let node = TestNode::new()
        .tag("input.field.wide#email")
        .attr("type", "email")
        .attr("class", "overwritten");
    let exp = explicit(node, &BuildOptions::default());
    assert_eq!(exp.tag, "input");
    assert_eq!(attr_of(&exp, "type").as_deref(), Some("email"));
    assert_eq!(attr_of(&exp, "class").as_deref(), Some("field wide"));
    assert_eq!(attr_of(&exp, "id").as_deref(), Some("email"));
    assert_eq!(exp.leading_class(), Some("field"));
}

#[test]
fn test_attr_without_fragments_is_kept() {
    let node = TestNode::new().tag("a").attr("class", "link plain");
    let exp = explicit(node, &BuildOptions::default());
    assert_eq!(attr_of(&exp, "class").as_deref(), Some("link plain"));
    assert_eq!(exp.leading_class(), Some("link"));
}

#[test]
fn test_markup_precedence() {
    let options = BuildOptions::default();

    let exp = explicit(TestNode::new().tag("span hello"), &options);
    assert_eq!(exp.markup.as_deref(), Some("hello"));

    let exp = explicit(TestNode::new().tag("span hello").markup("bye"), &options);
    assert_eq!(exp.markup.as_deref(), Some("bye"));

    // empty explicit markup only applies when the tag has no text
    let exp = explicit(TestNode::new().tag("span hello").markup(""), &options);
    assert_eq!(exp.markup.as_deref(), Some("hello"));
    let exp = explicit(TestNode::new().tag("span").markup(""), &options);
    assert_eq!(exp.markup.as_deref(), Some(""));

    // a trailing space is not text
    assert_eq!(explicit(TestNode::new().tag("span "), &options).markup, None);

    // markup works without a tag
    let exp = explicit(TestNode::new().markup("x"), &options);
    assert_eq!(exp.markup.as_deref(), Some("x"));
}

#[test]
fn test_empty_name_is_no_name() {
    let options = BuildOptions::default();
    assert_eq!(explicit(TestNode::new().name(""), &options).name, None);
    assert_eq!(
        explicit(TestNode::new().name("root"), &options).name.as_deref(),
        Some("root")
    );
}
