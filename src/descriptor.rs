//! Descriptors: compact descriptions of element trees.

use crate::backend::Backend;
use crate::events::EventHandler;
use core::fmt;
use std::collections::BTreeMap;

/// Describes one element and its subtree.
///
/// Descriptors are cheap throwaway values; building consumes them.
pub enum Descriptor<B: Backend> {
    /// Produces no element. Empty children are skipped without taking up a slot.
    Empty,
    /// An element that already exists; returned as-is.
    Element(B::Element),
    /// A bare shorthand tag string, e.g. `"li.item Hello"`.
    Tag(String),
    /// A head (usually a tag string) and a list of children, e.g. `("ul", vec!["li", "li"])`.
    Pair(Box<Descriptor<B>>, Vec<Descriptor<B>>),
    /// The canonical form.
    Node(Node<B>),
}

/// The canonical descriptor form. All fields are optional.
pub struct Node<B: Backend> {
    /// Tag name, possibly with shorthand classes, id and trailing text.
    pub tag: Option<String>,
    /// Attributes. Shorthand classes and ids are merged into these.
    pub attr: Option<BTreeMap<String, String>>,
    /// Raw markup content. Overrides text from the tag unless empty.
    pub markup: Option<String>,
    /// Inline style properties.
    pub style: BTreeMap<String, String>,
    /// Event listeners, attached in order.
    pub events: Vec<(String, EventHandler<B::Event>)>,
    pub children: Vec<Descriptor<B>>,
    /// Name under which the element is bound in the scope.
    pub name: Option<String>,
}

/// Result of coercing a descriptor.
pub enum Coerced<B: Backend> {
    /// Nothing to build.
    Skip,
    /// A pre-built element.
    Element(B::Element),
    /// A node to be normalized and materialized.
    Node(Node<B>),
}

impl<B: Backend> Descriptor<B> {
    /// Wraps an existing element.
    pub fn element(element: B::Element) -> Self {
        Descriptor::Element(element)
    }

    /// Returns true for [`Descriptor::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Descriptor::Empty)
    }

    /// Reduces any descriptor shape to a canonical node, a pre-built element, or nothing.
    ///
    /// For pairs, the head is coerced first and then receives the pair’s children. A pre-built
    /// element in head position wins and the children are dropped.
    pub fn coerce(self) -> Coerced<B> {
        match self {
            Descriptor::Empty => Coerced::Skip,
            Descriptor::Element(element) => Coerced::Element(element),
            Descriptor::Tag(tag) => Coerced::Node(Node::new().tag(tag)),
            Descriptor::Pair(head, children) => match head.coerce() {
                Coerced::Skip => Coerced::Node(Node {
                    children,
                    ..Node::default()
                }),
                Coerced::Element(element) => Coerced::Element(element),
                Coerced::Node(mut node) => {
                    node.children = children;
                    Coerced::Node(node)
                }
            },
            Descriptor::Node(node) => Coerced::Node(node),
        }
    }
}

impl<B: Backend> Node<B> {
    pub fn new() -> Self {
        Node::default()
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attr
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = Some(markup.into());
        self
    }

    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(property.into(), value.into());
        self
    }

    /// Adds an event listener. Adding the same event twice attaches both handlers.
    pub fn on(mut self, event: impl Into<String>, handler: EventHandler<B::Event>) -> Self {
        self.events.push((event.into(), handler));
        self
    }

    pub fn child(mut self, child: impl Into<Descriptor<B>>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Descriptor<B>>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Binds the built element in the scope under `name`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<B: Backend> Default for Node<B> {
    fn default() -> Self {
        Node {
            tag: None,
            attr: None,
            markup: None,
            style: BTreeMap::new(),
            events: Vec::new(),
            children: Vec::new(),
            name: None,
        }
    }
}

impl<B: Backend> Clone for Node<B> {
    fn clone(&self) -> Self {
        Node {
            tag: self.tag.clone(),
            attr: self.attr.clone(),
            markup: self.markup.clone(),
            style: self.style.clone(),
            events: self.events.clone(),
            children: self.children.clone(),
            name: self.name.clone(),
        }
    }
}

impl<B: Backend> Clone for Descriptor<B> {
    fn clone(&self) -> Self {
        match self {
            Descriptor::Empty => Descriptor::Empty,
            Descriptor::Element(element) => Descriptor::Element(element.clone()),
            Descriptor::Tag(tag) => Descriptor::Tag(tag.clone()),
            Descriptor::Pair(head, children) => Descriptor::Pair(head.clone(), children.clone()),
            Descriptor::Node(node) => Descriptor::Node(node.clone()),
        }
    }
}

impl<B: Backend> fmt::Debug for Node<B>
where
    B::Element: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Node")
            .field("tag", &self.tag)
            .field("attr", &self.attr)
            .field("markup", &self.markup)
            .field("style", &self.style)
            .field("events", &self.events)
            .field("children", &self.children)
            .field("name", &self.name)
            .finish()
    }
}

impl<B: Backend> fmt::Debug for Descriptor<B>
where
    B::Element: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Descriptor::Empty => write!(f, "Empty"),
            Descriptor::Element(element) => f.debug_tuple("Element").field(element).finish(),
            Descriptor::Tag(tag) => f.debug_tuple("Tag").field(tag).finish(),
            Descriptor::Pair(head, children) => {
                f.debug_tuple("Pair").field(head).field(children).finish()
            }
            Descriptor::Node(node) => node.fmt(f),
        }
    }
}

impl<B: Backend> From<&str> for Descriptor<B> {
    fn from(tag: &str) -> Self {
        Descriptor::Tag(tag.to_string())
    }
}

impl<B: Backend> From<String> for Descriptor<B> {
    fn from(tag: String) -> Self {
        Descriptor::Tag(tag)
    }
}

impl<B: Backend> From<Node<B>> for Descriptor<B> {
    fn from(node: Node<B>) -> Self {
        Descriptor::Node(node)
    }
}

impl<B: Backend, D: Into<Descriptor<B>>> From<Option<D>> for Descriptor<B> {
    fn from(descriptor: Option<D>) -> Self {
        match descriptor {
            Some(descriptor) => descriptor.into(),
            None => Descriptor::Empty,
        }
    }
}

impl<B: Backend, D: Into<Descriptor<B>>> From<(D, Vec<Descriptor<B>>)> for Descriptor<B> {
    fn from((head, children): (D, Vec<Descriptor<B>>)) -> Self {
        Descriptor::Pair(Box::new(head.into()), children)
    }
}

#[cfg(test)]
type TestDescriptor = Descriptor<crate::memory::Document<()>>;

#[test]
fn test_coerce_tag() {
    match TestDescriptor::from("li.item").coerce() {
        Coerced::Node(node) => {
            assert_eq!(node.tag.as_deref(), Some("li.item"));
            assert!(node.children.is_empty());
        }
        _ => panic!("expected a node"),
    }
}

#[test]
fn test_coerce_empty() {
    assert!(TestDescriptor::from(None::<&str>).is_empty());
    match TestDescriptor::Empty.coerce() {
        Coerced::Skip => (),
        _ => panic!("expected skip"),
    }
}

#[test]
fn test_coerce_pair() {
    let items = vec![TestDescriptor::from("li"), TestDescriptor::from("li")];
    let pair = TestDescriptor::from(("ul", items));
    match pair.coerce() {
        Coerced::Node(node) => {
            assert_eq!(node.tag.as_deref(), Some("ul"));
            assert_eq!(node.children.len(), 2);
        }
        _ => panic!("expected a node"),
    }

    // node heads keep their fields but take the pair’s children
    let head = Node::new().tag("ol").name("list").child("li");
    let pair = TestDescriptor::from((head, vec![TestDescriptor::from("li"); 3]));
    match pair.coerce() {
        Coerced::Node(node) => {
            assert_eq!(node.tag.as_deref(), Some("ol"));
            assert_eq!(node.name.as_deref(), Some("list"));
            assert_eq!(node.children.len(), 3);
        }
        _ => panic!("expected a node"),
    }

    // empty heads fall back to the default tag
    let pair = TestDescriptor::from((TestDescriptor::Empty, vec![TestDescriptor::from("p")]));
    match pair.coerce() {
        Coerced::Node(node) => {
            assert_eq!(node.tag, None);
            assert_eq!(node.children.len(), 1);
        }
        _ => panic!("expected a node"),
    }
}

#[test]
fn test_node_builder() {
    let node = Node::<crate::memory::Document<()>>::new()
        .tag("a")
        .attr("href", "/")
        .attr("href", "/home")
        .style("color", "red")
        .markup("home");
    let href = node.attr.as_ref().and_then(|attr| attr.get("href"));
    assert_eq!(href.map(String::as_str), Some("/home"));
    assert_eq!(node.style.get("color").map(String::as_str), Some("red"));
    assert_eq!(node.markup.as_deref(), Some("home"));
}
