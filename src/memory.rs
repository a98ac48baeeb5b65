//! An in-memory backend.
//!
//! [`Document`] keeps elements in a flat map keyed by [`ElementId`] and never renders anything.
//! It is useful for tests, for server-side rendering through [`Document::outer_html`], and as a
//! reference for what a real backend is expected to do.

use crate::backend::Backend;
use crate::events::EventHandler;
use core::fmt;
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// An element reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(Uuid);

impl ElementId {
    fn new() -> ElementId {
        ElementId(Uuid::new_v4())
    }
}

/// Errors returned by [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("invalid tag name {0:?}")]
    InvalidTagName(String),
    #[error("invalid attribute name {0:?}")]
    InvalidAttributeName(String),
    #[error("no such element: {0:?}")]
    NoSuchElement(ElementId),
    /// The element would become its own ancestor.
    #[error("appending {0:?} would create a cycle")]
    Cycle(ElementId),
}

/// An event waiting in the document queue: `(target, event name, payload)`.
pub type QueuedEvent<E> = (ElementId, String, E);

struct ElementNode<E> {
    tag: String,
    /// In insertion order; setting an existing attribute replaces it in place.
    attributes: Vec<(String, String)>,
    style: Vec<(String, String)>,
    listeners: Vec<(String, EventHandler<E>)>,
    markup: Option<String>,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
}

/// An in-memory element tree.
pub struct Document<E> {
    nodes: HashMap<ElementId, ElementNode<E>>,
    event_send: Sender<QueuedEvent<E>>,
    event_recv: Receiver<QueuedEvent<E>>,
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '/' | '"' | '\'' | '='))
}

fn set_entry(entries: &mut Vec<(String, String)>, name: &str, value: &str) {
    if let Some(entry) = entries.iter_mut().find(|(key, _)| key == name) {
        entry.1 = value.to_string();
    } else {
        entries.push((name.to_string(), value.to_string()));
    }
}

fn get_entry<'a>(entries: &'a [(String, String)], name: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

impl<E> Document<E> {
    pub fn new() -> Document<E> {
        let (event_send, event_recv) = channel::unbounded();
        Document {
            nodes: HashMap::new(),
            event_send,
            event_recv,
        }
    }

    /// Number of elements ever created and still held by the document.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: ElementId) -> Result<&ElementNode<E>, DocumentError> {
        self.nodes.get(&id).ok_or(DocumentError::NoSuchElement(id))
    }

    fn node_mut(&mut self, id: ElementId) -> Result<&mut ElementNode<E>, DocumentError> {
        self.nodes
            .get_mut(&id)
            .ok_or(DocumentError::NoSuchElement(id))
    }

    pub fn tag(&self, id: ElementId) -> Option<&str> {
        self.nodes.get(&id).map(|node| node.tag.as_str())
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        get_entry(&self.nodes.get(&id)?.attributes, name)
    }

    /// All attributes in the order they were first set.
    pub fn attributes(&self, id: ElementId) -> &[(String, String)] {
        self.nodes
            .get(&id)
            .map_or(&[][..], |node| node.attributes.as_slice())
    }

    pub fn style(&self, id: ElementId, property: &str) -> Option<&str> {
        get_entry(&self.nodes.get(&id)?.style, property)
    }

    pub fn markup(&self, id: ElementId) -> Option<&str> {
        self.nodes.get(&id)?.markup.as_deref()
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.nodes
            .get(&id)
            .map_or(&[][..], |node| node.children.as_slice())
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(&id)?.parent
    }

    /// Number of listeners for `event` on an element.
    pub fn listener_count(&self, id: ElementId, event: &str) -> usize {
        self.nodes.get(&id).map_or(0, |node| {
            node.listeners
                .iter()
                .filter(|(name, _)| name == event)
                .count()
        })
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    fn is_ancestor_or_self(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|node| node.parent);
        }
        false
    }

    fn detach(&mut self, id: ElementId) {
        let parent = match self.nodes.get_mut(&id) {
            Some(node) => node.parent.take(),
            None => return,
        };
        if let Some(parent) = parent.and_then(|parent| self.nodes.get_mut(&parent)) {
            parent.children.retain(|child| *child != id);
        }
    }

    /// Calls every listener for `event` on an element, in registration order.
    ///
    /// Events do not bubble. Returns the number of listeners called.
    pub fn dispatch(
        &self,
        id: ElementId,
        event: &str,
        payload: &E,
    ) -> Result<usize, DocumentError> {
        let node = self.node(id)?;
        let mut count = 0;
        for (_, handler) in node.listeners.iter().filter(|(name, _)| name == event) {
            handler.call(payload);
            count += 1;
        }
        Ok(count)
    }

    /// Returns a sender for queueing events; see [`Document::poll`].
    pub fn event_sender(&self) -> Sender<QueuedEvent<E>> {
        self.event_send.clone()
    }

    /// Dispatches all queued events. Events for unknown elements are dropped.
    ///
    /// Returns the number of listeners called.
    pub fn poll(&mut self) -> usize {
        let mut count = 0;
        loop {
            match self.event_recv.try_recv() {
                Ok((id, event, payload)) => match self.dispatch(id, &event, &payload) {
                    Ok(called) => count += called,
                    Err(err) => debug!(%event, "dropped queued event: {}", err),
                },
                // the document holds a sender itself, so the queue can’t disconnect
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        count
    }

    /// Serializes an element and its subtree as HTML.
    ///
    /// Markup is written verbatim before the element's children. Unknown ids serialize as an empty
    /// string.
    pub fn outer_html(&self, id: ElementId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: ElementId, out: &mut String) {
        let node = match self.nodes.get(&id) {
            Some(node) => node,
            None => return,
        };

        out.push('<');
        out.push_str(&node.tag);

        let inline_style = node
            .style
            .iter()
            .map(|(property, value)| format!("{}: {}", property, value))
            .collect::<Vec<_>>()
            .join("; ");
        let mut wrote_style = false;

        for (name, value) in &node.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            if name == "style" && !inline_style.is_empty() {
                escape_attribute(&format!("{}; {}", value, inline_style), out);
                wrote_style = true;
            } else {
                escape_attribute(value, out);
            }
            out.push('"');
        }
        if !wrote_style && !inline_style.is_empty() {
            out.push_str(" style=\"");
            escape_attribute(&inline_style, out);
            out.push('"');
        }
        out.push('>');

        if let Some(markup) = &node.markup {
            out.push_str(markup);
        }
        for child in &node.children {
            self.write_html(*child, out);
        }

        out.push_str("</");
        out.push_str(&node.tag);
        out.push('>');
    }
}

impl<E> Default for Document<E> {
    fn default() -> Self {
        Document::new()
    }
}

impl<E> fmt::Debug for Document<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Document")
            .field("elements", &self.nodes.len())
            .field("queued_events", &self.event_recv.len())
            .finish()
    }
}

impl<E> Backend for Document<E> {
    type Element = ElementId;
    type Event = E;
    type Error = DocumentError;

    fn create_element(&mut self, tag: &str) -> Result<ElementId, DocumentError> {
        if !is_valid_name(tag) {
            return Err(DocumentError::InvalidTagName(tag.to_string()));
        }

        let id = ElementId::new();
        self.nodes.insert(
            id,
            ElementNode {
                tag: tag.to_string(),
                attributes: Vec::new(),
                style: Vec::new(),
                listeners: Vec::new(),
                markup: None,
                children: Vec::new(),
                parent: None,
            },
        );
        Ok(id)
    }

    fn set_attribute(
        &mut self,
        element: &ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), DocumentError> {
        if !is_valid_name(name) {
            return Err(DocumentError::InvalidAttributeName(name.to_string()));
        }
        set_entry(&mut self.node_mut(*element)?.attributes, name, value);
        Ok(())
    }

    /// Replaces the content: current children are detached and the markup stored verbatim.
    fn set_markup(&mut self, element: &ElementId, markup: &str) -> Result<(), DocumentError> {
        let children = std::mem::take(&mut self.node_mut(*element)?.children);
        for child in children {
            if let Some(child) = self.nodes.get_mut(&child) {
                child.parent = None;
            }
        }
        self.node_mut(*element)?.markup = Some(markup.to_string());
        Ok(())
    }

    fn add_event_listener(
        &mut self,
        element: &ElementId,
        event: &str,
        handler: EventHandler<E>,
    ) -> Result<(), DocumentError> {
        self.node_mut(*element)?
            .listeners
            .push((event.to_string(), handler));
        Ok(())
    }

    fn set_style(
        &mut self,
        element: &ElementId,
        property: &str,
        value: &str,
    ) -> Result<(), DocumentError> {
        set_entry(&mut self.node_mut(*element)?.style, property, value);
        Ok(())
    }

    /// Moves `child` to the end of `parent`’s children, detaching it from any previous parent.
    fn append_child(
        &mut self,
        parent: &ElementId,
        child: &ElementId,
    ) -> Result<(), DocumentError> {
        self.node(*parent)?;
        self.node(*child)?;
        if self.is_ancestor_or_self(*child, *parent) {
            return Err(DocumentError::Cycle(*child));
        }

        self.detach(*child);
        self.node_mut(*child)?.parent = Some(*parent);
        self.node_mut(*parent)?.children.push(*child);
        Ok(())
    }
}

#[test]
fn test_invalid_names() {
    let mut doc = Document::<()>::new();
    assert_eq!(
        doc.create_element("bad tag"),
        Err(DocumentError::InvalidTagName("bad tag".to_string()))
    );
    assert_eq!(
        doc.create_element(""),
        Err(DocumentError::InvalidTagName(String::new()))
    );
    let el = doc.create_element("div").unwrap();
    assert_eq!(
        doc.set_attribute(&el, "a=b", "x"),
        Err(DocumentError::InvalidAttributeName("a=b".to_string()))
    );
    assert_eq!(doc.len(), 1);
}

#[test]
fn test_append_moves_and_rejects_cycles() {
    let mut doc = Document::<()>::new();
    let a = doc.create_element("div").unwrap();
    let b = doc.create_element("div").unwrap();
    let c = doc.create_element("span").unwrap();

    doc.append_child(&a, &b).unwrap();
    doc.append_child(&b, &c).unwrap();
    assert_eq!(doc.append_child(&c, &a), Err(DocumentError::Cycle(a)));
    assert_eq!(doc.append_child(&a, &a), Err(DocumentError::Cycle(a)));

    doc.append_child(&a, &c).unwrap();
    assert_eq!(doc.children(a), &[b, c]);
    assert!(doc.children(b).is_empty());
    assert_eq!(doc.parent(c), Some(a));
}

#[test]
fn test_markup_replaces_children() {
    let mut doc = Document::<()>::new();
    let a = doc.create_element("div").unwrap();
    let b = doc.create_element("b").unwrap();
    doc.append_child(&a, &b).unwrap();

    doc.set_markup(&a, "<i>x</i>").unwrap();
    assert!(doc.children(a).is_empty());
    assert_eq!(doc.parent(b), None);
    assert_eq!(doc.outer_html(a), "<div><i>x</i></div>");
}

#[test]
fn test_set_attribute_replaces_in_place() {
    let mut doc = Document::<()>::new();
    let a = doc.create_element("a").unwrap();
    doc.set_attribute(&a, "href", "/").unwrap();
    doc.set_attribute(&a, "title", "say \"hi\" & <bye>").unwrap();
    doc.set_attribute(&a, "href", "/home").unwrap();
    assert_eq!(doc.attribute(a, "href"), Some("/home"));
    assert_eq!(doc.attributes(a).len(), 2);
    assert_eq!(
        doc.outer_html(a),
        r#"<a href="/home" title="say &quot;hi&quot; &amp; &lt;bye&gt;"></a>"#
    );
}

#[test]
fn test_style_merges_with_style_attribute() {
    let mut doc = Document::<()>::new();
    let a = doc.create_element("p").unwrap();
    doc.set_attribute(&a, "style", "margin: 0").unwrap();
    doc.set_style(&a, "color", "red").unwrap();
    assert_eq!(doc.style(a, "color"), Some("red"));
    assert_eq!(doc.outer_html(a), r#"<p style="margin: 0; color: red"></p>"#);
}

#[test]
fn test_event_queue() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let mut doc = Document::<usize>::new();
    let a = doc.create_element("button").unwrap();
    let total = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&total);
    doc.add_event_listener(
        &a,
        "click",
        EventHandler::new(move |n: &usize| {
            counter.fetch_add(*n, Ordering::SeqCst);
        }),
    )
    .unwrap();

    assert_eq!(doc.dispatch(a, "click", &1), Ok(1));
    assert_eq!(doc.dispatch(a, "keydown", &1), Ok(0));

    let sender = doc.event_sender();
    sender.send((a, "click".to_string(), 10)).unwrap();
    sender.send((ElementId::new(), "click".to_string(), 100)).unwrap();
    assert_eq!(doc.poll(), 1);
    assert_eq!(doc.poll(), 0);
    assert_eq!(total.load(Ordering::SeqCst), 11);
}
