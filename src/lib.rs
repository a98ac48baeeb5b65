//! Element trees from compact descriptors.
//!
//! # Conceptual overview
//! Weave turns a terse description of a UI subtree into real elements, in one pass, instead of
//! one imperative call per node.
//!
//! ## Descriptors
//! A [`Descriptor`] describes one element and its subtree. It comes in several shapes, all of
//! which reduce to a canonical [`Node`]:
//!
//! - a shorthand tag string such as `"button.primary#save Save"`: tag `button`, class `primary`,
//!   id `save`, markup `Save`. A missing tag name means `div`, so `".card"` is a `div` with class
//!   `card`;
//! - a pair `(head, children)`, e.g. `("ul", vec!["li".into(), "li".into()])`;
//! - a node with explicit attributes, markup, style, event listeners, children and a name;
//! - an element that already exists, which is returned as-is;
//! - nothing at all ([`Descriptor::Empty`]), which builds nothing and is skipped as a child.
//!
//! Explicit fields win over shorthand: non-empty markup replaces text from the tag, and shorthand
//! classes and ids are added to the explicit attributes rather than replacing them.
//! Descriptors can also be read from JSON; see [`json`].
//!
//! ## Scopes
//! Building fills a caller-owned [`Scope`] with named references into the new tree. A node with a
//! name is bound under it, overwriting any previous binding. A node without one is bound under its
//! first class name, but only if that name is still free, so `".sidebar"` is reachable as
//! `scope.get("sidebar")` without naming it. Building without a scope binds nothing.
//!
//! ## Backends
//! Elements are created by a [`Backend`]: a platform-specific element API abstracted to a small
//! common interface. The builder never validates names; whatever errors the backend returns are
//! passed through unchanged, and the partially built tree is left as it is.
//!
//! [`memory::Document`] is an in-memory backend that can serialize its elements as HTML.
//!
//! ## Order of operations
//! For every node: create the element, set attributes, bind it in the scope, set markup, attach
//! listeners, set styles, then build and append the children in order. Because markup is set
//! before children are appended, a node can have both.
//!
//! ```
//! use weave::memory::Document;
//! use weave::{build_element, Descriptor, Node, Scope};
//!
//! let mut doc = Document::<()>::new();
//! let mut scope = Scope::new();
//! let menu: Node<Document<()>> = Node::new()
//!     .tag("nav.menu")
//!     .child("a.item Home")
//!     .child(Node::new().tag("a.item About").attr("href", "/about").name("about"))
//!     .child(Descriptor::Empty);
//!
//! let nav = build_element(&mut doc, menu, Some(&mut scope)).unwrap().unwrap();
//! assert_eq!(doc.children(nav).len(), 2);
//! assert_eq!(scope.get("menu"), Some(&nav));
//! assert!(scope.contains("about"));
//! ```

pub mod backend;
mod build;
mod descriptor;
pub mod events;
pub mod json;
pub mod memory;
mod normalize;
mod scope;
pub mod selector;

pub use backend::Backend;
pub use build::{build_element, BuildOptions, Builder};
pub use descriptor::{Coerced, Descriptor, Node};
pub use events::EventHandler;
pub use normalize::{explicit, Explicit};
pub use scope::Scope;
