//! Materializes descriptors into backend elements.

use crate::backend::Backend;
use crate::descriptor::{Coerced, Descriptor};
use crate::normalize::{self, Explicit};
use crate::scope::Scope;
use tracing::{debug, trace};

/// Build configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Tag used when a descriptor has no tag or only shorthand fragments.
    pub default_tag: String,

    /// Whether elements without a name are bound under their first class.
    pub implicit_binding: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            default_tag: "div".to_string(),
            implicit_binding: true,
        }
    }
}

/// Builds element trees in a backend.
pub struct Builder<'a, B: Backend> {
    backend: &'a mut B,
    options: BuildOptions,
}

impl<'a, B: Backend> Builder<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        Builder::with_options(backend, BuildOptions::default())
    }

    pub fn with_options(backend: &'a mut B, options: BuildOptions) -> Self {
        Builder { backend, options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Builds a descriptor.
    ///
    /// Returns `Ok(None)` for an empty descriptor and the element itself for a pre-built one.
    /// Names are bound in `scope` as elements are created; without a scope, no bindings happen.
    ///
    /// Backend errors are returned as-is. Elements created before the error stay wherever they
    /// were already appended.
    pub fn build(
        &mut self,
        descriptor: impl Into<Descriptor<B>>,
        scope: Option<&mut Scope<B::Element>>,
    ) -> Result<Option<B::Element>, B::Error> {
        let descriptor: Descriptor<B> = descriptor.into();
        match descriptor.coerce() {
            Coerced::Skip => Ok(None),
            Coerced::Element(element) => Ok(Some(element)),
            Coerced::Node(node) => {
                let explicit = normalize::explicit(node, &self.options);
                self.materialize(explicit, scope).map(Some)
            }
        }
    }

    /// Errors from building children are passed on as they are; only errors from this node's own
    /// backend calls are logged here.
    fn materialize(
        &mut self,
        node: Explicit<B>,
        mut scope: Option<&mut Scope<B::Element>>,
    ) -> Result<B::Element, B::Error> {
        let tag = node.tag.as_str();
        let element = self
            .backend
            .create_element(tag)
            .map_err(|err| aborted(tag, err))?;
        trace!(%tag, "created element");

        if let Some(attr) = &node.attr {
            for (name, value) in attr {
                self.backend
                    .set_attribute(&element, name, value)
                    .map_err(|err| aborted(tag, err))?;
            }
        }

        if let Some(name) = &node.name {
            if let Some(scope) = scope.as_deref_mut() {
                trace!(%name, "bound element");
                scope.bind(name.as_str(), element.clone());
            }
        } else if self.options.implicit_binding {
            if let (Some(scope), Some(class)) = (scope.as_deref_mut(), node.leading_class()) {
                if scope.bind_vacant(class, element.clone()) {
                    trace!(%class, "bound element by class");
                } else {
                    debug!(%class, "class name already bound; not rebinding");
                }
            }
        }

        if let Some(markup) = &node.markup {
            self.backend
                .set_markup(&element, markup)
                .map_err(|err| aborted(tag, err))?;
        }

        for (event, handler) in node.events {
            self.backend
                .add_event_listener(&element, &event, handler)
                .map_err(|err| aborted(tag, err))?;
        }

        for (property, value) in &node.style {
            self.backend
                .set_style(&element, property, value)
                .map_err(|err| aborted(tag, err))?;
        }

        for (i, child) in node.children.into_iter().enumerate() {
            match self.build(child, scope.as_deref_mut())? {
                Some(child) => self
                    .backend
                    .append_child(&element, &child)
                    .map_err(|err| aborted(tag, err))?,
                None => trace!(index = i, "skipped empty child"),
            }
        }

        Ok(element)
    }
}

fn aborted<E>(tag: &str, err: E) -> E {
    debug!(%tag, "backend error; subtree left partially built");
    err
}

/// Builds a descriptor with default options.
///
/// See [`Builder::build`].
pub fn build_element<B: Backend>(
    backend: &mut B,
    descriptor: impl Into<Descriptor<B>>,
    scope: Option<&mut Scope<B::Element>>,
) -> Result<Option<B::Element>, B::Error> {
    Builder::new(backend).build(descriptor, scope)
}

#[cfg(test)]
use crate::memory::{Document, DocumentError};

#[test]
fn test_build_order() {
    use crate::descriptor::Node;

    let mut doc = Document::<()>::new();
    let mut scope = Scope::new();
    let node: Node<Document<()>> = Node::new()
        .tag("p.note hello")
        .style("color", "red")
        .child("b bold");
    let el = build_element(&mut doc, node, Some(&mut scope)).unwrap().unwrap();

    // markup is assigned first, children are appended after it
    assert_eq!(doc.markup(el), Some("hello"));
    assert_eq!(doc.children(el).len(), 1);
    assert_eq!(
        doc.outer_html(el),
        r#"<p class="note" style="color: red">hello<b>bold</b></p>"#
    );
    assert_eq!(scope.get("note"), Some(&el));
}

#[test]
fn test_implicit_binding_disabled() {
    let mut doc = Document::<()>::new();
    let mut scope = Scope::new();
    let options = BuildOptions {
        implicit_binding: false,
        ..BuildOptions::default()
    };
    let el = Builder::with_options(&mut doc, options)
        .build("div.box", Some(&mut scope))
        .unwrap();
    assert!(el.is_some());
    assert!(scope.is_empty());
}

#[test]
fn test_backend_error_propagates() {
    use crate::descriptor::Node;

    let mut doc = Document::<()>::new();
    let mut scope = Scope::new();
    let node: Node<Document<()>> = Node::new()
        .tag("ul")
        .name("list")
        .child("li.first")
        .child(Node::new().tag("li").attr("bad name", "x"))
        .child("li.third");
    let err = build_element(&mut doc, node, Some(&mut scope)).unwrap_err();
    assert_eq!(err, DocumentError::InvalidAttributeName("bad name".to_string()));

    // the partially built tree stays as it was
    let list = *scope.get("list").unwrap();
    assert_eq!(doc.children(list).len(), 1);
    assert!(scope.contains("first"));
    assert!(!scope.contains("third"));
}

#[test]
fn test_backend_error_is_logged_once() {
    use crate::descriptor::Node;
    use parking_lot::Mutex;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let mut doc = Document::<()>::new();
    let node: Node<Document<()>> = Node::new().tag("ul").child(
        Node::new()
            .tag("li")
            .child(Node::new().tag("span").attr("bad name", "x")),
    );
    let result = tracing::subscriber::with_default(subscriber, || {
        build_element(&mut doc, node, None)
    });
    assert!(result.is_err());

    let log = String::from_utf8(capture.0.lock().clone()).unwrap();
    assert_eq!(log.matches("backend error").count(), 1, "{}", log);
    assert!(log.contains("tag=span"), "{}", log);
}
