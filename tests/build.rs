use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use weave::memory::{Document, ElementId};
use weave::{build_element, Backend, Descriptor, EventHandler, Node, Scope};

type Doc = Document<u32>;
type D = Descriptor<Doc>;
type N = Node<Doc>;

fn build(doc: &mut Doc, descriptor: impl Into<D>, scope: &mut Scope<ElementId>) -> ElementId {
    build_element(doc, descriptor, Some(scope))
        .expect("build failed")
        .expect("no element built")
}

#[test]
fn pre_built_elements_pass_through() {
    let mut doc = Doc::new();
    let existing = doc.create_element("canvas").unwrap();
    let mut scope = Scope::new();

    let el = build(&mut doc, D::element(existing), &mut scope);
    assert_eq!(el, existing);
    assert_eq!(doc.len(), 1);
    assert!(scope.is_empty());

    let el = build_element(&mut doc, D::element(existing), None).unwrap();
    assert_eq!(el, Some(existing));
}

#[test]
fn shorthand_matches_explicit_form() {
    let mut doc = Doc::new();
    let mut scope = Scope::new();

    let short = build(&mut doc, "div.card#x", &mut scope);
    let long = build(
        &mut doc,
        N::new().tag("div").attr("id", "x").attr("class", "card"),
        &mut Scope::new(),
    );

    assert_eq!(doc.outer_html(short), doc.outer_html(long));
    insta::assert_snapshot!(doc.outer_html(short), @r#"<div class="card" id="x"></div>"#);
}

#[test]
fn pairs_build_children_in_order() {
    let mut doc = Doc::new();
    let mut scope = Scope::new();
    let list = D::from((
        "ul",
        vec![
            D::from(("li.a", Vec::<D>::new())),
            D::from(("li.b", Vec::<D>::new())),
        ],
    ));

    let ul = build(&mut doc, list, &mut scope);
    assert_eq!(doc.tag(ul), Some("ul"));
    let children = doc.children(ul);
    assert_eq!(children.len(), 2);
    assert_eq!(doc.attribute(children[0], "class"), Some("a"));
    assert_eq!(doc.attribute(children[1], "class"), Some("b"));
    assert_eq!(doc.parent(children[0]), Some(ul));
}

#[test]
fn explicit_markup_overrides_tag_text() {
    let mut doc = Doc::new();
    let mut scope = Scope::new();
    let el = build(&mut doc, N::new().tag("span hello").markup("bye"), &mut scope);
    assert_eq!(doc.markup(el), Some("bye"));

    let el = build(&mut doc, "span hello world", &mut scope);
    assert_eq!(doc.markup(el), Some("hello world"));
}

#[test]
fn empty_markup_is_still_assigned() {
    let mut doc = Doc::new();
    let el = build(&mut doc, N::new().tag("p").markup(""), &mut Scope::new());
    assert_eq!(doc.markup(el), Some(""));

    let el = build(&mut doc, "p", &mut Scope::new());
    assert_eq!(doc.markup(el), None);
}

#[test]
fn tag_ending_in_space_has_no_markup() {
    let mut doc = Doc::new();
    let el = build(&mut doc, "span ", &mut Scope::new());
    assert_eq!(doc.markup(el), None);

    // an explicit empty markup still applies
    let el = build(&mut doc, N::new().tag("span ").markup(""), &mut Scope::new());
    assert_eq!(doc.markup(el), Some(""));
}

#[test]
fn truthy_json_scalars_build_default_elements() {
    let mut doc = Doc::new();
    let el = build(&mut doc, D::from_json(&json!(true)).unwrap(), &mut Scope::new());
    assert_eq!(doc.outer_html(el), "<div></div>");

    let list = D::from_json(&json!(["ul", [5, null, "li"]])).unwrap();
    let el = build(&mut doc, list, &mut Scope::new());
    insta::assert_snapshot!(doc.outer_html(el), @"<ul><div></div><li></li></ul>");
}

#[test]
fn named_binding_overwrites() {
    let mut doc = Doc::new();
    let mut scope = Scope::new();

    let first = build(&mut doc, N::new().tag("div").name("root"), &mut scope);
    assert_eq!(scope.get("root"), Some(&first));

    let second = build(&mut doc, N::new().tag("section").name("root"), &mut scope);
    assert_eq!(scope.get("root"), Some(&second));
    assert_eq!(scope.len(), 1);
}

#[test]
fn named_binding_suppresses_implicit_binding() {
    let mut doc = Doc::new();
    let mut scope = Scope::new();
    let el = build(&mut doc, N::new().tag("div.panel").name("main"), &mut scope);
    assert_eq!(scope.get("main"), Some(&el));
    assert!(!scope.contains("panel"));
}

#[test]
fn implicit_binding_never_overwrites() {
    let mut doc = Doc::new();
    let mut scope = Scope::new();
    let prior = doc.create_element("aside").unwrap();
    scope.bind("box", prior);

    let el = build(&mut doc, N::new().tag("div.box"), &mut scope);
    assert_ne!(el, prior);
    assert_eq!(scope.get("box"), Some(&prior));

    // the first element with a given leading class wins
    let mut scope = Scope::new();
    let tree = N::new()
        .tag("div")
        .child("div.sidebar.left")
        .child("div.sidebar.right");
    let root = build(&mut doc, tree, &mut scope);
    let sidebar = *scope.get("sidebar").unwrap();
    assert_eq!(doc.children(root)[0], sidebar);
    assert!(!scope.contains("left"));
}

#[test]
fn implicit_binding_uses_explicit_class_attr() {
    let mut doc = Doc::new();
    let mut scope = Scope::new();
    let el = build(&mut doc, N::new().tag("nav").attr("class", "menu dark"), &mut scope);
    assert_eq!(scope.get("menu"), Some(&el));
}

#[test]
fn empty_children_are_skipped() {
    let mut doc = Doc::new();
    let mut scope = Scope::new();
    let list = N::new()
        .tag("ul")
        .child(D::Empty)
        .child(N::new().tag("li"))
        .child(None::<&str>);

    let ul = build(&mut doc, list, &mut scope);
    assert_eq!(doc.children(ul).len(), 1);
    assert_eq!(doc.len(), 2);

    assert_eq!(build_element(&mut doc, D::Empty, Some(&mut scope)), Ok(None));
}

#[test]
fn no_scope_binds_nothing() {
    let mut doc = Doc::new();
    let el = build_element(&mut doc, N::new().tag("div.x").name("y"), None).unwrap();
    assert!(el.is_some());
}

#[test]
fn classes_are_aggregated() {
    let mut doc = Doc::new();
    let el = build(&mut doc, "div.a.b.c", &mut Scope::new());
    assert_eq!(doc.attribute(el, "class"), Some("a b c"));
}

#[test]
fn first_id_wins() {
    let mut doc = Doc::new();
    let el = build(&mut doc, "div#one#two", &mut Scope::new());
    assert_eq!(doc.attribute(el, "id"), Some("one"));
}

#[test]
fn shorthand_keeps_other_attributes() {
    let mut doc = Doc::new();
    let el = build(
        &mut doc,
        N::new().tag("input.field#name").attr("type", "text").attr("id", "lost"),
        &mut Scope::new(),
    );
    assert_eq!(doc.attribute(el, "type"), Some("text"));
    assert_eq!(doc.attribute(el, "id"), Some("name"));
    assert_eq!(doc.attribute(el, "class"), Some("field"));
}

#[test]
fn events_are_additive() {
    let mut doc = Doc::new();
    let clicks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&clicks);
    let handler = EventHandler::new(move |n: &u32| {
        counter.fetch_add(*n as usize, Ordering::SeqCst);
    });

    let button = N::new()
        .tag("button Go")
        .on("click", handler.clone())
        .on("click", handler);
    let el = build(&mut doc, button, &mut Scope::new());
    assert_eq!(doc.listener_count(el, "click"), 2);

    doc.event_sender().send((el, "click".to_string(), 3)).unwrap();
    assert_eq!(doc.poll(), 2);
    assert_eq!(clicks.load(Ordering::SeqCst), 6);
}

#[test]
fn styles_are_applied() {
    let mut doc = Doc::new();
    let el = build(
        &mut doc,
        N::new().tag("div").style("width", "10px").style("height", "5px"),
        &mut Scope::new(),
    );
    assert_eq!(doc.style(el, "width"), Some("10px"));
    assert_eq!(doc.style(el, "height"), Some("5px"));
}

#[test]
fn pre_built_children_are_appended() {
    let mut doc = Doc::new();
    let existing = doc.create_element("img").unwrap();
    let el = build(
        &mut doc,
        ("figure", vec![D::element(existing), D::from("figcaption Caption")]),
        &mut Scope::new(),
    );
    assert_eq!(doc.children(el)[0], existing);
    insta::assert_snapshot!(
        doc.outer_html(el),
        @"<figure><img></img><figcaption>Caption</figcaption></figure>"
    );
}

#[test]
fn json_descriptors_build_the_same_tree() {
    let value = json!(["ul.menu", [
        "li.item Home",
        { "tag": "li.item", "as": "last", "attr": { "data-x": 1 }, "innerHTML": "About" },
        null,
        0
    ]]);

    let mut doc = Doc::new();
    let mut scope = Scope::new();
    let from_json = build(&mut doc, D::from_json(&value).unwrap(), &mut scope);

    let native = D::from((
        "ul.menu",
        vec![
            D::from("li.item Home"),
            N::new()
                .tag("li.item")
                .name("last")
                .attr("data-x", "1")
                .markup("About")
                .into(),
        ],
    ));
    let built = build(&mut doc, native, &mut Scope::new());

    assert_eq!(doc.outer_html(from_json), doc.outer_html(built));
    assert_eq!(scope.get("menu"), Some(&from_json));
    assert_eq!(scope.get("item"), Some(&doc.children(from_json)[0]));
    assert_eq!(scope.get("last"), Some(&doc.children(from_json)[1]));
    insta::assert_snapshot!(
        doc.outer_html(from_json),
        @r#"<ul class="menu"><li class="item">Home</li><li class="item" data-x="1">About</li></ul>"#
    );
}
