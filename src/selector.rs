//! Shorthand tag strings.
//!
//! A shorthand tag looks like a CSS selector optionally followed by text:
//!
//! ```text
//! tag-string := selector (' ' text)?
//! selector   := name? fragment*
//! fragment   := '.' class | '#' id
//! ```
//!
//! where `name`, `class` and `id` run until the next `.` or `#`. A `$` ends a class or id value,
//! and the rest of that fragment is dropped. `text` is everything after the first space,
//! verbatim.

/// A parsed shorthand tag string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector<'a> {
    /// The leading tag name. May be empty (e.g. in `".card"`).
    pub tag: &'a str,
    /// Class fragments, in source order. Empty fragments (`"div..x"`) are kept.
    pub classes: Vec<&'a str>,
    /// The first id fragment.
    pub id: Option<&'a str>,
    /// Text after the first space, if there was a space.
    pub text: Option<&'a str>,
    fragments: usize,
}

impl<'a> Selector<'a> {
    /// Whether the selector token contained any `.` or `#` fragments.
    pub fn has_fragments(&self) -> bool {
        self.fragments > 0
    }

    /// The class attribute value, if there are any class fragments.
    pub fn class_list(&self) -> Option<String> {
        if self.classes.is_empty() {
            None
        } else {
            Some(self.classes.join(" "))
        }
    }
}

fn is_delimiter(c: char) -> bool {
    c == '.' || c == '#'
}

/// Parses a shorthand tag string.
///
/// Multiple ids (`"#a#b"`) are not an error; only the first one is kept.
pub fn parse(input: &str) -> Selector<'_> {
    let (token, text) = match input.split_once(' ') {
        Some((token, text)) => (token, Some(text)),
        None => (input, None),
    };

    let name_end = token.find(is_delimiter).unwrap_or(token.len());
    let mut selector = Selector {
        tag: &token[..name_end],
        text,
        ..Selector::default()
    };

    let mut rest = &token[name_end..];
    while let Some(delimiter) = rest.chars().next() {
        let body = &rest[delimiter.len_utf8()..];
        let end = body.find(is_delimiter).unwrap_or(body.len());
        let fragment = match body[..end].split_once('$') {
            Some((value, _)) => value,
            None => &body[..end],
        };

        if delimiter == '.' {
            selector.classes.push(fragment);
        } else if selector.id.is_none() {
            selector.id = Some(fragment);
        }
        selector.fragments += 1;
        rest = &body[end..];
    }

    selector
}

#[test]
fn test_plain_tag() {
    let sel = parse("span");
    assert_eq!(sel.tag, "span");
    assert!(!sel.has_fragments());
    assert_eq!(sel.class_list(), None);
    assert_eq!(sel.id, None);
    assert_eq!(sel.text, None);
}

#[test]
fn test_classes_and_id() {
    let sel = parse("div.card#main.wide");
    assert_eq!(sel.tag, "div");
    assert_eq!(sel.classes, vec!["card", "wide"]);
    assert_eq!(sel.class_list().as_deref(), Some("card wide"));
    assert_eq!(sel.id, Some("main"));
    assert!(sel.has_fragments());

    // order-independent
    let other = parse("div#main.card.wide");
    assert_eq!(other.classes, sel.classes);
    assert_eq!(other.id, sel.id);
}

#[test]
fn test_first_id_wins() {
    let sel = parse("p#first#second.x");
    assert_eq!(sel.id, Some("first"));
    assert_eq!(sel.classes, vec!["x"]);
}

#[test]
fn test_empty_name() {
    let sel = parse(".card");
    assert_eq!(sel.tag, "");
    assert_eq!(sel.class_list().as_deref(), Some("card"));

    let sel = parse("#only");
    assert_eq!(sel.tag, "");
    assert_eq!(sel.id, Some("only"));
    assert_eq!(sel.class_list(), None);
}

#[test]
fn test_trailing_text() {
    let sel = parse("button.primary Save changes");
    assert_eq!(sel.tag, "button");
    assert_eq!(sel.classes, vec!["primary"]);
    assert_eq!(sel.text, Some("Save changes"));

    // text is kept verbatim after the first space
    assert_eq!(parse("b  spaced").text, Some(" spaced"));
    assert_eq!(parse("b ").text, Some(""));
    // delimiters in the text are not fragments
    assert!(!parse("b a.b#c").has_fragments());
}

#[test]
fn test_dollar_ends_fragment() {
    let sel = parse("div.a$b");
    assert_eq!(sel.tag, "div");
    assert_eq!(sel.classes, vec!["a"]);

    let sel = parse("li.a$x.b#id$y");
    assert_eq!(sel.class_list().as_deref(), Some("a b"));
    assert_eq!(sel.id, Some("id"));

    assert_eq!(parse("p.$x").class_list().as_deref(), Some(""));
}

#[test]
fn test_empty_fragments() {
    let sel = parse("div.");
    assert!(sel.has_fragments());
    assert_eq!(sel.class_list().as_deref(), Some(""));

    assert_eq!(parse("div.a..b").class_list().as_deref(), Some("a  b"));
}
