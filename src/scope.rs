use std::collections::HashMap;

/// A caller-owned registry of named elements, filled in while building.
///
/// Explicit names always overwrite (last writer wins); implicit class names never do (first
/// writer wins). Nothing in this crate removes entries.
#[derive(Debug, Clone)]
pub struct Scope<E> {
    names: HashMap<String, E>,
}

impl<E> Scope<E> {
    pub fn new() -> Scope<E> {
        Scope {
            names: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&E> {
        self.names.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Binds `element` under `name`, returning the previous binding.
    pub fn bind(&mut self, name: impl Into<String>, element: E) -> Option<E> {
        self.names.insert(name.into(), element)
    }

    /// Binds `element` under `name` unless the name is taken. Returns whether it was bound.
    pub fn bind_vacant(&mut self, name: &str, element: E) -> bool {
        if self.names.contains_key(name) {
            false
        } else {
            self.names.insert(name.to_string(), element);
            true
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &E)> {
        self.names.iter().map(|(name, element)| (name.as_str(), element))
    }

    pub fn into_inner(self) -> HashMap<String, E> {
        self.names
    }
}

impl<E> Default for Scope<E> {
    fn default() -> Self {
        Scope::new()
    }
}

impl<E> From<HashMap<String, E>> for Scope<E> {
    fn from(names: HashMap<String, E>) -> Self {
        Scope { names }
    }
}

#[test]
fn test_bind_overwrites() {
    let mut scope = Scope::new();
    assert_eq!(scope.bind("root", 1), None);
    assert_eq!(scope.bind("root", 2), Some(1));
    assert_eq!(scope.get("root"), Some(&2));
    assert_eq!(scope.len(), 1);
}

#[test]
fn test_bind_vacant_keeps_first() {
    let mut scope = Scope::new();
    assert!(scope.bind_vacant("box", 1));
    assert!(!scope.bind_vacant("box", 2));
    assert_eq!(scope.get("box"), Some(&1));
    assert!(scope.contains("box"));
    assert!(!scope.contains("other"));
}
