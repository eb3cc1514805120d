//! The namespace maps `(module, name)` keys to the values defined in a
//! [`Linker`](crate::Linker).
use std::collections::hash_map::{self, Entry, HashMap};
use std::fmt;

use wasmer::Extern;

use crate::error::LinkError;

/// What happens when a key is defined a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shadowing {
    /// Redefinitions fail with [`LinkError::DuplicateDefinition`].
    #[default]
    Reject,
    /// Redefinitions replace the previous value.
    Allow,
}

impl From<bool> for Shadowing {
    fn from(allow: bool) -> Self {
        if allow { Self::Allow } else { Self::Reject }
    }
}

/// All of the values a linker can hand to a module's imports.
///
/// Bindings are grouped by module name, so lookups borrow the key. Keys are
/// compared exactly (case-sensitive). Entries are never removed, only
/// replaced when shadowing is allowed.
#[derive(Clone, Default)]
pub struct Namespace {
    map: HashMap<String, HashMap<String, Extern>>,
}

impl Namespace {
    /// Create an empty `Namespace`.
    pub fn new() -> Self {
        Default::default()
    }

    /// Binds `value` to `(module, name)`.
    ///
    /// With [`Shadowing::Reject`] an existing key is an error and the map is
    /// left untouched. With [`Shadowing::Allow`] the previous value is
    /// replaced and returned.
    pub fn insert(
        &mut self,
        module: &str,
        name: &str,
        value: Extern,
        shadowing: Shadowing,
    ) -> Result<Option<Extern>, LinkError> {
        if shadowing == Shadowing::Reject && self.exists(module, name) {
            return Err(LinkError::DuplicateDefinition {
                module: module.to_string(),
                name: name.to_string(),
            });
        }
        let names = self.map.entry(module.to_string()).or_default();
        match names.entry(name.to_string()) {
            Entry::Occupied(mut o) => Ok(Some(o.insert(value))),
            Entry::Vacant(v) => {
                v.insert(value);
                Ok(None)
            }
        }
    }

    /// Gets the value bound to `(module, name)`.
    pub fn get(&self, module: &str, name: &str) -> Option<&Extern> {
        self.map.get(module)?.get(name)
    }

    /// Returns if a value is bound to `(module, name)`.
    pub fn exists(&self, module: &str, name: &str) -> bool {
        self.get(module, name).is_some()
    }

    /// Returns true if any key uses `module`.
    pub fn contains_namespace(&self, module: &str) -> bool {
        self.map.get(module).is_some_and(|names| !names.is_empty())
    }

    /// Number of bound keys.
    pub fn len(&self) -> usize {
        self.map.values().map(HashMap::len).sum()
    }

    /// Whether nothing is bound yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates through all the bindings in this namespace.
    pub fn iter(&self) -> NamespaceIter<'_> {
        NamespaceIter {
            modules: self.map.iter(),
            current: None,
        }
    }
}

/// An iterator over namespace bindings.
pub struct NamespaceIter<'a> {
    modules: hash_map::Iter<'a, String, HashMap<String, Extern>>,
    current: Option<(&'a str, hash_map::Iter<'a, String, Extern>)>,
}

impl<'a> Iterator for NamespaceIter<'a> {
    type Item = (&'a str, &'a str, &'a Extern);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((module, names)) = self.current.as_mut() {
                if let Some((name, value)) = names.next() {
                    return Some((*module, name.as_str(), value));
                }
            }
            let (module, names) = self.modules.next()?;
            self.current = Some((module.as_str(), names.iter()));
        }
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut keys: Vec<_> = self.iter().map(|(module, name, _)| (module, name)).collect();
        keys.sort();
        f.debug_struct("Namespace").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wasmer::{Global, Store, Value};

    fn global(store: &mut Store, value: i32) -> Extern {
        Global::new(store, Value::I32(value)).into()
    }

    fn value_of(store: &mut Store, ext: &Extern) -> Value {
        match ext {
            Extern::Global(g) => g.get(store),
            other => panic!("expected a global, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_is_rejected_and_keeps_first_value() {
        let mut store = Store::default();
        let first = global(&mut store, 1);
        let second = global(&mut store, 2);
        let mut ns = Namespace::new();

        ns.insert("", "a", first, Shadowing::Reject).unwrap();
        let err = ns.insert("", "a", second, Shadowing::Reject).unwrap_err();

        assert!(matches!(err, LinkError::DuplicateDefinition { .. }));
        let kept = ns.get("", "a").unwrap().clone();
        assert_eq!(value_of(&mut store, &kept), Value::I32(1));
        assert_eq!(ns.len(), 1);
    }

    #[test]
    fn shadowing_replaces_value() {
        let mut store = Store::default();
        let first = global(&mut store, 1);
        let second = global(&mut store, 2);
        let mut ns = Namespace::new();

        assert!(ns.insert("", "a", first, Shadowing::Reject).unwrap().is_none());
        assert!(ns.insert("", "a", second, Shadowing::Allow).unwrap().is_some());

        let kept = ns.get("", "a").unwrap().clone();
        assert_eq!(value_of(&mut store, &kept), Value::I32(2));
    }

    #[test]
    fn keys_are_case_sensitive() {
        let mut store = Store::default();
        let lower = global(&mut store, 1);
        let upper = global(&mut store, 2);
        let mut ns = Namespace::new();

        ns.insert("env", "a", lower, Shadowing::Reject).unwrap();
        ns.insert("env", "A", upper, Shadowing::Reject).unwrap();
        ns.insert("Env", "a", global(&mut store, 3), Shadowing::Reject).unwrap();

        assert_eq!(ns.len(), 3);
        assert!(ns.exists("env", "A"));
        assert!(!ns.exists("ENV", "a"));
    }

    #[test]
    fn iter_visits_every_binding() {
        let mut store = Store::default();
        let mut ns = Namespace::new();
        ns.insert("x", "a", global(&mut store, 1), Shadowing::Reject).unwrap();
        ns.insert("x", "b", global(&mut store, 2), Shadowing::Reject).unwrap();
        ns.insert("y", "a", global(&mut store, 3), Shadowing::Reject).unwrap();

        let mut keys: Vec<_> = ns.iter().map(|(module, name, _)| (module, name)).collect();
        keys.sort();
        assert_eq!(keys, vec![("x", "a"), ("x", "b"), ("y", "a")]);
        assert_eq!(ns.len(), 3);
        assert!(ns.contains_namespace("y"));
        assert!(!ns.contains_namespace("z"));
    }

    #[test]
    fn lookups_borrow_both_key_parts() {
        let mut store = Store::default();
        let mut ns = Namespace::new();
        ns.insert("x", "a", global(&mut store, 1), Shadowing::Reject).unwrap();

        let module = String::from("x");
        assert!(ns.get(&module, "a").is_some());
        assert!(ns.get("y", "a").is_none());
        assert!(!ns.exists("x", "b"));
    }

    #[test]
    fn debug_lists_sorted_keys() {
        let mut store = Store::default();
        let mut ns = Namespace::new();
        ns.insert("b", "x", global(&mut store, 1), Shadowing::Reject).unwrap();
        ns.insert("a", "y", global(&mut store, 2), Shadowing::Reject).unwrap();

        assert_eq!(
            format!("{ns:?}"),
            r#"Namespace { keys: [("a", "y"), ("b", "x")] }"#
        );
    }
}
