//! The variable table consulted by `$(name)` substitution.

use alloc::{
    borrow::ToOwned,
    collections::BTreeMap,
    string::String,
};

/// A name-to-value mapping with ASCII-case-insensitive names.
///
/// The host may populate the table before and between [`process`] calls;
/// `:setvar` directives define or overwrite entries during a scan. Entries
/// are never implicitly cleared.
///
/// [`process`]: crate::Preprocessor::process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    // Keys are stored lowercased; values verbatim.
    entries: BTreeMap<String, String>,
}

impl VariableTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Defines or overwrites `name`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.entries.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Looks up `name`, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns whether `name` is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Removes `name`, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(&name.to_ascii_lowercase())
    }

    /// Number of defined variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs; names are in their lowercased
    /// stored form.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for VariableTable {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, value) in iter {
            table.set(name, value.to_owned());
        }
        table
    }
}
