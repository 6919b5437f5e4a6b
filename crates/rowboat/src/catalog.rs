//! Ordered column catalog: names plus a name→position lookup.

use indexmap::IndexMap;

use crate::error::{Result, TableError};

/// The ordered name↔index mapping for a table's columns.
///
/// Invariants: names are unique, and positions form a contiguous
/// `0..len()` range at all times. Delete and rename rebuild the lookup
/// rather than patching it in place, so a failed validation never leaves
/// the catalog half-updated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnCatalog {
    names: Vec<String>,
    lookup: IndexMap<String, usize>,
}

impl ColumnCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a list of names, rejecting duplicates.
    pub fn from_names(names: Vec<String>) -> Result<Self> {
        let mut catalog = Self::new();
        for name in names {
            catalog.push(&name)?;
        }
        Ok(catalog)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column names in positional order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Position of a column, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    /// Position of a column, or `UnknownColumn`.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name).ok_or_else(|| TableError::UnknownColumn {
            name: name.to_string(),
        })
    }

    /// Appends a column name, returning its position.
    pub fn push(&mut self, name: &str) -> Result<usize> {
        if self.contains(name) {
            return Err(TableError::DuplicateColumn {
                name: name.to_string(),
            });
        }
        let index = self.names.len();
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), index);
        Ok(index)
    }

    /// Removes a column, returning the position it occupied. Positions of
    /// subsequent columns shift down by one.
    pub fn remove(&mut self, name: &str) -> Result<usize> {
        let index = self.require(name)?;
        self.names.remove(index);
        self.rebuild_lookup();
        Ok(index)
    }

    /// Renames columns as a batch.
    ///
    /// The whole batch is validated before anything changes: every old
    /// name must exist, no two renames may target the same new name, and
    /// a new name may only equal an existing column name if that column is
    /// itself renamed away in the same batch.
    pub fn rename(&mut self, renames: &IndexMap<String, String>) -> Result<()> {
        for old in renames.keys() {
            self.require(old)?;
        }
        let mut targets: Vec<&str> = Vec::with_capacity(renames.len());
        for new in renames.values() {
            if targets.contains(&new.as_str()) {
                return Err(TableError::DuplicateColumn { name: new.clone() });
            }
            if self.contains(new) && !renames.contains_key(new) {
                return Err(TableError::DuplicateColumn { name: new.clone() });
            }
            targets.push(new);
        }

        for (old, new) in renames {
            let index = self.lookup[old.as_str()];
            self.names[index] = new.clone();
        }
        self.rebuild_lookup();
        Ok(())
    }

    fn rebuild_lookup(&mut self) {
        self.lookup = self
            .names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
    }
}
