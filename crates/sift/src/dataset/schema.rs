//! Ordered column schema.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::profile::TypeProfile;

/// Column name to profile mapping, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    columns: IndexMap<String, TypeProfile>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column, returning the schema for chaining.
    pub fn with_column(mut self, name: impl Into<String>, profile: TypeProfile) -> Self {
        self.columns.insert(name.into(), profile);
        self
    }

    /// Get a column's profile by name.
    pub fn profile(&self, name: &str) -> Option<&TypeProfile> {
        self.columns.get(name)
    }

    /// Get a column's position.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(name)
    }

    /// Get a column's name and profile by position.
    pub fn column(&self, index: usize) -> Option<(&str, &TypeProfile)> {
        self.columns
            .get_index(index)
            .map(|(name, profile)| (name.as_str(), profile))
    }

    /// All column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Iterate over (name, profile) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeProfile)> {
        self.columns.iter().map(|(name, profile)| (name.as_str(), profile))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<(String, TypeProfile)> for Schema {
    fn from_iter<T: IntoIterator<Item = (String, TypeProfile)>>(iter: T) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}
