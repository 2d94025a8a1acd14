//! Case-insensitive substring search over catalog records.
//!
//! Every dataset exposes a fixed set of searchable fields. A blank query is
//! the identity: it returns the haystack unchanged rather than nothing.

use crate::models::{Eip, Project};

/// A record that can be matched against a lowercased needle.
pub trait Searchable {
    /// `needle` is already trimmed and lowercased.
    fn matches(&self, needle: &str) -> bool;
}

/// Searchable fields for proposals: number, title, description, authors,
/// content body, category, status and type.
impl Searchable for Eip {
    fn matches(&self, needle: &str) -> bool {
        contains(&self.number.to_string(), needle)
            || contains(&self.title, needle)
            || contains(&self.description, needle)
            || self.author.iter().any(|a| contains(a, needle))
            || contains(&self.content, needle)
            || self
                .category
                .is_some_and(|c| contains(c.as_str(), needle))
            || contains(self.status.as_str(), needle)
            || contains(self.eip_type.as_str(), needle)
    }
}

/// Searchable fields for projects: name, description, implementation
/// details, status and implemented proposal numbers.
impl Searchable for Project {
    fn matches(&self, needle: &str) -> bool {
        contains(&self.name, needle)
            || contains(&self.description, needle)
            || contains(&self.implementation_details, needle)
            || contains(self.status.as_str(), needle)
            || self
                .eip_numbers
                .iter()
                .any(|n| contains(&n.to_string(), needle))
    }
}

/// Trim and lowercase a query; `None` when nothing is left.
pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Records in `haystack` matching `query`, in haystack order.
pub fn search<T: Searchable + Clone>(query: &str, haystack: &[T]) -> Vec<T> {
    match normalize_query(query) {
        None => haystack.to_vec(),
        Some(needle) => haystack
            .iter()
            .filter(|record| record.matches(&needle))
            .cloned()
            .collect(),
    }
}

fn contains(field: &str, needle: &str) -> bool {
    field.to_lowercase().contains(needle)
}
