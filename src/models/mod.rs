//! Data models for the EIP dashboard.
//!
//! These models match the frontend TypeScript interfaces for seamless interoperability.

mod chat;
mod eip;
mod metrics;
mod project;

pub use chat::*;
pub use eip::*;
pub use metrics::*;
pub use project::*;

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

/// A catalog record identified by a key that is unique within its catalog.
pub trait Keyed {
    type Key: ?Sized + Eq + Hash + Display;

    fn key(&self) -> &Self::Key;
}

/// The first key that occurs more than once in `records`.
pub fn duplicate_key<T: Keyed>(records: &[T]) -> Option<&T::Key> {
    let mut seen = HashSet::new();
    records.iter().map(Keyed::key).find(|key| !seen.insert(*key))
}
