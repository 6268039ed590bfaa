//! List envelope accepted from collection endpoints

use serde::{Deserialize, Serialize};

/// A collection response, either paginated or a bare array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Paginated<T> {
    Page {
        results: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
    },
    List(Vec<T>),
}

impl<T> Paginated<T> {
    /// Total number of items on the server, falling back to the number of
    /// items in this response.
    pub fn total(&self) -> u64 {
        match self {
            Paginated::Page {
                results, count, ..
            } => count.unwrap_or(results.len() as u64),
            Paginated::List(items) => items.len() as u64,
        }
    }

    pub fn has_next(&self) -> bool {
        matches!(self, Paginated::Page { next: Some(_), .. })
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Paginated::Page { results, .. } => results,
            Paginated::List(items) => items,
        }
    }

    pub fn into_parts(self) -> (Vec<T>, u64) {
        let total = self.total();
        (self.into_items(), total)
    }
}
