//! Loading/error/data triplet for remotely fetched values

use serde::{Deserialize, Serialize};

/// A remotely fetched value with its own request status.
///
/// Each catalog resource carries one of these so that concurrent fetches of
/// different resources never overwrite each other's flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Resource<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            loading: false,
            error: None,
        }
    }

    pub fn start(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn resolve(&mut self, data: T) {
        self.loading = false;
        self.data = data;
    }

    /// Records a failure; the previous data is kept.
    pub fn reject(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }
}
