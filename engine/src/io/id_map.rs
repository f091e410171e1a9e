//! Title to id mapping used while exporting

use std::collections::HashMap;
use tracing::{debug, warn};

/// Maps state titles to the ids generated for them
///
/// Connections and the initial state are resolved by title. Registering a
/// title twice replaces the earlier id, so the later state wins every lookup.
#[derive(Debug, Default)]
pub struct StateIdMap {
    mapping: HashMap<String, String>,
}

impl StateIdMap {
    /// Create a new empty map
    pub fn new() -> Self {
        Self {
            mapping: HashMap::new(),
        }
    }

    /// Register `id` for `title`, returning the id it replaced
    pub fn register(&mut self, title: &str, id: &str) -> Option<String> {
        debug!(title = title, id = id, "Registering state id");
        let previous = self.mapping.insert(title.to_string(), id.to_string());
        if let Some(previous_id) = &previous {
            warn!(
                title = title,
                replaced = %previous_id,
                id = id,
                "Duplicate state title, later state wins lookups"
            );
        }
        previous
    }

    /// Id registered for `title`
    pub fn resolve(&self, title: &str) -> Option<&str> {
        self.mapping.get(title).map(String::as_str)
    }

    /// Number of distinct titles
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}
