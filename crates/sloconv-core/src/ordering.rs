//! Application order of flattened bindings
//!
//! Converters writing through a wildcard only reach array elements that
//! exist when they run. Bindings under a "defer" prefix are applied after
//! every binding outside it, and later groups after earlier ones. Within a
//! group bindings are ordered by their textual path.

use crate::path::Path;
use crate::walker::Bindings;
use serde_json::Value;

/// Ordered defer groups for one destination schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathOrdering {
    groups: Vec<Path>,
}

impl PathOrdering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a defer group; it sorts after every group added before it
    pub fn defer(mut self, prefix: &str) -> Self {
        self.groups.push(Path::parse(prefix));
        self
    }

    pub fn groups(&self) -> &[Path] {
        &self.groups
    }

    /// Sort rank of `path`: 0 outside every group, else one past the
    /// position of the last group containing it
    pub fn rank(&self, path: &Path) -> usize {
        self.groups
            .iter()
            .rposition(|group| group.is_prefix_of(path))
            .map_or(0, |position| position + 1)
    }

    /// Bindings in application order
    pub fn sort(&self, bindings: Bindings) -> Vec<(Path, Value)> {
        let mut ordered: Vec<(Path, Value)> = bindings.into_iter().collect();
        ordered.sort_by_cached_key(|(path, _)| (self.rank(path), path.to_string()));
        ordered
    }
}
