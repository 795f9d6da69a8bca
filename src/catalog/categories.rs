//! Category breadcrumb extraction
//!
//! Builds a root-first category path from the ancestor chain of an item's
//! primary browse node.

use super::models::{BrowseNodeInfo, CategoryEntry};
use std::collections::HashSet;

/// Walks the ancestors of the first browse node and returns them root-first.
///
/// # Behaviour
///
/// * Only the first browse node is considered; the node itself is not part
///   of the result, only its ancestors.
/// * A category name is recorded once. When two ancestors share a name the
///   deepest one wins and the walk carries on.
/// * The walk stops as soon as an ancestor id repeats, so a malformed chain
///   that loops back on itself still terminates.
/// * Absent or empty input yields an empty path, never an error.
pub fn extract_categories(info: Option<&BrowseNodeInfo>) -> Vec<CategoryEntry> {
    let Some(first) = info
        .and_then(|i| i.browse_nodes.as_ref())
        .and_then(|nodes| nodes.first())
    else {
        return Vec::new();
    };

    let mut visited_ids: HashSet<&str> = HashSet::new();
    let mut seen_names: HashSet<&str> = HashSet::new();
    let mut categories = Vec::new();

    let mut current = first.ancestor.as_deref();
    while let Some(node) = current {
        if let Some(id) = node.id.as_deref() {
            if !visited_ids.insert(id) {
                tracing::warn!(browse_node_id = id, "ancestor chain revisits a node, stopping");
                break;
            }
        }

        if let Some(name) = node.name() {
            if seen_names.insert(name) {
                categories.push(CategoryEntry {
                    name: name.to_string(),
                    id: node.id.clone().unwrap_or_default(),
                });
            }
        }

        current = node.ancestor.as_deref();
    }

    categories.reverse();
    categories
}
