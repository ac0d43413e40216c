//! Dedup merge of a resolved page into the accumulated catalog.

use std::collections::HashSet;

use crate::domain::ItemDetail;

/// Result of merging one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub appended: usize,
    pub duplicates: usize,
}

/// Append `batch` to `accumulated` in order, skipping any item whose id is
/// already in `seen` or appeared earlier in the same batch. First occurrence
/// wins. `seen` must hold exactly the ids of `accumulated` on entry and does
/// again on return.
pub fn merge_unique(
    accumulated: &mut Vec<ItemDetail>,
    seen: &mut HashSet<u32>,
    batch: Vec<ItemDetail>,
) -> MergeStats {
    let mut stats = MergeStats::default();
    accumulated.reserve(batch.len());

    for item in batch {
        if seen.insert(item.id) {
            accumulated.push(item);
            stats.appended += 1;
        } else {
            stats.duplicates += 1;
        }
    }

    stats
}
