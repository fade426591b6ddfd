//! Old-to-new index translation over a deletion bitmap.
//!
//! After a batch edit, every array is compacted by dropping flagged entries.
//! An index `i` that survives moves down by the number of deleted entries at
//! or before it, which is exactly the inclusive prefix sum of the bitmap.

/// Inclusive prefix sum of the set flags: `sum[i]` counts the deleted
/// entries in `0..=i`, so a surviving index `i` compacts to `i - sum[i]`.
pub fn deletion_prefix_sum(deleted: &[bool]) -> Vec<usize> {
    deleted
        .iter()
        .scan(0usize, |running, &flag| {
            *running += usize::from(flag);
            Some(*running)
        })
        .collect()
}

/// Translates indices of an array before compaction to indices after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRemap {
    deleted: Vec<bool>,
    removed_through: Vec<usize>,
}

impl IndexRemap {
    /// Build the remap for one deletion bitmap.
    pub fn new(deleted: &[bool]) -> Self {
        Self {
            deleted: deleted.to_vec(),
            removed_through: deletion_prefix_sum(deleted),
        }
    }

    /// Number of entries before compaction.
    #[inline]
    pub fn old_len(&self) -> usize {
        self.deleted.len()
    }

    /// Number of entries that survive compaction.
    #[inline]
    pub fn new_len(&self) -> usize {
        self.deleted.len() - self.removed_through.last().copied().unwrap_or(0)
    }

    /// True if `old` is flagged for deletion.
    #[inline]
    pub fn is_deleted(&self, old: usize) -> bool {
        self.deleted[old]
    }

    /// Compacted position of `old`, or `None` if it is deleted or out of range.
    #[inline]
    pub fn new_index(&self, old: usize) -> Option<usize> {
        match self.deleted.get(old) {
            Some(false) => Some(old - self.removed_through[old]),
            _ => None,
        }
    }

    /// Keep the surviving entries of a per-element array, in order.
    pub fn compact_values<T: Clone>(&self, values: &[T]) -> Vec<T> {
        values
            .iter()
            .zip(&self.deleted)
            .filter(|&(_, &deleted)| !deleted)
            .map(|(value, _)| value.clone())
            .collect()
    }
}
