//! Program offset allocation
//!
//! Thermal and timer programs share one data region. Identifiers from both
//! maps are merged, sorted lexicographically and laid out back to back, each
//! program taking [`PROGRAM_ENTRY_SIZE`] bytes per entry. Devices in the
//! field depend on this exact placement, so the order must not change.

use crate::model::ProgramId;
use crate::protocol::{BufferOffset, PROGRAM_ENTRY_SIZE};
use std::collections::BTreeMap;

/// Offsets assigned to every program of a configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Allocation {
    offsets: BTreeMap<ProgramId, BufferOffset>,
    end: usize,
}

impl Allocation {
    /// Lay out programs starting at `start`
    ///
    /// `programs` yields (id, entry count) pairs from both program maps.
    /// When an id appears twice, the last count wins; callers reject such
    /// ids before allocating.
    pub fn new<'a, I>(programs: I, start: usize) -> Self
    where
        I: IntoIterator<Item = (&'a str, usize)>,
    {
        let lengths: BTreeMap<&str, usize> = programs.into_iter().collect();

        let mut offsets = BTreeMap::new();
        let mut cursor = start;
        for (id, entries) in lengths {
            // Callers bound the total size by the store capacity first
            let offset = BufferOffset::from_position(cursor).unwrap_or(BufferOffset::NONE);
            #[cfg(feature = "logging")]
            log::trace!("program '{}' placed at {} ({} entries)", id, offset, entries);
            offsets.insert(id.to_string(), offset);
            cursor += entries * PROGRAM_ENTRY_SIZE;
        }

        Self {
            offsets,
            end: cursor,
        }
    }

    /// Offset of a program; the empty id maps to [`BufferOffset::NONE`]
    pub fn offset(&self, id: &str) -> Option<BufferOffset> {
        if id.is_empty() {
            return Some(BufferOffset::NONE);
        }
        self.offsets.get(id).copied()
    }

    /// Allocated programs in placement order
    pub fn iter(&self) -> impl Iterator<Item = (&str, BufferOffset)> {
        self.offsets.iter().map(|(id, offset)| (id.as_str(), *offset))
    }

    /// Number of allocated programs
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// First byte after the last program
    pub fn end(&self) -> usize {
        self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicographic_placement() {
        let alloc = Allocation::new([("b", 2), ("a", 1), ("10", 1), ("9", 3)], 25);

        let order: Vec<(&str, u8)> = alloc.iter().map(|(id, o)| (id, o.to_byte())).collect();
        assert_eq!(order, vec![("10", 25), ("9", 30), ("a", 45), ("b", 50)]);
        assert_eq!(alloc.end(), 60);
    }

    #[test]
    fn test_empty_id_is_none() {
        let alloc = Allocation::new([("x", 1)], 9);
        assert_eq!(alloc.offset(""), Some(BufferOffset::NONE));
        assert_eq!(alloc.offset("x"), Some(BufferOffset::from_byte(9)));
        assert_eq!(alloc.offset("y"), None);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = Allocation::new([("x", 1), ("y", 2), ("z", 3)], 9);
        let b = Allocation::new([("z", 3), ("x", 1), ("y", 2)], 9);
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_programs() {
        let alloc = Allocation::new(std::iter::empty(), 41);
        assert!(alloc.is_empty());
        assert_eq!(alloc.end(), 41);
    }
}
