//! Weekday reference tables
//!
//! A weekday table is seven offset bytes, one per day, each pointing at the
//! start of a program in the data region or 0 for "no program". The
//! top-level table points into the timer programs, the table inside each
//! function record into the thermal programs.

use crate::allocator::Allocation;
use crate::config::CodecConfig;
use crate::error::{DecodeError, EncodeError};
use crate::model::{Program, ProgramId, WeekdayTable};
use crate::protocol::{BufferOffset, DAYS_PER_WEEK};
use crate::schedule::{self, ScheduleEntry};
use std::collections::{BTreeMap, BTreeSet};

/// Program ids reached from any weekday table during a compile
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    ids: BTreeSet<ProgramId>,
}

impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str) {
        if !self.ids.contains(id) {
            self.ids.insert(id.to_string());
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Encode a weekday table into its seven offset bytes
///
/// Every slot must name a program of `programs`; the ids are recorded in
/// `references` for the orphan check.
pub fn encode_table<E>(
    table: &WeekdayTable,
    programs: &BTreeMap<ProgramId, Program<E>>,
    allocation: &Allocation,
    references: &mut ReferenceSet,
) -> Result<[u8; DAYS_PER_WEEK], EncodeError> {
    let mut bytes = [0u8; DAYS_PER_WEEK];

    for (byte, slot) in bytes.iter_mut().zip(table.slots()) {
        let id = match slot.as_deref() {
            None | Some("") => continue,
            Some(id) => id,
        };
        let offset = allocation
            .offset(id)
            .filter(|_| programs.contains_key(id))
            .ok_or_else(|| EncodeError::UnknownProgram { id: id.to_string() })?;
        references.insert(id);
        *byte = offset.to_byte();
    }

    Ok(bytes)
}

/// Programs decoded so far, keyed by their offset
///
/// A program referenced from several slots or tables is decoded once.
#[derive(Debug, Clone)]
pub struct ProgramCache<E> {
    programs: BTreeMap<BufferOffset, Program<E>>,
}

impl<E> Default for ProgramCache<E> {
    fn default() -> Self {
        Self {
            programs: BTreeMap::new(),
        }
    }
}

impl<E: ScheduleEntry> ProgramCache<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the program at `offset`, decoding it on first use
    pub fn resolve(
        &mut self,
        buffer: &[u8],
        offset: BufferOffset,
        config: &CodecConfig,
    ) -> Result<ProgramId, DecodeError> {
        if !self.programs.contains_key(&offset) {
            let program = schedule::decode_program(buffer, offset, config)?;
            self.programs.insert(offset, program);
        }
        Ok(program_id(offset))
    }

    /// Number of distinct programs decoded
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Hand over the decoded programs under their synthesized ids
    pub fn into_programs(self) -> BTreeMap<ProgramId, Program<E>> {
        self.programs
            .into_iter()
            .map(|(offset, program)| (program_id(offset), program))
            .collect()
    }
}

/// Id given to a decoded program
///
/// Zero-padded so lexicographic order matches offset order, which makes a
/// decompiled configuration compile back to the same layout.
pub fn program_id(offset: BufferOffset) -> ProgramId {
    format!("{:03}", offset.to_byte())
}

/// Decode the weekday table stored at `position`
pub fn decode_table<E: ScheduleEntry>(
    buffer: &[u8],
    position: usize,
    cache: &mut ProgramCache<E>,
    config: &CodecConfig,
) -> Result<WeekdayTable, DecodeError> {
    let end = position + DAYS_PER_WEEK;
    let bytes = buffer.get(position..end).ok_or(DecodeError::BufferTooShort {
        needed: end,
        available: buffer.len(),
    })?;

    let mut slots: [Option<ProgramId>; DAYS_PER_WEEK] = Default::default();
    for (slot, &byte) in slots.iter_mut().zip(bytes) {
        let offset = BufferOffset::from_byte(byte);
        if !offset.is_none() {
            *slot = Some(cache.resolve(buffer, offset, config)?);
        }
    }

    Ok(WeekdayTable::from(slots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimerEntry;

    fn timer_programs() -> BTreeMap<ProgramId, Program<TimerEntry>> {
        let mut programs = BTreeMap::new();
        programs.insert("work".to_string(), vec![TimerEntry::new(7, 0, 1, 0, 0)].into());
        programs.insert("rest".to_string(), vec![TimerEntry::new(9, 30, 1, 0, 0)].into());
        programs
    }

    #[test]
    fn test_encode_table() {
        let programs = timer_programs();
        let allocation = Allocation::new(programs.iter().map(|(id, p)| (id.as_str(), p.len())), 9);
        let mut table = WeekdayTable::every_day("work");
        table.set(5, Some("rest"));
        table.set(6, None::<&str>);

        let mut references = ReferenceSet::new();
        let bytes = encode_table(&table, &programs, &allocation, &mut references).unwrap();

        // "rest" sorts first
        assert_eq!(bytes, [14, 14, 14, 14, 14, 9, 0]);
        assert!(references.contains("work"));
        assert!(references.contains("rest"));
        assert_eq!(references.len(), 2);
    }

    #[test]
    fn test_encode_unknown_program() {
        let programs = timer_programs();
        let allocation = Allocation::new(programs.iter().map(|(id, p)| (id.as_str(), p.len())), 9);
        let table = WeekdayTable::every_day("holiday");

        let err = encode_table(&table, &programs, &allocation, &mut ReferenceSet::new());
        assert_eq!(
            err,
            Err(EncodeError::UnknownProgram {
                id: "holiday".to_string()
            })
        );
    }

    #[test]
    fn test_encode_wrong_map() {
        // Allocated (it exists in the other map) but not a timer program
        let programs = timer_programs();
        let allocation = Allocation::new([("heat", 1), ("rest", 1), ("work", 1)], 9);
        let table = WeekdayTable::every_day("heat");

        let err = encode_table(&table, &programs, &allocation, &mut ReferenceSet::new());
        assert!(matches!(err, Err(EncodeError::UnknownProgram { .. })));
    }

    #[test]
    fn test_decode_memoizes() {
        // Table at 0, one timer entry at 7
        let mut buffer = vec![7, 7, 0, 7, 0, 0, 0];
        buffer.extend_from_slice(&[0x86, 0x30, 0x01, 0x02, 0x04]);

        let mut cache = ProgramCache::<TimerEntry>::new();
        let table = decode_table(&buffer, 0, &mut cache, &CodecConfig::default()).unwrap();

        assert_eq!(table.get(0), Some("007"));
        assert_eq!(table.get(1), Some("007"));
        assert_eq!(table.get(2), None);
        assert_eq!(cache.len(), 1);

        let programs = cache.into_programs();
        let program = &programs["007"];
        assert_eq!(program.entries(), &[TimerEntry::new(6, 30, 1, 2, 4)]);
    }

    #[test]
    fn test_decode_short_table() {
        let mut cache = ProgramCache::<TimerEntry>::new();
        let err = decode_table(&[0, 0, 0], 0, &mut cache, &CodecConfig::default());
        assert_eq!(
            err,
            Err(DecodeError::BufferTooShort {
                needed: 7,
                available: 3
            })
        );
    }

    #[test]
    fn test_program_id_order() {
        let ids: Vec<ProgramId> = [9u8, 25, 105, 250]
            .iter()
            .map(|&b| program_id(BufferOffset::from_byte(b)))
            .collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(ids[0], "009");
    }
}
