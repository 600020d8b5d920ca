//! Editable thermostat configuration
//!
//! These are the types the editing layer mutates. [`crate::compile`] turns a
//! [`Configuration`] into a program blob and [`crate::decompile`] rebuilds one.

use crate::error::EncodeError;
use crate::protocol::{self, SensorId, DAYS_PER_WEEK};
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Program identifier shared by the thermal and timer program maps
pub type ProgramId = String;

/// 8-bit relay mask, one bit per relay
pub type RelayMask = u8;

/// Time of day at minute resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeOfDay {
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
}

impl TimeOfDay {
    /// Create a new time of day (not range checked)
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    /// Check that hour and minute are within a day
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.hour > 23 || self.minute > 59 {
            return Err(EncodeError::InvalidTime {
                hour: self.hour,
                minute: self.minute,
            });
        }
        Ok(())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Thermal setpoint taking effect at a time of day
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThermalEntry {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub time: TimeOfDay,
    /// Target temperature (signed, 1/256 resolution on the wire)
    pub temperature: f64,
    /// Hysteresis around the target (unsigned, 1/16 resolution on the wire)
    pub hysteresis: f64,
}

impl ThermalEntry {
    pub fn new(hour: u8, minute: u8, temperature: f64, hysteresis: f64) -> Self {
        Self {
            time: TimeOfDay::new(hour, minute),
            temperature,
            hysteresis,
        }
    }
}

/// Relay actions applied at a time of day
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TimerEntry {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub time: TimeOfDay,
    /// Relays switched on
    pub relays_on: RelayMask,
    /// Relays switched off
    pub relays_off: RelayMask,
    /// Relays pulsed once
    pub relays_once: RelayMask,
}

impl TimerEntry {
    pub fn new(hour: u8, minute: u8, relays_on: u8, relays_off: u8, relays_once: u8) -> Self {
        Self {
            time: TimeOfDay::new(hour, minute),
            relays_on,
            relays_off,
            relays_once,
        }
    }
}

/// Anything stored as one entry of a daily program
pub trait Timed {
    /// When the entry takes effect
    fn time(&self) -> TimeOfDay;
}

impl Timed for ThermalEntry {
    fn time(&self) -> TimeOfDay {
        self.time
    }
}

impl Timed for TimerEntry {
    fn time(&self) -> TimeOfDay {
        self.time
    }
}

/// One day's schedule
///
/// Entries keep the order they were pushed in; the last one is the terminal
/// entry on the wire. Call [`Program::sort_entries`] to order them by time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Program<E> {
    entries: Vec<E>,
}

impl<E> Default for Program<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E> Program<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: E) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut Vec<E> {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.entries.iter()
    }

    /// Bytes this program occupies in the data region
    pub fn encoded_size(&self) -> usize {
        self.entries.len() * protocol::PROGRAM_ENTRY_SIZE
    }
}

impl<E: Timed> Program<E> {
    /// Order entries by time of day, keeping the relative order of ties
    pub fn sort_entries(&mut self) {
        self.entries.sort_by_key(|e| e.time());
    }
}

impl<E> From<Vec<E>> for Program<E> {
    fn from(entries: Vec<E>) -> Self {
        Self { entries }
    }
}

impl<E> FromIterator<E> for Program<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a, E> IntoIterator for &'a Program<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Seven weekday slots, each naming a program or nothing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WeekdayTable {
    slots: [Option<ProgramId>; DAYS_PER_WEEK],
}

impl WeekdayTable {
    /// Table with every slot empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with every slot referencing the same program
    pub fn every_day(id: impl Into<ProgramId>) -> Self {
        let id = id.into();
        Self {
            slots: std::array::from_fn(|_| Some(id.clone())),
        }
    }

    pub fn get(&self, day: usize) -> Option<&str> {
        self.slots
            .get(day)
            .and_then(|slot| slot.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// Set or clear a slot; an empty id clears it. Days past 6 are ignored.
    pub fn set(&mut self, day: usize, id: Option<impl Into<ProgramId>>) {
        if let Some(slot) = self.slots.get_mut(day) {
            *slot = id.map(Into::into).filter(|id: &ProgramId| !id.is_empty());
        }
    }

    pub fn slots(&self) -> &[Option<ProgramId>; DAYS_PER_WEEK] {
        &self.slots
    }

    /// Non-empty program ids in slot order (may repeat)
    pub fn referenced(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_deref())
            .filter(|id| !id.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.referenced().next().is_none()
    }
}

impl From<[Option<ProgramId>; DAYS_PER_WEEK]> for WeekdayTable {
    fn from(slots: [Option<ProgramId>; DAYS_PER_WEEK]) -> Self {
        Self { slots }
    }
}

/// Sensor-driven control rule
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Function {
    /// Controlling sensor
    pub sensor: SensorId,
    /// Sensor subtracted from `sensor`; must be some function's `sensor`
    #[cfg_attr(feature = "serde", serde(default))]
    pub diff: Option<SensorId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooling: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub critical: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub display: bool,
    /// Feed formula input bit N (0-7) instead of switching relays
    #[cfg_attr(feature = "serde", serde(default))]
    pub formula_index: Option<u8>,
    /// Relays switched directly
    #[cfg_attr(feature = "serde", serde(default))]
    pub relays: RelayMask,
    /// Thermal program per weekday
    #[cfg_attr(feature = "serde", serde(default))]
    pub programs: WeekdayTable,
}

impl Function {
    /// Function on `sensor` with no flags, relays or programs
    pub fn new(sensor: SensorId) -> Self {
        Self {
            sensor,
            diff: None,
            cooling: false,
            critical: false,
            display: false,
            formula_index: None,
            relays: 0,
            programs: WeekdayTable::new(),
        }
    }
}

/// Indirect control rule over formula input bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Formula {
    pub mask1: u8,
    pub mask2: u8,
    /// Relays engaged while the formula holds
    pub relays: RelayMask,
}

/// Complete thermostat configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct Configuration {
    /// Timer program per weekday
    pub timer: WeekdayTable,
    /// Relays forced on when the watchdog triggers
    pub watchdog_relays: RelayMask,
    pub functions: Vec<Function>,
    pub formulas: Vec<Formula>,
    pub thermal_programs: BTreeMap<ProgramId, Program<ThermalEntry>>,
    pub timer_programs: BTreeMap<ProgramId, Program<TimerEntry>>,
}

impl Configuration {
    /// Empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Size in bytes of the blob this configuration compiles to
    pub fn encoded_size(&self) -> usize {
        protocol::program_section_start(self.functions.len(), self.formulas.len())
            + self.program_bytes()
    }

    /// Bytes used by all programs of both maps
    pub fn program_bytes(&self) -> usize {
        self.thermal_programs
            .values()
            .map(Program::encoded_size)
            .chain(self.timer_programs.values().map(Program::encoded_size))
            .sum()
    }

    /// Sort the entries of every program by time of day
    pub fn sort_entries(&mut self) {
        self.thermal_programs
            .values_mut()
            .for_each(Program::sort_entries);
        self.timer_programs
            .values_mut()
            .for_each(Program::sort_entries);
    }

    /// Index of the function controlled by `sensor`
    pub fn function_index(&self, sensor: &SensorId) -> Option<usize> {
        self.functions.iter().position(|f| &f.sensor == sensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(s: &str) -> SensorId {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_configuration() {
        let config = Configuration::new();
        assert!(config.timer.is_empty());
        assert_eq!(config.watchdog_relays, 0);
        assert_eq!(config.encoded_size(), 9);
    }

    #[test]
    fn test_time_validation() {
        assert!(TimeOfDay::new(23, 59).validate().is_ok());
        assert_eq!(
            TimeOfDay::new(24, 0).validate(),
            Err(EncodeError::InvalidTime { hour: 24, minute: 0 })
        );
        assert!(TimeOfDay::new(12, 60).validate().is_err());
        assert_eq!(TimeOfDay::new(6, 5).to_string(), "06:05");
    }

    #[test]
    fn test_sort_entries_is_stable() {
        let mut program: Program<TimerEntry> = vec![
            TimerEntry::new(18, 0, 0x01, 0, 0),
            TimerEntry::new(6, 30, 0x02, 0, 0),
            TimerEntry::new(6, 30, 0x04, 0, 0),
            TimerEntry::new(0, 0, 0x08, 0, 0),
        ]
        .into();

        program.sort_entries();

        let order: Vec<u8> = program.iter().map(|e| e.relays_on).collect();
        assert_eq!(order, vec![0x08, 0x02, 0x04, 0x01]);
    }

    #[test]
    fn test_weekday_table() {
        let mut table = WeekdayTable::new();
        table.set(0, Some("a"));
        table.set(3, Some("b"));
        table.set(5, Some(""));
        table.set(9, Some("ignored"));

        assert_eq!(table.get(0), Some("a"));
        assert_eq!(table.get(5), None);
        assert_eq!(table.referenced().collect::<Vec<_>>(), vec!["a", "b"]);

        table.set(0, None::<&str>);
        assert_eq!(table.get(0), None);
    }

    #[test]
    fn test_encoded_size() {
        let mut config = Configuration::new();
        config.functions.push(Function::new(sensor("0102030405AA")));
        config.formulas.push(Formula::default());
        config.thermal_programs.insert(
            "1".into(),
            vec![ThermalEntry::new(6, 0, 21.0, 0.5), ThermalEntry::new(22, 0, 18.0, 0.5)].into(),
        );
        config
            .timer_programs
            .insert("2".into(), vec![TimerEntry::new(7, 0, 1, 0, 0)].into());

        assert_eq!(config.program_bytes(), 15);
        assert_eq!(config.encoded_size(), 9 + 16 + 3 + 15);
        assert_eq!(config.function_index(&sensor("0102030405AA")), Some(0));
        assert_eq!(config.function_index(&sensor("000000000000")), None);
    }
}
