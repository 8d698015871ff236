//! Satellite data model: records, constellations and snapshots.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::nmea::TalkerId;

/// Satellite PRN number.
pub type Prn = u16;

/// PRNs referenced by the most recent GSA sentence.
///
/// Ordered so that joins against a [`ViewSnapshot`] are deterministic.
pub type InUseSet = BTreeSet<Prn>;

/// Satellite navigation system, derived from the sentence talker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constellation {
    /// `GP` - NAVSTAR GPS.
    Gps,
    /// `GL` - GLONASS.
    Glonass,
    /// `GA` - Galileo.
    Galileo,
    /// `GB` / `BD` - BeiDou.
    BeiDou,
    /// `GQ` - QZSS.
    Qzss,
    /// `GI` - NavIC (IRNSS).
    Navic,
    /// `GN` - combined multi-constellation solution.
    Multi,
    /// Any other talker.
    Unknown,
}

impl Constellation {
    /// Map a talker identifier to its constellation.
    pub fn from_talker(talker: TalkerId) -> Self {
        match talker.as_bytes() {
            b"GP" => Constellation::Gps,
            b"GL" => Constellation::Glonass,
            b"GA" => Constellation::Galileo,
            b"GB" | b"BD" => Constellation::BeiDou,
            b"GQ" => Constellation::Qzss,
            b"GI" => Constellation::Navic,
            b"GN" => Constellation::Multi,
            _ => Constellation::Unknown,
        }
    }

    /// Short display name.
    pub fn name(&self) -> &'static str {
        match self {
            Constellation::Gps => "GPS",
            Constellation::Glonass => "GLONASS",
            Constellation::Galileo => "Galileo",
            Constellation::BeiDou => "BeiDou",
            Constellation::Qzss => "QZSS",
            Constellation::Navic => "NavIC",
            Constellation::Multi => "GNSS",
            Constellation::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Constellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One satellite as reported by a GSV field group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SatelliteRecord {
    /// Navigation system the satellite belongs to.
    pub constellation: Constellation,

    /// PRN number; identity within the constellation.
    pub prn: Prn,

    /// Elevation above the horizon in degrees.
    pub elevation: i16,

    /// Azimuth from true north in degrees.
    pub azimuth: u16,

    /// Signal-to-noise ratio in dB-Hz (0 when not tracked).
    pub signal_strength: u8,
}

/// The most recently completed GSV group, keyed by PRN.
///
/// Snapshots are immutable once published; a new group replaces the whole
/// snapshot rather than merging into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSnapshot {
    satellites: BTreeMap<Prn, SatelliteRecord>,
}

impl ViewSnapshot {
    pub(crate) fn from_map(satellites: BTreeMap<Prn, SatelliteRecord>) -> Self {
        Self { satellites }
    }

    /// Look up a satellite by PRN.
    pub fn get(&self, prn: Prn) -> Option<&SatelliteRecord> {
        self.satellites.get(&prn)
    }

    /// Whether the snapshot contains `prn`.
    pub fn contains(&self, prn: Prn) -> bool {
        self.satellites.contains_key(&prn)
    }

    /// Number of satellites in view.
    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    /// Whether no satellite is in view.
    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }

    /// Iterate records in ascending PRN order.
    pub fn iter(&self) -> impl Iterator<Item = &SatelliteRecord> {
        self.satellites.values()
    }

    /// Copy the records out in ascending PRN order.
    pub fn records(&self) -> Vec<SatelliteRecord> {
        self.satellites.values().copied().collect()
    }
}
