//! GSV (satellites in view) accumulation.
//!
//! A GSV group is split over one or more sentences:
//!
//! ```text
//! $GPGSV,2,1,08,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45*75
//!        | | |  '---------- up to four (PRN, elevation, azimuth, SNR) groups
//!        | | '------------- satellites in view
//!        | '--------------- sentence index (1-based)
//!        '----------------- sentence count
//! ```
//!
//! Sentences accumulate into an in-progress map that is only published once
//! the last sentence of the group arrives.

use std::collections::BTreeMap;
use std::str::FromStr;

use tracing::{debug, info, trace};

use super::model::{Constellation, Prn, SatelliteRecord, ViewSnapshot};
use crate::nmea::Sentence;

/// Index of the first satellite field group.
const FIRST_GROUP_FIELD: usize = 4;

/// Fields per satellite group.
const GROUP_LEN: usize = 4;

/// Builds [`ViewSnapshot`]s out of multi-sentence GSV groups.
#[derive(Debug, Default)]
pub struct GsvAccumulator {
    in_progress: BTreeMap<Prn, SatelliteRecord>,
    next_index: Option<u32>,
}

impl GsvAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of satellites collected for the group in progress.
    pub fn pending_len(&self) -> usize {
        self.in_progress.len()
    }

    /// Feed one GSV sentence.
    ///
    /// Returns the completed snapshot when `sentence` is the last one of its
    /// group, `None` otherwise.
    pub fn accept(&mut self, sentence: &Sentence<'_>) -> Option<ViewSnapshot> {
        let fields = sentence.fields();
        if fields.len() < FIRST_GROUP_FIELD {
            trace!(fields = fields.len(), "GSV sentence without header, ignoring");
            return None;
        }

        let (Some(count), Some(index)) = (parse_nonzero(fields[1]), parse_nonzero(fields[2])) else {
            debug!(
                count = fields[1],
                index = fields[2],
                "GSV sentence with invalid header, ignoring"
            );
            return None;
        };
        let declared: usize = parse_or_zero(fields[3]);

        if index == 1 {
            self.in_progress.clear();
        } else if self.next_index != Some(index) {
            debug!(
                index,
                count,
                expected = ?self.next_index,
                "GSV sentence out of sequence"
            );
        }
        self.next_index = index.checked_add(1);

        let constellation = Constellation::from_talker(sentence.talker());
        for group in fields[FIRST_GROUP_FIELD..].chunks_exact(GROUP_LEN) {
            let Ok(prn) = group[0].parse::<Prn>() else {
                trace!(prn = group[0], "GSV group without PRN, skipping");
                continue;
            };
            self.in_progress.insert(
                prn,
                SatelliteRecord {
                    constellation,
                    prn,
                    elevation: parse_or_zero(group[1]),
                    azimuth: parse_or_zero(group[2]),
                    signal_strength: parse_or_zero(group[3]),
                },
            );
        }

        if index != count {
            return None;
        }

        self.next_index = None;
        if self.in_progress.len() != declared {
            info!(
                declared,
                collected = self.in_progress.len(),
                %constellation,
                "Satellites in view count mismatch"
            );
        }

        Some(ViewSnapshot::from_map(self.in_progress.clone()))
    }
}

/// Parse a 1-based header number, rejecting zero and garbage.
fn parse_nonzero(field: &str) -> Option<u32> {
    field.trim().parse().ok().filter(|&n| n > 0)
}

/// Parse a numeric field, treating empty or malformed values as zero.
fn parse_or_zero<T: FromStr + Default>(field: &str) -> T {
    field.trim().parse().unwrap_or_default()
}
