//! GSA (satellites in use) resolution.
//!
//! ```text
//! $GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1*39
//!        | | '---------------------' twelve PRN slots, empty when unused
//!        | '- fix type (1 = none, 2 = 2D, 3 = 3D)
//!        '--- selection mode (A = auto, M = manual)
//! ```
//!
//! GSA carries only PRNs, so the in-use list is produced by joining those
//! PRNs against the latest complete [`ViewSnapshot`].

use tracing::{debug, trace};

use super::model::{InUseSet, Prn, SatelliteRecord, ViewSnapshot};
use crate::nmea::Sentence;

/// Index of the first PRN slot.
const FIRST_PRN_FIELD: usize = 3;

/// Number of PRN slots in a GSA sentence.
const PRN_SLOTS: usize = 12;

/// Joins GSA PRN lists against the published view snapshot.
#[derive(Debug, Default)]
pub struct GsaResolver {
    in_use: InUseSet,
}

impl GsaResolver {
    /// Create a resolver with an empty in-use set.
    pub fn new() -> Self {
        Self::default()
    }

    /// PRNs referenced by the last GSA sentence that was evaluated.
    pub fn in_use(&self) -> &InUseSet {
        &self.in_use
    }

    /// Resolve one GSA sentence against `view`.
    ///
    /// Returns the in-use records in ascending PRN order, or `None` when no
    /// view has been published yet or when any referenced PRN is missing
    /// from `view`.
    pub fn resolve(
        &mut self,
        sentence: &Sentence<'_>,
        view: Option<&ViewSnapshot>,
    ) -> Option<Vec<SatelliteRecord>> {
        let view = match view {
            Some(view) if !view.is_empty() => view,
            _ => {
                trace!("GSA received before any satellites in view, ignoring");
                return None;
            }
        };

        self.in_use = collect_prns(sentence);

        let mut resolved = Vec::with_capacity(self.in_use.len());
        for &prn in &self.in_use {
            match view.get(prn) {
                Some(record) => resolved.push(*record),
                None => debug!(prn, "Satellite in use not found in view"),
            }
        }

        if resolved.len() != self.in_use.len() {
            debug!(
                in_use = self.in_use.len(),
                resolved = resolved.len(),
                "Incomplete in-use resolution, skipping cycle"
            );
            return None;
        }

        Some(resolved)
    }
}

/// Collect the non-empty PRN slots of a GSA sentence.
fn collect_prns(sentence: &Sentence<'_>) -> InUseSet {
    sentence
        .fields()
        .iter()
        .skip(FIRST_PRN_FIELD)
        .take(PRN_SLOTS)
        .filter(|field| !field.is_empty())
        .filter_map(|field| match field.trim().parse::<Prn>() {
            Ok(prn) => Some(prn),
            Err(_) => {
                trace!(field = *field, "Unparseable PRN slot in GSA");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmea::{parse_sentence, xor_checksum};
    use crate::satellite::GsvAccumulator;

    fn line(body: &str) -> Vec<u8> {
        format!("${}*{:02X}", body, xor_checksum(body.as_bytes())).into_bytes()
    }

    fn view() -> ViewSnapshot {
        let mut acc = GsvAccumulator::new();
        acc.accept(
            &parse_sentence(
                b"$GPGSV,2,1,08,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45*75",
            )
            .unwrap(),
        );
        acc.accept(
            &parse_sentence(
                b"$GPGSV,2,2,08,15,52,050,40,18,11,181,34,22,65,095,47,25,33,140,43*7C",
            )
            .unwrap(),
        )
        .unwrap()
    }

    fn resolve(resolver: &mut GsaResolver, body: &str, view: Option<&ViewSnapshot>) -> Option<Vec<Prn>> {
        let raw = line(body);
        let sentence = parse_sentence(&raw).unwrap();
        resolver
            .resolve(&sentence, view)
            .map(|records| records.iter().map(|r| r.prn).collect())
    }

    #[test]
    fn test_all_prns_resolved() {
        let view = view();
        let mut resolver = GsaResolver::new();

        let prns = resolve(&mut resolver, "GPGSA,A,3,14,01,02,12,,,,,,,,,2.5,1.3,2.1", Some(&view));
        assert_eq!(prns, Some(vec![1, 2, 12, 14]));
    }

    #[test]
    fn test_missing_prn_yields_nothing() {
        let view = view();
        let mut resolver = GsaResolver::new();

        let prns = resolve(&mut resolver, "GPGSA,A,3,01,02,99,,,,,,,,,,2.5,1.3,2.1", Some(&view));
        assert_eq!(prns, None);
        assert_eq!(resolver.in_use().len(), 3);
    }

    #[test]
    fn test_duplicate_slots_collapse() {
        let view = view();
        let mut resolver = GsaResolver::new();

        let prns = resolve(&mut resolver, "GPGSA,A,3,01,01,02,,,,,,,,,,2.5,1.3,2.1", Some(&view));
        assert_eq!(prns, Some(vec![1, 2]));
    }

    #[test]
    fn test_no_view_yields_nothing() {
        let mut resolver = GsaResolver::new();
        assert_eq!(
            resolve(&mut resolver, "GPGSA,A,3,01,02,,,,,,,,,,,2.5,1.3,2.1", None),
            None
        );
        let empty = ViewSnapshot::default();
        assert_eq!(
            resolve(&mut resolver, "GPGSA,A,3,01,02,,,,,,,,,,,2.5,1.3,2.1", Some(&empty)),
            None
        );
    }

    #[test]
    fn test_dop_fields_not_treated_as_prns() {
        let view = view();
        let mut resolver = GsaResolver::new();

        let prns = resolve(&mut resolver, "GPGSA,A,3,01,,,,,,,,,,,,2.5,1.3,2.1", Some(&view));
        assert_eq!(prns, Some(vec![1]));
    }

    #[test]
    fn test_no_fix_resolves_to_empty_list() {
        let view = view();
        let mut resolver = GsaResolver::new();

        let prns = resolve(&mut resolver, "GPGSA,A,1,,,,,,,,,,,,,,,", Some(&view));
        assert_eq!(prns, Some(vec![]));
    }

    #[test]
    fn test_short_sentence_does_not_panic() {
        let view = view();
        let mut resolver = GsaResolver::new();

        let prns = resolve(&mut resolver, "GPGSA,A,3,01", Some(&view));
        assert_eq!(prns, Some(vec![1]));
    }
}
