//! Stringency Resolver.
//!
//! Picks the governing zone of a work interval: the highest-ranked zone seen
//! since the interval began. Must be folded over every zone set during the
//! interval, so an escalation stays remembered after a later de-escalation.

use super::{UnknownZone, ZoneId, ZonePolicyTable};

/// Returns the more stringent of the accumulated zone and a candidate.
///
/// The candidate wins only with a strictly higher rank; equal ranks keep
/// the accumulated zone so the result never flaps.
///
/// # Errors
///
/// - `UnknownZone` if either zone is not configured
pub fn most_stringent(
    table: &ZonePolicyTable,
    current_most: Option<&ZoneId>,
    candidate: &ZoneId,
) -> Result<ZoneId, UnknownZone> {
    let candidate_rank = table.rank(candidate)?;
    match current_most {
        None => Ok(candidate.clone()),
        Some(current) => {
            if candidate_rank > table.rank(current)? {
                Ok(candidate.clone())
            } else {
                Ok(current.clone())
            }
        }
    }
}

/// Folds an ordered sequence of zones into its most stringent member.
///
/// Returns `None` for an empty sequence.
pub fn most_stringent_of<'a>(
    table: &ZonePolicyTable,
    zones: impl IntoIterator<Item = &'a ZoneId>,
) -> Result<Option<ZoneId>, UnknownZone> {
    zones.into_iter().try_fold(None, |acc: Option<ZoneId>, zone| {
        most_stringent(table, acc.as_ref(), zone).map(Some)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::zone::ZoneSpec;
    use proptest::prelude::*;

    fn table() -> ZonePolicyTable {
        ZonePolicyTable::new(ZonePolicyTable::heat_zone_specs()).unwrap()
    }

    fn zone(name: &str) -> ZoneId {
        ZoneId::new(name).unwrap()
    }

    #[test]
    fn first_zone_becomes_most_stringent() {
        assert_eq!(most_stringent(&table(), None, &zone("green")).unwrap(), zone("green"));
    }

    #[test]
    fn escalation_replaces_current() {
        let result = most_stringent(&table(), Some(&zone("green")), &zone("black")).unwrap();
        assert_eq!(result, zone("black"));
    }

    #[test]
    fn de_escalation_keeps_current() {
        let result = most_stringent(&table(), Some(&zone("black")), &zone("white")).unwrap();
        assert_eq!(result, zone("black"));
    }

    #[test]
    fn same_zone_keeps_current() {
        let result = most_stringent(&table(), Some(&zone("red")), &zone("red")).unwrap();
        assert_eq!(result, zone("red"));
    }

    #[test]
    fn unknown_candidate_is_rejected() {
        let err = most_stringent(&table(), Some(&zone("white")), &zone("purple")).unwrap_err();
        assert_eq!(err, UnknownZone("purple".to_string()));
    }

    #[test]
    fn white_green_black_white_resolves_to_black() {
        let zones = [zone("white"), zone("green"), zone("black"), zone("white")];
        let result = most_stringent_of(&table(), zones.iter()).unwrap();
        assert_eq!(result, Some(zone("black")));
    }

    #[test]
    fn empty_sequence_resolves_to_none() {
        assert_eq!(most_stringent_of(&table(), std::iter::empty()).unwrap(), None);
    }

    #[test]
    fn custom_ranks_drive_resolution() {
        let inverted = ZonePolicyTable::new(vec![
            ZoneSpec::new("calm", 60.0, 10, 7),
            ZoneSpec::new("storm", 10.0, 40, 2),
        ])
        .unwrap();
        let result = most_stringent(&inverted, Some(&zone("calm")), &zone("storm")).unwrap();
        assert_eq!(result, zone("calm"));
    }

    const HEAT_ZONES: [&str; 6] = ["white", "green", "yellow", "red", "black", "cut-off"];

    proptest! {
        #[test]
        fn result_is_order_independent(indices in proptest::collection::vec(0usize..6, 1..12)) {
            let table = table();
            let zones: Vec<ZoneId> = indices.iter().map(|&i| zone(HEAT_ZONES[i])).collect();
            let mut reversed = zones.clone();
            reversed.reverse();

            let forward = most_stringent_of(&table, zones.iter()).unwrap();
            let backward = most_stringent_of(&table, reversed.iter()).unwrap();
            let max_index = *indices.iter().max().unwrap();

            prop_assert_eq!(forward.clone(), backward);
            prop_assert_eq!(forward, Some(zone(HEAT_ZONES[max_index])));
        }
    }
}
