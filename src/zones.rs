//! Zone aggregation.
//!
//! Turns flat location and beacon lists into one summary per yard: how many
//! distinct motorcycles currently sit there and how many beacons ride on them.
//! Zones are rebuilt from scratch on every load.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::i18n::Locale;
use crate::models::{Beacon, Id, Location, Zone};

/// How to pick a motorcycle's current yard when it has several locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YardPolicy {
    /// The last record in list order wins.
    #[default]
    LastOccurrence,
    /// The record with the newest `dataHora` wins. Records without a usable
    /// timestamp lose to any timestamped one; ties go to the later record.
    LatestTimestamp,
}

/// Current yard of every motorcycle that has at least one location
pub fn current_yards(locations: &[Location], policy: YardPolicy) -> HashMap<Id, Id> {
    match policy {
        YardPolicy::LastOccurrence => locations
            .iter()
            .map(|loc| (loc.moto_id, loc.patio_id))
            .collect(),
        YardPolicy::LatestTimestamp => {
            let mut latest: HashMap<Id, (Option<NaiveDateTime>, Id)> = HashMap::new();
            for loc in locations {
                let seen = loc.observed_at();
                latest
                    .entry(loc.moto_id)
                    .and_modify(|(at, yard)| {
                        if seen >= *at {
                            *at = seen;
                            *yard = loc.patio_id;
                        }
                    })
                    .or_insert((seen, loc.patio_id));
            }
            latest
                .into_iter()
                .map(|(moto, (_, yard))| (moto, yard))
                .collect()
        }
    }
}

/// Build the zone list, sorted by yard id. Yards without a joined name are
/// labelled "Yard {id}" in `locale`.
pub fn derive_zones(
    locations: &[Location],
    beacons: &[Beacon],
    policy: YardPolicy,
    locale: Locale,
) -> Vec<Zone> {
    let moto_to_yard = current_yards(locations, policy);

    let mut yard_names: HashMap<Id, &str> = HashMap::new();
    for loc in locations {
        if let Some(name) = loc.nome_patio.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            yard_names.insert(loc.patio_id, name);
        }
    }

    let mut yard_motos: BTreeMap<Id, BTreeSet<Id>> = BTreeMap::new();
    for (&moto, &yard) in &moto_to_yard {
        yard_motos.entry(yard).or_default().insert(moto);
    }

    let mut yard_beacons: BTreeMap<Id, usize> = BTreeMap::new();
    for yard in beacons
        .iter()
        .filter_map(|b| b.moto_id)
        .filter_map(|moto| moto_to_yard.get(&moto))
    {
        *yard_beacons.entry(*yard).or_default() += 1;
    }

    let yard_ids: BTreeSet<Id> = yard_motos.keys().chain(yard_beacons.keys()).copied().collect();

    yard_ids
        .into_iter()
        .map(|id| Zone {
            id,
            label: yard_names
                .get(&id)
                .map(|name| name.to_string())
                .unwrap_or_else(|| locale.t_with("home.yard", &[("id", &id)])),
            motos: yard_motos.get(&id).map_or(0, BTreeSet::len),
            beacons: yard_beacons.get(&id).copied().unwrap_or(0),
        })
        .collect()
}

/// Dashboard KPIs summed over all zones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ZoneTotals {
    pub motos: usize,
    pub beacons: usize,
}

pub fn totals(zones: &[Zone]) -> ZoneTotals {
    zones.iter().fold(ZoneTotals::default(), |acc, z| ZoneTotals {
        motos: acc.motos + z.motos,
        beacons: acc.beacons + z.beacons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(moto_id: Id, patio_id: Id) -> Location {
        Location {
            id: 0,
            posicao_x: 0.0,
            posicao_y: 0.0,
            data_hora: None,
            moto_id,
            patio_id,
            placa_moto: None,
            nome_patio: None,
        }
    }

    fn loc_at(moto_id: Id, patio_id: Id, at: &str) -> Location {
        Location {
            data_hora: Some(at.into()),
            ..loc(moto_id, patio_id)
        }
    }

    fn beacon(id: Id, moto_id: Option<Id>) -> Beacon {
        Beacon {
            id,
            uuid: format!("B-{}", id),
            bateria: Some(90),
            moto_id,
            modelo_beacon_id: None,
            placa_moto: None,
            modelo_nome: None,
        }
    }

    fn zones(locations: &[Location], beacons: &[Beacon]) -> Vec<Zone> {
        derive_zones(locations, beacons, YardPolicy::LastOccurrence, Locale::PtBr)
    }

    #[test]
    fn two_motos_one_beacon_in_same_yard() {
        let result = zones(&[loc(1, 5), loc(2, 5)], &[beacon(1, Some(1))]);
        assert_eq!(
            result,
            vec![Zone {
                id: 5,
                label: "Pátio 5".into(),
                motos: 2,
                beacons: 1
            }]
        );
    }

    #[test]
    fn empty_input_gives_no_zones() {
        assert!(zones(&[], &[]).is_empty());
        assert!(zones(&[], &[beacon(1, Some(1))]).is_empty());
    }

    #[test]
    fn moto_counts_only_in_its_latest_yard() {
        let result = zones(&[loc(1, 2), loc(1, 3), loc(2, 2)], &[beacon(1, Some(1))]);
        let counts: Vec<_> = result.iter().map(|z| (z.id, z.motos, z.beacons)).collect();
        assert_eq!(counts, vec![(2, 1, 0), (3, 1, 1)]);
    }

    #[test]
    fn repeated_locations_count_moto_once() {
        let result = zones(&[loc(7, 1), loc(7, 1), loc(7, 1)], &[]);
        assert_eq!(result[0].motos, 1);
    }

    #[test]
    fn unlinked_and_unlocated_beacons_are_ignored() {
        let result = zones(
            &[loc(1, 4)],
            &[beacon(1, None), beacon(2, Some(99)), beacon(3, Some(1)), beacon(4, Some(1))],
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].beacons, 2);
    }

    #[test]
    fn zones_sorted_by_yard_without_duplicates() {
        let result = zones(&[loc(1, 30), loc(2, 4), loc(3, 12), loc(4, 4)], &[]);
        let ids: Vec<_> = result.iter().map(|z| z.id).collect();
        assert_eq!(ids, vec![4, 12, 30]);
    }

    #[test]
    fn yard_name_used_as_label_when_known() {
        let named = Location {
            nome_patio: Some("Pátio Butantã".into()),
            ..loc(1, 8)
        };
        let result = derive_zones(&[named, loc(2, 9)], &[], YardPolicy::LastOccurrence, Locale::EsEs);
        assert_eq!(result[0].label, "Pátio Butantã");
        assert_eq!(result[1].label, "Patio 9");
    }

    #[test]
    fn latest_timestamp_policy_ignores_list_order() {
        let locations = [
            loc_at(1, 2, "2025-05-02T08:00:00"),
            loc_at(1, 3, "2025-05-01T08:00:00"),
        ];

        let by_order = current_yards(&locations, YardPolicy::LastOccurrence);
        let by_time = current_yards(&locations, YardPolicy::LatestTimestamp);

        assert_eq!(by_order[&1], 3);
        assert_eq!(by_time[&1], 2);
    }

    #[test]
    fn latest_timestamp_prefers_timestamped_records_and_later_ties() {
        let locations = [
            loc_at(1, 2, "2025-05-01T08:00:00"),
            loc(1, 3),
            loc_at(1, 4, "2025-05-01T08:00:00"),
        ];
        assert_eq!(current_yards(&locations, YardPolicy::LatestTimestamp)[&1], 4);
    }

    #[test]
    fn moto_count_matches_distinct_latest_yards() {
        let locations = [loc(1, 1), loc(2, 1), loc(3, 2), loc(1, 2), loc(4, 3), loc(2, 3)];
        let beacons = [beacon(1, Some(1)), beacon(2, Some(2)), beacon(3, Some(3))];
        let result = zones(&locations, &beacons);

        let current = current_yards(&locations, YardPolicy::LastOccurrence);
        for zone in &result {
            let expected = current.values().filter(|&&y| y == zone.id).count();
            assert_eq!(zone.motos, expected);
            let expected_beacons = beacons
                .iter()
                .filter(|b| b.moto_id.and_then(|m| current.get(&m)) == Some(&zone.id))
                .count();
            assert_eq!(zone.beacons, expected_beacons);
        }
        assert_eq!(totals(&result), ZoneTotals { motos: 4, beacons: 3 });
    }
}
