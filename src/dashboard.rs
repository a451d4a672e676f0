//! Screen data loading.
//!
//! Each loader fetches what one screen needs in a single concurrent round; the
//! first failed request fails the whole load and nothing partial is returned.

use serde::Serialize;
use tracing::{debug, info};

use crate::client::{ApiClient, ApiError};
use crate::error::Result;
use crate::i18n::Locale;
use crate::models::{Beacon, Id, Location, LocationForm, Moto, Zone};
use crate::validation;
use crate::zones::{self, YardPolicy, ZoneTotals};

/// How many recent motos/beacons the home screen lists
pub const RECENT_LIMIT: usize = 5;

/// Home screen: KPIs, zone summary and the most recent registrations
#[derive(Debug, Clone, Serialize)]
pub struct HomeSummary {
    pub zones: Vec<Zone>,
    pub totals: ZoneTotals,
    /// Newest first
    pub recent_motos: Vec<Moto>,
    /// Newest first
    pub recent_beacons: Vec<Beacon>,
}

/// Map screen: zones plus the raw lists they were derived from
#[derive(Debug, Clone, Serialize)]
pub struct YardMap {
    pub zones: Vec<Zone>,
    pub totals: ZoneTotals,
    pub locations: Vec<Location>,
    pub beacons: Vec<Beacon>,
}

impl YardMap {
    pub fn zone(&self, yard_id: Id) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == yard_id)
    }
}

/// Motos with the beacon riding on each
#[derive(Debug, Clone, Serialize)]
pub struct FleetRow {
    pub moto: Moto,
    pub beacon_uuid: Option<String>,
}

pub async fn load_home(client: &ApiClient, locale: Locale) -> std::result::Result<HomeSummary, ApiError> {
    let locations_api = client.locations();
    let beacons_api = client.beacons();
    let motos_api = client.motos();
    let (locations, beacons, motos) =
        tokio::try_join!(locations_api.list(), beacons_api.list(), motos_api.list())?;
    debug!(
        "Home loaded {} locations, {} beacons, {} motos",
        locations.len(),
        beacons.len(),
        motos.len()
    );

    let zones = zones::derive_zones(&locations, &beacons, YardPolicy::LatestTimestamp, locale);
    Ok(HomeSummary {
        totals: zones::totals(&zones),
        zones,
        recent_motos: newest_first(motos),
        recent_beacons: newest_first(beacons),
    })
}

pub async fn load_map(client: &ApiClient, locale: Locale) -> std::result::Result<YardMap, ApiError> {
    let locations_api = client.locations();
    let beacons_api = client.beacons();
    let (locations, beacons) = tokio::try_join!(locations_api.list(), beacons_api.list())?;

    let zones = zones::derive_zones(&locations, &beacons, YardPolicy::LastOccurrence, locale);
    Ok(YardMap {
        totals: zones::totals(&zones),
        zones,
        locations,
        beacons,
    })
}

pub async fn load_fleet(client: &ApiClient) -> std::result::Result<Vec<FleetRow>, ApiError> {
    let motos_api = client.motos();
    let beacons_api = client.beacons();
    let (motos, beacons) = tokio::try_join!(motos_api.list(), beacons_api.list())?;
    Ok(fleet_rows(motos, &beacons))
}

pub fn fleet_rows(motos: Vec<Moto>, beacons: &[Beacon]) -> Vec<FleetRow> {
    motos
        .into_iter()
        .map(|moto| FleetRow {
            beacon_uuid: beacons
                .iter()
                .find(|b| b.moto_id == Some(moto.id))
                .map(|b| b.uuid.clone()),
            moto,
        })
        .collect()
}

/// Validate and record a location, then hand back the refreshed map.
///
/// The motorcycle must already carry a beacon; that is checked against a
/// fresh beacon list before anything is sent.
pub async fn record_location(client: &ApiClient, form: &LocationForm, locale: Locale) -> Result<YardMap> {
    let payload = validation::location_payload(form)?;
    let beacons = client.beacons().list().await?;
    validation::ensure_moto_has_beacon(payload.moto_id, &beacons)?;

    client.locations().create(&payload).await?;
    info!("Location created in yard {}", payload.patio_id);

    Ok(load_map(client, locale).await?)
}

fn newest_first<T>(items: Vec<T>) -> Vec<T> {
    items.into_iter().rev().take(RECENT_LIMIT).collect()
}
