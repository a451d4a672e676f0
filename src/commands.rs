//! Commands Module
//!
//! One handler per user action. Handlers return the text to print; failures
//! come back as [`AppError`] for the caller to show as an [`Alert`].
//!
//! [`Alert`]: crate::error::Alert

use std::fmt::Write as _;

use serde::Serialize;
use tracing::{debug, info};

use crate::client::ApiError;
use crate::dashboard::{self, FleetRow, HomeSummary, YardMap};
use crate::error::{Alert, Result};
use crate::i18n::Locale;
use crate::models::{
    Beacon, BeaconForm, Id, Location, LocationForm, Moto, MotoForm, RegisterForm, User, Zone,
};
use crate::theme::{Palette, ThemeMode};
use crate::validation;
use crate::AppState;

/// Output format for listing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Text,
    Json,
}

fn render<T: Serialize>(format: Format, value: &T, text: impl FnOnce() -> String) -> Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(value)?),
        Format::Text => Ok(text()),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub async fn login(state: &mut AppState, username: &str, password: &str) -> Result<String> {
    let locale = state.locale();
    let user = state.session.login(username, password).await?;
    Ok(format!("{} {}", locale.t("login.welcome"), display_name(user)))
}

pub fn logout(state: &mut AppState) -> Result<String> {
    state.session.logout()?;
    Ok(state.locale.t("login.loggedOut"))
}

pub async fn whoami(state: &mut AppState, format: Format) -> Result<String> {
    let locale = state.locale();
    let user = state.session.restore().await?.cloned();
    match user {
        Some(user) => render(format, &user, || render_user(&user)),
        None => Ok(locale.t("login.anonymous")),
    }
}

pub async fn register(state: &AppState, form: &RegisterForm) -> Result<String> {
    let locale = state.locale();
    let payload = validation::registration_payload(form)?;
    match state.api.users().register(&payload).await {
        Ok(()) => Ok(locale.t("register.success")),
        // The backend answers 400 when the email is taken
        Err(ApiError::Http { status: 400, .. }) => Err(ApiError::Http {
            status: 400,
            message: Some(locale.t("register.emailInUse")),
        }
        .into()),
        Err(e) => Err(e.into()),
    }
}

fn display_name(user: &User) -> String {
    user.nome
        .clone()
        .or_else(|| user.username.clone())
        .unwrap_or_default()
}

fn render_user(user: &User) -> String {
    let mut out = display_name(user);
    if let Some(email) = &user.email {
        let _ = write!(out, " <{}>", email);
    }
    if let Some(cargo) = &user.cargo {
        let _ = write!(out, " ({})", cargo);
    }
    if let Some(id) = user.id_funcionario {
        let _ = write!(out, " #{}", id);
    }
    out
}

// ---------------------------------------------------------------------------
// Dashboard and map
// ---------------------------------------------------------------------------

pub async fn home(state: &AppState, format: Format) -> Result<String> {
    let locale = state.locale();
    let summary = dashboard::load_home(&state.api, locale).await?;
    render(format, &summary, || render_home(&summary, locale))
}

/// A zone with the bar colour it is drawn in
#[derive(Debug, Serialize)]
pub struct ZoneBar<'a> {
    #[serde(flatten)]
    pub zone: &'a Zone,
    pub color: String,
}

pub fn zone_bars<'a>(zones: &'a [Zone], palette: &Palette) -> Vec<ZoneBar<'a>> {
    zones
        .iter()
        .enumerate()
        .map(|(i, zone)| ZoneBar {
            zone,
            color: palette.zone_band(i),
        })
        .collect()
}

pub async fn map(state: &AppState, format: Format) -> Result<String> {
    let locale = state.locale();
    let map = dashboard::load_map(&state.api, locale).await?;
    let bars = zone_bars(&map.zones, state.theme.palette());
    render(format, &bars, || render_zones(&map, &bars, locale))
}

pub fn render_home(summary: &HomeSummary, locale: Locale) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} - {}", locale.t("home.brand"), locale.t("home.subtitle"));
    let _ = writeln!(
        out,
        "{} {}: {}",
        locale.t("home.kpiMotosTitle"),
        locale.t("home.kpiMotosSuffix"),
        summary.totals.motos
    );
    let _ = writeln!(
        out,
        "{} {}: {}",
        locale.t("home.kpiBeaconsTitle"),
        locale.t("home.kpiBeaconsSuffix"),
        summary.totals.beacons
    );

    let _ = writeln!(out, "\n{}", locale.t("home.mapSummary"));
    if summary.zones.is_empty() {
        let _ = writeln!(out, "  {}", locale.t("common.empty"));
    }
    for zone in &summary.zones {
        let _ = writeln!(out, "  {}", zone_line(zone, locale));
    }

    let _ = writeln!(out, "\n{}", locale.t("home.lastMotos"));
    if summary.recent_motos.is_empty() {
        let _ = writeln!(out, "  {}", locale.t("home.noBikes"));
    }
    for moto in &summary.recent_motos {
        let _ = writeln!(out, "  {}", moto_line(moto, None));
    }

    let _ = writeln!(out, "\n{}", locale.t("home.lastBeacons"));
    if summary.recent_beacons.is_empty() {
        let _ = writeln!(out, "  {}", locale.t("home.noBeacons"));
    }
    for beacon in &summary.recent_beacons {
        let _ = writeln!(out, "  {}", beacon_line(beacon, locale));
    }
    out
}

fn render_zones(map: &YardMap, bars: &[ZoneBar<'_>], locale: Locale) -> String {
    if bars.is_empty() {
        return locale.t("common.empty");
    }
    let mut out = String::new();
    for bar in bars {
        let _ = writeln!(
            out,
            "[{}] {} ({})",
            bar.zone.id,
            zone_line(bar.zone, locale),
            bar.color
        );
    }
    let _ = write!(
        out,
        "{}: {} • {}: {}",
        locale.t("home.kpiMotosTitle"),
        map.totals.motos,
        locale.t("home.kpiBeaconsTitle"),
        map.totals.beacons
    );
    out
}

fn zone_line(zone: &Zone, locale: Locale) -> String {
    locale.t_with(
        "home.zoneCounts",
        &[("label", &zone.label), ("motos", &zone.motos), ("beacons", &zone.beacons)],
    )
}

// ---------------------------------------------------------------------------
// Motos
// ---------------------------------------------------------------------------

/// Fields to change on an existing moto; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct MotoChanges {
    pub placa: Option<String>,
    pub cliente_id: Option<String>,
    pub modelo_moto_id: Option<String>,
}

impl MotoChanges {
    fn apply(self, moto: &Moto) -> MotoForm {
        MotoForm {
            placa: self.placa.unwrap_or_else(|| moto.placa.clone()),
            cliente_id: self.cliente_id.unwrap_or_else(|| moto.cliente_id.to_string()),
            modelo_moto_id: self
                .modelo_moto_id
                .unwrap_or_else(|| moto.modelo_moto_id.to_string()),
        }
    }
}

pub async fn motos_list(state: &AppState, query: Option<&str>, format: Format) -> Result<String> {
    let locale = state.locale();
    let rows: Vec<FleetRow> = dashboard::load_fleet(&state.api)
        .await?
        .into_iter()
        .filter(|row| query.map_or(true, |q| row.moto.matches(q)))
        .collect();
    debug!("{} motos after filtering", rows.len());

    render(format, &rows, || {
        if rows.is_empty() {
            return locale.t("motos.empty");
        }
        rows.iter()
            .map(|row| moto_line(&row.moto, row.beacon_uuid.as_deref()))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

pub async fn motos_get(state: &AppState, id: Id, format: Format) -> Result<String> {
    let moto = state.api.motos().get(id).await?;
    render(format, &moto, || moto_line(&moto, None))
}

pub async fn motos_create(state: &AppState, form: &MotoForm) -> Result<String> {
    let payload = validation::moto_payload(form)?;
    let moto = state.api.motos().create(&payload).await?;
    Ok(format!("{} ({})", Alert::success(state.locale(), "motos.created"), moto_line(&moto, None)))
}

pub async fn motos_update(state: &AppState, id: Id, changes: MotoChanges) -> Result<String> {
    let current = state.api.motos().get(id).await?;
    let payload = validation::moto_payload(&changes.apply(&current))?;
    let moto = state.api.motos().update(id, &payload).await?;
    Ok(format!("{} ({})", Alert::success(state.locale(), "motos.updated"), moto_line(&moto, None)))
}

/// Delete after `confirm` accepts the localized question; a refusal sends nothing
pub async fn motos_delete<C>(state: &AppState, id: Id, confirm: C) -> Result<String>
where
    C: FnOnce(&str) -> bool,
{
    let locale = state.locale();
    if !confirm(&locale.t_with("motos.confirmDelete", &[("id", &id)])) {
        return Ok(locale.t("common.cancelled"));
    }
    state.api.motos().delete(id).await?;
    Ok(Alert::success(state.locale(), "motos.deleted").to_string())
}

fn moto_line(moto: &Moto, beacon_uuid: Option<&str>) -> String {
    let mut line = format!("#{} {}", moto.id, moto.placa);
    let model: Vec<&str> = [moto.fabricante.as_deref(), moto.modelo_nome.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !model.is_empty() {
        let _ = write!(line, " • {}", model.join(" "));
    }
    if let Some(client) = &moto.nome_cliente {
        let _ = write!(line, " • {}", client);
    }
    if let Some(uuid) = beacon_uuid {
        let _ = write!(line, " • beacon {}", uuid);
    }
    line
}

// ---------------------------------------------------------------------------
// Beacons
// ---------------------------------------------------------------------------

/// Fields to change on an existing beacon; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct BeaconChanges {
    pub uuid: Option<String>,
    pub bateria: Option<String>,
    pub moto_id: Option<String>,
    pub modelo_beacon_id: Option<String>,
}

impl BeaconChanges {
    fn apply(self, beacon: &Beacon) -> BeaconForm {
        let current = BeaconForm::from(beacon);
        BeaconForm {
            uuid: self.uuid.unwrap_or(current.uuid),
            bateria: self.bateria.unwrap_or(current.bateria),
            moto_id: self.moto_id.unwrap_or(current.moto_id),
            modelo_beacon_id: self.modelo_beacon_id.unwrap_or(current.modelo_beacon_id),
        }
    }
}

pub async fn beacons_list(state: &AppState, query: Option<&str>, format: Format) -> Result<String> {
    let locale = state.locale();
    let beacons: Vec<Beacon> = state
        .api
        .beacons()
        .list()
        .await?
        .into_iter()
        .filter(|b| query.map_or(true, |q| b.matches(q)))
        .collect();

    render(format, &beacons, || {
        if beacons.is_empty() {
            return locale.t("beacons.empty");
        }
        let mut out = format!("{} {}", beacons.len(), locale.t("beacons.title").to_lowercase());
        for beacon in &beacons {
            let _ = write!(out, "\n{}", beacon_line(beacon, locale));
        }
        out
    })
}

pub async fn beacons_get(state: &AppState, id: Id, format: Format) -> Result<String> {
    let locale = state.locale();
    let beacon = state.api.beacons().get(id).await?;
    render(format, &beacon, || beacon_line(&beacon, locale))
}

pub async fn beacons_create(state: &AppState, form: &BeaconForm) -> Result<String> {
    let payload = validation::beacon_payload(form)?;
    let beacon = state.api.beacons().create(&payload).await?;
    let locale = state.locale();
    Ok(format!("{} ({})", Alert::success(locale, "beacons.created"), beacon_line(&beacon, locale)))
}

pub async fn beacons_update(state: &AppState, id: Id, changes: BeaconChanges) -> Result<String> {
    let current = state.api.beacons().get(id).await?;
    let payload = validation::beacon_payload(&changes.apply(&current))?;
    let beacon = state.api.beacons().update(id, &payload).await?;
    let locale = state.locale();
    Ok(format!("{} ({})", Alert::success(locale, "beacons.updated"), beacon_line(&beacon, locale)))
}

pub async fn beacons_delete<C>(state: &AppState, id: Id, confirm: C) -> Result<String>
where
    C: FnOnce(&str) -> bool,
{
    let locale = state.locale();
    if !confirm(&locale.t_with("beacons.confirmDelete", &[("id", &id)])) {
        return Ok(locale.t("common.cancelled"));
    }
    state.api.beacons().delete(id).await?;
    info!("Beacon {} removed by user", id);
    Ok(Alert::success(state.locale(), "beacons.deleted").to_string())
}

fn beacon_line(beacon: &Beacon, locale: Locale) -> String {
    let battery = beacon
        .bateria
        .map(|b| format!("{}%", b))
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!("#{} {} • {}: {}", beacon.id, beacon.uuid, locale.t("field.bateria"), battery);
    if beacon.placa_moto.is_some() || beacon.modelo_nome.is_some() {
        let _ = write!(line, " • {}", beacon.placa_moto.as_deref().unwrap_or("-"));
        if let Some(model) = &beacon.modelo_nome {
            let _ = write!(line, " {}", model);
        }
    }
    line
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

pub async fn locations_list(state: &AppState, yard: Option<Id>, format: Format) -> Result<String> {
    let locale = state.locale();
    let locations: Vec<Location> = state
        .api
        .locations()
        .list()
        .await?
        .into_iter()
        .filter(|l| yard.map_or(true, |y| l.patio_id == y))
        .collect();

    render(format, &locations, || {
        if locations.is_empty() {
            return locale.t("locations.empty");
        }
        locations
            .iter()
            .map(|l| location_line(l, locale))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

pub async fn locations_create(state: &AppState, form: &LocationForm) -> Result<String> {
    let locale = state.locale();
    let map = dashboard::record_location(&state.api, form, locale).await?;
    let mut out = Alert::success(locale, "locations.created").to_string();
    if let Some(zone) = map.zone(form.patio_id) {
        let _ = write!(out, "\n{}", zone_line(zone, locale));
    }
    Ok(out)
}

fn location_line(location: &Location, locale: Locale) -> String {
    let moto = match &location.placa_moto {
        Some(plate) => locale.t_with("home.bikeLabel", &[("plate", plate)]),
        None => locale.t_with("home.bikeNumber", &[("id", &location.moto_id)]),
    };
    let yard = match &location.nome_patio {
        Some(name) => locale.t_with("home.yardLabel", &[("name", name)]),
        None => locale.t_with("home.yard", &[("id", &location.patio_id)]),
    };
    let mut line = format!(
        "#{} {} • {} • ({}, {})",
        location.id, moto, yard, location.posicao_x, location.posicao_y
    );
    if let Some(at) = &location.data_hora {
        let _ = write!(line, " • {}", at);
    }
    line
}

/// Answers accepted at a yes/no prompt, in either language
pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "sim" | "si" | "sí" | "y" | "yes"
    )
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

pub fn theme_show(state: &AppState) -> String {
    let locale = state.locale();
    let palette = state.theme.palette();
    format!(
        "{}\nprimary {} • background {} • text {}\nzones {} • fill {}",
        locale.t_with(
            "config.theme",
            &[("mode", &state.theme.mode()), ("scheme", &state.theme.scheme())]
        ),
        palette.primary,
        palette.background,
        palette.text,
        palette.zone_bands().join(", "),
        palette.zone_fill()
    )
}

pub fn theme_set(state: &mut AppState, mode: ThemeMode) -> Result<String> {
    state.theme.set_mode(mode)?;
    Ok(theme_show(state))
}

pub fn theme_toggle(state: &mut AppState) -> Result<String> {
    state.theme.toggle()?;
    Ok(theme_show(state))
}

pub fn language_show(state: &AppState) -> String {
    state
        .locale
        .t_with("config.language", &[("locale", &state.locale())])
}

pub fn language_set(state: &mut AppState, tag: &str) -> Result<String> {
    state.locale.set_locale(tag)?;
    Ok(language_show(state))
}
