//! Backend DTOs, form inputs and request payloads.
//!
//! Field names follow the backend's JSON (camelCase Portuguese); Rust names
//! are the snake_case equivalents.

use chrono::{DateTime, NaiveDateTime};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

pub type Id = i64;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Motorcycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moto {
    pub id: Id,
    pub placa: String,
    /// 0 when the backend leaves it out
    #[serde(default, deserialize_with = "nullable_id")]
    pub cliente_id: Id,
    #[serde(default, deserialize_with = "nullable_id")]
    pub modelo_moto_id: Id,
    #[serde(default)]
    pub nome_cliente: Option<String>,
    #[serde(default)]
    pub modelo_nome: Option<String>,
    #[serde(default)]
    pub fabricante: Option<String>,
}

impl Moto {
    /// Case-insensitive match on plate, model name or manufacturer
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_uppercase();
        if q.is_empty() {
            return true;
        }
        [Some(&self.placa), self.modelo_nome.as_ref(), self.fabricante.as_ref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_uppercase().contains(&q))
    }
}

/// Bluetooth beacon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beacon {
    pub id: Id,
    pub uuid: String,
    /// 0..=100
    #[serde(default, deserialize_with = "lenient_battery")]
    pub bateria: Option<u8>,
    #[serde(default)]
    pub moto_id: Option<Id>,
    #[serde(default)]
    pub modelo_beacon_id: Option<Id>,
    #[serde(default)]
    pub placa_moto: Option<String>,
    #[serde(default)]
    pub modelo_nome: Option<String>,
}

impl Beacon {
    /// Case-insensitive match on UUID
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        q.is_empty() || self.uuid.to_lowercase().contains(&q)
    }
}

fn nullable_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Id, D::Error> {
    Ok(Option::<Id>::deserialize(deserializer)?.unwrap_or_default())
}

/// The backend may send the level as a double; round and clamp into 0..=100
fn lenient_battery<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    let level = Option::<f64>::deserialize(deserializer)?;
    Ok(level
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(0.0, 100.0) as u8))
}

/// Timestamped observation of a motorcycle in a yard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: Id,
    pub posicao_x: f64,
    pub posicao_y: f64,
    #[serde(default)]
    pub data_hora: Option<String>,
    pub moto_id: Id,
    pub patio_id: Id,
    #[serde(default)]
    pub placa_moto: Option<String>,
    #[serde(default)]
    pub nome_patio: Option<String>,
}

impl Location {
    /// Parsed `dataHora`. Accepts RFC 3339 and the backend's zone-less ISO form.
    pub fn observed_at(&self) -> Option<NaiveDateTime> {
        let raw = self.data_hora.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
    }
}

/// Per-yard summary derived from locations and beacons. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Zone {
    /// Yard id
    pub id: Id,
    pub label: String,
    pub motos: usize,
    pub beacons: usize,
}

/// Logged-in employee profile
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id_funcionario: Option<Id>,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cargo: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub id_funcionario: Option<Id>,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cargo: Option<String>,
}

// ---------------------------------------------------------------------------
// Forms (raw user input) and payloads (what the backend receives)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotoForm {
    pub placa: String,
    pub cliente_id: String,
    pub modelo_moto_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MotoPayload {
    pub placa: String,
    pub cliente_id: Id,
    pub modelo_moto_id: Id,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeaconForm {
    pub uuid: String,
    pub bateria: String,
    pub moto_id: String,
    pub modelo_beacon_id: String,
}

impl From<&Beacon> for BeaconForm {
    fn from(beacon: &Beacon) -> Self {
        let opt = |v: Option<Id>| v.map(|n| n.to_string()).unwrap_or_default();
        Self {
            uuid: beacon.uuid.clone(),
            bateria: beacon.bateria.map(|b| b.to_string()).unwrap_or_default(),
            moto_id: opt(beacon.moto_id),
            modelo_beacon_id: opt(beacon.modelo_beacon_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconPayload {
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bateria: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moto_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modelo_beacon_id: Option<Id>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationForm {
    pub posicao_x: String,
    pub posicao_y: String,
    pub moto_id: String,
    pub patio_id: Id,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    pub posicao_x: f64,
    pub posicao_y: f64,
    pub moto_id: Id,
    pub patio_id: Id,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm: String,
}

/// Sends both naming variants the backend has used for the same fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserPayload {
    pub nome: String,
    pub nome_completo: String,
    pub email: String,
    pub username: String,
    pub senha: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// List responses
// ---------------------------------------------------------------------------

/// Shape of a list response: a bare array or a paginated `{ "content": [...] }`.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    Items(Vec<T>),
    Page {
        content: Vec<T>,
        total_elements: Option<u64>,
    },
    /// `null`, an empty body, or an object without `content`
    Empty,
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Items(items) | Listing::Page { content: items, .. } => items,
            Listing::Empty => Vec::new(),
        }
    }
}

impl<T: DeserializeOwned> Listing<T> {
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        use serde_json::Value;

        match value {
            Value::Array(_) => Ok(Listing::Items(serde_json::from_value(value)?)),
            Value::Object(mut map) => match map.remove("content") {
                Some(content @ Value::Array(_)) => Ok(Listing::Page {
                    content: serde_json::from_value(content)?,
                    total_elements: map.get("totalElements").and_then(Value::as_u64),
                }),
                _ => Ok(Listing::Empty),
            },
            _ => Ok(Listing::Empty),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Listing<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Listing::from_value(value).map_err(serde::de::Error::custom)
    }
}
