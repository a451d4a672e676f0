//! Form Validation Module
//!
//! Client-side checks and form-to-payload conversion performed before any
//! request leaves the device.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::i18n::Locale;
use crate::models::{
    Beacon, BeaconForm, BeaconPayload, Id, LocationForm, LocationPayload, MotoForm, MotoPayload,
    NewUserPayload, RegisterForm,
};

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid regex"));

/// Validation failures, each naming the offending form field
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{0} must be a number")]
    NotANumber(&'static str),

    #[error("battery must be a whole number between 0 and 100 (got '{0}')")]
    BatteryOutOfRange(String),

    #[error("moto {0} has no linked beacon")]
    MotoWithoutBeacon(Id),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("password must be at least 6 characters")]
    WeakPassword,

    #[error("password confirmation does not match")]
    PasswordMismatch,
}

impl ValidationError {
    /// Message in the user's language
    pub fn localized(&self, locale: Locale) -> String {
        let field = |name: &str| locale.t(&format!("field.{}", name));
        match self {
            Self::Required(name) => locale.t_with("validation.required", &[("field", &field(name))]),
            Self::NotANumber(name) => locale.t_with("validation.number", &[("field", &field(name))]),
            Self::BatteryOutOfRange(_) => locale.t("validation.battery"),
            Self::MotoWithoutBeacon(_) => locale.t("validation.motoWithoutBeacon"),
            Self::InvalidEmail => locale.t("validation.invalidEmail"),
            Self::WeakPassword => {
                locale.t_with("validation.weakPassword", &[("min", &MIN_PASSWORD_LEN)])
            }
            Self::PasswordMismatch => locale.t("validation.passwordMismatch"),
        }
    }
}

/// Keep ASCII alphanumerics only, uppercased
pub fn sanitize_plate(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Keep ASCII digits only, as numeric inputs do while typing
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Parse a decimal, accepting a comma as the decimal separator.
/// Blank or unparsable input is `None`.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Id inputs keep digits only; nothing left is `None`
pub fn parse_optional_id(raw: &str, field: &'static str) -> Result<Option<Id>, ValidationError> {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return Ok(None);
    }
    digits
        .parse::<Id>()
        .map(Some)
        .map_err(|_| ValidationError::NotANumber(field))
}

/// A required id must be present and non-zero
pub fn parse_required_id(raw: &str, field: &'static str) -> Result<Id, ValidationError> {
    match parse_optional_id(raw, field)? {
        Some(id) if id != 0 => Ok(id),
        _ => Err(ValidationError::Required(field)),
    }
}

/// Battery level: a number in 0..=100 with no fractional part
pub fn parse_battery(raw: &str) -> Result<Option<u8>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let out_of_range = || ValidationError::BatteryOutOfRange(trimmed.to_string());
    let value = trimmed.parse::<f64>().map_err(|_| out_of_range())?;
    if !value.is_finite() || !(0.0..=100.0).contains(&value) || value.fract() != 0.0 {
        return Err(out_of_range());
    }
    Ok(Some(value as u8))
}

pub fn moto_payload(form: &MotoForm) -> Result<MotoPayload, ValidationError> {
    let placa = sanitize_plate(form.placa.trim());
    if placa.is_empty() {
        return Err(ValidationError::Required("placa"));
    }
    Ok(MotoPayload {
        placa,
        cliente_id: parse_required_id(&form.cliente_id, "clienteId")?,
        modelo_moto_id: parse_required_id(&form.modelo_moto_id, "modeloMotoId")?,
    })
}

pub fn beacon_payload(form: &BeaconForm) -> Result<BeaconPayload, ValidationError> {
    let uuid = form.uuid.trim();
    if uuid.is_empty() {
        return Err(ValidationError::Required("uuid"));
    }
    Ok(BeaconPayload {
        uuid: uuid.to_string(),
        bateria: parse_battery(&form.bateria)?,
        moto_id: parse_optional_id(&form.moto_id, "motoId")?,
        modelo_beacon_id: parse_optional_id(&form.modelo_beacon_id, "modeloBeaconId")?,
    })
}

pub fn location_payload(form: &LocationForm) -> Result<LocationPayload, ValidationError> {
    if form.patio_id == 0 {
        return Err(ValidationError::Required("patioId"));
    }
    let moto_id = parse_required_id(&form.moto_id, "motoId")?;
    let posicao_x = parse_decimal(&form.posicao_x).ok_or(ValidationError::NotANumber("posicaoX"))?;
    let posicao_y = parse_decimal(&form.posicao_y).ok_or(ValidationError::NotANumber("posicaoY"))?;
    Ok(LocationPayload {
        posicao_x,
        posicao_y,
        moto_id,
        patio_id: form.patio_id,
    })
}

/// A location can only be recorded for a motorcycle carrying a beacon
pub fn ensure_moto_has_beacon(moto_id: Id, beacons: &[Beacon]) -> Result<(), ValidationError> {
    if beacons.iter().any(|b| b.moto_id == Some(moto_id)) {
        Ok(())
    } else {
        Err(ValidationError::MotoWithoutBeacon(moto_id))
    }
}

pub fn require_credentials(username: &str, password: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::Required("username"));
    }
    if password.is_empty() {
        return Err(ValidationError::Required("password"));
    }
    Ok(())
}

pub fn registration_payload(form: &RegisterForm) -> Result<NewUserPayload, ValidationError> {
    let required = [
        (&form.full_name, "fullName"),
        (&form.email, "email"),
        (&form.username, "username"),
        (&form.password, "password"),
        (&form.confirm, "confirm"),
    ];
    if let Some((_, field)) = required.iter().find(|(value, _)| value.trim().is_empty()) {
        return Err(ValidationError::Required(*field));
    }
    let email = form.email.trim();
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::WeakPassword);
    }
    if form.password != form.confirm {
        return Err(ValidationError::PasswordMismatch);
    }

    let name = form.full_name.trim().to_string();
    Ok(NewUserPayload {
        nome: name.clone(),
        nome_completo: name,
        email: email.to_string(),
        username: form.username.trim().to_string(),
        senha: form.password.clone(),
        password: form.password.clone(),
    })
}
