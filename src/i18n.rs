//! Locale Module
//!
//! Two supported language packs (pt-BR, es-ES), a dotted-key message catalog
//! with `{{name}}` interpolation, and the persisted language preference.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::storage::{DeviceStorage, StorageError, LANGUAGE_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "es-ES")]
    EsEs,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::PtBr, Locale::EsEs];

    /// Map any language tag onto a supported locale: `es*` is Spanish,
    /// everything else (including nothing) falls back to pt-BR.
    pub fn normalize(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_lowercase()) {
            Some(t) if t.starts_with("es") => Locale::EsEs,
            _ => Locale::PtBr,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Locale::PtBr => "pt-BR",
            Locale::EsEs => "es-ES",
        }
    }

    /// Look up `key`, falling back to pt-BR, then to the key itself.
    pub fn t(self, key: &str) -> String {
        self.t_with(key, &[])
    }

    pub fn t_with(self, key: &str, params: &[(&str, &dyn fmt::Display)]) -> String {
        let template = catalog(self)
            .get(key)
            .or_else(|| catalog(Locale::PtBr).get(key))
            .copied()
            .unwrap_or(key);
        interpolate(template, params)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

fn interpolate(template: &str, params: &[(&str, &dyn fmt::Display)]) -> String {
    let mut out = template.to_string();
    for (name, value) in params {
        out = out.replace(&format!("{{{{{}}}}}", name), &value.to_string());
    }
    out
}

/// Language preference persisted in device storage
#[derive(Debug, Clone)]
pub struct LocaleStore {
    storage: DeviceStorage,
    locale: Locale,
}

impl LocaleStore {
    /// Start from the device tag, then prefer a stored choice if there is one.
    pub fn init(storage: DeviceStorage, device_tag: Option<&str>) -> Self {
        let mut locale = Locale::normalize(device_tag);
        match storage.get_item(LANGUAGE_KEY) {
            Ok(Some(saved)) => locale = Locale::normalize(Some(&saved)),
            Ok(None) => {}
            // Unreadable preference: keep the device locale
            Err(e) => warn!("Failed to read language preference: {}", e),
        }
        debug!("Locale initialized: {}", locale);
        Self { storage, locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Switch language. Returns `false` when the normalized locale is unchanged.
    pub fn set_locale(&mut self, tag: &str) -> Result<bool, StorageError> {
        let next = Locale::normalize(Some(tag));
        if next == self.locale {
            return Ok(false);
        }
        self.locale = next;
        self.storage.set_item(LANGUAGE_KEY, next.tag())?;
        info!("Language set to {}", next);
        Ok(true)
    }

    pub fn t(&self, key: &str) -> String {
        self.locale.t(key)
    }

    pub fn t_with(&self, key: &str, params: &[(&str, &dyn fmt::Display)]) -> String {
        self.locale.t_with(key, params)
    }
}

/// Device language tag from the environment (`LC_ALL`, then `LANG`).
pub fn device_language_tag() -> Option<String> {
    ["LC_ALL", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| !v.is_empty() && v != "C" && v != "POSIX")
        .map(|v| v.replace('_', "-"))
}

type Catalog = HashMap<&'static str, &'static str>;

fn catalog(locale: Locale) -> &'static Catalog {
    match locale {
        Locale::PtBr => &PT_BR,
        Locale::EsEs => &ES_ES,
    }
}

static PT_BR: Lazy<Catalog> = Lazy::new(|| {
    HashMap::from([
        ("common.errorLoading", "Falha ao carregar dados."),
        ("common.tryAgain", "Tentar novamente"),
        ("common.empty", "Nenhum dado encontrado. Cadastre localizações."),
        ("common.error", "Erro"),
        ("common.success", "Sucesso"),
        ("common.cancelled", "Operação cancelada."),
        ("common.confirmHint", "[s/N]"),
        ("home.brand", "Mottooth"),
        ("home.subtitle", "Gestão de Pátio"),
        ("home.kpiMotosTitle", "Motos"),
        ("home.kpiMotosSuffix", "no Pátio"),
        ("home.kpiBeaconsTitle", "Beacons"),
        ("home.kpiBeaconsSuffix", "Ativos"),
        ("home.mapSummary", "Resumo do Mapa"),
        ("home.lastMotos", "Últimas Motos Cadastradas"),
        ("home.lastBeacons", "Últimos Beacons"),
        ("home.yard", "Pátio {{id}}"),
        ("home.yardLabel", "Pátio: {{name}}"),
        ("home.bikeNumber", "Moto #{{id}}"),
        ("home.bikeLabel", "Moto: {{plate}}"),
        ("home.zoneCounts", "{{label}} — {{motos}} motos • {{beacons}} beacons"),
        ("home.noBikes", "Nenhuma moto cadastrada ainda"),
        ("home.noBeacons", "Nenhum beacon cadastrado ainda"),
        ("errors.sessionExpiredTitle", "Sessão expirada"),
        ("errors.sessionExpired", "Sessão expirada. Faça login novamente."),
        ("errors.badRequestTitle", "Dados inválidos"),
        ("errors.badRequest", "Os dados enviados são inválidos."),
        ("errors.notFoundTitle", "Não encontrado"),
        ("errors.notFound", "Registro não encontrado."),
        ("errors.conflictTitle", "Conflito"),
        ("errors.conflict", "Conflito de dados."),
        ("errors.server", "Servidor indisponível. Tente novamente."),
        ("errors.network", "Não foi possível conectar. Verifique o servidor."),
        ("errors.generic", "Falha ao comunicar com o servidor."),
        ("validation.title", "Validação"),
        ("validation.required", "{{field}} é obrigatório."),
        ("validation.number", "{{field}} deve ser um número."),
        ("validation.battery", "Bateria deve ser um número entre 0 e 100."),
        ("validation.motoWithoutBeacon", "Esta moto não possui beacon vinculado."),
        ("validation.invalidEmail", "Informe um e-mail válido."),
        ("validation.weakPassword", "A senha deve ter pelo menos {{min}} caracteres."),
        ("validation.passwordMismatch", "Confirmação não confere com a senha."),
        ("login.welcome", "Bem-vindo!"),
        ("login.invalid", "Credenciais inválidas."),
        ("login.unavailable", "Servidor indisponível."),
        ("login.failed", "Falha ao entrar."),
        ("login.loggedOut", "Sessão encerrada."),
        ("login.anonymous", "Nenhuma sessão ativa."),
        ("register.success", "Cadastro realizado! Faça login para continuar."),
        ("register.emailInUse", "Já existe um usuário com este e-mail."),
        ("motos.title", "Motos"),
        ("motos.created", "Moto cadastrada com sucesso."),
        ("motos.updated", "Moto atualizada com sucesso."),
        ("motos.deleted", "Moto excluída."),
        ("motos.empty", "Nenhuma moto cadastrada"),
        ("motos.confirmDelete", "Deseja excluir a moto #{{id}}?"),
        ("beacons.title", "Beacons"),
        ("beacons.created", "Beacon criado."),
        ("beacons.updated", "Beacon atualizado."),
        ("beacons.deleted", "Beacon excluído."),
        ("beacons.empty", "Nenhum beacon cadastrado"),
        ("beacons.confirmDelete", "Deseja excluir o beacon #{{id}}?"),
        ("locations.created", "Localização criada."),
        ("locations.empty", "Nenhuma localização registrada"),
        ("config.theme", "Tema: {{mode}} (efetivo: {{scheme}})"),
        ("config.language", "Idioma: {{locale}}"),
        ("field.uuid", "UUID"),
        ("field.bateria", "Bateria"),
        ("field.placa", "Placa"),
        ("field.clienteId", "Cliente ID"),
        ("field.modeloMotoId", "Modelo ID"),
        ("field.motoId", "Moto ID"),
        ("field.patioId", "Pátio ID"),
        ("field.modeloBeaconId", "Modelo Beacon ID"),
        ("field.posicaoX", "Posição X"),
        ("field.posicaoY", "Posição Y"),
        ("field.fullName", "Nome completo"),
        ("field.email", "E-mail"),
        ("field.username", "Usuário"),
        ("field.password", "Senha"),
        ("field.confirm", "Confirmação de senha"),
    ])
});

static ES_ES: Lazy<Catalog> = Lazy::new(|| {
    HashMap::from([
        ("common.errorLoading", "Error al cargar los datos."),
        ("common.tryAgain", "Intentar de nuevo"),
        ("common.empty", "No se encontraron datos. Registre ubicaciones."),
        ("common.error", "Error"),
        ("common.success", "Éxito"),
        ("common.cancelled", "Operación cancelada."),
        ("common.confirmHint", "[s/N]"),
        ("home.brand", "Mottooth"),
        ("home.subtitle", "Gestión de Patio"),
        ("home.kpiMotosTitle", "Motos"),
        ("home.kpiMotosSuffix", "en el Patio"),
        ("home.kpiBeaconsTitle", "Beacons"),
        ("home.kpiBeaconsSuffix", "Activos"),
        ("home.mapSummary", "Resumen del Mapa"),
        ("home.lastMotos", "Últimas Motos Registradas"),
        ("home.lastBeacons", "Últimos Beacons"),
        ("home.yard", "Patio {{id}}"),
        ("home.yardLabel", "Patio: {{name}}"),
        ("home.bikeNumber", "Moto #{{id}}"),
        ("home.bikeLabel", "Moto: {{plate}}"),
        ("home.zoneCounts", "{{label}} — {{motos}} motos • {{beacons}} beacons"),
        ("home.noBikes", "Aún no hay motos registradas"),
        ("home.noBeacons", "Aún no hay beacons registrados"),
        ("errors.sessionExpiredTitle", "Sesión expirada"),
        ("errors.sessionExpired", "Sesión expirada. Inicie sesión nuevamente."),
        ("errors.badRequestTitle", "Datos inválidos"),
        ("errors.badRequest", "Los datos enviados no son válidos."),
        ("errors.notFoundTitle", "No encontrado"),
        ("errors.notFound", "Registro no encontrado."),
        ("errors.conflictTitle", "Conflicto"),
        ("errors.conflict", "Conflicto de datos."),
        ("errors.server", "Servidor no disponible. Intente de nuevo."),
        ("errors.network", "No fue posible conectar. Verifique el servidor."),
        ("errors.generic", "Error al comunicarse con el servidor."),
        ("validation.title", "Validación"),
        ("validation.required", "{{field}} es obligatorio."),
        ("validation.number", "{{field}} debe ser un número."),
        ("validation.battery", "La batería debe ser un número entre 0 y 100."),
        ("validation.motoWithoutBeacon", "Esta moto no tiene beacon vinculado."),
        ("validation.invalidEmail", "Ingrese un correo válido."),
        ("validation.weakPassword", "La contraseña debe tener al menos {{min}} caracteres."),
        ("validation.passwordMismatch", "La confirmación no coincide con la contraseña."),
        ("login.welcome", "¡Bienvenido!"),
        ("login.invalid", "Credenciales inválidas."),
        ("login.unavailable", "Servidor no disponible."),
        ("login.failed", "Error al iniciar sesión."),
        ("login.loggedOut", "Sesión cerrada."),
        ("login.anonymous", "No hay sesión activa."),
        ("register.success", "¡Registro completado! Inicie sesión para continuar."),
        ("register.emailInUse", "Ya existe un usuario con este correo."),
        ("motos.title", "Motos"),
        ("motos.created", "Moto registrada con éxito."),
        ("motos.updated", "Moto actualizada con éxito."),
        ("motos.deleted", "Moto eliminada."),
        ("motos.empty", "No hay motos registradas"),
        ("motos.confirmDelete", "¿Desea eliminar la moto #{{id}}?"),
        ("beacons.title", "Beacons"),
        ("beacons.created", "Beacon creado."),
        ("beacons.updated", "Beacon actualizado."),
        ("beacons.deleted", "Beacon eliminado."),
        ("beacons.empty", "No hay beacons registrados"),
        ("beacons.confirmDelete", "¿Desea eliminar el beacon #{{id}}?"),
        ("locations.created", "Ubicación creada."),
        ("locations.empty", "No hay ubicaciones registradas"),
        ("config.theme", "Tema: {{mode}} (efectivo: {{scheme}})"),
        ("config.language", "Idioma: {{locale}}"),
        ("field.placa", "Matrícula"),
        ("field.bateria", "Batería"),
        ("field.clienteId", "ID de Cliente"),
        ("field.modeloMotoId", "ID de Modelo"),
        ("field.patioId", "ID de Patio"),
        ("field.modeloBeaconId", "ID de Modelo de Beacon"),
        ("field.posicaoX", "Posición X"),
        ("field.posicaoY", "Posición Y"),
        ("field.fullName", "Nombre completo"),
        ("field.email", "Correo"),
        ("field.username", "Usuario"),
        ("field.password", "Contraseña"),
        ("field.confirm", "Confirmación de contraseña"),
    ])
});
