//! Mottooth Companion Library
//!
//! Yard management client: motorcycles, Bluetooth beacons, yard locations and
//! the per-yard zone summaries derived from them.

pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod i18n;
pub mod logging;
pub mod models;
pub mod session;
pub mod storage;
pub mod theme;
pub mod validation;
pub mod zones;

use tracing::debug;

use client::ApiClient;
use config::AppConfig;
use error::AppError;
use i18n::{Locale, LocaleStore};
use session::SessionManager;
use storage::DeviceStorage;
use theme::ThemeStore;

/// Application state, built once at startup and passed to every command
pub struct AppState {
    pub config: AppConfig,
    pub storage: DeviceStorage,
    pub api: ApiClient,
    pub session: SessionManager,
    pub theme: ThemeStore,
    pub locale: LocaleStore,
}

impl AppState {
    /// Open storage and wire the providers; `device_tag` seeds the locale
    /// when no language has been chosen yet.
    pub fn init(config: AppConfig, device_tag: Option<&str>) -> Result<Self, AppError> {
        let storage = DeviceStorage::open(&config.data_dir)?;
        let api = ApiClient::new(&config.api_base_url, config.request_timeout(), storage.clone())?;
        let session = SessionManager::new(api.clone());
        let theme = ThemeStore::init(storage.clone(), config.system_color_scheme);
        let locale = LocaleStore::init(storage.clone(), device_tag);

        debug!("Application state ready (api: {})", api.base_url());

        Ok(Self {
            config,
            storage,
            api,
            session,
            theme,
            locale,
        })
    }

    pub fn locale(&self) -> Locale {
        self.locale.locale()
    }
}
