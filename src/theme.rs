//! Theme Module
//!
//! Light/dark palettes and the persisted theme preference.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::storage::{DeviceStorage, StorageError, THEME_MODE_KEY};

/// Concrete colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl FromStr for ColorScheme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ColorScheme::Light),
            "dark" => Ok(ColorScheme::Dark),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorScheme::Light => write!(f, "light"),
            ColorScheme::Dark => write!(f, "dark"),
        }
    }
}

/// User preference: a fixed scheme or whatever the system reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }
}

impl FromStr for ThemeMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "system" => Ok(ThemeMode::System),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colour tokens, `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub card: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
    pub border: &'static str,
    /// Brand green
    pub primary: &'static str,
    pub accent: &'static str,
}

pub const LIGHT: Palette = Palette {
    background: "#FFFFFF",
    card: "#F5F7F9",
    text: "#111827",
    muted: "#6B7280",
    border: "#E5E7EB",
    primary: "#00C04B",
    accent: "#F0FFF7",
};

pub const DARK: Palette = Palette {
    background: "#0B0B0B",
    card: "#111827",
    text: "#F3F4F6",
    muted: "#9CA3AF",
    border: "#1F2937",
    primary: "#00C04B",
    accent: "#0E1712",
};

impl Palette {
    pub fn for_scheme(scheme: ColorScheme) -> &'static Palette {
        match scheme {
            ColorScheme::Light => &LIGHT,
            ColorScheme::Dark => &DARK,
        }
    }

    /// Five bands of the primary colour, progressively darker, for zone bars
    pub fn zone_bands(&self) -> Vec<String> {
        [0.0, -0.1, -0.2, -0.3, -0.4]
            .iter()
            .map(|&amount| shade(self.primary, amount).unwrap_or_else(|| self.primary.to_string()))
            .collect()
    }

    /// Translucent primary behind the zone bars
    pub fn zone_fill(&self) -> String {
        alpha(self.primary, 0.15).unwrap_or_else(|| self.primary.to_string())
    }

    /// Band colour for the zone at `index`, cycling through [`Palette::zone_bands`]
    pub fn zone_band(&self, index: usize) -> String {
        let bands = self.zone_bands();
        bands[index % bands.len()].clone()
    }
}

/// Theme preference persisted in device storage
#[derive(Debug, Clone)]
pub struct ThemeStore {
    storage: DeviceStorage,
    mode: ThemeMode,
    system: ColorScheme,
}

impl ThemeStore {
    /// Load the saved mode; unknown or unreadable values leave `system`
    pub fn init(storage: DeviceStorage, system: ColorScheme) -> Self {
        let mode = match storage.get_item(THEME_MODE_KEY) {
            Ok(Some(saved)) => saved.parse().unwrap_or_else(|_| {
                warn!("Ignoring unknown theme mode '{}'", saved);
                ThemeMode::System
            }),
            Ok(None) => ThemeMode::System,
            Err(e) => {
                warn!("Failed to read theme preference: {}", e);
                ThemeMode::System
            }
        };
        Self { storage, mode, system }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn scheme(&self) -> ColorScheme {
        match self.mode {
            ThemeMode::Light => ColorScheme::Light,
            ThemeMode::Dark => ColorScheme::Dark,
            ThemeMode::System => self.system,
        }
    }

    pub fn is_dark(&self) -> bool {
        self.scheme() == ColorScheme::Dark
    }

    pub fn palette(&self) -> &'static Palette {
        Palette::for_scheme(self.scheme())
    }

    pub fn set_mode(&mut self, mode: ThemeMode) -> Result<(), StorageError> {
        self.mode = mode;
        self.storage.set_item(THEME_MODE_KEY, mode.as_str())?;
        info!("Theme mode set to {}", mode);
        Ok(())
    }

    /// Flip between light and dark based on what is currently shown
    pub fn toggle(&mut self) -> Result<ThemeMode, StorageError> {
        let next = if self.is_dark() { ThemeMode::Light } else { ThemeMode::Dark };
        self.set_mode(next)?;
        Ok(next)
    }
}

fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let h = hex.trim_start_matches('#');
    if h.len() != 6 {
        return None;
    }
    let num = u32::from_str_radix(h, 16).ok()?;
    Some(((num >> 16) as u8, (num >> 8) as u8, num as u8))
}

/// Darken (negative `amount`) or lighten (positive) a hex colour, `-1.0..=1.0`
pub fn shade(hex: &str, amount: f64) -> Option<String> {
    let (r, g, b) = hex_to_rgb(hex)?;
    let m = amount.clamp(-1.0, 1.0);
    let adjust = |c: u8| {
        let c = f64::from(c);
        let v = if m >= 0.0 { c + (255.0 - c) * m } else { c * (1.0 + m) };
        v.clamp(0.0, 255.0).round() as u8
    };
    Some(format!("rgb({}, {}, {})", adjust(r), adjust(g), adjust(b)))
}

/// Apply transparency to a hex colour
pub fn alpha(hex: &str, a: f64) -> Option<String> {
    let (r, g, b) = hex_to_rgb(hex)?;
    Some(format!("rgba({}, {}, {}, {})", r, g, b, a.clamp(0.0, 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(system: ColorScheme) -> (tempfile::TempDir, DeviceStorage, ThemeStore) {
        let dir = tempfile::tempdir().unwrap();
        let storage = DeviceStorage::open(dir.path()).unwrap();
        let theme = ThemeStore::init(storage.clone(), system);
        (dir, storage, theme)
    }

    #[test]
    fn defaults_to_following_the_system() {
        let (_dir, _storage, theme) = store(ColorScheme::Dark);
        assert_eq!(theme.mode(), ThemeMode::System);
        assert!(theme.is_dark());
        assert_eq!(theme.palette(), &DARK);
    }

    #[test]
    fn toggle_flips_effective_scheme_and_persists() {
        let (_dir, storage, mut theme) = store(ColorScheme::Dark);

        assert_eq!(theme.toggle().unwrap(), ThemeMode::Light);
        assert!(!theme.is_dark());
        assert_eq!(storage.get_item(THEME_MODE_KEY).unwrap().as_deref(), Some("light"));

        assert_eq!(theme.toggle().unwrap(), ThemeMode::Dark);
        assert!(theme.is_dark());
    }

    #[test]
    fn saved_mode_is_restored_and_unknown_ignored() {
        let (dir, storage, _) = store(ColorScheme::Light);
        storage.set_item(THEME_MODE_KEY, "dark").unwrap();
        assert_eq!(ThemeStore::init(storage.clone(), ColorScheme::Light).mode(), ThemeMode::Dark);

        storage.set_item(THEME_MODE_KEY, "sepia").unwrap();
        assert_eq!(ThemeStore::init(storage, ColorScheme::Light).mode(), ThemeMode::System);
        drop(dir);
    }

    #[test]
    fn system_scheme_only_matters_in_system_mode() {
        let (_dir, _storage, mut theme) = store(ColorScheme::Dark);
        assert!(theme.is_dark());

        theme.set_mode(ThemeMode::Light).unwrap();
        assert!(!theme.is_dark());
        assert_eq!(theme.palette(), &LIGHT);
    }

    #[test]
    fn shade_and_alpha() {
        assert_eq!(shade("#00C04B", 0.0).as_deref(), Some("rgb(0, 192, 75)"));
        assert_eq!(shade("#808080", -0.5).as_deref(), Some("rgb(64, 64, 64)"));
        assert_eq!(shade("#000000", 1.0).as_deref(), Some("rgb(255, 255, 255)"));
        assert_eq!(alpha("#111827", 0.06).as_deref(), Some("rgba(17, 24, 39, 0.06)"));
        assert_eq!(shade("green", 0.1), None);
        assert_eq!(LIGHT.zone_bands().len(), 5);
    }

    #[test]
    fn zone_colours_cycle_and_fill_is_translucent() {
        assert_eq!(DARK.zone_band(0), "rgb(0, 192, 75)");
        assert_eq!(DARK.zone_band(1), "rgb(0, 173, 68)");
        assert_eq!(DARK.zone_band(5), DARK.zone_band(0));
        assert_eq!(LIGHT.zone_fill(), "rgba(0, 192, 75, 0.15)");
    }
}
