//! Process-wide configuration.
//!
//! [`Settings`] is the optional user file. [`EngineConfig`] is built from it
//! once at startup and passed by reference into every evaluation; nothing
//! mutates it afterwards.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculator::{DEFAULT_DECIMAL_PLACES, Formatter, FunctionTable};
use crate::conversion::ConversionTable;

/// Significant decimal digits carried by every computation.
///
/// Fixed by the 96-bit mantissa of [`Decimal`]; no setting changes it.
pub const PRECISION: u32 = 28;

/// Largest accepted `decimal_places` setting.
pub const MAX_DECIMAL_PLACES: u32 = 20;

const APP_DIR: &str = "calcline";
const CONFIG_FILE: &str = "config.toml";

/// User-facing settings read from `config.toml`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Decimal places kept when a result is not an integer.
    pub decimal_places: u32,
    /// How close a result must be to an integer multiple of π to print as `kπ`.
    pub pi_tolerance: f64,
    /// Render multiples of π symbolically.
    pub symbolic_pi: bool,
    /// Fallback filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            decimal_places: DEFAULT_DECIMAL_PLACES,
            pi_tolerance: 1e-10,
            symbolic_pi: true,
            log_level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Default location: `<config dir>/calcline/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load settings.
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// if present, otherwise defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("no config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.decimal_places > MAX_DECIMAL_PLACES {
            anyhow::bail!(
                "decimal_places must be at most {MAX_DECIMAL_PLACES}, got {}",
                self.decimal_places
            );
        }
        if !(self.pi_tolerance > 0.0 && self.pi_tolerance < 0.5) {
            anyhow::bail!(
                "pi_tolerance must be between 0 and 0.5, got {}",
                self.pi_tolerance
            );
        }
        Ok(())
    }
}

/// Immutable engine configuration.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Always [`PRECISION`]. Reported at startup, never consulted by arithmetic.
    pub precision: u32,
    pub decimal_places: u32,
    pub pi_tolerance: Decimal,
    pub symbolic_pi: bool,
    pub functions: FunctionTable,
    pub conversions: ConversionTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            precision: PRECISION,
            decimal_places: DEFAULT_DECIMAL_PLACES,
            pi_tolerance: Decimal::new(1, 10),
            symbolic_pi: true,
            functions: FunctionTable::standard(),
            conversions: ConversionTable::standard(),
        }
    }
}

impl EngineConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        // f64 Display never uses exponent notation, so this always parses
        let pi_tolerance = Decimal::from_str(&settings.pi_tolerance.to_string())
            .with_context(|| format!("pi_tolerance {} is out of range", settings.pi_tolerance))?;

        Ok(Self {
            decimal_places: settings.decimal_places,
            pi_tolerance,
            symbolic_pi: settings.symbolic_pi,
            ..Self::default()
        })
    }

    /// A formatter honoring this configuration.
    pub fn formatter(&self) -> Formatter {
        Formatter::new(self.decimal_places, self.pi_tolerance, self.symbolic_pi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        assert_eq!(Settings::parse("").unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_file_overrides() {
        let settings = Settings::parse("decimal_places = 4\nsymbolic_pi = false\n").unwrap();
        assert_eq!(settings.decimal_places, 4);
        assert!(!settings.symbolic_pi);
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Settings::parse("decimal_places = 40").is_err());
        assert!(Settings::parse("pi_tolerance = 0.0").is_err());
        assert!(Settings::parse("pi_tolerance = \"small\"").is_err());
        assert!(Settings::parse("precision = 50").is_err());
    }

    #[test]
    fn test_engine_config_from_settings() {
        let settings = Settings::parse("decimal_places = 2\npi_tolerance = 0.001").unwrap();
        let config = EngineConfig::from_settings(&settings).unwrap();
        assert_eq!(config.precision, PRECISION);
        assert_eq!(config.decimal_places, 2);
        assert_eq!(config.pi_tolerance, Decimal::new(1, 3));
        assert_eq!(config.formatter().format(Decimal::ONE / Decimal::from(3)), "0.33");
    }

    #[test]
    fn test_default_tolerance_converts_exactly() {
        let config = EngineConfig::from_settings(&Settings::default()).unwrap();
        assert_eq!(config.pi_tolerance, Decimal::new(1, 10));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/calcline.toml"))).is_err());
    }
}
