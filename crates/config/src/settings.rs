// Form configuration
// Loaded from ~/.config/landpermit/form.toml

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the fixture valuation of a parcel is obtained.
///
/// The two modes are mutually exclusive per form: a form either lets the
/// user type each fixture amount, or derives the single fixture amount
/// from the contract total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValuationMode {
    /// Fixture valuation is read as-is from its own input field.
    Direct,
    /// Fixture valuation = max(0, contract total - land valuation).
    /// Single-parcel forms only.
    #[default]
    Derived,
}

impl std::fmt::Display for ValuationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Derived => write!(f, "derived"),
        }
    }
}

/// Defaults used when describing the building fixture of a parcel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureSettings {
    /// Structure used in the fixture content line when the building
    /// registry does not report one.
    pub default_structure: String,
}

impl Default for FixtureSettings {
    fn default() -> Self {
        Self {
            default_structure: "철근콘크리트구조".to_string(),
        }
    }
}

/// Which fields the rendered form actually carries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Field keys absent from this layout (e.g. `"contract_total"` on the
    /// multi-parcel form). Writes to them are dropped.
    pub omit: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Number of parcel rows on the form (fixed per form instance).
    pub parcel_count: usize,

    pub valuation_mode: ValuationMode,

    pub fixture: FixtureSettings,

    pub layout: LayoutSettings,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            parcel_count: 1,
            valuation_mode: ValuationMode::Derived,
            fixture: FixtureSettings::default(),
            layout: LayoutSettings::default(),
        }
    }
}

impl FormConfig {
    /// Parse and validate a TOML config string.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Config for the multi-parcel layout: N rows, fixture amounts typed in.
    pub fn multi_parcel(parcel_count: usize) -> Self {
        Self {
            parcel_count,
            valuation_mode: ValuationMode::Direct,
            layout: LayoutSettings {
                omit: vec!["contract_total".to_string()],
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parcel_count == 0 {
            return Err(ConfigError::Validation(
                "parcel_count must be at least 1".into(),
            ));
        }
        if self.valuation_mode == ValuationMode::Derived && self.parcel_count != 1 {
            return Err(ConfigError::Validation(format!(
                "valuation_mode = \"derived\" requires exactly 1 parcel, found {}",
                self.parcel_count
            )));
        }
        Ok(())
    }

    /// Get the config file path
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("landpermit");
        config_dir.join("form.toml")
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Load from the default path, falling back to defaults.
    pub fn load_or_default() -> Self {
        let path = Self::default_path();
        if !path.exists() {
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), "{e}; using default form config");
                Self::default()
            }
        }
    }

    /// Render as TOML for display.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Validation(format!("cannot serialize config: {e}")))
    }
}
