//! Configuration system for Tabula.
//!
//! Uses `figment` for layered configuration: defaults -> config file ->
//! environment. The file is looked up at `~/.config/tabula/config.toml`
//! unless an explicit path is given. Configuration is loaded once at startup
//! and never mutated afterwards; every component borrows it read-only.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::registry::{default_commands, CommandDescriptor};
use crate::tiles::Tile;

/// Top-level configuration for the Tabula start page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabulaConfig {
    /// Delimiter separating a command key from a path segment, e.g. "r/rust".
    pub command_path_delimiter: String,
    /// Delimiter separating a command key from a search term, e.g. "y lofi".
    pub command_search_delimiter: String,
    /// Search URL template with a `{}` placeholder for the encoded term.
    pub default_search_template: String,
    /// Whether navigation should open a new tab (keep the dashboard running)
    /// or replace the current one (exit after opening).
    pub open_links_in_new_tab: bool,
    /// Maximum number of suggestions rendered under the search bar.
    pub suggestion_limit: usize,

    /// Display name used in the greeting.
    pub user: String,
    /// Custom greeting; when set it wins over the time-of-day message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Page title shown in the dashboard header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Render the clock in 12-hour format instead of 24-hour.
    pub disable_24_hour: bool,
    /// IANA timezone name for the clock; invalid names fall back to local.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,

    pub disable_message: bool,
    pub disable_clock: bool,
    pub disable_weather: bool,
    pub disable_search_bar: bool,

    pub weather: WeatherSettings,

    /// Command registry contents, in display order.
    #[serde(default = "default_commands")]
    pub commands: Vec<CommandDescriptor>,

    /// Quick-link tiles rendered below the search bar.
    #[serde(default)]
    pub tiles: Vec<Tile>,

    /// Optional color overrides for the dashboard theme.
    #[serde(default)]
    pub style: StyleConfig,
}

impl Default for TabulaConfig {
    fn default() -> Self {
        Self {
            command_path_delimiter: "/".to_string(),
            command_search_delimiter: " ".to_string(),
            default_search_template: "https://duckduckgo.com/?q={}".to_string(),
            open_links_in_new_tab: true,
            suggestion_limit: 4,
            user: "there".to_string(),
            message: None,
            title: None,
            disable_24_hour: false,
            time_zone: None,
            disable_message: false,
            disable_clock: false,
            disable_weather: false,
            disable_search_bar: false,
            weather: WeatherSettings::default(),
            commands: default_commands(),
            tiles: Vec::new(),
            style: StyleConfig::default(),
        }
    }
}

/// Settings for the weather line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSettings {
    /// Location query, e.g. "Mumbai" or "Berlin,de".
    pub location: String,
    /// Display unit: "cel" or "fah" (prefix match; anything else means celsius).
    pub unit: String,
    /// OpenWeatherMap API key; the weather line is skipped when empty.
    #[serde(default)]
    pub api_key: String,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            location: String::new(),
            unit: "cel".to_string(),
            api_key: String::new(),
        }
    }
}

/// Optional color overrides, as `#rgb`/`#rrggbb` hex strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_color: Option<String>,
}

impl TabulaConfig {
    /// Load configuration with figment layering: defaults, then the config
    /// file (explicit path or the platform default), then `TABULA_*`
    /// environment variables.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(TabulaConfig::default()));

        match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.to_path_buf(),
                    }
                    .into());
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = Self::default_path() {
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        let config: TabulaConfig = figment
            .merge(Env::prefixed("TABULA_").split("__"))
            .extract()
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })?;

        Ok(config)
    }

    /// Platform config file location, e.g. `~/.config/tabula/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "tabula")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// The display unit for the weather line, normalized to "cel" or "fah".
    pub fn weather_unit(&self) -> &str {
        if self.weather.unit.starts_with("fah") {
            "fah"
        } else {
            "cel"
        }
    }
}
