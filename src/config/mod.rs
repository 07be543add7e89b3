//! Application settings and campaign data loading.
//!
//! Settings come from `./config.toml` (or `$STRAYLIGHT_CONFIG_PATH`).
//! Environment variables override file values; file values override
//! defaults. Campaign data — the audience configuration table and the
//! event details record — is JSON, loaded once at startup and read-only
//! for the process lifetime.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::blocks::Tone;
use crate::compose::variables::VariableMap;

// ── Campaign data ───────────────────────────────────────────────

/// Errors loading campaign data files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a campaign data file.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the file that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A campaign data file was not valid JSON of the expected shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Path of the file that could not be parsed.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Per-audience composition defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudienceConfig {
    /// Human-readable audience name.
    pub name: String,
    /// Default tone for this audience.
    pub tone: Tone,
    /// Default intention block selector.
    pub intention: String,
    /// Ordered value-proposition selectors. The only multi-valued default.
    #[serde(default)]
    pub value_props: Vec<String>,
    /// Default call-to-action selector.
    pub cta: String,
    /// Default event-info selector.
    pub event_info: String,
    /// Free-form audience tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Subject template with placeholders. When absent, the composer falls
    /// back to the static per-audience default table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_template: Option<String>,
}

/// The event record inside [`EventDetails`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventInfo {
    /// Event name.
    #[serde(default)]
    pub name: String,
    /// One-line tagline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    /// Date, ideally `YYYY-MM-DD` (normalized for substitution).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Time of day, free-form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Venue or city.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Sectors covered by the event.
    #[serde(default)]
    pub sectors: Vec<String>,
    /// Thematic focus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
    /// Organizing body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    /// Event website URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Any further event fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Event metadata used as default substitution variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDetails {
    /// The event record.
    pub event: EventInfo,
    /// Optional feature highlights document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Value>,
    /// Optional nonprofit context document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonprofit_context: Option<Value>,
}

/// Read-only campaign state owned by a composer instance.
///
/// Holding this as an explicit value (rather than module-level state) lets
/// several independently configured composers coexist in one process.
#[derive(Debug, Clone, Default)]
pub struct CampaignConfig {
    audiences: BTreeMap<String, AudienceConfig>,
    event: EventDetails,
}

impl CampaignConfig {
    /// Build from in-memory parts (fixtures, tests).
    pub fn new(audiences: BTreeMap<String, AudienceConfig>, event: EventDetails) -> Self {
        Self { audiences, event }
    }

    /// Load the audience table and event details from JSON files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when either file cannot be read or parsed.
    /// Unlike block loading this is fatal: composition without an audience
    /// table cannot produce anything useful.
    pub fn load(audiences_path: &Path, event_path: &Path) -> Result<Self, ConfigError> {
        let audiences = read_json(audiences_path)?;
        let event = read_json(event_path)?;
        Ok(Self { audiences, event })
    }

    /// Configuration for one audience type.
    pub fn audience(&self, audience_type: &str) -> Option<&AudienceConfig> {
        self.audiences.get(audience_type)
    }

    /// Configured audience types, sorted.
    pub fn audience_types(&self) -> Vec<String> {
        self.audiences.keys().cloned().collect()
    }

    /// The event details record.
    pub fn event(&self) -> &EventDetails {
        &self.event
    }

    /// Default substitution variables derived from the event record.
    pub fn event_variables(&self) -> VariableMap {
        fn opt(value: &Option<String>) -> Value {
            Value::String(value.clone().unwrap_or_default())
        }
        let event = &self.event.event;
        let mut vars = VariableMap::new();
        vars.insert("event_name".to_string(), Value::String(event.name.clone()));
        vars.insert("event_tagline".to_string(), opt(&event.tagline));
        vars.insert(
            "event_date".to_string(),
            Value::String(
                event
                    .date
                    .as_deref()
                    .map(format_event_date)
                    .unwrap_or_default(),
            ),
        );
        vars.insert("event_time".to_string(), opt(&event.time));
        vars.insert("event_location".to_string(), opt(&event.location));
        vars.insert(
            "event_sectors".to_string(),
            Value::String(event.sectors.join(", ")),
        );
        vars.insert("event_focus".to_string(), opt(&event.focus));
        vars.insert("event_organizer".to_string(), opt(&event.organizer));
        vars.insert("event_website".to_string(), opt(&event.website));
        vars
    }
}

/// Normalize a raw event date for substitution.
///
/// `YYYY-MM-DD` becomes a spelled-out date (`March 5, 2026`); anything
/// else passes through unchanged.
pub fn format_event_date(raw: &str) -> String {
    match chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

// ── Application settings ────────────────────────────────────────

/// Top-level settings loaded from TOML.
///
/// Path: `./config.toml` or `$STRAYLIGHT_CONFIG_PATH`.
/// Env vars override file values; file values override defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Filesystem locations of campaign data.
    pub paths: PathsConfig,
    /// Default composition flags.
    pub compose: ComposeDefaults,
    /// Default log level when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            compose: ComposeDefaults::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Filesystem paths for campaign data (`[paths]` table).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory of per-category block JSON files.
    pub blocks_dir: String,
    /// Audience configuration JSON file.
    pub audiences_file: String,
    /// Event details JSON file.
    pub event_file: String,
    /// Directory for rotated batch log files.
    pub logs_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            blocks_dir: "data/blocks".to_string(),
            audiences_file: "data/audiences.json".to_string(),
            event_file: "data/event.json".to_string(),
            logs_dir: "logs".to_string(),
        }
    }
}

/// Default composition flags (`[compose]` table).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct ComposeDefaults {
    /// Fail on unresolved placeholders by default.
    pub strict: bool,
    /// Keep unresolved placeholders verbatim by default.
    pub keep_placeholders: bool,
}

impl Settings {
    /// Load settings with precedence: env vars > TOML file > defaults.
    ///
    /// Config file path: `$STRAYLIGHT_CONFIG_PATH` or `./config.toml`.
    /// A missing file falls back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path_with(|key| std::env::var(key).ok());
        let mut settings = Self::load_from_file(&path)?;
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Load settings from an explicit file path, then apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = Self::load_from_file(path)?;
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::debug!(path = %path.display(), "loading settings from file");
                toml::from_str(&contents).context("failed to parse settings TOML")
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no settings file found, using defaults");
                Ok(Settings::default())
            }
            Err(e) => Err(anyhow::anyhow!("failed to read settings file: {e}")),
        }
    }

    /// Resolve the settings file path using a custom env resolver.
    fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        env("STRAYLIGHT_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Apply environment variable overrides (env > file > defaults).
    ///
    /// Takes a resolver function for testability.
    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("STRAYLIGHT_BLOCKS_DIR") {
            self.paths.blocks_dir = v;
        }
        if let Some(v) = env("STRAYLIGHT_AUDIENCES_FILE") {
            self.paths.audiences_file = v;
        }
        if let Some(v) = env("STRAYLIGHT_EVENT_FILE") {
            self.paths.event_file = v;
        }
        if let Some(v) = env("STRAYLIGHT_LOGS_DIR") {
            self.paths.logs_dir = v;
        }
        if let Some(v) = env("STRAYLIGHT_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = env("STRAYLIGHT_STRICT") {
            match v.parse() {
                Ok(b) => self.compose.strict = b,
                Err(_) => tracing::warn!(
                    var = "STRAYLIGHT_STRICT",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("STRAYLIGHT_KEEP_PLACEHOLDERS") {
            match v.parse() {
                Ok(b) => self.compose.keep_placeholders = b,
                Err(_) => tracing::warn!(
                    var = "STRAYLIGHT_KEEP_PLACEHOLDERS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
    }
}
