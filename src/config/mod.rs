use crate::core::sync::SourceKind;
use crate::errors::{AppError, AppResult};
use crate::models::ReferenceZone;
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One upstream feed: where to read it, how often, and from when.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    /// JSON export of the feed. Unset means the source is not polled.
    #[serde(default)]
    pub feed: Option<String>,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Lower bound for a full sync, as a checkpoint value.
    #[serde(default)]
    pub epoch: Option<String>,
}

impl SourceConfig {
    fn with_interval(interval_secs: u64) -> Self {
        Self {
            feed: None,
            interval_secs,
            epoch: None,
        }
    }

    pub fn feed_path(&self) -> Option<PathBuf> {
        self.feed.as_deref().map(expand_tilde)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub reference_utc_offset: ReferenceZone,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_true")]
    pub reconcile_every_cycle: bool,
    #[serde(default = "default_calendar")]
    pub calendar: SourceConfig,
    #[serde(default = "default_trips")]
    pub trips: SourceConfig,
    #[serde(default = "default_presence")]
    pub presence: SourceConfig,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_interval_secs() -> u64 {
    300
}
fn default_calendar() -> SourceConfig {
    SourceConfig::with_interval(900)
}
fn default_trips() -> SourceConfig {
    SourceConfig::with_interval(300)
}
fn default_presence() -> SourceConfig {
    SourceConfig::with_interval(120)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            reference_utc_offset: ReferenceZone::default(),
            log_level: default_log_level(),
            reconcile_every_cycle: true,
            calendar: default_calendar(),
            trips: default_trips(),
            presence: default_presence(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cabinlog")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("cabinlog.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("cabinlog.sqlite")
    }

    pub fn source(&self, kind: SourceKind) -> &SourceConfig {
        match kind {
            SourceKind::Calendar => &self.calendar,
            SourceKind::Trips => &self.trips,
            SourceKind::Presence => &self.presence,
        }
    }

    pub fn zone(&self) -> ReferenceZone {
        self.reference_utc_offset
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        let mut file = fs::File::create(path).map_err(|_| AppError::ConfigSave)?;
        file.write_all(yaml.as_bytes())
            .map_err(|_| AppError::ConfigSave)?;
        Ok(())
    }

    /// Initialize configuration and database files.
    ///
    /// Returns the database path. In test mode the config file is left alone.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();

        // DB name: user provided or default
        let db_path = match custom_db {
            Some(name) => {
                let p = expand_tilde(name);
                if p.is_absolute() { p } else { dir.join(p) }
            }
            None => Self::database_file(),
        };

        if !is_test {
            fs::create_dir_all(&dir)?;
            let config = Config {
                database: db_path.to_string_lossy().to_string(),
                ..Config::default()
            };
            config.save_to(&Self::config_file())?;
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(db_path)
    }
}
