use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "qrcheckin";

/// Credentials for the messaging provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolapiConfig {
    pub api_key: String,
    pub api_secret: String,
    /// Registered sender number.
    pub sender: String,
    pub base_url: String,
}

impl Default for SolapiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            sender: String::new(),
            base_url: "https://api.solapi.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    /// `https://…` web endpoint or path of a CSV sheet.
    #[serde(default)]
    pub sync_endpoint: Option<String>,
    #[serde(default)]
    pub solapi: SolapiConfig,
    #[serde(default = "default_message_template")]
    pub message_template: String,
    #[serde(default = "default_dispatch_delay_ms")]
    pub dispatch_delay_ms: u64,
    #[serde(default = "default_scan_window_secs")]
    pub scan_window_secs: u64,
}

fn default_message_template() -> String {
    "Please show the attached QR code at the registration desk.".to_string()
}
fn default_dispatch_delay_ms() -> u64 {
    200
}
fn default_scan_window_secs() -> u64 {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file())
    }
}

impl Config {
    fn with_database(db_path: PathBuf) -> Self {
        Self {
            database: db_path.to_string_lossy().to_string(),
            sync_endpoint: None,
            solapi: SolapiConfig::default(),
            message_template: default_message_template(),
            dispatch_delay_ms: default_dispatch_delay_ms(),
            scan_window_secs: default_scan_window_secs(),
        }
    }

    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join(APP_DIR)
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(format!(".{}", APP_DIR))
        }
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join(format!("{}.conf", APP_DIR))
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join(format!("{}.sqlite", APP_DIR))
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Resolve a user supplied database name against the config directory.
    pub fn resolve_db_path(name: &str) -> PathBuf {
        let p = Path::new(name);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            Self::config_dir().join(p)
        }
    }

    /// Initialize configuration and database files.
    ///
    /// In test mode the configuration file is left untouched and only the
    /// database file is created.
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<PathBuf> {
        let db_path = match custom_name {
            Some(name) => Self::resolve_db_path(&name),
            None => Self::database_file(),
        };

        if !is_test {
            fs::create_dir_all(Self::config_dir())?;
            let config = Self::with_database(db_path.clone());
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        Ok(db_path)
    }

    /// The sync endpoint, or a configuration error telling the user to set it.
    pub fn sync_endpoint(&self) -> AppResult<&str> {
        self.sync_endpoint
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::Config("sync_endpoint is not set in the configuration file".into()))
    }
}
