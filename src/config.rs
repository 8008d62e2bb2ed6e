//! Support for library configuration options

use std::convert::TryFrom;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::sort::{SortKey, DEFAULT_ORDER};

/// Product name sent in the `User-Agent` of every request.
/// Feel free to override it when initing this library.
pub static PRODUCT_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("tickbox".to_string())));

/// The `User-Agent` header value, e.g. `tickbox/0.1.0`
pub fn user_agent() -> String {
    let name = match PRODUCT_NAME.lock() {
        Ok(name) => name.clone(),
        Err(_) => "tickbox".to_string(),
    };
    format!("{}/{}", name, env!("CARGO_PKG_VERSION"))
}

/// Where the server is expected when nothing else is configured
pub const DEFAULT_URL: &str = "http://localhost:8080/api/";
/// Environment variable that overrides the server URL of the settings file
pub const URL_ENV_VAR: &str = "TICKBOX_URL";
/// How long alerts stay visible by default
pub const DEFAULT_ALERT_SECONDS: u64 = 5;


/// User settings, read from `config.toml`
///
/// ```toml
/// url = "http://my.server.com/api/"
/// sort = ["done", "due", "priority", "title"]
/// alert_seconds = 5
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the REST API
    pub url: String,
    /// How tasks are ordered when displaying a list
    pub sort: Vec<SortKey>,
    /// How long (in seconds) alerts stay visible
    pub alert_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            sort: DEFAULT_ORDER.to_vec(),
            alert_seconds: DEFAULT_ALERT_SECONDS,
        }
    }
}

impl Settings {
    /// Load settings from the default config file if it exists, then apply environment overrides
    pub fn load() -> Result<Self, Box<dyn Error>> {
        let path = Self::config_file();
        let mut settings = if path.exists() {
            log::debug!("Loading settings from {:?}", path);
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        settings.apply_url_override(std::env::var(URL_ENV_VAR).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let content = match std::fs::read_to_string(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(content) => content,
        };
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, Box<dyn Error>> {
        let settings: Self = toml::from_str(content)?;
        settings.alert_lifetime()?;
        if settings.sort.is_empty() {
            log::warn!("No sort key configured, tasks will be shown in server order");
        }
        Ok(settings)
    }

    /// Get the path to the settings file
    pub fn config_file() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tickbox")
            .join("config.toml")
    }

    fn apply_url_override(&mut self, url: Option<String>) {
        match url {
            Some(url) if url.trim().is_empty() == false => {
                log::debug!("Server URL overridden by {}", URL_ENV_VAR);
                self.url = url.trim().to_string();
            },
            _ => (),
        }
    }

    /// How long alerts stay visible. Fails if `alert_seconds` is too large to be represented.
    pub fn alert_lifetime(&self) -> Result<chrono::Duration, Box<dyn Error>> {
        i64::try_from(self.alert_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| format!("alert_seconds is out of range: {}", self.alert_seconds).into())
    }
}
