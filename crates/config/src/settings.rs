//! Application settings.
//!
//! Loaded from `config/default` plus an optional environment-specific file,
//! then overridden by `LEADFLOW__`-prefixed environment variables
//! (`LEADFLOW__SERVER__PORT=9000`).

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Config-endpoint service settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Typing-simulation pacing.
    #[serde(default)]
    pub typing: TypingSettings,

    /// Geolocation enrichment.
    #[serde(default)]
    pub geo: GeoSettings,

    /// Base URL of the tenant config endpoint the widget bootstrap calls
    /// when the embedding page does not supply credentials directly.
    #[serde(default = "default_config_endpoint")]
    pub config_endpoint: String,

    /// How long fetched tenant credentials may be cached, in seconds.
    #[serde(default = "default_credentials_cache")]
    pub credentials_cache_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            typing: TypingSettings::default(),
            geo: GeoSettings::default(),
            config_endpoint: default_config_endpoint(),
            credentials_cache_seconds: default_credentials_cache(),
        }
    }
}

/// Settings for the config-endpoint service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Supabase project URL handed out to widgets.
    #[serde(default)]
    pub supabase_url: String,

    /// Optional anon key handed out alongside the URL.
    #[serde(default)]
    pub supabase_key: Option<String>,

    /// Base URL of the hosted widget bundle, used in embed snippets.
    #[serde(default = "default_widget_script_url")]
    pub widget_script_url: String,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins; empty means localhost-only.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// `Cache-Control: max-age` window for config responses, in seconds.
    #[serde(default = "default_config_cache")]
    pub config_cache_seconds: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            supabase_url: String::new(),
            supabase_key: None,
            widget_script_url: default_widget_script_url(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
            config_cache_seconds: default_config_cache(),
        }
    }
}

/// Artificial typing pause bounds, in milliseconds. The actual pause is
/// sampled uniformly from `[min_ms, max_ms]` before each responsive bot
/// message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingSettings {
    #[serde(default = "default_typing_min")]
    pub min_ms: u64,
    #[serde(default = "default_typing_max")]
    pub max_ms: u64,
}

impl Default for TypingSettings {
    fn default() -> Self {
        Self {
            min_ms: default_typing_min(),
            max_ms: default_typing_max(),
        }
    }
}

/// Geolocation provider settings. Providers are tried in order; the first
/// usable payload wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoSettings {
    /// Full geolocation provider, returns city/region/country/ip.
    #[serde(default = "default_geo_primary")]
    pub primary_url: String,

    /// Fallback provider, returns the public IP only.
    #[serde(default = "default_geo_fallback")]
    pub fallback_url: String,

    #[serde(default = "default_geo_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GeoSettings {
    fn default() -> Self {
        Self {
            primary_url: default_geo_primary(),
            fallback_url: default_geo_fallback(),
            timeout_seconds: default_geo_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_widget_script_url() -> String {
    "https://widget.leadflow.app/leadflow.js".to_string()
}
fn default_config_endpoint() -> String {
    "http://localhost:8080/api/config".to_string()
}
fn default_credentials_cache() -> u64 {
    300
}
fn default_config_cache() -> u64 {
    300
}
fn default_typing_min() -> u64 {
    1000
}
fn default_typing_max() -> u64 {
    2000
}
fn default_geo_primary() -> String {
    "https://ipapi.co/json/".to_string()
}
fn default_geo_fallback() -> String {
    "https://api.ipify.org?format=json".to_string()
}
fn default_geo_timeout() -> u64 {
    5
}
fn default_true() -> bool {
    true
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "port cannot be 0".to_string(),
            });
        }
        if self.typing.min_ms > self.typing.max_ms {
            return Err(ConfigError::InvalidValue {
                field: "typing.min_ms".to_string(),
                message: format!(
                    "must not exceed typing.max_ms ({} > {})",
                    self.typing.min_ms, self.typing.max_ms
                ),
            });
        }
        if self.geo.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "geo.timeout_seconds".to_string(),
                message: "timeout must be at least 1 second".to_string(),
            });
        }
        if self.config_endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "config_endpoint".to_string(),
                message: "endpoint URL cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Load settings from files and environment.
///
/// Priority (highest to lowest):
/// 1. `LEADFLOW__`-prefixed environment variables
/// 2. `config/{env}.yaml` (if an environment name is given)
/// 3. `config/default.yaml`
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));
    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{env_name}")).required(false));
    }
    builder = builder.add_source(
        Environment::with_prefix("LEADFLOW")
            .separator("__")
            .try_parsing(true),
    );

    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.typing.min_ms, 1000);
        assert_eq!(settings.typing.max_ms, 2000);
    }

    #[test]
    fn inverted_typing_bounds_rejected() {
        let mut settings = Settings::default();
        settings.typing.min_ms = 3000;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_port_rejected() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_geo_timeout_rejected() {
        let mut settings = Settings::default();
        settings.geo.timeout_seconds = 0;
        assert!(settings.validate().is_err());
    }
}
