use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::module::acquisition::StalePolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub sensor: SensorConfig,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub acquisition: AcquisitionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Local path or http(s) URL of `location-data.json`
    #[serde(default = "default_dataset_source")]
    pub source: String,
}

/// Fixed-position sensor. Without both coordinates every fix request
/// fails with "position unavailable".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy_m: Option<f64>,
    pub altitude_m: Option<f64>,

    #[serde(default = "default_sensor_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_elevation_url")]
    pub elevation_url: String,

    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,

    /// `accept-language` sent to the geocoder
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upper bound for each enrichment call
    #[serde(default = "default_enrichment_timeout_secs")]
    pub timeout_secs: u64,

    /// Run the elevation and address lookups concurrently
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Initial reachability before any probe result
    #[serde(default = "default_true")]
    pub assume_online: bool,

    /// `host:port` to probe with a TCP connect; no probing when unset
    pub probe_address: Option<String>,

    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,

    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Re-run a cycle every N seconds; 0 runs a single cycle
    #[serde(default)]
    pub refresh_interval_secs: u64,

    #[serde(default)]
    pub stale_policy: StalePolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_dataset_source() -> String {
    "data/location-data.json".to_string()
}

fn default_sensor_timeout_secs() -> u64 {
    10
}

fn default_elevation_url() -> String {
    "https://cyberjapandata2.gsi.go.jp/general/dem/scripts/getelevation.php".to_string()
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org/reverse".to_string()
}

fn default_language() -> String {
    "ja".to_string()
}

fn default_user_agent() -> String {
    "OfflineQTH/2.0".to_string()
}

fn default_enrichment_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_probe_interval_secs() -> u64 {
    30
}

fn default_probe_timeout_secs() -> u64 {
    3
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            dataset: DatasetConfig::default(),
            sensor: SensorConfig::default(),
            enrichment: EnrichmentConfig::default(),
            network: NetworkConfig::default(),
            acquisition: AcquisitionConfig::default(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            source: default_dataset_source(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            accuracy_m: None,
            altitude_m: None,
            timeout_secs: default_sensor_timeout_secs(),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            elevation_url: default_elevation_url(),
            geocoder_url: default_geocoder_url(),
            language: default_language(),
            user_agent: default_user_agent(),
            timeout_secs: default_enrichment_timeout_secs(),
            parallel: false,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            assume_online: true,
            probe_address: None,
            probe_interval_secs: default_probe_interval_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 0,
            stale_policy: StalePolicy::default(),
        }
    }
}

impl ResolverConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ResolverConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Like [`ResolverConfig::from_file`], but a missing file yields the
    /// defaults. A file that exists and does not parse is still an error.
    ///
    /// Runs before logging is set up, so the fallback goes to stderr.
    pub fn from_file_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            eprintln!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_file(path)
    }
}

impl SensorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl EnrichmentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub static CONFIG: OnceLock<ResolverConfig> = OnceLock::new();

/// Load the config once for the whole process.
pub fn read_config(path: impl AsRef<Path>) -> anyhow::Result<&'static ResolverConfig> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }
    let config = ResolverConfig::from_file_or_default(path)?;
    Ok(CONFIG.get_or_init(|| config))
}
