//! Configuration types for discheck.

use {
    crate::{dnslib::default_providers, errors::Result, structs::Provider, subnets},
    serde::Deserialize,
    std::path::{Path, PathBuf},
};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// IP list location, an `http(s)://` URL or a local path.
    #[serde(default = "default_ip_list")]
    pub ip_list: String,

    /// JSON file holding the check history.
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// DoH providers, tried in order.
    #[serde(default = "default_providers")]
    pub providers: Vec<Provider>,

    /// Largest subnet `expand` will enumerate.
    #[serde(default = "default_max_subnet_hosts")]
    pub max_subnet_hosts: u64,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Telemetry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter (e.g., "info", "debug", "discheck=debug,warn").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ip_list: default_ip_list(),
            history_file: default_history_file(),
            timeout: default_timeout(),
            providers: default_providers(),
            max_subnet_hosts: default_max_subnet_hosts(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Config {
    /// Layer an optional TOML file and `DISCHECK__*` environment variables
    /// over the defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file).required(true));
        } else {
            builder = builder.add_source(config::File::with_name("discheck").required(false));
        }

        Ok(builder
            .add_source(
                config::Environment::with_prefix("DISCHECK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?)
    }
}

fn default_ip_list() -> String {
    "ips.txt".to_string()
}

fn default_history_file() -> PathBuf {
    PathBuf::from("discheck-history.json")
}

fn default_timeout() -> u64 {
    5
}

fn default_max_subnet_hosts() -> u64 {
    subnets::DEFAULT_MAX_SUBNET_HOSTS as u64
}

fn default_log_level() -> String {
    "info".to_string()
}
