//! Configuration loading and types

use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{WrapErr, eyre};
use serde::{Deserialize, Serialize};
use wuprobe_core::ProbeConfig;

use crate::cli::Args;

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Monitoring server connection
    #[serde(default)]
    pub server: ServerConfig,
    /// What is checked and where it is reported
    #[serde(default)]
    pub check: CheckConfig,
    /// Local log file
    #[serde(default)]
    pub log: LogConfig,
}

/// Monitoring server connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Check settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Host name in the monitoring server (default: local FQDN)
    pub hostname: Option<String>,
    /// Service name in the monitoring server
    #[serde(default = "default_service")]
    pub service: String,
    #[serde(flatten)]
    pub severities: ProbeConfig,
    /// Inventory snapshot file
    pub cache_path: Option<PathBuf>,
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,
    #[serde(default = "default_cache_expiry_hours")]
    pub cache_expiry_hours: i64,
    /// Upper bound for one update agent search
    #[serde(default = "default_inventory_timeout_secs")]
    pub inventory_timeout_secs: u64,
    #[serde(default = "default_powershell")]
    pub powershell: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            hostname: None,
            service: default_service(),
            severities: ProbeConfig::default(),
            cache_path: None,
            cache_enabled: default_cache_enabled(),
            cache_expiry_hours: default_cache_expiry_hours(),
            inventory_timeout_secs: default_inventory_timeout_secs(),
            powershell: default_powershell(),
        }
    }
}

/// Log file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub path: Option<PathBuf>,
    #[serde(default = "default_log_max_size")]
    pub max_size_bytes: u64,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_size_bytes: default_log_max_size(),
            level: default_log_level(),
        }
    }
}

impl LogConfig {
    /// Configured path or `wuprobe.log` in the temp dir
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("wuprobe.log"))
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_service() -> String {
    "Windows Updates".to_string()
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_expiry_hours() -> i64 {
    wuprobe_inventory::DEFAULT_EXPIRY_HOURS
}

fn default_inventory_timeout_secs() -> u64 {
    600
}

fn default_powershell() -> String {
    "powershell.exe".to_string()
}

fn default_log_max_size() -> u64 {
    10 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).wrap_err_with(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Load from the given path, the default paths, or use defaults
    ///
    /// # Errors
    /// Returns error if a config file exists but cannot be read or parsed
    pub fn load_default(explicit: Option<&Path>) -> eyre::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let paths = [
            Some(PathBuf::from("wuprobe.toml")),
            system_config_path(),
            dirs::config_dir().map(|p| p.join("wuprobe").join("wuprobe.toml")),
        ];

        for path in paths.into_iter().flatten() {
            if path.exists() {
                return Self::load(&path);
            }
        }

        Ok(Config::default())
    }

    /// Apply command-line overrides
    pub fn merge(&mut self, args: &Args) {
        fn set<T: Clone>(target: &mut T, value: Option<&T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        if args.server.is_some() {
            self.server.url.clone_from(&args.server);
        }
        if args.username.is_some() {
            self.server.username.clone_from(&args.username);
        }
        if args.password.is_some() {
            self.server.password.clone_from(&args.password);
        }
        if args.hostname.is_some() {
            self.check.hostname.clone_from(&args.hostname);
        }
        if args.cache_path.is_some() {
            self.check.cache_path.clone_from(&args.cache_path);
        }
        if args.log_file.is_some() {
            self.log.path.clone_from(&args.log_file);
        }
        set(&mut self.check.service, args.service.as_ref());
        set(&mut self.check.severities.reboot_severity, args.reboot_severity.as_ref());
        set(&mut self.check.severities.optional_severity, args.optional_severity.as_ref());
        set(&mut self.check.cache_expiry_hours, args.cache_expiry_hours.as_ref());
        set(&mut self.check.powershell, args.powershell.as_ref());
        set(&mut self.log.max_size_bytes, args.log_max_size.as_ref());
        if args.no_cache {
            self.check.cache_enabled = false;
        }
    }

    /// Check required values and fill in derived defaults
    ///
    /// # Errors
    /// Returns error if server URL, username or password is missing, or a
    /// duration is out of range
    pub fn resolve(self) -> eyre::Result<Settings> {
        let url = self
            .server
            .url
            .ok_or_else(|| eyre!("monitoring server URL not configured"))?;
        let username = self
            .server
            .username
            .ok_or_else(|| eyre!("monitoring server username not configured"))?;
        let password = self
            .server
            .password
            .ok_or_else(|| eyre!("monitoring server password not configured"))?;

        if self.check.cache_expiry_hours <= 0 {
            return Err(eyre!(
                "cache_expiry_hours must be positive, got {}",
                self.check.cache_expiry_hours
            ));
        }

        let expiry = chrono::Duration::try_hours(self.check.cache_expiry_hours).ok_or_else(|| {
            eyre!(
                "cache_expiry_hours out of range: {}",
                self.check.cache_expiry_hours
            )
        })?;

        let cache_path = self.check.cache_path.unwrap_or_else(default_cache_path);
        let cache = self.check.cache_enabled.then(|| CacheSettings {
            path: cache_path,
            expiry,
        });

        Ok(Settings {
            url,
            username,
            password,
            timeout: Duration::from_secs(self.server.timeout_secs),
            hostname: self.check.hostname.unwrap_or_else(local_fqdn),
            service: self.check.service,
            severities: self.check.severities,
            cache,
            inventory_timeout: Duration::from_secs(self.check.inventory_timeout_secs),
            powershell: self.check.powershell,
        })
    }
}

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
    pub hostname: String,
    pub service: String,
    pub severities: ProbeConfig,
    /// `None` when caching is disabled
    pub cache: Option<CacheSettings>,
    pub inventory_timeout: Duration,
    pub powershell: String,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub path: PathBuf,
    pub expiry: chrono::Duration,
}

fn system_config_path() -> Option<PathBuf> {
    if cfg!(windows) {
        std::env::var_os("ProgramData").map(|p| PathBuf::from(p).join("wuprobe").join("wuprobe.toml"))
    } else {
        Some(PathBuf::from("/etc/wuprobe/wuprobe.toml"))
    }
}

fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("wuprobe")
        .join("updates.json")
}

/// Fully qualified name of this machine, best effort
fn local_fqdn() -> String {
    let non_empty = |value: String| {
        let value = value.trim().to_string();
        (!value.is_empty()).then_some(value)
    };

    if let Some(host) = std::env::var("COMPUTERNAME").ok().and_then(non_empty) {
        return match std::env::var("USERDNSDOMAIN").ok().and_then(non_empty) {
            Some(domain) => format!("{host}.{domain}").to_lowercase(),
            None => host.to_lowercase(),
        };
    }

    std::env::var("HOSTNAME")
        .ok()
        .and_then(non_empty)
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .and_then(non_empty)
        })
        .unwrap_or_else(|| "localhost".to_string())
}
