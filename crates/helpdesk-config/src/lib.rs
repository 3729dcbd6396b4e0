use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_HELPDESK_CONFIG: &str = "HELPDESK_CONFIG";

const DEFAULT_HOME_ROUTE: &str = "home";
const DEFAULT_THREAD_ROUTE: &str = "thread";
const DEFAULT_USER_ROUTE: &str = "user";
const DEFAULT_MAX_REDIRECTS: u32 = 4;
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const MIN_POLL_INTERVAL_MS: u64 = 10;
const DEFAULT_BUFFER_CAPACITY: usize = 256;
/// One navigation publishes a tab-opened and a completion before the shell
/// syncs; the floor leaves headroom for a redirect chain on top of that.
pub const MIN_BUFFER_CAPACITY: usize = 16;
const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_GATEWAY_PROVIDER: &str = "gateway.in_memory";
const DEFAULT_SEED_DEMO_DATA: bool = true;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Message(String),
}

impl ConfigError {
    fn configuration(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HelpDeskConfig {
    #[serde(default)]
    pub navigation: NavigationConfigToml,
    #[serde(default)]
    pub dirty_tracking: DirtyTrackingConfigToml,
    #[serde(default)]
    pub eventbus: EventBusConfigToml,
    #[serde(default)]
    pub logging: LoggingConfigToml,
    #[serde(default)]
    pub gateway: GatewayConfigToml,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavigationConfigToml {
    #[serde(default = "default_home_route")]
    pub home_route: String,
    #[serde(default = "default_thread_route")]
    pub thread_route: String,
    #[serde(default = "default_user_route")]
    pub user_route: String,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
}

impl Default for NavigationConfigToml {
    fn default() -> Self {
        Self {
            home_route: default_home_route(),
            thread_route: default_thread_route(),
            user_route: default_user_route(),
            max_redirects: default_max_redirects(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirtyTrackingConfigToml {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for DirtyTrackingConfigToml {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventBusConfigToml {
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

impl Default for EventBusConfigToml {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfigToml {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfigToml {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayConfigToml {
    #[serde(default = "default_gateway_provider")]
    pub provider: String,
    #[serde(default = "default_seed_demo_data")]
    pub seed_demo_data: bool,
}

impl Default for GatewayConfigToml {
    fn default() -> Self {
        Self {
            provider: default_gateway_provider(),
            seed_demo_data: default_seed_demo_data(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRuntimeConfig {
    pub home_route: String,
    pub thread_route: String,
    pub user_route: String,
    pub max_redirects: u32,
}

impl Default for NavigationRuntimeConfig {
    fn default() -> Self {
        HelpDeskConfig::default().navigation_runtime()
    }
}

impl HelpDeskConfig {
    pub fn navigation_runtime(&self) -> NavigationRuntimeConfig {
        NavigationRuntimeConfig {
            home_route: self.navigation.home_route.clone(),
            thread_route: self.navigation.thread_route.clone(),
            user_route: self.navigation.user_route.clone(),
            max_redirects: self.navigation.max_redirects,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.dirty_tracking.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}

pub fn load_from_env() -> Result<HelpDeskConfig, ConfigError> {
    let path = config_path_from_env()?;
    load_from_path(path)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<HelpDeskConfig, ConfigError> {
    load_or_create_config(path.as_ref())
}

pub fn parse_config(raw: &str) -> Result<HelpDeskConfig, ConfigError> {
    let mut config: HelpDeskConfig = toml::from_str(raw).map_err(|err| {
        ConfigError::configuration(format!("Failed to parse HELPDESK_CONFIG: {err}"))
    })?;
    normalize_config(&mut config);
    Ok(config)
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = resolve_home_dir().ok_or_else(|| {
        ConfigError::configuration("Unable to resolve home directory from HOME or USERPROFILE")
    })?;

    Ok(home.join(".config").join("helpdesk").join("config.toml"))
}

fn config_path_from_env() -> Result<PathBuf, ConfigError> {
    match std::env::var(ENV_HELPDESK_CONFIG) {
        Ok(raw) => {
            if raw.trim().is_empty() {
                default_config_path()
            } else {
                Ok(raw.into())
            }
        }
        Err(std::env::VarError::NotPresent) => default_config_path(),
        Err(_) => Err(ConfigError::configuration(
            "HELPDESK_CONFIG contained invalid UTF-8",
        )),
    }
}

fn resolve_home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("USERPROFILE")
                .ok()
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
}

fn default_home_route() -> String {
    DEFAULT_HOME_ROUTE.to_owned()
}

fn default_thread_route() -> String {
    DEFAULT_THREAD_ROUTE.to_owned()
}

fn default_user_route() -> String {
    DEFAULT_USER_ROUTE.to_owned()
}

fn default_max_redirects() -> u32 {
    DEFAULT_MAX_REDIRECTS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

fn default_gateway_provider() -> String {
    DEFAULT_GATEWAY_PROVIDER.to_owned()
}

fn default_seed_demo_data() -> bool {
    DEFAULT_SEED_DEMO_DATA
}

fn persist_config(path: &Path, config: &HelpDeskConfig) -> Result<(), ConfigError> {
    let rendered = toml::to_string_pretty(config).map_err(|err| {
        ConfigError::configuration(format!(
            "Failed to serialize HELPDESK_CONFIG for {}: {err}",
            path.display()
        ))
    })?;

    std::fs::write(path, rendered.as_bytes()).map_err(|err| {
        ConfigError::configuration(format!(
            "Failed to write HELPDESK_CONFIG to {}: {err}",
            path.display()
        ))
    })
}

fn load_or_create_config(path: &Path) -> Result<HelpDeskConfig, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|err| {
                        ConfigError::configuration(format!(
                            "Failed to create parent directory {} for HELPDESK_CONFIG: {err}",
                            parent.display()
                        ))
                    })?;
                }
            }

            let default_config = HelpDeskConfig::default();
            persist_config(path, &default_config)?;
            return Ok(default_config);
        }
        Err(err) => {
            return Err(ConfigError::configuration(format!(
                "Failed to read HELPDESK_CONFIG from {}: {err}",
                path.display()
            )));
        }
    };

    let mut config: HelpDeskConfig = toml::from_str(&raw).map_err(|err| {
        ConfigError::configuration(format!(
            "Failed to parse HELPDESK_CONFIG from {}: {err}",
            path.display()
        ))
    })?;

    if normalize_config(&mut config) {
        persist_config(path, &config)?;
    }

    Ok(config)
}

/// Replaces blank or out-of-range values with defaults; true when anything
/// was rewritten.
pub fn normalize_config(config: &mut HelpDeskConfig) -> bool {
    let mut changed = false;

    changed |= normalize_route(&mut config.navigation.home_route, DEFAULT_HOME_ROUTE);
    changed |= normalize_route(&mut config.navigation.thread_route, DEFAULT_THREAD_ROUTE);
    changed |= normalize_route(&mut config.navigation.user_route, DEFAULT_USER_ROUTE);
    if config.navigation.max_redirects == 0 {
        config.navigation.max_redirects = DEFAULT_MAX_REDIRECTS;
        changed = true;
    }
    if config.dirty_tracking.poll_interval_ms < MIN_POLL_INTERVAL_MS {
        config.dirty_tracking.poll_interval_ms = MIN_POLL_INTERVAL_MS;
        changed = true;
    }
    if config.eventbus.buffer_capacity < MIN_BUFFER_CAPACITY {
        config.eventbus.buffer_capacity = MIN_BUFFER_CAPACITY;
        changed = true;
    }
    if config.logging.filter.trim().is_empty() {
        config.logging.filter = DEFAULT_LOG_FILTER.to_owned();
        changed = true;
    }
    let provider = config.gateway.provider.trim();
    if provider.is_empty() {
        config.gateway.provider = DEFAULT_GATEWAY_PROVIDER.to_owned();
        changed = true;
    } else if provider != config.gateway.provider {
        config.gateway.provider = provider.to_owned();
        changed = true;
    }

    changed
}

fn normalize_route(value: &mut String, default: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        *value = default.to_owned();
        return true;
    }
    if trimmed != value {
        *value = trimmed.to_owned();
        return true;
    }
    false
}
