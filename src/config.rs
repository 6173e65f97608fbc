use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::registry::RegistryConfig;
use crate::trigger::TriggerConfig;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: String,
    pub file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "/store".into(),
            file: "tagwatch.json".into(),
        }
    }
}

/// Settings of a docker watcher.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DockerWatcherConfig {
    pub socket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub port: u16,
    pub cron: String,
    pub watchbydefault: bool,
}

impl Default for DockerWatcherConfig {
    fn default() -> Self {
        Self {
            socket: "/var/run/docker.sock".into(),
            host: None,
            port: 2375,
            cron: "0 * * * *".into(),
            watchbydefault: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WatcherConfig {
    Docker(DockerWatcherConfig),
}

impl WatcherConfig {
    pub fn cron(&self) -> &str {
        match self {
            WatcherConfig::Docker(docker) => &docker.cron,
        }
    }

    pub fn watch_by_default(&self) -> bool {
        match self {
            WatcherConfig::Docker(docker) => docker.watchbydefault,
        }
    }

    pub fn validate(&self) -> Result<()> {
        parse_schedule(self.cron())?;
        match self {
            WatcherConfig::Docker(docker) if docker.port == 0 => {
                Err(Error::Configuration("docker port must not be 0".into()))
            }
            WatcherConfig::Docker(_) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub watchers: BTreeMap<String, WatcherConfig>,
    pub registries: BTreeMap<String, RegistryConfig>,
    pub triggers: BTreeMap<String, TriggerConfig>,
    /// Maximum number of concurrent registry calls within one cycle.
    pub max_concurrency: usize,
    /// Timeout of a single tag listing call.
    pub registry_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            watchers: BTreeMap::new(),
            registries: BTreeMap::new(),
            triggers: BTreeMap::new(),
            max_concurrency: 8,
            registry_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("tagwatch.toml"))
            .merge(Json::file("tagwatch.json"))
            .merge(Env::prefixed("TAGWATCH_").split("__"))
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        Ok(config.with_defaults())
    }

    /// Fill in the local docker watcher and the anonymous hub registry when
    /// none are configured.
    pub fn with_defaults(mut self) -> Self {
        if self.watchers.is_empty() {
            self.watchers.insert(
                "local".into(),
                WatcherConfig::Docker(DockerWatcherConfig::default()),
            );
        }
        if self.registries.is_empty() {
            self.registries
                .insert("hub".into(), RegistryConfig::Hub(Default::default()));
        }
        self
    }

    /// Checks that are fatal to the whole daemon.  Watcher settings are
    /// checked when each watcher starts.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(Error::Configuration("max_concurrency must be at least 1".into()));
        }
        if self.registry_timeout_secs == 0 {
            return Err(Error::Configuration(
                "registry_timeout_secs must be at least 1".into(),
            ));
        }
        for (name, registry) in &self.registries {
            registry
                .validate()
                .map_err(|e| Error::Configuration(format!("registry {}: {}", name, e)))?;
        }
        for (name, trigger) in &self.triggers {
            trigger
                .validate()
                .map_err(|e| Error::Configuration(format!("trigger {}: {}", name, e)))?;
        }
        Ok(())
    }

    /// A copy safe to log: every secret is masked.
    pub fn masked(&self) -> Self {
        let mut config = self.clone();
        for registry in config.registries.values_mut() {
            *registry = registry.masked();
        }
        for trigger in config.triggers.values_mut() {
            *trigger = trigger.masked();
        }
        config
    }
}

/// Parse a cron expression.  The classic five-field form gets an implied
/// `0` seconds field.
pub fn parse_schedule(expression: &str) -> Result<cron::Schedule> {
    let expression = expression.trim();
    let normalized = if expression.split_whitespace().count() == 5 {
        format!("0 {}", expression)
    } else {
        expression.to_string()
    };
    cron::Schedule::from_str(&normalized)
        .map_err(|e| Error::Configuration(format!("invalid cron expression {:?}: {}", expression, e)))
}

/// Mask a secret, keeping only its first and last characters.
pub fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    match chars.len() {
        0..=2 => "*".repeat(chars.len()),
        n => format!("{}{}{}", chars[0], "*".repeat(n - 2), chars[n - 1]),
    }
}
