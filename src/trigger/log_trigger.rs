use log::{log, Level};
use serde::{Deserialize, Serialize};

use super::Trigger;
use crate::types::Image;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogTriggerConfig {
    pub level: String,
}

impl Default for LogTriggerConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl LogTriggerConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.level
            .parse::<Level>()
            .map(|_| ())
            .map_err(|_| format!("unknown log level {:?}", self.level))
    }
}

/// Writes one log line per new version.
pub struct LogTrigger {
    id: String,
    level: Level,
}

impl LogTrigger {
    pub fn new(id: impl Into<String>, config: &LogTriggerConfig) -> Result<Self, String> {
        config.validate()?;
        Ok(Self {
            id: id.into(),
            level: config.level.parse().unwrap_or(Level::Info),
        })
    }
}

impl Trigger for LogTrigger {
    fn id(&self) -> &str {
        &self.id
    }

    fn notify(&self, image: &Image) -> anyhow::Result<()> {
        let new_version = image
            .result
            .as_ref()
            .and_then(|r| r.new_version.as_deref())
            .ok_or_else(|| anyhow::anyhow!("no new version for {}", image.reference()))?;
        log!(
            self.level,
            "New version {} available for {} (watcher {})",
            new_version,
            image.reference(),
            image.watcher
        );
        Ok(())
    }
}
