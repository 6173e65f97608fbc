//! Triggers consume new-version events from the bus.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::event::EventBus;
use crate::types::Image;

pub mod log_trigger;
pub use log_trigger::{LogTrigger, LogTriggerConfig};

pub trait Trigger: Send + Sync {
    fn id(&self) -> &str;

    /// Called once per new-version event.
    fn notify(&self, image: &Image) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TriggerConfig {
    Log(LogTriggerConfig),
}

impl TriggerConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            TriggerConfig::Log(log) => log.validate(),
        }
    }

    pub fn masked(&self) -> Self {
        self.clone()
    }

    fn build(&self, name: &str) -> std::result::Result<Arc<dyn Trigger>, String> {
        match self {
            TriggerConfig::Log(log) => Ok(Arc::new(LogTrigger::new(name, log)?)),
        }
    }
}

/// Build every configured trigger and subscribe it to new-version events.
pub fn register_all(
    configs: &BTreeMap<String, TriggerConfig>,
    bus: &EventBus,
) -> Result<Vec<Arc<dyn Trigger>>> {
    let mut triggers = Vec::with_capacity(configs.len());
    for (name, config) in configs {
        let trigger = config
            .build(name)
            .map_err(|e| Error::Configuration(format!("trigger {}: {}", name, e)))?;
        register(bus, Arc::clone(&trigger));
        triggers.push(trigger);
    }
    Ok(triggers)
}

pub fn register(bus: &EventBus, trigger: Arc<dyn Trigger>) {
    info!("Register trigger {}", trigger.id());
    bus.on_image_new_version(move |image| trigger.notify(image));
}
