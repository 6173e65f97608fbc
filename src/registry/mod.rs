//! Registry providers.
//!
//! A provider knows which images it serves, how to normalize their
//! registry url and path, and how to list the tags of a repository.
//! Providers are selected by the `type` field of their configuration
//! section and looked up by the name they were configured under.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Error, Result};
use crate::types::Image;

pub mod hub;
pub use hub::{HubConfig, HubRegistry};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to authenticate with registry: {0}")]
    AuthenticationFailed(String),
    #[error("Registry responded with status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Registry call timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait RegistryProvider: Send + Sync {
    /// Name the provider was configured under.
    fn id(&self) -> &str;

    /// Whether this provider serves the registry of `image`.
    fn matches(&self, image: &Image) -> bool;

    /// Rewrite registry url and path to their canonical form and stamp the
    /// image with this provider's id.
    fn normalize_image(&self, image: Image) -> Image;

    /// All tags of the repository of `image`.
    async fn get_tags(&self, image: &Image) -> std::result::Result<Vec<String>, RegistryError>;
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RegistryConfig {
    Hub(HubConfig),
}

impl RegistryConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            RegistryConfig::Hub(hub) => hub.validate(),
        }
    }

    pub fn masked(&self) -> Self {
        match self {
            RegistryConfig::Hub(hub) => RegistryConfig::Hub(hub.masked()),
        }
    }

    fn build(&self, name: &str) -> Arc<dyn RegistryProvider> {
        match self {
            RegistryConfig::Hub(hub) => Arc::new(HubRegistry::new(name, hub.clone())),
        }
    }
}

/// The set of configured registry providers.
#[derive(Clone, Default)]
pub struct Registries {
    providers: Vec<Arc<dyn RegistryProvider>>,
}

impl Registries {
    pub fn new(providers: Vec<Arc<dyn RegistryProvider>>) -> Self {
        Self { providers }
    }

    pub fn from_config(configs: &BTreeMap<String, RegistryConfig>) -> Result<Self> {
        let mut providers = Vec::with_capacity(configs.len());
        for (name, config) in configs {
            config
                .validate()
                .map_err(|e| Error::Configuration(format!("registry {}: {}", name, e)))?;
            providers.push(config.build(name));
        }
        Ok(Self { providers })
    }

    /// First provider serving the registry of `image`.
    pub fn find_for(&self, image: &Image) -> Option<&Arc<dyn RegistryProvider>> {
        self.providers.iter().find(|provider| provider.matches(image))
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn RegistryProvider>> {
        self.providers.iter().find(|provider| provider.id() == id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
