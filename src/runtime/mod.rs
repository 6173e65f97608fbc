use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

pub mod docker;
pub use docker::DockerRuntime;

/// A running container as reported by the runtime.
#[derive(Debug, Clone, Default)]
pub struct ContainerSpec {
    pub name: String,
    /// Image reference the container was started from; may be a bare digest.
    pub image: String,
    pub labels: HashMap<String, String>,
}

impl ContainerSpec {
    /// Value of a label, matching its name case-insensitively.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Image properties the runtime knows about.
#[derive(Debug, Clone, Default)]
pub struct ImageDetails {
    pub architecture: Option<String>,
    pub os: Option<String>,
    pub size: Option<i64>,
    pub created: Option<String>,
    pub repo_tags: Vec<String>,
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Docker error: {0}")]
    Docker(#[from] bollard::errors::Error),
    #[error("Image not found: {0}")]
    ImageNotFound(String),
}

#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Running containers.
    async fn list(&self) -> Result<Vec<ContainerSpec>, RuntimeError>;

    /// Details of the image a container runs.
    async fn inspect_image(&self, image: &str) -> Result<ImageDetails, RuntimeError>;
}
