//! In-memory collaborators for driving watchers without docker or network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::reference::ImageReference;
use crate::registry::{RegistryError, RegistryProvider};
use crate::runtime::{ContainerRuntime, ContainerSpec, ImageDetails, RuntimeError};
use crate::types::Image;

#[derive(Default)]
pub struct FakeRuntime {
    pub containers: StdMutex<Vec<ContainerSpec>>,
    pub images: HashMap<String, ImageDetails>,
    pub unavailable: bool,
}

impl FakeRuntime {
    pub fn with(containers: Vec<ContainerSpec>) -> Self {
        Self {
            containers: StdMutex::new(containers),
            ..Default::default()
        }
    }

    pub fn set(&self, containers: Vec<ContainerSpec>) {
        *self.containers.lock().unwrap() = containers;
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn list(&self) -> std::result::Result<Vec<ContainerSpec>, RuntimeError> {
        if self.unavailable {
            return Err(RuntimeError::Docker(
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 500,
                    message: "daemon down".into(),
                },
            ));
        }
        Ok(self.containers.lock().unwrap().clone())
    }

    async fn inspect_image(&self, image: &str) -> std::result::Result<ImageDetails, RuntimeError> {
        match self.images.get(image) {
            Some(details) => Ok(details.clone()),
            None if ImageReference::is_digest(image) => {
                Err(RuntimeError::ImageNotFound(image.to_string()))
            }
            None => Ok(ImageDetails {
                architecture: Some("amd64".into()),
                os: Some("linux".into()),
                ..Default::default()
            }),
        }
    }
}

#[derive(Default)]
pub struct FakeRegistry {
    pub tags: StdMutex<HashMap<String, std::result::Result<Vec<String>, String>>>,
    pub delay: Option<Duration>,
    pub in_flight: AtomicUsize,
    /// Highest number of `get_tags` calls seen running at once.
    pub peak: AtomicUsize,
}

impl FakeRegistry {
    pub fn with(tags: Vec<(&str, Vec<&str>)>) -> Self {
        let registry = Self::default();
        for (image, list) in tags {
            registry.set(image, &list);
        }
        registry
    }

    pub fn set(&self, image: &str, tags: &[&str]) {
        self.tags.lock().unwrap().insert(
            image.to_string(),
            Ok(tags.iter().map(|t| t.to_string()).collect()),
        );
    }

    pub fn fail(&self, image: &str, message: &str) {
        self.tags
            .lock()
            .unwrap()
            .insert(image.to_string(), Err(message.to_string()));
    }
}

#[async_trait]
impl RegistryProvider for FakeRegistry {
    fn id(&self) -> &str {
        "fake"
    }

    fn matches(&self, image: &Image) -> bool {
        image.registry_url == "fake.io"
    }

    fn normalize_image(&self, mut image: Image) -> Image {
        image.registry = "fake".into();
        image
    }

    async fn get_tags(&self, image: &Image) -> std::result::Result<Vec<String>, RegistryError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let found = self.tags.lock().unwrap().get(&image.image).cloned();
        match found {
            Some(Ok(tags)) => Ok(tags),
            Some(Err(message)) => Err(RegistryError::AuthenticationFailed(message)),
            None => Ok(Vec::new()),
        }
    }
}

pub fn container(name: &str, image: &str) -> ContainerSpec {
    ContainerSpec {
        name: name.into(),
        image: image.into(),
        labels: HashMap::new(),
    }
}

pub fn labelled(name: &str, image: &str, labels: &[(&str, &str)]) -> ContainerSpec {
    ContainerSpec {
        labels: labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        ..container(name, image)
    }
}
