use super::{ContainerRuntime, ContainerSpec, ImageDetails, RuntimeError};
use crate::config::DockerWatcherConfig;
use async_trait::async_trait;
use bollard::container::ListContainersOptions;
use bollard::{Docker, API_DEFAULT_VERSION};
use log::{debug, info};

/// Seconds before a call to the docker daemon gives up.
const DOCKER_TIMEOUT: u64 = 120;

pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect to the daemon over tcp when a host is configured, over the
    /// unix socket otherwise.
    pub fn connect(config: &DockerWatcherConfig) -> Result<Self, RuntimeError> {
        let docker = match &config.host {
            Some(host) => {
                let addr = format!("http://{}:{}", host, config.port);
                info!("Connect to docker daemon at {}", addr);
                Docker::connect_with_http(&addr, DOCKER_TIMEOUT, API_DEFAULT_VERSION)?
            }
            None => {
                info!("Connect to docker daemon on socket {}", config.socket);
                Docker::connect_with_socket(&config.socket, DOCKER_TIMEOUT, API_DEFAULT_VERSION)?
            }
        };
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list(&self) -> Result<Vec<ContainerSpec>, RuntimeError> {
        let opts = ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        };
        let containers = self.docker.list_containers(Some(opts)).await?;

        let mut specs = Vec::with_capacity(containers.len());
        for c in containers {
            let name = c
                .names
                .as_ref()
                .and_then(|n| n.first())
                .map(|n| n.trim_start_matches('/').to_string());
            let name = match (name, c.id) {
                (Some(n), _) => n,
                (_, Some(id)) => id,
                _ => continue,
            };
            let image = match c.image {
                Some(image) if !image.is_empty() => image,
                _ => {
                    debug!("Container {} has no image reference", name);
                    continue;
                }
            };
            specs.push(ContainerSpec {
                name,
                image,
                labels: c.labels.unwrap_or_default(),
            });
        }
        Ok(specs)
    }

    async fn inspect_image(&self, image: &str) -> Result<ImageDetails, RuntimeError> {
        let detail = self.docker.inspect_image(image).await.map_err(|e| match e {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            } => RuntimeError::ImageNotFound(image.to_string()),
            e => RuntimeError::Docker(e),
        })?;
        Ok(ImageDetails {
            architecture: detail.architecture,
            os: detail.os,
            size: detail.size,
            created: detail.created,
            repo_tags: detail.repo_tags.unwrap_or_default(),
        })
    }
}
