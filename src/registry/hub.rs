use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::debug;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{RegistryError, RegistryProvider};
use crate::config::mask;
use crate::types::Image;

const REGISTRY_HOST: &str = "registry-1.docker.io";
const REGISTRY_URL: &str = "https://registry-1.docker.io";
const AUTH_REALM: &str = "https://auth.docker.io/token";
const AUTH_SERVICE: &str = "registry.docker.io";
const HUB_DOMAINS: [&str; 4] = ["", "docker.io", "index.docker.io", "registry-1.docker.io"];
const PAGE_SIZE: usize = 1000;
const MAX_PAGES: usize = 100;

/// Optional credentials for the Docker Hub token endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HubConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl HubConfig {
    pub fn validate(&self) -> Result<(), String> {
        match (&self.login, &self.token) {
            (Some(_), None) | (None, Some(_)) => {
                Err("login and token must be set together".to_string())
            }
            _ => Ok(()),
        }
    }

    pub fn masked(&self) -> Self {
        Self {
            login: self.login.clone(),
            token: self.token.as_deref().map(mask),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TagList {
    tags: Option<Vec<String>>,
}

/// Bearer tokens by scope.  The lock guards the map only, never a fetch,
/// so a stalled token request holds up its own caller alone.
#[derive(Default)]
struct TokenCache {
    tokens: Mutex<HashMap<String, (String, Instant)>>,
}

impl TokenCache {
    async fn get_or_fetch<F, Fut>(&self, scope: &str, fetch: F) -> Result<String, RegistryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(String, Duration), RegistryError>>,
    {
        let cached = self
            .tokens
            .lock()
            .await
            .get(scope)
            .filter(|(_, deadline)| Instant::now() < *deadline)
            .map(|(token, _)| token.clone());
        if let Some(token) = cached {
            return Ok(token);
        }

        let (token, ttl) = fetch().await?;
        self.tokens
            .lock()
            .await
            .insert(scope.to_string(), (token.clone(), Instant::now() + ttl));
        Ok(token)
    }
}

/// Docker Hub tag listing over the registry v2 API.
pub struct HubRegistry {
    id: String,
    config: HubConfig,
    client: Client,
    tokens: TokenCache,
}

impl HubRegistry {
    pub fn new(id: impl Into<String>, config: HubConfig) -> Self {
        Self {
            id: id.into(),
            config,
            client: Client::new(),
            tokens: TokenCache::default(),
        }
    }

    async fn token(&self, repository: &str) -> Result<String, RegistryError> {
        let scope = format!("repository:{}:pull", repository);
        self.tokens
            .get_or_fetch(&scope, || self.fetch_token(&scope))
            .await
    }

    async fn fetch_token(&self, scope: &str) -> Result<(String, Duration), RegistryError> {
        let mut request = self
            .client
            .get(AUTH_REALM)
            .query(&[("service", AUTH_SERVICE), ("scope", scope)]);
        if let (Some(login), Some(token)) = (&self.config.login, &self.config.token) {
            request = request.basic_auth(login, Some(token));
        }
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(RegistryError::AuthenticationFailed(format!(
                "Status: {}",
                resp.status()
            )));
        }
        let body: TokenResponse = resp.json().await?;
        // Renew a little before the registry expires the token.
        let ttl = body.expires_in.unwrap_or(300).saturating_sub(10);
        Ok((body.token, Duration::from_secs(ttl)))
    }
}

#[async_trait]
impl RegistryProvider for HubRegistry {
    fn id(&self) -> &str {
        &self.id
    }

    fn matches(&self, image: &Image) -> bool {
        HUB_DOMAINS.contains(&image.registry_url.as_str())
    }

    fn normalize_image(&self, mut image: Image) -> Image {
        image.registry = self.id.clone();
        image.registry_url = REGISTRY_HOST.to_string();
        if !image.image.contains('/') {
            image.image = format!("library/{}", image.image);
        }
        image
    }

    async fn get_tags(&self, image: &Image) -> Result<Vec<String>, RegistryError> {
        let token = self.token(&image.image).await?;
        let mut url = format!("{}/v2/{}/tags/list?n={}", REGISTRY_URL, image.image, PAGE_SIZE);
        let mut tags = Vec::new();

        for _ in 0..MAX_PAGES {
            debug!("List tags {}", url);
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .send()
                .await?;
            match resp.status() {
                status if status.is_success() => {}
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    return Err(RegistryError::AuthenticationFailed(format!(
                        "Status: {} for {}",
                        resp.status(),
                        image.image
                    )))
                }
                status => {
                    return Err(RegistryError::Status {
                        status: status.as_u16(),
                        url,
                    })
                }
            }

            let next = resp
                .headers()
                .get(header::LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_page);
            let page: TagList = resp.json().await?;
            tags.extend(page.tags.unwrap_or_default());

            match next {
                Some(path) if path.starts_with("http") => url = path,
                Some(path) => url = format!("{}{}", REGISTRY_URL, path),
                None => break,
            }
        }
        Ok(tags)
    }
}

/// Extract the `rel="next"` target of a `Link` header.
fn next_page(link: &str) -> Option<String> {
    link.split(',')
        .find(|part| part.contains("rel=\"next\""))
        .and_then(|part| {
            let start = part.find('<')? + 1;
            let end = part.find('>')?;
            (start < end).then(|| part[start..end].to_string())
        })
}
