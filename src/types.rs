//! Data structures shared by the watch pipeline.
//!
//! These types are serialised using [`serde`](https://serde.rs/) both to
//! persist the store and to hand records to the read surface.  An
//! [`Image`] describes one watched artifact as it was discovered on a
//! container runtime; its optional [`ImageResult`] carries the outcome of
//! the last resolution attempt against the registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of one resolution attempt.
///
/// A result with only `error` set is a failed attempt.  "No newer tag"
/// is not represented here at all: the image simply has no result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImageResult {
    pub fn found(new_version: impl Into<String>) -> Self {
        Self {
            new_version: Some(new_version.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            new_version: None,
            error: Some(error.into()),
        }
    }
}

/// Structural comparison of a stored result with a freshly computed one.
///
/// Both absent is equal; a result appearing where none was stored is a
/// change; otherwise the two results are compared field by field.
pub fn is_same_result(stored: Option<&ImageResult>, fresh: Option<&ImageResult>) -> bool {
    match (stored, fresh) {
        (None, None) => true,
        (Some(stored), Some(fresh)) => stored == fresh,
        _ => false,
    }
}

/// The identity tuple of a watched artifact.
///
/// The store holds at most one record per key.  Ordering is only used to
/// keep log output and prune lists deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageKey {
    pub watcher: String,
    pub registry_url: String,
    pub image: String,
    pub version: String,
    pub include_tags: Option<String>,
    pub exclude_tags: Option<String>,
}

impl std::fmt::Display for ImageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}/{}:{}",
            self.watcher, self.registry_url, self.image, self.version
        )
    }
}

/// One watched artifact instance.
///
/// `id`, `created` and `updated` are owned by the store; an image built by
/// a watcher has them unset until it is first persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub watcher: String,
    pub registry: String,
    pub registry_url: String,
    pub image: String,
    pub version: String,
    #[serde(default)]
    pub version_date: Option<String>,
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub include_tags: Option<String>,
    #[serde(default)]
    pub exclude_tags: Option<String>,
    #[serde(default)]
    pub is_semver: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ImageResult>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

impl Image {
    /// Build an unsaved image with only its identifying fields set.
    pub fn new(
        watcher: impl Into<String>,
        registry_url: impl Into<String>,
        image: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            watcher: watcher.into(),
            registry: String::new(),
            registry_url: registry_url.into(),
            image: image.into(),
            version: version.into(),
            version_date: None,
            architecture: None,
            os: None,
            size: None,
            include_tags: None,
            exclude_tags: None,
            is_semver: false,
            result: None,
            created: None,
            updated: None,
        }
    }

    pub fn key(&self) -> ImageKey {
        ImageKey {
            watcher: self.watcher.clone(),
            registry_url: self.registry_url.clone(),
            image: self.image.clone(),
            version: self.version.clone(),
            include_tags: self.include_tags.clone(),
            exclude_tags: self.exclude_tags.clone(),
        }
    }

    /// Human readable reference, used in log lines.
    pub fn reference(&self) -> String {
        if self.registry_url.is_empty() {
            format!("{}:{}", self.image, self.version)
        } else {
            format!("{}/{}:{}", self.registry_url, self.image, self.version)
        }
    }
}
