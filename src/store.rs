//! Keyed store of watched images.
//!
//! The store keeps one record per identity tuple ([`ImageKey`]) and owns
//! the synthetic id and the timestamps of every record.  All mutations go
//! through a single write lock, so a find-then-write sequence such as
//! [`Store::reconcile`] is atomic with respect to overlapping cycles.
//!
//! When opened from a file the table is loaded at startup and written back
//! on [`Store::persist`].

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::{debug, info};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::types::{is_same_result, Image, ImageKey};

/// Equality criteria for [`Store::list`]; unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ImageFilter {
    pub watcher: Option<String>,
    pub registry: Option<String>,
    pub image: Option<String>,
    pub version: Option<String>,
}

impl ImageFilter {
    pub fn by_watcher(watcher: impl Into<String>) -> Self {
        Self {
            watcher: Some(watcher.into()),
            ..Default::default()
        }
    }

    fn matches(&self, image: &Image) -> bool {
        fn eq(criterion: &Option<String>, value: &str) -> bool {
            criterion.as_deref().map_or(true, |c| c == value)
        }
        eq(&self.watcher, &image.watcher)
            && eq(&self.registry, &image.registry)
            && eq(&self.image, &image.image)
            && eq(&self.version, &image.version)
    }
}

/// What [`Store::reconcile`] did with a freshly resolved image.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// The record as persisted.
    pub image: Image,
    /// Whether a new-version event should fire for it.
    pub new_version: bool,
}

#[derive(Default)]
struct Table {
    images: HashMap<ImageKey, Image>,
    ids: HashMap<Uuid, ImageKey>,
}

impl Table {
    fn insert(&mut self, mut image: Image) -> Result<Image> {
        let key = image.key();
        if self.images.contains_key(&key) {
            return Err(Error::Store(format!("image {} already exists", key)));
        }
        let now = Utc::now();
        let id = Uuid::new_v4();
        image.id = Some(id);
        image.created = Some(now);
        image.updated = Some(now);
        self.ids.insert(id, key.clone());
        self.images.insert(key, image.clone());
        Ok(image)
    }

    fn update(&mut self, image: &Image) -> Option<Image> {
        let existing = self.images.get_mut(&image.key())?;
        existing.result = image.result.clone();
        existing.updated = Some(later(existing.updated));
        Some(existing.clone())
    }

    fn remove(&mut self, id: &Uuid) -> Option<Image> {
        let key = self.ids.remove(id)?;
        self.images.remove(&key)
    }

    /// Load a persisted record as is, keeping its id and timestamps.
    fn restore(&mut self, mut image: Image) {
        let key = image.key();
        if self.images.contains_key(&key) {
            debug!("Skip duplicate persisted image {}", key);
            return;
        }
        let id = *image.id.get_or_insert_with(Uuid::new_v4);
        let now = Utc::now();
        image.created.get_or_insert(now);
        image.updated.get_or_insert(now);
        self.ids.insert(id, key.clone());
        self.images.insert(key, image);
    }
}

/// `now`, but never earlier than the previous timestamp.
fn later(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(prev) if prev > now => prev,
        _ => now,
    }
}

pub struct Store {
    table: RwLock<Table>,
    file: Option<PathBuf>,
    // Held from snapshot to rename so writers never interleave.
    persisting: Mutex<()>,
}

impl Store {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            table: RwLock::new(Table::default()),
            file: None,
            persisting: Mutex::new(()),
        }
    }

    /// Open the store file described by `config`, creating its folder when
    /// missing.  A missing file is an empty store.
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let dir = PathBuf::from(&config.path);
        let file = dir.join(&config.file);
        info!("Init store ({})", file.display());
        if !dir.exists() {
            debug!("Create folder {}", dir.display());
            tokio::fs::create_dir_all(&dir).await?;
        }

        let mut table = Table::default();
        if file.exists() {
            let raw = tokio::fs::read(&file).await?;
            if !raw.is_empty() {
                let images: Vec<Image> = serde_json::from_slice(&raw)?;
                for image in images {
                    table.restore(image);
                }
            }
        } else {
            info!("Store empty => start with no images");
        }
        info!("Store loaded with {} images", table.images.len());

        Ok(Self {
            table: RwLock::new(table),
            file: Some(file),
            persisting: Mutex::new(()),
        })
    }

    pub async fn find(&self, key: &ImageKey) -> Option<Image> {
        self.table.read().await.images.get(key).cloned()
    }

    /// Insert a new record; assigns its id and sets created = updated = now.
    pub async fn insert(&self, image: Image) -> Result<Image> {
        self.table.write().await.insert(image)
    }

    /// Replace the result of the record sharing `image`'s identity tuple and
    /// bump its `updated` timestamp.  `id` and `created` are preserved.
    pub async fn update(&self, image: &Image) -> Option<Image> {
        self.table.write().await.update(image)
    }

    /// Record a freshly resolved image and decide whether it is news.
    ///
    /// A first sighting is inserted and is news only when it carries a new
    /// version.  A known image is always updated; it is news when its result
    /// changed and the fresh result carries a new version.
    pub async fn reconcile(&self, image: Image) -> Result<Reconciliation> {
        let mut table = self.table.write().await;
        let key = image.key();
        let previous = table.images.get(&key).map(|stored| stored.result.clone());
        let has_new_version = image
            .result
            .as_ref()
            .map_or(false, |r| r.new_version.is_some());

        match previous {
            None => {
                debug!("Image {} watched for the first time", key);
                let image = table.insert(image)?;
                Ok(Reconciliation {
                    image,
                    new_version: has_new_version,
                })
            }
            Some(stored) => {
                let changed = !is_same_result(stored.as_ref(), image.result.as_ref());
                let image = table
                    .update(&image)
                    .ok_or_else(|| Error::Store(format!("image {} vanished", key)))?;
                Ok(Reconciliation {
                    image,
                    new_version: changed && has_new_version,
                })
            }
        }
    }

    /// Records matching `filter`, sorted by watcher, registry, image and
    /// version.
    pub async fn list(&self, filter: &ImageFilter) -> Vec<Image> {
        let table = self.table.read().await;
        let mut images: Vec<Image> = table
            .images
            .values()
            .filter(|image| filter.matches(image))
            .cloned()
            .collect();
        images.sort_by(|a, b| {
            (&a.watcher, &a.registry, &a.image, &a.version)
                .cmp(&(&b.watcher, &b.registry, &b.image, &b.version))
        });
        images
    }

    pub async fn get_by_id(&self, id: &Uuid) -> Option<Image> {
        let table = self.table.read().await;
        let key = table.ids.get(id)?;
        table.images.get(key).cloned()
    }

    /// Delete a record by id.  Deleting an unknown id is a no-op.
    pub async fn delete_by_id(&self, id: &Uuid) -> Option<Image> {
        self.table.write().await.remove(id)
    }

    /// Delete every record of `watcher` whose identity tuple is not in
    /// `discovered`, returning the removed records.
    pub async fn prune(&self, watcher: &str, discovered: &HashSet<ImageKey>) -> Vec<Image> {
        let mut table = self.table.write().await;
        let stale: Vec<Uuid> = table
            .images
            .iter()
            .filter(|(key, _)| key.watcher == watcher && !discovered.contains(*key))
            .filter_map(|(_, image)| image.id)
            .collect();
        stale.iter().filter_map(|id| table.remove(id)).collect()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.images.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Write the table back to its file.  No-op for an in-memory store.
    pub async fn persist(&self) -> Result<()> {
        let file = match &self.file {
            Some(file) => file,
            None => return Ok(()),
        };
        let _persisting = self.persisting.lock().await;
        let images = self.list(&ImageFilter::default()).await;
        let bytes = serde_json::to_vec_pretty(&images)?;
        let tmp = file.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        if let Err(e) = tokio::fs::write(&tmp, bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tokio::fs::rename(&tmp, file).await?;
        debug!("Store persisted ({} images)", images.len());
        Ok(())
    }
}
