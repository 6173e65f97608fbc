//! Everything built at startup, passed explicitly instead of living in
//! process-wide registries.
//!
//! The context owns the store, the event bus, the registry providers, the
//! triggers and the watchers.  It also exposes the read surface used by an
//! outer API layer: listing, getting and deleting records, plus an
//! on-demand re-watch of one record.  Nothing outside the watchers writes
//! to the store.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::{Config, WatcherConfig};
use crate::error::{Error, Result};
use crate::event::EventBus;
use crate::registry::Registries;
use crate::runtime::{ContainerRuntime, DockerRuntime};
use crate::store::{ImageFilter, Reconciliation, Store};
use crate::trigger::{self, Trigger};
use crate::types::Image;
use crate::watcher::{Shared, Watcher};

pub struct Context {
    store: Arc<Store>,
    bus: Arc<EventBus>,
    registries: Registries,
    triggers: Vec<Arc<dyn Trigger>>,
    watchers: Vec<Arc<Watcher>>,
    handles: Vec<JoinHandle<()>>,
}

impl Context {
    /// Open the store and build every component from `config`, connecting
    /// docker watchers to their daemon.
    pub async fn init(config: &Config) -> Result<Self> {
        let store = Arc::new(Store::open(&config.store).await?);
        Self::build(config, store, |_, watcher| match watcher {
            WatcherConfig::Docker(docker) => DockerRuntime::connect(docker)
                .map(|runtime| Arc::new(runtime) as Arc<dyn ContainerRuntime>)
                .map_err(|e| Error::Configuration(e.to_string())),
        })
    }

    /// Build the context around `store`, asking `connect` for the container
    /// runtime of each watcher.
    ///
    /// Invalid daemon-wide settings fail the whole build.  A watcher whose
    /// own settings are invalid is logged and left out.
    pub fn build<F>(config: &Config, store: Arc<Store>, connect: F) -> Result<Self>
    where
        F: Fn(&str, &WatcherConfig) -> Result<Arc<dyn ContainerRuntime>>,
    {
        let registries = Registries::from_config(&config.registries)?;
        Self::assemble(config, store, registries, connect)
    }

    /// Like [`Context::build`], with registry providers supplied by the
    /// caller instead of the `registries` section.
    pub fn assemble<F>(
        config: &Config,
        store: Arc<Store>,
        registries: Registries,
        connect: F,
    ) -> Result<Self>
    where
        F: Fn(&str, &WatcherConfig) -> Result<Arc<dyn ContainerRuntime>>,
    {
        config.validate()?;
        let bus = Arc::new(EventBus::new());
        let triggers = trigger::register_all(&config.triggers, &bus)?;

        let shared = Shared {
            store: Arc::clone(&store),
            bus: Arc::clone(&bus),
            registries: registries.clone(),
            max_concurrency: config.max_concurrency,
            registry_timeout: Duration::from_secs(config.registry_timeout_secs),
        };

        let mut watchers = Vec::with_capacity(config.watchers.len());
        for (name, watcher_config) in &config.watchers {
            let watcher = connect(name, watcher_config).and_then(|runtime| {
                Watcher::new(name.as_str(), watcher_config.clone(), runtime, shared.clone())
            });
            match watcher {
                Ok(watcher) => watchers.push(Arc::new(watcher)),
                Err(e) => error!("Watcher {} not started: {}", name, e),
            }
        }
        if watchers.is_empty() {
            warn!("No watcher could be initialized");
        }
        info!(
            "Context ready: {} watchers, {} registries, {} triggers",
            watchers.len(),
            registries.len(),
            triggers.len()
        );

        Ok(Self {
            store,
            bus,
            registries,
            triggers,
            watchers,
            handles: Vec::new(),
        })
    }

    /// Start the schedule of every watcher.
    pub fn start(&mut self) {
        for watcher in &self.watchers {
            self.handles.push(watcher.start());
        }
    }

    /// Stop the schedules, along with any cycle in flight, and write the
    /// store back.  Nothing touches the store once this returns.
    pub async fn shutdown(mut self) -> Result<()> {
        for handle in self.handles.drain(..) {
            handle.abort();
            let _ = handle.await;
        }
        self.store.persist().await?;
        info!("Context shut down");
        Ok(())
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn triggers(&self) -> &[Arc<dyn Trigger>] {
        &self.triggers
    }

    pub fn watchers(&self) -> &[Arc<Watcher>] {
        &self.watchers
    }

    pub fn watcher(&self, id: &str) -> Option<&Arc<Watcher>> {
        self.watchers.iter().find(|watcher| watcher.id() == id)
    }

    pub async fn list_images(&self, filter: &ImageFilter) -> Vec<Image> {
        self.store.list(filter).await
    }

    pub async fn get_image(&self, id: &Uuid) -> Option<Image> {
        self.store.get_by_id(id).await
    }

    /// Delete a record; returns it when it existed.
    pub async fn delete_image(&self, id: &Uuid) -> Result<Option<Image>> {
        let deleted = self.store.delete_by_id(id).await;
        if deleted.is_some() {
            self.store.persist().await?;
        }
        Ok(deleted)
    }

    /// Re-watch one stored record now, through the watcher that owns it.
    pub async fn watch_image(&self, id: &Uuid) -> Result<Option<Reconciliation>> {
        let image = match self.store.get_by_id(id).await {
            Some(image) => image,
            None => return Ok(None),
        };
        let watcher = self.watcher(&image.watcher).ok_or_else(|| {
            Error::Configuration(format!(
                "no watcher {} for image {}",
                image.watcher, id
            ))
        })?;
        watcher.watch_image(image).await.map(Some)
    }
}
