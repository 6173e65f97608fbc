//! Watch cycle of one watcher.
//!
//! A cycle lists the running containers, maps each one to an [`Image`],
//! deduplicates images by identity tuple, resolves a candidate tag for each
//! unique image against its registry, reconciles the outcome with the
//! store and finally prunes the records of images this watcher no longer
//! sees.
//!
//! Per-item failures never abort a cycle: containers that cannot be mapped
//! are skipped, and a failing registry call becomes an error-bearing
//! result.  Registry calls run with a concurrency cap and a per-call
//! timeout.  Only a failure to list containers ends the cycle early, and
//! in that case nothing is pruned.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use cron::Schedule;
use futures_util::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use crate::config::{parse_schedule, WatcherConfig};
use crate::error::{Error, Result};
use crate::event::EventBus;
use crate::reference::ImageReference;
use crate::registry::{RegistryError, Registries};
use crate::runtime::{ContainerRuntime, ContainerSpec};
use crate::store::{Reconciliation, Store};
use crate::tags::{candidates, coerce, sort_lexical_desc, TagPolicy};
use crate::types::{Image, ImageKey, ImageResult};

/// Opt-in label, required when the watcher does not watch by default.
pub const LABEL_WATCH: &str = "tagwatch.watch";
/// Regex a tag must match to be a candidate.
pub const LABEL_TAG_INCLUDE: &str = "tagwatch.tag.include";
/// Regex excluding tags from the candidates.
pub const LABEL_TAG_EXCLUDE: &str = "tagwatch.tag.exclude";

/// Collaborators shared by every watcher.
#[derive(Clone)]
pub struct Shared {
    pub store: Arc<Store>,
    pub bus: Arc<EventBus>,
    pub registries: Registries,
    pub max_concurrency: usize,
    pub registry_timeout: Duration,
}

/// Counters of one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// The cycle did not run because the previous one was still running.
    pub skipped: bool,
    pub containers: usize,
    pub watched: usize,
    pub new_versions: usize,
    pub failures: usize,
    pub pruned: usize,
}

pub struct Watcher {
    id: String,
    config: WatcherConfig,
    schedule: Schedule,
    runtime: Arc<dyn ContainerRuntime>,
    shared: Shared,
    running: Mutex<()>,
    watched: AtomicUsize,
}

impl Watcher {
    /// Fails with a configuration error when the watcher settings are
    /// invalid; such a watcher never starts.
    pub fn new(
        id: impl Into<String>,
        config: WatcherConfig,
        runtime: Arc<dyn ContainerRuntime>,
        shared: Shared,
    ) -> Result<Self> {
        let id = id.into();
        config
            .validate()
            .map_err(|e| Error::Configuration(format!("watcher {}: {}", id, e)))?;
        let schedule = parse_schedule(config.cron())?;
        Ok(Self {
            id,
            config,
            schedule,
            runtime,
            shared,
            running: Mutex::new(()),
            watched: AtomicUsize::new(0),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of unique images watched by the last cycle.
    pub fn watched_images(&self) -> usize {
        self.watched.load(Ordering::Relaxed)
    }

    /// Run a cycle now, then on every tick of the schedule.
    ///
    /// Cycles run inside the returned task, so aborting it also stops a
    /// cycle in flight.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let watcher = Arc::clone(self);
        tokio::spawn(async move {
            info!("Schedule watcher {} ({})", watcher.id, watcher.config.cron());
            loop {
                if let Err(e) = watcher.watch().await {
                    error!("Watcher {}: cycle failed: {}", watcher.id, e);
                }
                let next = match watcher.schedule.upcoming(Utc).next() {
                    Some(next) => next,
                    None => {
                        warn!("Watcher {}: schedule has no upcoming tick", watcher.id);
                        break;
                    }
                };
                let wait = (next - Utc::now()).to_std().unwrap_or_default();
                sleep(wait).await;
            }
        })
    }

    /// Run one watch cycle.
    pub async fn watch(&self) -> Result<CycleReport> {
        let _cycle = match self.running.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!(
                    "Watcher {}: previous cycle still running, skip this one",
                    self.id
                );
                return Ok(CycleReport {
                    skipped: true,
                    ..Default::default()
                });
            }
        };

        let containers = self
            .runtime
            .list()
            .await
            .map_err(|e| Error::Resolution(format!("cannot list containers: {}", e)))?;
        let watch_by_default = self.config.watch_by_default();
        let containers: Vec<ContainerSpec> = containers
            .into_iter()
            .filter(|container| watch_by_default || is_opted_in(container))
            .collect();

        let limit = self.shared.max_concurrency.max(1);
        let mapped: Vec<(String, Result<Image>)> = stream::iter(containers.iter().cloned())
            .map(|container| async move {
                let image = self.map_container(&container).await;
                (container.name, image)
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        // Distinct containers may run the same image.
        let mut images: BTreeMap<ImageKey, Image> = BTreeMap::new();
        for (container, mapped) in mapped {
            match mapped {
                Ok(image) => {
                    images.insert(image.key(), image);
                }
                Err(e) => warn!("Watcher {}: skip container {}: {}", self.id, container, e),
            }
        }
        let discovered: HashSet<ImageKey> = images.keys().cloned().collect();
        self.watched.store(images.len(), Ordering::Relaxed);
        debug!(
            "Watcher {}: {} containers, {} images to watch",
            self.id,
            containers.len(),
            images.len()
        );

        let mut report = CycleReport {
            containers: containers.len(),
            watched: images.len(),
            ..Default::default()
        };
        let outcomes: Vec<Result<Reconciliation>> = stream::iter(images.into_values())
            .map(|image| self.watch_image(image))
            .buffer_unordered(limit)
            .collect()
            .await;
        for outcome in outcomes {
            match outcome {
                Ok(outcome) => {
                    if outcome.new_version {
                        report.new_versions += 1;
                    }
                    if outcome.image.result.as_ref().map_or(false, |r| r.error.is_some()) {
                        report.failures += 1;
                    }
                }
                Err(e) => {
                    error!("Watcher {}: {}", self.id, e);
                    report.failures += 1;
                }
            }
        }

        let pruned = self.shared.store.prune(&self.id, &discovered).await;
        for image in &pruned {
            info!("Watcher {}: prune {}", self.id, image.reference());
        }
        report.pruned = pruned.len();

        if let Err(e) = self.shared.store.persist().await {
            error!("Watcher {}: cannot persist store: {}", self.id, e);
        }

        info!(
            "Watcher {}: {} images watched, {} new versions, {} failures, {} pruned",
            self.id, report.watched, report.new_versions, report.failures, report.pruned
        );
        Ok(report)
    }

    /// Resolve one image, record the result and emit the events.
    ///
    /// Also used to re-watch a stored image on demand.
    pub async fn watch_image(&self, mut image: Image) -> Result<Reconciliation> {
        debug!("Check {}", image.reference());
        image.result = self.find_new_version(&image).await?;
        self.shared.bus.emit_image_result(&image);

        let outcome = self.shared.store.reconcile(image).await?;
        if outcome.new_version {
            debug!("New image version found ({})", outcome.image.reference());
            self.shared.bus.emit_image_new_version(&outcome.image);
        } else {
            debug!(
                "Result already processed => no need to trigger ({})",
                outcome.image.reference()
            );
        }
        Ok(outcome)
    }

    async fn find_new_version(&self, image: &Image) -> Result<Option<ImageResult>> {
        let policy = TagPolicy::from_image(image)?;
        let provider = self
            .shared
            .registries
            .get(&image.registry)
            .ok_or_else(|| Error::ProviderUnavailable(image.reference()))?;

        let limit = self.shared.registry_timeout;
        let tags = match timeout(limit, provider.get_tags(image)).await {
            Ok(Ok(tags)) => tags,
            Ok(Err(e)) => {
                debug!("Tag listing failed for {}: {}", image.reference(), e);
                return Ok(Some(ImageResult::failed(e.to_string())));
            }
            Err(_) => {
                return Ok(Some(ImageResult::failed(
                    RegistryError::Timeout(limit).to_string(),
                )))
            }
        };
        Ok(resolve(&policy, image.is_semver, tags))
    }

    async fn map_container(&self, container: &ContainerSpec) -> Result<Image> {
        let details = match self.runtime.inspect_image(&container.image).await {
            Ok(details) => Some(details),
            Err(e) => {
                warn!(
                    "Watcher {}: cannot inspect image {}: {}",
                    self.id, container.image, e
                );
                None
            }
        };

        // A bare digest says nothing about the repository; fall back to the
        // first repo tag of the image.
        let reference = if ImageReference::is_digest(&container.image) {
            details
                .as_ref()
                .and_then(|d| d.repo_tags.first().cloned())
                .ok_or_else(|| Error::UnresolvableImageReference(container.image.clone()))?
        } else {
            container.image.clone()
        };
        let parsed = ImageReference::parse(&reference);
        let version = parsed.tag_or_latest();

        let mut image = Image::new(
            &self.id,
            parsed.domain.unwrap_or_default(),
            parsed.path,
            version,
        );
        image.is_semver = coerce(&image.version).is_some();
        image.include_tags = container.label(LABEL_TAG_INCLUDE).map(str::to_string);
        image.exclude_tags = container.label(LABEL_TAG_EXCLUDE).map(str::to_string);
        TagPolicy::from_image(&image)?;

        if let Some(details) = details {
            image.version_date = details.created;
            image.architecture = details.architecture;
            image.os = details.os;
            image.size = details.size;
        }

        let provider = self
            .shared
            .registries
            .find_for(&image)
            .ok_or_else(|| Error::ProviderUnavailable(image.reference()))?;
        Ok(provider.normalize_image(image))
    }
}

fn is_opted_in(container: &ContainerSpec) -> bool {
    container
        .label(LABEL_WATCH)
        .map_or(false, |value| !value.eq_ignore_ascii_case("false"))
}

/// Pick the best candidate of a tag universe as the new version.
///
/// Non-semver universes are presented to the resolver sorted descending
/// lexically.
pub fn resolve(policy: &TagPolicy, is_semver: bool, mut tags: Vec<String>) -> Option<ImageResult> {
    if !is_semver {
        sort_lexical_desc(&mut tags);
    }
    candidates(policy, &tags)
        .into_iter()
        .next()
        .map(ImageResult::found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DockerWatcherConfig;
    use crate::registry::RegistryProvider;
    use crate::runtime::ImageDetails;
    use crate::store::ImageFilter;
    use crate::testing::{container, labelled, FakeRegistry, FakeRuntime};

    struct Harness {
        store: Arc<Store>,
        bus: Arc<EventBus>,
        results: Arc<AtomicUsize>,
        new_versions: Arc<AtomicUsize>,
    }

    impl Harness {
        fn new() -> Self {
            let bus = Arc::new(EventBus::new());
            let results = Arc::new(AtomicUsize::new(0));
            let new_versions = Arc::new(AtomicUsize::new(0));
            let r = Arc::clone(&results);
            bus.on_image_result(move |_| {
                r.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            let n = Arc::clone(&new_versions);
            bus.on_image_new_version(move |_| {
                n.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            Self {
                store: Arc::new(Store::in_memory()),
                bus,
                results,
                new_versions,
            }
        }

        fn watcher(
            &self,
            id: &str,
            runtime: Arc<FakeRuntime>,
            registry: Arc<FakeRegistry>,
            watch_by_default: bool,
        ) -> Watcher {
            let config = WatcherConfig::Docker(DockerWatcherConfig {
                watchbydefault: watch_by_default,
                ..Default::default()
            });
            let shared = Shared {
                store: Arc::clone(&self.store),
                bus: Arc::clone(&self.bus),
                registries: Registries::new(vec![registry as Arc<dyn RegistryProvider>]),
                max_concurrency: 4,
                registry_timeout: Duration::from_millis(200),
            };
            Watcher::new(id, config, runtime, shared).unwrap()
        }

        fn results(&self) -> usize {
            self.results.load(Ordering::SeqCst)
        }

        fn new_versions(&self) -> usize {
            self.new_versions.load(Ordering::SeqCst)
        }
    }

    fn registry() -> Arc<FakeRegistry> {
        Arc::new(FakeRegistry::with(vec![
            ("app", vec!["1.1.0", "1.2.0", "1.3.0", "nightly"]),
            ("db", vec!["v9", "v10", "v11", "v12"]),
            ("tool", vec!["beta", "edge", "latest"]),
        ]))
    }

    async fn stored(harness: &Harness, name: &str) -> Option<Image> {
        harness
            .store
            .list(&ImageFilter {
                image: Some(name.into()),
                ..Default::default()
            })
            .await
            .into_iter()
            .next()
    }

    #[test]
    fn resolve_sorts_lexical_universe() {
        let policy = TagPolicy::new("2024-01", None, None, false).unwrap();
        let tags = vec![
            "2023-12".to_string(),
            "2024-03".into(),
            "2024-01".into(),
            "2024-02".into(),
        ];
        assert_eq!(resolve(&policy, false, tags), Some(ImageResult::found("2024-03")));
        assert_eq!(resolve(&policy, false, vec!["2023-12".into()]), None);
    }

    #[tokio::test]
    async fn first_cycle_records_images_and_fires_for_new_versions() {
        let harness = Harness::new();
        let runtime = Arc::new(FakeRuntime::with(vec![
            container("web-1", "fake.io/app:1.2.0"),
            container("web-2", "fake.io/app:1.2.0"),
            container("db", "fake.io/db:v10"),
            container("tool", "fake.io/tool:latest"),
        ]));
        let watcher = harness.watcher("local", runtime, registry(), true);

        let report = watcher.watch().await.unwrap();

        assert_eq!(report.containers, 4);
        assert_eq!(report.watched, 3);
        assert_eq!(report.new_versions, 2);
        assert_eq!(watcher.watched_images(), 3);
        assert_eq!(harness.results(), 3);
        assert_eq!(harness.new_versions(), 2);
        assert_eq!(harness.store.len().await, 3);

        let app = stored(&harness, "app").await.unwrap();
        assert_eq!(app.result, Some(ImageResult::found("1.3.0")));
        assert!(app.is_semver);
        assert_eq!(app.architecture.as_deref(), Some("amd64"));
        let db = stored(&harness, "db").await.unwrap();
        assert_eq!(db.result, Some(ImageResult::found("v12")));
        let tool = stored(&harness, "tool").await.unwrap();
        assert_eq!(tool.result, None);
    }

    #[tokio::test]
    async fn unchanged_second_cycle_fires_nothing_new() {
        let harness = Harness::new();
        let runtime = Arc::new(FakeRuntime::with(vec![container("web", "fake.io/app:1.2.0")]));
        let watcher = harness.watcher("local", runtime, registry(), true);

        watcher.watch().await.unwrap();
        let first = stored(&harness, "app").await.unwrap();
        let report = watcher.watch().await.unwrap();
        let second = stored(&harness, "app").await.unwrap();

        assert_eq!(report.new_versions, 0);
        assert_eq!(harness.results(), 2);
        assert_eq!(harness.new_versions(), 1);
        assert_eq!(harness.store.len().await, 1);
        assert_eq!(second.id, first.id);
        assert!(second.updated >= first.updated);
    }

    #[tokio::test]
    async fn registry_failure_is_isolated_to_its_image() {
        let harness = Harness::new();
        let registry = registry();
        registry.fail("db", "denied");
        let runtime = Arc::new(FakeRuntime::with(vec![
            container("web", "fake.io/app:1.2.0"),
            container("db", "fake.io/db:v10"),
        ]));
        let watcher = harness.watcher("local", runtime, registry, true);

        let report = watcher.watch().await.unwrap();

        assert_eq!(report.failures, 1);
        assert_eq!(report.new_versions, 1);
        assert_eq!(harness.results(), 2);
        let db = stored(&harness, "db").await.unwrap();
        assert_eq!(
            db.result,
            Some(ImageResult::failed("Failed to authenticate with registry: denied"))
        );
        assert!(stored(&harness, "app").await.unwrap().result.unwrap().new_version.is_some());
    }

    #[tokio::test]
    async fn slow_registry_call_times_out() {
        let harness = Harness::new();
        let registry = Arc::new(FakeRegistry {
            delay: Some(Duration::from_secs(10)),
            ..FakeRegistry::with(vec![("app", vec!["1.3.0"])])
        });
        let runtime = Arc::new(FakeRuntime::with(vec![container("web", "fake.io/app:1.2.0")]));
        let watcher = harness.watcher("local", runtime, registry, true);

        let report = watcher.watch().await.unwrap();

        assert_eq!(report.failures, 1);
        let app = stored(&harness, "app").await.unwrap();
        let error = app.result.unwrap().error.unwrap();
        assert!(error.contains("timed out"), "{}", error);
    }

    #[tokio::test]
    async fn vanished_images_of_this_watcher_are_pruned() {
        let harness = Harness::new();
        let other = harness
            .store
            .insert(Image::new("remote", "fake.io", "db", "v10"))
            .await
            .unwrap();
        let runtime = Arc::new(FakeRuntime::with(vec![
            container("web", "fake.io/app:1.2.0"),
            container("db", "fake.io/db:v10"),
        ]));
        let watcher = harness.watcher("local", Arc::clone(&runtime), registry(), true);
        watcher.watch().await.unwrap();
        assert_eq!(harness.store.len().await, 3);

        runtime.set(vec![container("web", "fake.io/app:1.2.0")]);
        let report = watcher.watch().await.unwrap();

        assert_eq!(report.pruned, 1);
        let local = harness.store.list(&ImageFilter::by_watcher("local")).await;
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].image, "app");
        assert!(harness.store.get_by_id(&other.id.unwrap()).await.is_some());
    }

    #[tokio::test]
    async fn failed_listing_prunes_nothing() {
        let harness = Harness::new();
        harness
            .store
            .insert(Image::new("local", "fake.io", "app", "1.2.0"))
            .await
            .unwrap();
        let runtime = Arc::new(FakeRuntime {
            unavailable: true,
            ..Default::default()
        });
        let watcher = harness.watcher("local", runtime, registry(), true);

        assert!(matches!(watcher.watch().await, Err(Error::Resolution(_))));
        assert_eq!(harness.store.len().await, 1);
    }

    #[tokio::test]
    async fn digest_reference_uses_first_repo_tag_or_is_skipped() {
        let harness = Harness::new();
        let mut runtime = FakeRuntime::with(vec![
            container("tagged", "sha256:aaaa"),
            container("orphan", "sha256:bbbb"),
        ]);
        runtime.images.insert(
            "sha256:aaaa".into(),
            ImageDetails {
                repo_tags: vec!["fake.io/app:1.2.0".into()],
                ..Default::default()
            },
        );
        runtime
            .images
            .insert("sha256:bbbb".into(), ImageDetails::default());
        let watcher = harness.watcher("local", Arc::new(runtime), registry(), true);

        let report = watcher.watch().await.unwrap();

        assert_eq!(report.containers, 2);
        assert_eq!(report.watched, 1);
        let app = stored(&harness, "app").await.unwrap();
        assert_eq!(app.version, "1.2.0");
    }

    #[tokio::test]
    async fn only_opted_in_containers_are_watched_when_not_by_default() {
        let harness = Harness::new();
        let runtime = Arc::new(FakeRuntime::with(vec![
            labelled("web", "fake.io/app:1.2.0", &[("TagWatch.Watch", "true")]),
            container("db", "fake.io/db:v10"),
            labelled("tool", "fake.io/tool:latest", &[("tagwatch.watch", "false")]),
        ]));
        let watcher = harness.watcher("local", runtime, registry(), false);

        let report = watcher.watch().await.unwrap();

        assert_eq!(report.containers, 1);
        assert_eq!(report.watched, 1);
        assert!(stored(&harness, "app").await.is_some());
    }

    #[tokio::test]
    async fn tag_labels_are_applied_and_invalid_ones_skip_the_container() {
        let harness = Harness::new();
        let registry = registry();
        registry.set("api", &["1.0.0", "1.1.0", "2.0.0"]);
        let runtime = Arc::new(FakeRuntime::with(vec![
            labelled("api", "fake.io/api:1.0.0", &[(LABEL_TAG_INCLUDE, "^1\\.")]),
            labelled("web", "fake.io/app:1.2.0", &[(LABEL_TAG_EXCLUDE, "(")]),
            container("elsewhere", "ghcr.io/owner/app:1.0.0"),
        ]));
        let watcher = harness.watcher("local", runtime, registry, true);

        let report = watcher.watch().await.unwrap();

        assert_eq!(report.watched, 1);
        let api = stored(&harness, "api").await.unwrap();
        assert_eq!(api.include_tags.as_deref(), Some("^1\\."));
        assert_eq!(api.result, Some(ImageResult::found("1.1.0")));
        assert!(stored(&harness, "app").await.is_none());
    }

    #[tokio::test]
    async fn overlapping_cycle_is_skipped() {
        let harness = Harness::new();
        let runtime = Arc::new(FakeRuntime::with(vec![container("web", "fake.io/app:1.2.0")]));
        let watcher = harness.watcher("local", runtime, registry(), true);

        let _running = watcher.running.try_lock().unwrap();
        let report = watcher.watch().await.unwrap();

        assert!(report.skipped);
        assert!(harness.store.is_empty().await);
    }

    #[tokio::test]
    async fn stored_image_can_be_watched_on_demand() {
        let harness = Harness::new();
        let registry = registry();
        let runtime = Arc::new(FakeRuntime::with(vec![container("web", "fake.io/app:1.2.0")]));
        let watcher = harness.watcher("local", runtime, Arc::clone(&registry), true);
        watcher.watch().await.unwrap();

        registry.set("app", &["1.2.0", "1.3.0", "1.4.0"]);
        let app = stored(&harness, "app").await.unwrap();
        let outcome = watcher.watch_image(app.clone()).await.unwrap();

        assert!(outcome.new_version);
        assert_eq!(outcome.image.id, app.id);
        assert_eq!(outcome.image.result, Some(ImageResult::found("1.4.0")));
        assert_eq!(harness.new_versions(), 2);
    }

    #[tokio::test]
    async fn start_runs_a_first_cycle_immediately() {
        let harness = Harness::new();
        let runtime = Arc::new(FakeRuntime::with(vec![container("web", "fake.io/app:1.2.0")]));
        let watcher = Arc::new(harness.watcher("local", runtime, registry(), true));

        let handle = watcher.start();
        for _ in 0..100 {
            if !harness.store.is_empty().await {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert_eq!(harness.store.len().await, 1);
    }

    #[tokio::test]
    async fn registry_calls_respect_the_concurrency_cap() {
        let harness = Harness::new();
        let registry = Arc::new(FakeRegistry {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let containers = (0..12)
            .map(|i| container(&format!("svc-{}", i), &format!("fake.io/svc-{}:1.0.0", i)))
            .collect();
        let runtime = Arc::new(FakeRuntime::with(containers));
        let watcher = harness.watcher("local", runtime, Arc::clone(&registry), true);

        let report = watcher.watch().await.unwrap();

        assert_eq!(report.watched, 12);
        assert_eq!(report.failures, 0);
        let peak = registry.peak.load(Ordering::SeqCst);
        assert!(peak > 1, "calls never overlapped");
        assert!(peak <= 4, "{} calls in flight", peak);
    }

    #[test]
    fn invalid_cron_prevents_the_watcher_from_starting() {
        let harness = Harness::new();
        let config = WatcherConfig::Docker(DockerWatcherConfig {
            cron: "whenever".into(),
            ..Default::default()
        });
        let shared = Shared {
            store: Arc::clone(&harness.store),
            bus: Arc::clone(&harness.bus),
            registries: Registries::default(),
            max_concurrency: 1,
            registry_timeout: Duration::from_secs(1),
        };
        let result = Watcher::new("local", config, Arc::new(FakeRuntime::default()), shared);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
