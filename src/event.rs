//! In-process event bus between the watchers and the triggers.
//!
//! Two topics exist: `image result`, emitted after every resolution
//! attempt, and `image new version`, emitted when the store decides that a
//! result is news.  Delivery is synchronous and fans out to the listeners
//! registered at the time of the emit; nothing is buffered or replayed.
//! Each listener runs isolated: an error or a panic is logged and the next
//! listener still receives the event.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use log::error;

use crate::types::Image;

pub type Listener = Arc<dyn Fn(&Image) -> anyhow::Result<()> + Send + Sync>;

struct Topic {
    name: &'static str,
    listeners: RwLock<Vec<Listener>>,
}

impl Topic {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            listeners: RwLock::new(Vec::new()),
        }
    }

    fn register(&self, listener: Listener) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Returns how many listeners handled the event without failing.
    fn emit(&self, image: &Image) -> usize {
        // Snapshot so a listener may register others without deadlocking.
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut delivered = 0;
        for listener in listeners {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(image))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => error!(
                    "Listener of {} failed for {}: {}",
                    self.name,
                    image.reference(),
                    e
                ),
                Err(_) => error!(
                    "Listener of {} panicked for {}",
                    self.name,
                    image.reference()
                ),
            }
        }
        delivered
    }

    fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

pub struct EventBus {
    image_result: Topic,
    image_new_version: Topic,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            image_result: Topic::new("image result"),
            image_new_version: Topic::new("image new version"),
        }
    }

    pub fn on_image_result<F>(&self, listener: F)
    where
        F: Fn(&Image) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.image_result.register(Arc::new(listener));
    }

    pub fn on_image_new_version<F>(&self, listener: F)
    where
        F: Fn(&Image) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.image_new_version.register(Arc::new(listener));
    }

    pub fn emit_image_result(&self, image: &Image) -> usize {
        self.image_result.emit(image)
    }

    pub fn emit_image_new_version(&self, image: &Image) -> usize {
        self.image_new_version.emit(image)
    }

    pub fn listener_count(&self) -> usize {
        self.image_result.len() + self.image_new_version.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
