//! Watch running containers for newer image tags.
//!
//! Each configured watcher periodically lists the containers of its
//! runtime, resolves the newest candidate tag of every image against the
//! image's registry, records the outcome in the [`store::Store`] and
//! publishes events on the [`event::EventBus`] for the triggers.

pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod reference;
pub mod registry;
pub mod runtime;
pub mod store;
pub mod tags;
pub mod trigger;
pub mod types;
pub mod watcher;

#[cfg(test)]
mod testing;

pub use context::Context;
pub use error::{Error, Result};
