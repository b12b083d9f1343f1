//! Workspace facade crate.
//!
//! Re-exports the offline-first media library core so host applications can
//! depend on `media-library-core` without wiring each member crate
//! individually. The interesting pieces live in the members:
//!
//! - [`bridge_traits`] — contracts for the remote catalog and media storage
//! - [`core_runtime`] — event bus, logging setup, core configuration
//! - [`core_net`] — network state monitor with simulated-offline override
//! - [`core_cache`] — embedded SQLite cache mirroring remote entities
//! - [`core_query`] — offline-aware read/write query cache with persistence
//! - [`core_sync`] — entity synchronizers and the background sync orchestrator
//! - [`core_transfer`] — sequential bulk media download/delete
//!
//! [`bootstrap()`] assembles all of them from one [`CoreConfig`], with the
//! host supplying the bridge implementations.
//!
//! [`CoreConfig`]: core_runtime::config::CoreConfig

pub mod bootstrap;

pub use bootstrap::{bootstrap, BootstrapError, CoreHandle};

pub use bridge_traits;
pub use core_cache;
pub use core_net;
pub use core_query;
pub use core_runtime;
pub use core_sync;
pub use core_transfer;
