//! # Runtime Module
//!
//! Ambient infrastructure shared by the core crates:
//! - **Event bus** (`events`): typed broadcast channel for sync, transfer,
//!   and connectivity lifecycle events
//! - **Logging** (`logging`): `tracing-subscriber` configuration
//! - **Configuration** (`config`): fail-fast builder for core settings

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Result, RuntimeError};
pub use events::{CoreEvent, EventBus, NetworkEvent, SyncEvent, TransferEvent};
pub use logging::{init_logging, LogFormat, LoggingConfig};
