//! # Network State Monitor
//!
//! Single source of truth for "are we online". Combines the low-level
//! connectivity signal reported by the transport layer with a manual
//! simulated-offline developer override.

pub mod monitor;

pub use monitor::NetworkStateMonitor;
