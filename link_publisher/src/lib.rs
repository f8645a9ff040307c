//! # Link Publisher Library
//!
//! Mirrors the local player's pose into the Link shared memory record once
//! per host tick, for positional audio in an external voice chat client.
//!
//! # Module Structure
//!
//! - [`host`] - Host integration traits (`LinkHost`, `HostSystem`)
//! - [`snapshot`] - Pose snapshot and record encoding
//! - [`system`] - `LinkSystem`, the per-tick publishing logic
//! - [`runtime`] - Fixed-interval tick driver
//! - [`simulation`] - Simulated host for running without a game engine
//! - [`config`] - Publisher configuration
//! - [`inspect`] - Read-only record decoding for diagnostics
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ tick ┌──────────────────────────────┐ write ┌──────────────────┐
//! │ Host / Tick  ├─────►│ LinkSystem                   ├──────►│ LinkChannelMgr   │
//! │ Runtime      │      │  PoseSnapshot → RecordEncoder│ poll  │ (link_shared_mem)│
//! └──────┬───────┘      └──────────────▲───────────────┘◄──────┴──────────────────┘
//!        │ LinkHost                    │
//!        └─────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod host;
pub mod inspect;
pub mod runtime;
pub mod simulation;
pub mod snapshot;
pub mod system;

// Re-export key types for convenience
pub use crate::config::{PublisherConfig, SimulationConfig};
pub use crate::error::{PublisherError, PublisherResult};
pub use crate::host::{HostSystem, LinkHost, PlayerPose};
pub use crate::runtime::{HostClock, TickRuntime, TickStats};
pub use crate::simulation::SimulatedHost;
pub use crate::snapshot::{PoseSnapshot, RecordEncoder};
pub use crate::system::{LinkSystem, PublishStats, SkipReason, TickOutcome};
