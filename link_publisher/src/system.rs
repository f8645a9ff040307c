//! Link publishing system driven by the host lifecycle.
//!
//! Per tick:
//! 1. Drain presence events so open/close happens on this thread
//! 2. Skip when offline, when no player exists, or when no channel is open
//! 3. Advance the heartbeat and refresh context, identity and pose
//! 4. Encode and write the whole record

use crate::host::{HostSystem, LinkHost};
use crate::snapshot::{PoseSnapshot, RecordEncoder};
use link::config::LinkConfig;
use link_shared_memory::{LinkChannelManager, LinkError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Why a tick did not publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Host is in single-player/offline mode
    SinglePlayer,
    /// No local player entity yet
    NoPlayer,
    /// No channel open
    ChannelClosed,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Record written with this heartbeat value
    Published(u32),
    /// Nothing written
    Skipped(SkipReason),
}

/// Publishing counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishStats {
    /// Ticks received from the host
    pub ticks: u64,
    /// Records written
    pub published: u64,
    /// Ticks skipped for any reason
    pub skipped: u64,
    /// Write or poll failures absorbed
    pub errors: u64,
}

/// Host system that mirrors the local player into the Link record.
pub struct LinkSystem {
    manager: LinkChannelManager,
    snapshot: PoseSnapshot,
    encoder: RecordEncoder,
    stats: PublishStats,
}

impl LinkSystem {
    /// Create a system around an unstarted channel manager.
    pub fn new(manager: LinkChannelManager, name: &str, description: &str) -> Self {
        Self {
            manager,
            snapshot: PoseSnapshot::new(),
            encoder: RecordEncoder::new(name, description),
            stats: PublishStats::default(),
        }
    }

    /// Create a system from the `[link]` configuration section.
    pub fn from_config(config: &LinkConfig) -> Self {
        Self::new(
            LinkChannelManager::from_config(config),
            &config.name,
            &config.description,
        )
    }

    /// Run one tick and report what happened.
    pub fn publish(&mut self, host: &dyn LinkHost) -> TickOutcome {
        self.stats.ticks += 1;

        if let Err(e) = self.manager.poll() {
            self.stats.errors += 1;
            warn!("Presence poll failed: {}", e);
        }

        let outcome = self.try_publish(host);
        if let TickOutcome::Skipped(reason) = outcome {
            self.stats.skipped += 1;
            debug!("Tick skipped: {:?}", reason);
        }
        outcome
    }

    fn try_publish(&mut self, host: &dyn LinkHost) -> TickOutcome {
        if host.is_single_player() {
            return TickOutcome::Skipped(SkipReason::SinglePlayer);
        }
        let Some(pose) = host.player() else {
            return TickOutcome::Skipped(SkipReason::NoPlayer);
        };
        if !self.manager.is_open() {
            return TickOutcome::Skipped(SkipReason::ChannelClosed);
        }

        let tick = self.snapshot.update(host.world_seed(), &pose);
        let record = self.encoder.encode(&self.snapshot);

        match self.manager.write(&record[..]) {
            Ok(true) => {
                self.stats.published += 1;
                TickOutcome::Published(tick)
            }
            Ok(false) => TickOutcome::Skipped(SkipReason::ChannelClosed),
            Err(e) => {
                // The next tick overwrites the record anyway.
                self.stats.errors += 1;
                warn!("Link write failed: {}", e);
                TickOutcome::Skipped(SkipReason::ChannelClosed)
            }
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> &PoseSnapshot {
        &self.snapshot
    }

    /// Channel manager.
    pub fn manager(&self) -> &LinkChannelManager {
        &self.manager
    }

    /// Publishing counters.
    pub fn stats(&self) -> PublishStats {
        self.stats
    }
}

impl HostSystem for LinkSystem {
    type Error = LinkError;

    fn name(&self) -> &'static str {
        "link"
    }

    fn start(&mut self, host: &dyn LinkHost) -> Result<(), LinkError> {
        if host.is_single_player() {
            info!("Single-player session: Link publishing stays idle");
        }
        self.manager.start()
    }

    fn tick(&mut self, host: &dyn LinkHost, _dt: Duration) {
        self.publish(host);
    }

    fn dispose(&mut self) {
        self.manager.stop();
        info!(
            "Link system disposed: {} ticks, {} published, {} skipped, {} errors",
            self.stats.ticks, self.stats.published, self.stats.skipped, self.stats.errors
        );
    }
}

impl std::fmt::Debug for LinkSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkSystem")
            .field("manager", &self.manager)
            .field("ui_tick", &self.snapshot.ui_tick)
            .field("stats", &self.stats)
            .finish()
    }
}
