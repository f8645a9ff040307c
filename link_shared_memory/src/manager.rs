//! Link channel manager: owns the single shared channel and its discovery.
//!
//! The manager is driven entirely by its owner. [`LinkChannelManager::start`]
//! performs discovery, [`LinkChannelManager::poll`] applies pending presence
//! transitions, [`LinkChannelManager::write`] publishes a record if a channel
//! is open, and [`LinkChannelManager::stop`] (or `Drop`) releases everything.
//! Calling `poll` and `write` from the same thread keeps open/close and
//! writes strictly ordered.

use crate::channel::SharedChannel;
use crate::error::{LinkError, LinkResult};
use crate::platform::{
    always_open_resource_dir, link_resource_path, presence_resource_dir,
    presence_watch_supported,
};
use crate::watcher::{PresenceEvent, PresenceWatcher};
use link::config::{LinkConfig, StrategyChoice};
use link::layout::LINK_SIZE;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How the shared resource is discovered. Selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStrategy {
    /// The consumer creates the resource; follow its creation and deletion.
    PresenceWatched,
    /// Create or open the resource immediately and hold it until stop.
    AlwaysOpen,
}

impl ChannelStrategy {
    /// Strategy for the current operating system.
    pub const fn for_host() -> Self {
        if presence_watch_supported() {
            ChannelStrategy::PresenceWatched
        } else {
            ChannelStrategy::AlwaysOpen
        }
    }

    /// Resolve a configured choice.
    pub const fn resolve(choice: StrategyChoice) -> Self {
        match choice {
            StrategyChoice::Auto => Self::for_host(),
            StrategyChoice::Presence => ChannelStrategy::PresenceWatched,
            StrategyChoice::Always => ChannelStrategy::AlwaysOpen,
        }
    }

    /// Short name for logs.
    pub const fn name(self) -> &'static str {
        match self {
            ChannelStrategy::PresenceWatched => "presence",
            ChannelStrategy::AlwaysOpen => "always",
        }
    }

    /// Platform default directory for this strategy's resource.
    pub fn default_dir(self) -> PathBuf {
        match self {
            ChannelStrategy::PresenceWatched => presence_resource_dir(),
            ChannelStrategy::AlwaysOpen => always_open_resource_dir(),
        }
    }
}

/// Channel lifecycle counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Closed -> open transitions
    pub attach_count: u64,
    /// Open -> closed transitions caused by the resource going away
    pub detach_count: u64,
    /// Open attempts that left the channel closed
    pub failed_opens: u64,
    /// Records written into an open channel
    pub frames_written: u64,
}

/// Owner of the single Link shared channel.
pub struct LinkChannelManager {
    strategy: ChannelStrategy,
    path: PathBuf,
    channel: Option<SharedChannel>,
    watcher: Option<PresenceWatcher>,
    /// Reused event buffer
    events: Vec<PresenceEvent>,
    stats: ChannelStats,
    started: bool,
}

impl LinkChannelManager {
    /// Create a manager for an explicit resource path. Nothing is opened yet.
    pub fn new(strategy: ChannelStrategy, path: PathBuf) -> Self {
        Self {
            strategy,
            path,
            channel: None,
            watcher: None,
            events: Vec::with_capacity(8),
            stats: ChannelStats::default(),
            started: false,
        }
    }

    /// Manager with the platform strategy and the user-scoped default path.
    pub fn for_host() -> Self {
        let strategy = ChannelStrategy::for_host();
        let path = link_resource_path(&strategy.default_dir());
        Self::new(strategy, path)
    }

    /// Manager configured from the `[link]` section.
    pub fn from_config(config: &LinkConfig) -> Self {
        let strategy = ChannelStrategy::resolve(config.strategy);
        let dir = config
            .shm_dir
            .clone()
            .unwrap_or_else(|| strategy.default_dir());
        Self::new(strategy, link_resource_path(&dir))
    }

    /// Begin discovery. Calling `start` on a started manager does nothing.
    ///
    /// # Errors
    ///
    /// - PresenceWatched: the directory watch cannot be established.
    /// - AlwaysOpen: the resource cannot be created or mapped.
    pub fn start(&mut self) -> LinkResult<()> {
        if self.started {
            return Ok(());
        }

        info!(
            "Starting Link channel ({} strategy) at {}",
            self.strategy.name(),
            self.path.display()
        );

        match self.strategy {
            ChannelStrategy::PresenceWatched => {
                // Subscribe before the existence check so a creation in
                // between is delivered on the next poll.
                self.watcher = Some(PresenceWatcher::watch(&self.path)?);
                if self.path.exists() {
                    self.try_attach();
                } else {
                    info!("Waiting for Link resource {}", self.path.display());
                }
            }
            ChannelStrategy::AlwaysOpen => {
                let channel = SharedChannel::create_or_open(&self.path)?;
                self.attach(channel);
            }
        }

        self.started = true;
        Ok(())
    }

    /// Apply all pending presence transitions without blocking.
    ///
    /// Returns the number of presence events processed.
    pub fn poll(&mut self) -> LinkResult<usize> {
        let Some(watcher) = self.watcher.as_mut() else {
            return Ok(0);
        };

        let mut events = std::mem::take(&mut self.events);
        events.clear();
        let result = watcher.poll(&mut events);
        for &event in &events {
            self.apply(event);
        }
        let count = events.len();
        self.events = events;

        result.map(|_| count)
    }

    /// Write one record into the open channel.
    ///
    /// Returns `Ok(false)` without side effects when no channel is open.
    ///
    /// # Errors
    ///
    /// [`LinkError::InvalidSize`] if `record` is not exactly one record long.
    pub fn write(&mut self, record: &[u8]) -> LinkResult<bool> {
        if record.len() != LINK_SIZE {
            return Err(LinkError::InvalidSize {
                size: record.len(),
                expected: LINK_SIZE,
            });
        }
        let Some(channel) = self.channel.as_mut() else {
            return Ok(false);
        };
        channel.write(record)?;
        self.stats.frames_written += 1;
        Ok(true)
    }

    /// Release the watch, the view and the region. Idempotent.
    pub fn stop(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.unwatch();
            debug!("Presence watch released");
        }
        if self.channel.take().is_some() {
            debug!("Link channel released: {}", self.path.display());
        }
        if self.started {
            info!("Link channel stopped");
        }
        self.started = false;
    }

    /// True while a channel is open.
    pub fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    /// True between `start` and `stop`.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Selected strategy.
    pub fn strategy(&self) -> ChannelStrategy {
        self.strategy
    }

    /// Resource path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lifecycle counters.
    pub fn stats(&self) -> ChannelStats {
        self.stats
    }

    fn apply(&mut self, event: PresenceEvent) {
        debug!("Presence event {:?} (open={})", event, self.is_open());
        match event {
            // Events arrive in order, so a Created while open is the start-up
            // race where the existence check already attached.
            PresenceEvent::Created => {
                if self.channel.is_none() {
                    self.try_attach();
                }
            }
            PresenceEvent::Modified => {
                if self.channel.is_none() {
                    self.try_attach();
                } else if !self.path.exists() {
                    self.detach();
                }
            }
            PresenceEvent::Deleted => self.detach(),
        }
    }

    fn try_attach(&mut self) -> bool {
        match SharedChannel::open_existing(&self.path) {
            Ok(channel) => {
                self.attach(channel);
                true
            }
            Err(e) if e.is_transient() => {
                self.stats.failed_opens += 1;
                debug!("Link resource not ready, still watching: {}", e);
                false
            }
            Err(e) => {
                self.stats.failed_opens += 1;
                warn!("Failed to open Link resource, still watching: {}", e);
                false
            }
        }
    }

    fn attach(&mut self, channel: SharedChannel) {
        info!("Link established: {}", channel.path().display());
        self.stats.attach_count += 1;
        self.channel = Some(channel);
    }

    fn detach(&mut self) {
        if self.channel.take().is_some() {
            info!("Link lost: {}", self.path.display());
            self.stats.detach_count += 1;
        }
    }
}

impl Drop for LinkChannelManager {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for LinkChannelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkChannelManager")
            .field("strategy", &self.strategy)
            .field("path", &self.path)
            .field("open", &self.is_open())
            .field("started", &self.started)
            .field("stats", &self.stats)
            .finish()
    }
}
