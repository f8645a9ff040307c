//! # Link Shared Memory Channel
//!
//! Lifecycle management for the single shared memory region a positional
//! audio consumer reads the Link record from.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────┐   poll()   ┌──────────────────┐
//! │ PresenceWatcher ├───────────►│                  │   write()   ┌─────────────────┐
//! │ (inotify, dir)  │  Created/  │ LinkChannelMgr   ├────────────►│ SharedChannel   │
//! └─────────────────┘  Deleted   │                  │             │ [LinkedMem, S]  │
//!                                │ PresenceWatched  │             └────────┬────────┘
//!                                │   | AlwaysOpen   │                      │ mmap
//!                                └──────────────────┘             ┌────────▼────────┐
//!                                                                 │ /dev/shm/       │
//!                                                                 │ MumbleLink.<uid>│
//!                                                                 └─────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use link_shared_memory::{LinkChannelManager, LinkResult};
//!
//! # fn main() -> LinkResult<()> {
//! let mut manager = LinkChannelManager::for_host();
//! manager.start()?;
//!
//! let record = vec![0u8; 10_580];
//! loop {
//!     manager.poll()?;
//!     // Ok(false) while the consumer is not running
//!     manager.write(&record[..])?;
//!     std::thread::sleep(std::time::Duration::from_millis(20));
//! }
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! - **LinkChannelManager**: NOT thread-safe; call `poll` and `write` from the
//!   tick thread. Presence events are queued by the kernel until polled.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod error;
pub mod manager;
pub mod platform;
pub mod watcher;

pub use channel::SharedChannel;
pub use error::{LinkError, LinkResult};
pub use manager::{ChannelStats, ChannelStrategy, LinkChannelManager};
pub use watcher::{PresenceEvent, PresenceWatcher};

/// Initialize tracing for tests and embedders without their own subscriber
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
