//! Presence watching for the consumer-created resource.
//!
//! The consumer signals availability by creating its shared memory file and
//! withdraws it by deleting the file. [`PresenceWatcher`] subscribes to the
//! parent directory with a non-blocking inotify descriptor and reports events
//! for the one watched file name. Nothing is delivered asynchronously: the
//! owner drains events with [`PresenceWatcher::poll`] on its own thread, so
//! state transitions never race with writes.

use crate::error::LinkResult;
use std::path::Path;

/// Presence transition of the watched resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceEvent {
    /// Resource appeared (created or moved in)
    Created,
    /// Resource content or size changed, or the event queue overflowed
    Modified,
    /// Resource disappeared (deleted, moved out, or the watch was dropped)
    Deleted,
}

#[cfg(target_os = "linux")]
pub use inotify_watch::PresenceWatcher;

#[cfg(not(target_os = "linux"))]
pub use unsupported::PresenceWatcher;

#[cfg(target_os = "linux")]
mod inotify_watch {
    use super::*;
    use crate::error::LinkError;
    use nix::errno::Errno;
    use nix::sys::inotify::{AddWatchFlags, InitFlags, Inotify, WatchDescriptor};
    use std::ffi::{OsStr, OsString};
    use std::path::PathBuf;
    use tracing::{debug, warn};

    /// Directory watch scoped to a single file name.
    pub struct PresenceWatcher {
        inotify: Inotify,
        wd: Option<WatchDescriptor>,
        dir: PathBuf,
        file_name: OsString,
    }

    impl PresenceWatcher {
        /// Start watching the parent directory of `path` for events on its file name.
        pub fn watch(path: &Path) -> LinkResult<Self> {
            let (Some(dir), Some(file_name)) = (path.parent(), path.file_name()) else {
                return Err(LinkError::InvalidPath {
                    path: path.to_path_buf(),
                });
            };

            let inotify = Inotify::init(InitFlags::IN_NONBLOCK | InitFlags::IN_CLOEXEC)?;
            let mask = AddWatchFlags::IN_CREATE
                | AddWatchFlags::IN_DELETE
                | AddWatchFlags::IN_MOVED_TO
                | AddWatchFlags::IN_MOVED_FROM
                | AddWatchFlags::IN_MODIFY
                | AddWatchFlags::IN_CLOSE_WRITE;
            let wd = inotify.add_watch(dir, mask)?;

            debug!("Watching {} for {:?}", dir.display(), file_name);

            Ok(Self {
                inotify,
                wd: Some(wd),
                dir: dir.to_path_buf(),
                file_name: file_name.to_os_string(),
            })
        }

        /// Drain all pending events into `out` without blocking.
        ///
        /// Returns the number of events appended.
        pub fn poll(&mut self, out: &mut Vec<PresenceEvent>) -> LinkResult<usize> {
            let before = out.len();
            loop {
                match self.inotify.read_events() {
                    Ok(events) if events.is_empty() => break,
                    Ok(events) => {
                        for event in &events {
                            self.note_watch_state(event.mask);
                            if let Some(presence) =
                                classify(event.mask, event.name.as_deref(), &self.file_name)
                            {
                                out.push(presence);
                            }
                        }
                    }
                    Err(Errno::EAGAIN) => break,
                    Err(Errno::EINTR) => continue,
                    Err(e) => return Err(e.into()),
                }
            }
            Ok(out.len() - before)
        }

        /// Remove the kernel watch. Safe to call more than once.
        pub fn unwatch(&mut self) {
            if let Some(wd) = self.wd.take() {
                // EINVAL when the kernel already dropped the watch.
                let _ = self.inotify.rm_watch(wd);
            }
        }

        fn note_watch_state(&mut self, mask: AddWatchFlags) {
            if mask.contains(AddWatchFlags::IN_Q_OVERFLOW) {
                warn!("Presence event queue overflowed, rechecking resource");
            }
            if mask.contains(AddWatchFlags::IN_IGNORED) {
                warn!("Watch on {} was removed by the kernel", self.dir.display());
                // The kernel already released the descriptor.
                self.wd = None;
            }
        }
    }

    /// Map one raw event to a presence transition for `file_name`.
    ///
    /// Queue overflow and watch removal are not scoped to a name: overflow
    /// forces a recheck of the path, watch removal means the resource is gone.
    fn classify(
        mask: AddWatchFlags,
        name: Option<&OsStr>,
        file_name: &OsStr,
    ) -> Option<PresenceEvent> {
        if mask.contains(AddWatchFlags::IN_Q_OVERFLOW) {
            return Some(PresenceEvent::Modified);
        }
        if mask.contains(AddWatchFlags::IN_IGNORED) {
            return Some(PresenceEvent::Deleted);
        }
        if name != Some(file_name) {
            return None;
        }

        if mask.intersects(AddWatchFlags::IN_CREATE | AddWatchFlags::IN_MOVED_TO) {
            Some(PresenceEvent::Created)
        } else if mask.intersects(AddWatchFlags::IN_DELETE | AddWatchFlags::IN_MOVED_FROM) {
            Some(PresenceEvent::Deleted)
        } else if mask.intersects(AddWatchFlags::IN_MODIFY | AddWatchFlags::IN_CLOSE_WRITE) {
            Some(PresenceEvent::Modified)
        } else {
            None
        }
    }

    impl Drop for PresenceWatcher {
        fn drop(&mut self) {
            self.unwatch();
        }
    }

}

#[cfg(not(target_os = "linux"))]
mod unsupported {
    use super::*;
    use crate::error::LinkError;

    /// Placeholder on platforms without inotify; construction always fails.
    pub struct PresenceWatcher {
        _private: (),
    }

    impl PresenceWatcher {
        /// Always fails with [`LinkError::StrategyUnsupported`].
        pub fn watch(_path: &Path) -> LinkResult<Self> {
            Err(LinkError::StrategyUnsupported {
                strategy: "presence",
            })
        }

        /// Never yields events.
        pub fn poll(&mut self, _out: &mut Vec<PresenceEvent>) -> LinkResult<usize> {
            Ok(0)
        }

        /// No-op.
        pub fn unwatch(&mut self) {}
    }
}
