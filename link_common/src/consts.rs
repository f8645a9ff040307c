//! System-wide constants for the Link workspace.
//!
//! Single source of truth for resource names, default paths and timing.

/// File name prefix of the Link shared memory resource.
///
/// The full name is `MumbleLink.<uid>`, scoped to the current user.
pub const LINK_RESOURCE_PREFIX: &str = "MumbleLink";

/// Directory where the consumer creates its shared memory file on Linux.
pub const DEFAULT_SHM_DIR: &str = "/dev/shm";

/// Host tick interval hint in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 20;

/// Application name written into the record when none is configured.
pub const DEFAULT_APP_NAME: &str = "Vintage Story";

/// Description written into the record when none is configured.
pub const DEFAULT_APP_DESCRIPTION: &str = "Vintage Story positional audio via Link";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/link/link_publisher.toml";

/// Build the user-scoped resource file name, e.g. `MumbleLink.1000`.
pub fn resource_file_name(uid: u32) -> String {
    format!("{LINK_RESOURCE_PREFIX}.{uid}")
}
