//! Linux-specific resource naming and memory mapping

use crate::error::{LinkError, LinkResult};
use link::consts::{DEFAULT_SHM_DIR, resource_file_name};
use memmap2::{MmapMut, MmapOptions};
use nix::unistd::getuid;
use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

/// Real user id of the current process.
pub fn current_uid() -> u32 {
    getuid().as_raw()
}

/// Directory the consumer uses for its presence-marked resource.
pub fn presence_resource_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SHM_DIR)
}

/// Directory used when the publisher creates the resource itself.
pub fn always_open_resource_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        PathBuf::from(DEFAULT_SHM_DIR)
    }
    #[cfg(not(target_os = "linux"))]
    {
        std::env::temp_dir()
    }
}

/// Full resource path, e.g. `/dev/shm/MumbleLink.1000`.
pub fn link_resource_path(dir: &Path) -> PathBuf {
    dir.join(resource_file_name(current_uid()))
}

/// Create or open the resource, grow it to `size` if shorter, and map it.
pub fn create_link_mmap(path: &Path, size: usize) -> LinkResult<MmapMut> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .mode(0o600) // Owner read/write only
        .open(path)
        .map_err(|e| LinkError::from_open(path, e))?;

    // Never shrink a region a consumer may already have mapped.
    if file.metadata()?.len() < size as u64 {
        file.set_len(size as u64)?;
    }

    let mmap = unsafe { MmapOptions::new().len(size).map_mut(&file)? };
    Ok(mmap)
}

/// Attach to an existing resource without creating or resizing it.
pub fn attach_link_mmap(path: &Path, size: usize) -> LinkResult<MmapMut> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| LinkError::from_open(path, e))?;

    // Touching pages beyond EOF raises SIGBUS, so wait until the consumer
    // has sized the file.
    let len = file.metadata()?.len();
    if len < size as u64 {
        return Err(LinkError::ResourceTooSmall {
            path: path.to_path_buf(),
            len,
            required: size,
        });
    }

    let mmap = unsafe { MmapOptions::new().len(size).map_mut(&file)? };
    Ok(mmap)
}

/// True when a kernel presence watch (inotify) is available.
pub const fn presence_watch_supported() -> bool {
    cfg!(target_os = "linux")
}
