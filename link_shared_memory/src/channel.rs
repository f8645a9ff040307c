//! Shared channel: a writable view of one Link record in shared memory

use crate::error::{LinkError, LinkResult};
use crate::platform::{attach_link_mmap, create_link_mmap};
use link::layout::LINK_SIZE;
use memmap2::MmapMut;
use std::path::{Path, PathBuf};

/// Open memory-mapped view of exactly [`LINK_SIZE`] bytes at offset 0.
pub struct SharedChannel {
    /// Backing resource path
    path: PathBuf,
    /// Memory mapping
    mmap: MmapMut,
}

impl SharedChannel {
    /// Attach to a resource the consumer already created and sized.
    ///
    /// Fails with [`LinkError::NotFound`] if the file vanished and with
    /// [`LinkError::ResourceTooSmall`] if it has not been sized yet.
    pub fn open_existing(path: &Path) -> LinkResult<Self> {
        let mmap = attach_link_mmap(path, LINK_SIZE)?;
        Ok(Self {
            path: path.to_path_buf(),
            mmap,
        })
    }

    /// Create the resource if needed, size it, and map it.
    pub fn create_or_open(path: &Path) -> LinkResult<Self> {
        let mmap = create_link_mmap(path, LINK_SIZE)?;
        Ok(Self {
            path: path.to_path_buf(),
            mmap,
        })
    }

    /// Overwrite the whole record starting at position 0.
    pub fn write(&mut self, record: &[u8]) -> LinkResult<()> {
        if record.len() != LINK_SIZE {
            return Err(LinkError::InvalidSize {
                size: record.len(),
                expected: LINK_SIZE,
            });
        }
        self.mmap[..LINK_SIZE].copy_from_slice(record);
        Ok(())
    }

    /// Current contents of the view.
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..LINK_SIZE]
    }

    /// Backing resource path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mapped size in bytes.
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Always false: a channel never maps an empty view.
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

impl std::fmt::Debug for SharedChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedChannel")
            .field("path", &self.path)
            .field("len", &self.mmap.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_or_open_sizes_resource() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("MumbleLink.test");

        let channel = SharedChannel::create_or_open(&path).unwrap();
        assert_eq!(channel.len(), LINK_SIZE);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), LINK_SIZE as u64);
        assert!(channel.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_open_existing_missing() {
        let dir = tempdir().unwrap();
        let result = SharedChannel::open_existing(&dir.path().join("absent"));
        assert!(matches!(result, Err(LinkError::NotFound { .. })));
    }

    #[test]
    fn test_open_existing_unsized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("MumbleLink.empty");
        std::fs::File::create(&path).unwrap();

        let result = SharedChannel::open_existing(&path);
        assert!(matches!(
            result,
            Err(LinkError::ResourceTooSmall { len: 0, .. })
        ));
    }

    #[test]
    fn test_open_existing_larger_file_maps_record_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("MumbleLink.big");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(LINK_SIZE as u64 * 2).unwrap();

        let channel = SharedChannel::open_existing(&path).unwrap();
        assert_eq!(channel.len(), LINK_SIZE);
    }

    #[test]
    fn test_write_is_visible_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("MumbleLink.rw");
        let mut channel = SharedChannel::create_or_open(&path).unwrap();

        let mut record = vec![0u8; LINK_SIZE];
        record[0] = 2;
        record[LINK_SIZE - 1] = 0xAB;
        channel.write(&record).unwrap();

        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(on_disk[0], 2);
        assert_eq!(on_disk[LINK_SIZE - 1], 0xAB);
    }

    #[test]
    fn test_write_rejects_wrong_size() {
        let dir = tempdir().unwrap();
        let mut channel = SharedChannel::create_or_open(&dir.path().join("MumbleLink.sz")).unwrap();

        let result = channel.write(&[1, 2, 3]);
        assert!(matches!(result, Err(LinkError::InvalidSize { size: 3, .. })));
        assert!(channel.as_bytes().iter().all(|&b| b == 0));
    }
}
