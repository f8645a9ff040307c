//! Read-only view of a live Link record, for diagnostics.

use crate::error::{PublisherError, PublisherResult};
use link::layout::LinkFrame;
use link_shared_memory::LinkError;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Map the resource read-only and decode the current record.
pub fn read_frame(path: &Path) -> PublisherResult<LinkFrame> {
    let file = File::open(path).map_err(|e| LinkError::from_open(path, e))?;
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(LinkFrame::decode(&mmap)?)
}

/// Render a frame as pretty JSON.
pub fn frame_to_json(frame: &LinkFrame) -> PublisherResult<String> {
    serde_json::to_string_pretty(frame).map_err(PublisherError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use link::layout::{LINK_SIZE, LayoutError};
    use tempfile::tempdir;

    #[test]
    fn test_missing_resource() {
        let dir = tempdir().unwrap();
        let result = read_frame(&dir.path().join("absent"));
        assert!(matches!(
            result,
            Err(PublisherError::Link(LinkError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_short_resource() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short");
        std::fs::write(&path, [0u8; 16]).unwrap();
        assert!(matches!(
            read_frame(&path),
            Err(PublisherError::Layout(LayoutError::BufferTooSmall { actual: 16, .. }))
        ));
    }

    #[test]
    fn test_zeroed_resource_decodes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("zero");
        std::fs::write(&path, vec![0u8; LINK_SIZE]).unwrap();

        let frame = read_frame(&path).unwrap();
        assert_eq!(frame.ui_tick, 0);
        assert!(frame.identity.is_empty());

        let json = frame_to_json(&frame).unwrap();
        assert!(json.contains("\"ui_tick\": 0"));
    }
}
