//! Test support: scratch images backed by unlinked temporary files.

use crate::device::Device;
use crate::format::{FormatOptions, format};
use crate::fs::Superblock;

/// Formats a fresh 64-block, 32-inode scratch image.
pub(crate) fn scratch_image() -> (Device, Superblock) {
    let file = tempfile::tempfile().expect("creating a temporary image");
    let mut dev = Device::new(file);
    let opts = FormatOptions {
        total_blocks: Some(64),
        inode_count: Some(32),
    };
    let sb = format(&mut dev, &opts).expect("formatting the scratch image");
    (dev, sb)
}
