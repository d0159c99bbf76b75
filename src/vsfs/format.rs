//! Creation of fresh VSFS images.
//!
//! The formatter owns the layout: superblock in block 0, one bitmap block
//! per resource kind, the inode table, the journal region, then the data
//! region. The rest of the crate only ever follows the superblock.

use crate::bitmap::Bitmap;
use crate::device::{BLOCK_SIZE, Device};
use crate::fs::{self, INODES_PER_BLOCK, Inode, Superblock};
use crate::journal;
use crate::util::{reinterpret, timestamp_secs};
use crate::{Error, Result};
use std::io;
use std::mem::size_of;

/// Default number of inodes on a fresh image.
pub const DEFAULT_INODE_COUNT: u32 = 32;

/// Geometry of the filesystem to create.
#[derive(Default)]
pub struct FormatOptions {
    /// Total number of blocks. Derived from the target's size when `None`.
    pub total_blocks: Option<u32>,
    /// Number of inodes. Defaults to [`DEFAULT_INODE_COUNT`].
    pub inode_count: Option<u32>,
}

/// Tells whether a VSFS filesystem is already present on `dev`.
///
/// A target too small to hold a superblock counts as absent.
pub fn is_present(dev: &mut Device) -> Result<bool> {
    let block = match dev.read_block(0) {
        Ok(block) => block,
        Err(Error::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(false),
        Err(e) => return Err(e),
    };
    let mut magic = [0; 4];
    magic.copy_from_slice(&block[..4]);
    Ok(u32::from_le_bytes(magic) == fs::VSFS_MAGIC)
}

/// Writes a fresh filesystem onto `dev`.
///
/// Every block the layout names is rewritten; previous content is lost.
/// Returns the superblock that was written.
pub fn format(dev: &mut Device, opts: &FormatOptions) -> Result<Superblock> {
    let inode_count = opts.inode_count.unwrap_or(DEFAULT_INODE_COUNT);
    if inode_count == 0 || inode_count as usize > BLOCK_SIZE * 8 {
        return Err(Error::InvalidArgument(format!(
            "inode count {inode_count} out of range"
        )));
    }
    let total_blocks = match opts.total_blocks {
        Some(n) => n,
        None => dev.size_in_blocks()?.min(u32::MAX as u64) as u32,
    };

    let inode_blocks = inode_count.div_ceil(INODES_PER_BLOCK);
    let inode_start = 3;
    let journal_block = inode_start + inode_blocks;
    let data_start = journal_block + journal::JOURNAL_BLOCKS;
    if total_blocks <= data_start {
        return Err(Error::InvalidArgument(format!(
            "{total_blocks} blocks leave no room for data (metadata ends at block {data_start})"
        )));
    }

    let now = timestamp_secs();
    let sb = Superblock::new(
        total_blocks,
        inode_count,
        journal_block,
        1,
        2,
        inode_start,
        data_start,
    );

    // Block 0: superblock, padded to a full block
    let mut block = [0; BLOCK_SIZE];
    block[..size_of::<Superblock>()].copy_from_slice(reinterpret(&sb));
    dev.write_block(0, &block)?;

    // Bitmaps: slot 0 of each is taken by the root directory and its block
    let mut bitmap = Bitmap::new();
    bitmap.set(0);
    dev.write_block(sb.inode_bitmap, bitmap.as_block())?;
    dev.write_block(sb.data_bitmap, bitmap.as_block())?;

    // Inode table: root at inode 0, every other slot free
    for i in 0..inode_blocks {
        let mut block = [0; BLOCK_SIZE];
        if i == 0 {
            fs::write_inode_into(&mut block, fs::ROOT_INODE, &Inode::new_dir(data_start, now));
        }
        dev.write_block(inode_start + i, &block)?;
    }

    // Journal region: valid header, no records
    journal::clear(dev, &sb)?;

    // Root directory block: every slot empty
    dev.write_block(data_start, &[0; BLOCK_SIZE])?;

    dev.sync()?;
    Ok(sb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::scratch_image;

    #[test]
    fn fresh_image_invariants() {
        let (mut dev, sb) = scratch_image();
        let (magic, block_size, total_blocks, inode_count) =
            (sb.magic, sb.block_size, sb.total_blocks, sb.inode_count);
        let (journal_block, inode_start, data_start) =
            (sb.journal_block, sb.inode_start, sb.data_start);
        assert_eq!(magic, fs::VSFS_MAGIC);
        assert_eq!(block_size, BLOCK_SIZE as u32);
        assert_eq!(total_blocks, 64);
        assert_eq!(inode_count, 32);
        assert_eq!(inode_start, 3);
        assert_eq!(journal_block, 4);
        assert_eq!(data_start, 8);

        // reading it back goes through the magic check
        let reread = Superblock::read(&mut dev).unwrap();
        let reread_total = reread.total_blocks;
        assert_eq!(reread_total, 64);

        // root inode and its directory block are allocated, nothing else
        let inode_bitmap = Bitmap::from_block(dev.read_block(sb.inode_bitmap).unwrap());
        assert!(inode_bitmap.test(0));
        assert_eq!(inode_bitmap.count_set(inode_count as usize), 1);
        assert_eq!(inode_bitmap.find_first_zero(inode_count as usize), Some(1));
        let data_bitmap = Bitmap::from_block(dev.read_block(sb.data_bitmap).unwrap());
        assert!(data_bitmap.test(0));
        assert_eq!(data_bitmap.count_set((total_blocks - data_start) as usize), 1);

        let root = fs::read_inode(&mut dev, &sb, fs::ROOT_INODE).unwrap();
        let (kind, links, direct) = (root.kind, root.links, root.direct);
        assert_eq!(kind, fs::TYPE_DIR);
        assert_eq!(links, 1);
        assert_eq!(direct[0], data_start);

        // root directory lists no entries
        let dir = dev.read_block(data_start).unwrap();
        assert_eq!(fs::find_free_dirent_slot(&dir), Some(0));
        assert!(fs::dirents(&dir).iter().all(|e| e.inode == 0));

        // the journal is clean
        assert!(matches!(
            journal::scan(&mut dev, &sb).unwrap(),
            journal::Scan::Clean
        ));
    }

    #[test]
    fn is_present_detection() {
        let file = tempfile::tempfile().unwrap();
        let mut dev = Device::new(file);
        // empty target: too small for a superblock
        assert!(!is_present(&mut dev).unwrap());
        dev.write_block(0, &[0; BLOCK_SIZE]).unwrap();
        assert!(!is_present(&mut dev).unwrap());

        let (mut dev, _) = scratch_image();
        assert!(is_present(&mut dev).unwrap());
    }

    #[test]
    fn geometry_is_validated() {
        let file = tempfile::tempfile().unwrap();
        let mut dev = Device::new(file);
        let opts = FormatOptions {
            // metadata alone ends at block 8
            total_blocks: Some(8),
            inode_count: Some(32),
        };
        assert!(matches!(
            format(&mut dev, &opts),
            Err(Error::InvalidArgument(_))
        ));

        let opts = FormatOptions {
            total_blocks: Some(64),
            inode_count: Some(0),
        };
        assert!(matches!(
            format(&mut dev, &opts),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn size_is_derived_from_the_target() {
        let file = tempfile::tempfile().unwrap();
        file.set_len(64 * BLOCK_SIZE as u64).unwrap();
        let mut dev = Device::new(file);
        let opts = FormatOptions {
            total_blocks: None,
            inode_count: Some(32),
        };
        let sb = format(&mut dev, &opts).unwrap();
        let total_blocks = sb.total_blocks;
        assert_eq!(total_blocks, 64);
    }

    #[test]
    fn larger_inode_tables_shift_the_layout() {
        let file = tempfile::tempfile().unwrap();
        let mut dev = Device::new(file);
        let opts = FormatOptions {
            total_blocks: Some(128),
            inode_count: Some(64),
        };
        let sb = format(&mut dev, &opts).unwrap();
        let (journal_block, data_start) = (sb.journal_block, sb.data_start);
        assert_eq!(journal_block, 5);
        assert_eq!(data_start, 9);
        // inode 63 lives in the second table block
        assert_eq!(sb.inode_block(63), 4);
    }
}
