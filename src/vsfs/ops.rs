//! The journaled user operations: `create` and `install`.
//!
//! `create` stages a mutation in the journal and commits it; `install`
//! replays a committed transaction into the home blocks and truncates the
//! journal. A crash between the two leaves the image either fully
//! pre-transaction (no durable COMMIT) or fully post-transaction (COMMIT
//! durable, replay re-runnable at the next `install`).

use crate::bitmap::Bitmap;
use crate::device::Device;
use crate::fs::{self, Inode, Superblock};
use crate::journal::{
    self, COMMIT_RECORD_SIZE, DATA_RECORD_SIZE, JOURNAL_HEADER_SIZE, JOURNAL_SIZE, Scan,
};
use crate::util::timestamp_secs;
use crate::{Error, Result};

/// Where a created file landed.
pub struct Created {
    /// The inode number allocated to the file.
    pub inum: u32,
    /// The root directory slot taken by the entry.
    pub slot: usize,
}

/// Outcome of a successful [`install`].
pub enum Install {
    /// The journal was clean; nothing to do.
    Empty,
    /// A committed transaction was replayed: this many block images were
    /// written home.
    Applied(usize),
}

/// Stages the creation of an empty regular file named `name` in the root
/// directory, and commits the transaction to the journal.
///
/// Home blocks are untouched until [`install`] replays the journal. All
/// failures are raised before the first journal write, so a failed call
/// leaves the on-disk state unchanged.
///
/// The staging order is fixed: inode bitmap, inode table block, directory
/// block.
pub fn create(dev: &mut Device, sb: &Superblock, name: &str) -> Result<Created> {
    let name = name.as_bytes();
    if name.len() >= fs::NAME_LEN {
        return Err(Error::NameTooLong);
    }

    let inode_bitmap = Bitmap::from_block(dev.read_block(sb.inode_bitmap)?);
    let root = fs::read_inode(dev, sb, fs::ROOT_INODE)?;
    if root.kind != fs::TYPE_DIR {
        return Err(Error::NotADirectory);
    }
    let direct = root.direct;
    let dir_block_no = direct[0];
    let dir_block = dev.read_block(dir_block_no)?;

    if fs::find_dirent_by_name(&dir_block, name).is_some() {
        return Err(Error::AlreadyExists(
            String::from_utf8_lossy(name).into_owned(),
        ));
    }
    let slot = fs::find_free_dirent_slot(&dir_block).ok_or(Error::DirFull)?;
    let inum = inode_bitmap
        .find_first_zero(sb.inode_count as usize)
        .ok_or(Error::NoFreeInode)? as u32;

    // The whole transaction must fit before anything is staged; a partial
    // staging would linger until the next transaction overwrites it.
    if JOURNAL_HEADER_SIZE + 3 * DATA_RECORD_SIZE + COMMIT_RECORD_SIZE > JOURNAL_SIZE {
        return Err(Error::JournalFull);
    }

    let now = timestamp_secs();

    let mut new_bitmap = inode_bitmap.clone();
    new_bitmap.set(inum as usize);

    let inode_block_no = sb.inode_block(inum);
    let mut inode_block = dev.read_block(inode_block_no)?;
    fs::write_inode_into(&mut inode_block, inum, &Inode::new_file(now));

    let mut new_dir = dir_block;
    fs::dirents_mut(&mut new_dir)[slot].fill(inum, name);

    let mut jh = journal::begin(dev, sb)?;
    journal::append_data(dev, sb, &mut jh, sb.inode_bitmap, new_bitmap.as_block())?;
    journal::append_data(dev, sb, &mut jh, inode_block_no, &inode_block)?;
    journal::append_data(dev, sb, &mut jh, dir_block_no, &new_dir)?;
    journal::append_commit(dev, sb, &mut jh)?;

    Ok(Created { inum, slot })
}

/// Replays a committed journal transaction into its home blocks, then
/// truncates the journal.
///
/// Returns [`Install::Empty`] on a clean journal. Staged records without a
/// COMMIT fail with [`Error::IncompleteTransaction`] and leave the journal
/// intact. Running `install` twice against the same committed journal (a
/// crash between replay and truncate) writes the same full-block images
/// again.
pub fn install(dev: &mut Device, sb: &Superblock) -> Result<Install> {
    match journal::scan(dev, sb)? {
        Scan::Clean => Ok(Install::Empty),
        Scan::Incomplete => Err(Error::IncompleteTransaction),
        Scan::Committed(records) => {
            journal::replay(dev, &records)?;
            // the home blocks must be durable before the journal goes away
            dev.sync()?;
            journal::clear(dev, sb)?;
            Ok(Install::Applied(records.len()))
        }
    }
}
