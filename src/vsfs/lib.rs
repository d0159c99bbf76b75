//! Core library of the VSFS utilities.
//!
//! VSFS is a tiny block filesystem living in an image file: a superblock,
//! one bitmap block per resource kind, a fixed inode table, a reserved
//! journal region and a data region. The library is layered bottom-up:
//! [`device`] for raw block I/O, [`bitmap`] for allocation bitmaps, [`fs`]
//! for the typed on-disk structures, [`journal`] for the write-ahead log,
//! [`ops`] for the journaled user operations and [`format`] for laying out
//! fresh images.

use std::env::ArgsOs;
use std::path::PathBuf;
use std::process::exit;
use std::{env, fmt, io};

use thiserror::Error as ThisError;

pub mod bitmap;
pub mod device;
pub mod format;
pub mod fs;
pub mod journal;
pub mod ops;
pub mod prompt;
pub mod util;

#[cfg(test)]
pub(crate) mod testutil;

/// Returns the command's name along with an iterator over the command's arguments.
pub fn args() -> (String, ArgsOs) {
    let mut args = env::args_os();
    let bin = args
        .next()
        .map(PathBuf::from)
        .and_then(|p| {
            p.file_name()
                .and_then(|name| name.to_str())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| {
            error("vsfs", "missing binary name");
        });
    (bin, args)
}

/// Writes an error to stderr, then exits.
pub fn error<M: fmt::Display>(bin: &str, msg: M) -> ! {
    eprintln!("{bin}: error: {msg}");
    exit(1);
}

/// An error reported by the filesystem core.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Block I/O failed or was short.
    ///
    /// A short read or write means the image is truncated or damaged; the
    /// operation is never retried.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// Block 0 does not carry the VSFS magic number.
    #[error("invalid filesystem magic 0x{0:08x}")]
    CorruptImage(u32),
    /// The journal header or a record is malformed.
    ///
    /// The journal is left untouched so that it can be inspected by hand.
    #[error("corrupt journal: {0}")]
    CorruptJournal(String),
    /// The journal holds DATA records without a terminating COMMIT.
    #[error("journal transaction has no commit record")]
    IncompleteTransaction,
    /// A file name of 28 bytes or more.
    #[error("file name too long (at most 27 bytes)")]
    NameTooLong,
    /// The root directory already holds an entry with this name.
    #[error("file '{0}' already exists")]
    AlreadyExists(String),
    /// Every slot of the root directory block is taken.
    #[error("root directory is full")]
    DirFull,
    /// Every inode of the table is allocated.
    #[error("no free inode left")]
    NoFreeInode,
    /// The root inode is not a directory.
    #[error("root inode is not a directory")]
    NotADirectory,
    /// The transaction does not fit in the journal region.
    #[error("journal is full")]
    JournalFull,
    /// Unusable geometry or option value.
    #[error("{0}")]
    InvalidArgument(String),
}

/// The result of an operation on a filesystem image.
pub type Result<T> = std::result::Result<T, Error>;
