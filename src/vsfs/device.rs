//! Block-level access to a filesystem image.

use crate::Result;
use libc::ioctl;
use std::ffi::c_long;
use std::fs::{File, OpenOptions};
use std::io;
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::FileTypeExt;
use std::path::Path;

/// The size of a block in bytes.
pub const BLOCK_SIZE: usize = 4096;

/// A full block image.
pub type Block = [u8; BLOCK_SIZE];

/// ioctl macro: Command.
macro_rules! ioc {
    ($a:expr, $b:expr, $c:expr, $d:expr) => {
        (($a) << 30) | (($b) << 8) | ($c) | (($d) << 16)
    };
}

/// ioctl macro: Read command.
macro_rules! ior {
    ($a:expr, $b:expr, $c:ty) => {
        ioc!(2, $a, $b, std::mem::size_of::<$c>() as c_long)
    };
}

/// ioctl command: Get size of disk in bytes.
const BLKGETSIZE64: c_long = ior!(0x12, 114, u64);

/// An open filesystem image.
///
/// The device owns the underlying file for the duration of a command. There
/// is no caching: every call hits the file, positioned at `n * 4096`, and
/// covers exactly one block.
pub struct Device {
    file: File,
}

impl Device {
    /// Opens the image at `path` for reading and writing.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self { file })
    }

    /// Wraps an already-open image file.
    pub fn new(file: File) -> Self {
        Self { file }
    }

    /// Reads block `n`.
    ///
    /// A short read is an error: it means the image is truncated.
    pub fn read_block(&mut self, n: u32) -> Result<Block> {
        let mut buf = [0; BLOCK_SIZE];
        self.file
            .seek(SeekFrom::Start(n as u64 * BLOCK_SIZE as u64))?;
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Writes the image `buf` at block `n`.
    pub fn write_block(&mut self, n: u32, buf: &Block) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(n as u64 * BLOCK_SIZE as u64))?;
        self.file.write_all(buf)?;
        Ok(())
    }

    /// Forces buffered writes down to the backing target.
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Returns the size of the underlying target in whole blocks.
    pub fn size_in_blocks(&self) -> io::Result<u64> {
        let metadata = self.file.metadata()?;
        let file_type = metadata.file_type();
        if file_type.is_block_device() || file_type.is_char_device() {
            let mut size: u64 = 0;
            let ret = unsafe { ioctl(self.file.as_raw_fd(), BLKGETSIZE64 as _, &mut size) };
            if ret < 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(size / BLOCK_SIZE as u64)
        } else if file_type.is_file() {
            Ok(metadata.len() / BLOCK_SIZE as u64)
        } else {
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_io_roundtrip() {
        let file = tempfile::tempfile().unwrap();
        let mut dev = Device::new(file);

        let image = [0x5a; BLOCK_SIZE];
        dev.write_block(3, &image).unwrap();
        assert_eq!(dev.read_block(3).unwrap()[..], image[..]);
        // blocks below the written one read back as zeros
        assert_eq!(dev.read_block(0).unwrap()[..], [0; BLOCK_SIZE][..]);
    }

    #[test]
    fn short_read_is_an_error() {
        let file = tempfile::tempfile().unwrap();
        let mut dev = Device::new(file);
        assert!(dev.read_block(0).is_err());
    }

    #[test]
    fn size_of_regular_file() {
        let file = tempfile::tempfile().unwrap();
        file.set_len(10 * BLOCK_SIZE as u64 + 5).unwrap();
        let dev = Device::new(file);
        assert_eq!(dev.size_in_blocks().unwrap(), 10);
    }
}
