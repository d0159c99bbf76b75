//! The `info` command prints a read-only report on an image.

use std::env::ArgsOs;
use std::path::PathBuf;
use vsfs::bitmap::Bitmap;
use vsfs::device::Device;
use vsfs::error;
use vsfs::fs::{self, Superblock};

/// Structure storing command line arguments.
#[derive(Default)]
struct Args {
    /// If true, print command line help.
    help: bool,
    /// The path to the image.
    image: Option<PathBuf>,
}

fn parse_args(args: ArgsOs) -> Args {
    let mut res: Args = Default::default();
    for arg in args {
        match arg.to_str() {
            Some("-h" | "--help") => res.help = true,
            _ => res.image = Some(PathBuf::from(arg)),
        }
    }
    res
}

fn print_help() {
    println!("Usage:");
    println!(" vsfs info <image>");
    println!();
    println!("Prints the superblock, inode usage and root directory of the image.");
}

fn report(dev: &mut Device, sb: &Superblock) -> vsfs::Result<()> {
    let (magic, block_size, total_blocks, inode_count) =
        (sb.magic, sb.block_size, sb.total_blocks, sb.inode_count);
    let (journal_block, inode_bitmap, data_bitmap, inode_start, data_start) = (
        sb.journal_block,
        sb.inode_bitmap,
        sb.data_bitmap,
        sb.inode_start,
        sb.data_start,
    );
    println!("Filesystem Info:");
    println!("  Magic: 0x{magic:X}");
    println!("  Block size (superblock field): {block_size}");
    println!("  Total Blocks: {total_blocks}");
    println!("  Inode Count: {inode_count}");
    println!("  Journal Block: {journal_block}");
    println!("  Inode Bitmap Block: {inode_bitmap}");
    println!("  Data Bitmap Block: {data_bitmap}");
    println!("  Inode Start Block: {inode_start}");
    println!("  Data Start Block: {data_start}");

    println!();
    println!("Bitmap Analysis:");
    let bitmap = Bitmap::from_block(dev.read_block(inode_bitmap)?);
    let used = bitmap.count_set(inode_count as usize);
    println!("  Used Inodes: {used} / {inode_count}");
    match bitmap.find_first_zero(inode_count as usize) {
        Some(i) => println!("  First Free Inode: {i}"),
        None => println!("  First Free Inode: none"),
    }

    println!();
    println!("Root Directory Contents:");
    let root = fs::read_inode(dev, sb, fs::ROOT_INODE)?;
    let (kind, direct) = (root.kind, root.direct);
    if kind == fs::TYPE_DIR && direct[0] != 0 {
        let dir = dev.read_block(direct[0])?;
        for (i, entry) in fs::dirents(&dir).iter().enumerate() {
            let inum = entry.inode;
            if inum != 0 {
                let name = String::from_utf8_lossy(entry.name());
                println!("  [{i}] inode={inum} name='{name}'");
            }
        }
    }
    Ok(())
}

pub fn main(args: ArgsOs) {
    let args = parse_args(args);
    if args.help {
        print_help();
        return;
    }
    let image = args.image.unwrap_or_else(|| {
        error("vsfs info", "specify path to an image");
    });
    let mut dev = Device::open(&image).unwrap_or_else(|e| {
        error("vsfs info", format_args!("{}: {e}", image.display()));
    });
    let sb = Superblock::read(&mut dev).unwrap_or_else(|e| {
        error("vsfs info", e);
    });
    if let Err(e) = report(&mut dev, &sb) {
        error("vsfs info", e);
    }
}
