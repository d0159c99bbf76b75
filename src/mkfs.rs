//! The `mkfs` command writes a fresh VSFS filesystem onto a regular file
//! or block device.

use std::env::ArgsOs;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::exit;
use vsfs::device::{BLOCK_SIZE, Device};
use vsfs::error;
use vsfs::format::{self, FormatOptions};
use vsfs::prompt::confirm;

/// Structure storing command line arguments.
#[derive(Default)]
struct Args {
    /// If true, print command line help.
    help: bool,
    /// The number of inodes to create.
    inode_count: Option<u32>,
    /// The total number of blocks.
    total_blocks: Option<u32>,
    /// The path to the image.
    image: Option<PathBuf>,
}

fn parse_count(name: &str, value: Option<std::ffi::OsString>) -> u32 {
    value
        .and_then(|s| s.into_string().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            error("vsfs mkfs", format_args!("{name} requires a numeric value"));
        })
}

fn parse_args(mut args: ArgsOs) -> Args {
    let mut res: Args = Default::default();
    while let Some(arg) = args.next() {
        match arg.to_str() {
            Some("-h" | "--help") => res.help = true,
            Some("-i" | "--inodes") => res.inode_count = Some(parse_count("-i", args.next())),
            Some("-b" | "--blocks") => res.total_blocks = Some(parse_count("-b", args.next())),
            _ => res.image = Some(PathBuf::from(arg)),
        }
    }
    res
}

fn print_help() {
    println!("Usage:");
    println!(" vsfs mkfs [options] <image>");
    println!();
    println!("Writes a fresh VSFS filesystem onto the image.");
    println!();
    println!("Options:");
    println!(" -h, --help\t\tPrints help.");
    println!(" -i, --inodes <n>\tNumber of inodes (default 32).");
    println!(" -b, --blocks <n>\tTotal number of blocks (default: the target's size).");
}

pub fn main(args: ArgsOs) {
    let args = parse_args(args);
    if args.help {
        print_help();
        return;
    }
    let image = args.image.unwrap_or_else(|| {
        error("vsfs mkfs", "specify path to an image");
    });
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&image)
        .unwrap_or_else(|e| {
            error("vsfs mkfs", format_args!("{}: {e}", image.display()));
        });

    // grow a regular file to the requested geometry
    if let Some(blocks) = args.total_blocks {
        let metadata = file.metadata().unwrap_or_else(|e| {
            error("vsfs mkfs", format_args!("{}: {e}", image.display()));
        });
        let len = blocks as u64 * BLOCK_SIZE as u64;
        if metadata.is_file() && metadata.len() < len {
            file.set_len(len).unwrap_or_else(|e| {
                error("vsfs mkfs", format_args!("{}: {e}", image.display()));
            });
        }
    }

    let mut dev = Device::new(file);
    let present = format::is_present(&mut dev).unwrap_or_else(|e| {
        error("vsfs mkfs", format_args!("{}: {e}", image.display()));
    });
    if present {
        println!("{} already contains a VSFS filesystem", image.display());
        if !confirm("Proceed anyway? (y/N) ") {
            eprintln!("Abort.");
            exit(1);
        }
    }

    let opts = FormatOptions {
        total_blocks: args.total_blocks,
        inode_count: args.inode_count,
    };
    let sb = format::format(&mut dev, &opts).unwrap_or_else(|e| {
        error("vsfs mkfs", e);
    });
    let (total_blocks, inode_count) = (sb.total_blocks, sb.inode_count);
    println!(
        "Created VSFS filesystem on {}: {total_blocks} blocks, {inode_count} inodes",
        image.display()
    );
}
