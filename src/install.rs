//! The `install` command replays a committed journal transaction into the
//! home blocks, then truncates the journal.

use std::env::ArgsOs;
use std::path::PathBuf;
use vsfs::device::Device;
use vsfs::error;
use vsfs::fs::Superblock;
use vsfs::ops::{self, Install};

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
    println!(" vsfs install <image>");
    println!();
    println!("Replays the committed journal transaction into its home blocks and");
    println!("clears the journal. A clean journal is not an error.");
}

pub fn main(args: ArgsOs) {
    let args = parse_args(args);
    if args.help {
        print_help();
        return;
    }
    let image = args.image.unwrap_or_else(|| {
        error("vsfs install", "specify path to an image");
    });
    let mut dev = Device::open(&image).unwrap_or_else(|e| {
        error("vsfs install", format_args!("{}: {e}", image.display()));
    });
    let sb = Superblock::read(&mut dev).unwrap_or_else(|e| {
        error("vsfs install", e);
    });
    match ops::install(&mut dev, &sb) {
        Ok(Install::Empty) => println!("Journal is empty, nothing to install."),
        Ok(Install::Applied(n)) => println!("Installed {n} block images from the journal."),
        Err(e) => error("vsfs install", e),
    }
}
