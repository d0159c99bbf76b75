//! The `create` command journals the creation of an empty file in the root
//! directory. The home blocks are only rewritten by a later `install`.

use std::env::ArgsOs;
use std::path::PathBuf;
use vsfs::device::Device;
use vsfs::error;
use vsfs::fs::Superblock;
use vsfs::ops;

/// Structure storing command line arguments.
#[derive(Default)]
struct Args {
    /// If true, print command line help.
    help: bool,
    /// The name of the file to create.
    name: Option<String>,
    /// The path to the image.
    image: Option<PathBuf>,
}

fn parse_args(args: ArgsOs) -> Args {
    let mut res: Args = Default::default();
    for arg in args {
        match arg.to_str() {
            Some("-h" | "--help") => res.help = true,
            _ if res.name.is_none() => res.name = arg.into_string().ok(),
            _ => res.image = Some(PathBuf::from(arg)),
        }
    }
    res
}

fn print_help() {
    println!("Usage:");
    println!(" vsfs create <name> <image>");
    println!();
    println!("Stages the creation of an empty file in the root directory and commits");
    println!("it to the journal. Run 'vsfs install' to apply it.");
}

pub fn main(args: ArgsOs) {
    let args = parse_args(args);
    if args.help {
        print_help();
        return;
    }
    let name = args.name.unwrap_or_else(|| {
        error("vsfs create", "specify the name of the file to create");
    });
    let image = args.image.unwrap_or_else(|| {
        error("vsfs create", "specify path to an image");
    });
    let mut dev = Device::open(&image).unwrap_or_else(|e| {
        error("vsfs create", format_args!("{}: {e}", image.display()));
    });
    let sb = Superblock::read(&mut dev).unwrap_or_else(|e| {
        error("vsfs create", e);
    });
    let created = ops::create(&mut dev, &sb, &name).unwrap_or_else(|e| {
        error("vsfs create", e);
    });
    println!(
        "Created '{name}': inode {}, directory slot {} (pending install)",
        created.inum, created.slot
    );
}
