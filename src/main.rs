//! Entry point of the VSFS utilities.
//!
//! A single binary multiplexes the commands over an image file: `mkfs`
//! writes a fresh filesystem, `info` reports on one, `create` journals the
//! creation of an empty file and `install` replays the journal into the
//! home blocks.

mod create;
mod info;
mod install;
mod mkfs;

use std::process::exit;
use vsfs::error;

fn print_usage() {
    eprintln!("usage: vsfs <command> [options] <image>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!(" info\t\tprint superblock, inode usage and root directory");
    eprintln!(" create\t\tjournal the creation of an empty file");
    eprintln!(" install\treplay the journal into the home blocks");
    eprintln!(" mkfs\t\twrite a fresh filesystem");
    eprintln!();
    eprintln!("Run 'vsfs <command> --help' for details on a command.");
}

fn main() {
    let (_, mut args) = vsfs::args();
    let Some(cmd) = args.next().and_then(|s| s.into_string().ok()) else {
        print_usage();
        exit(1);
    };
    match cmd.as_str() {
        "info" => info::main(args),
        "create" => create::main(args),
        "install" => install::main(args),
        "mkfs" => mkfs::main(args),
        "-h" | "--help" => print_usage(),
        _ => error("vsfs", format_args!("unknown command `{cmd}`")),
    }
}
