//! Pack a directory tree into a VPK archive.
//!
//! This example demonstrates basic pack creation:
//! - Collecting every file under a directory
//! - Adding an entry from memory
//! - Writing a version 2 pack with checksums
//!
//! # Usage
//!
//! ```bash
//! cargo run --example pack_directory -- output.vpk ./content
//! ```

use reefmerge::{ArchivePath, Result, VpkVersion, VpkWriter};
use std::env;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <output.vpk> <content_dir>", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} pack.vpk ./content", args[0]);
        std::process::exit(1);
    }

    let output_path = &args[1];
    let content_dir = &args[2];

    let mut writer = VpkWriter::new(VpkVersion::V2);

    println!("Collecting files under {}", content_dir);
    let added = writer.add_directory(content_dir)?;
    println!("  {} files queued", added);

    // Entries can also come from memory
    writer.add_bytes(
        ArchivePath::new("pack_manifest.txt")?,
        format!("packed from {content_dir}\n").into_bytes(),
    );

    println!("Writing {}", output_path);
    let summary = writer.write_path(output_path)?;
    println!(
        "  {} entries, {} bytes ({} tree, {} data)",
        summary.entries_written, summary.bytes_written, summary.tree_size, summary.data_size
    );

    Ok(())
}
