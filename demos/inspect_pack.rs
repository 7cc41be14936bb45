//! Inspect the contents of a VPK archive.
//!
//! This example walks an archive's directory tree without extracting
//! anything:
//! - Header version and entry count
//! - Per-entry paths and sizes
//! - A size summary grouped by file extension
//!
//! # Usage
//!
//! ```bash
//! cargo run --example inspect_pack -- dota.vpk
//! ```

use reefmerge::{Result, VpkArchive};
use std::collections::BTreeMap;
use std::env;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <archive.vpk>", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} dota.vpk", args[0]);
        std::process::exit(1);
    }

    let archive_path = &args[1];

    println!("Opening archive: {}", archive_path);
    let archive = VpkArchive::open_path(archive_path)?;

    println!(
        "VPK version {} with {} entries:",
        archive.version().as_u32(),
        archive.len()
    );
    for entry in archive.entries() {
        println!("  {} ({} bytes)", entry.path, entry.total_len());
    }
    println!();

    // Group entry counts and sizes by extension
    let mut by_extension: BTreeMap<String, (usize, u64)> = BTreeMap::new();
    for entry in archive.entries() {
        let ext = entry.path.extension().unwrap_or("(none)").to_string();
        let slot = by_extension.entry(ext).or_default();
        slot.0 += 1;
        slot.1 += entry.total_len();
    }

    println!("By extension:");
    for (ext, (count, bytes)) in &by_extension {
        println!("  {}: {} files, {} bytes", ext, count, bytes);
    }

    Ok(())
}
