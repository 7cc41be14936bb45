//! # reefmerge
//!
//! Merges the `dota_reef.vpk` overlay map pack into the stock `dota.vpk`
//! archive.
//!
//! The overlay ships a handful of entries that belong in the base archive:
//! everything under `maps/dota/` carries over unchanged, the single
//! `maps/dota_reef.vmap_c` entry replaces `maps/dota.vmap_c`, and the rest
//! of the overlay is ignored. This crate plans that selection, repacks the
//! base archive with the overlay content folded in, and records a content
//! digest next to the archive so repeated runs are cheap no-ops.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reefmerge::{MergeOutcome, MergeRules, Merger, Result};
//!
//! fn main() -> Result<()> {
//!     let merger = Merger::new(MergeRules::dota());
//!     match merger.run("game/dota/maps")? {
//!         MergeOutcome::Skipped { digest } => {
//!             println!("already merged ({digest})");
//!         }
//!         MergeOutcome::Merged(report) => {
//!             println!(
//!                 "merged {} entries, dropped {} overlay entries",
//!                 report.entries_written(),
//!                 report.overlay_dropped
//!             );
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Working with VPK Archives Directly
//!
//! The VPK layer is usable on its own:
//!
//! ```rust,no_run
//! use reefmerge::{ArchivePath, Result, VpkArchive, VpkVersion, VpkWriter};
//!
//! fn main() -> Result<()> {
//!     let mut archive = VpkArchive::open_path("dota.vpk")?;
//!     for entry in archive.entries() {
//!         println!("{} ({} bytes)", entry.path, entry.total_len());
//!     }
//!
//!     let mut writer = VpkWriter::new(VpkVersion::V2);
//!     writer.add_bytes(ArchivePath::new("maps/dota.vmap_c")?, b"level".to_vec());
//!     writer.write_path("repacked.vpk")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli` | Yes | The `reefmerge` command-line tool |
//!
//! The library itself has no optional functionality; disabling `cli` just
//! drops the clap dependency:
//!
//! ```toml
//! [dependencies]
//! reefmerge = { version = "0.2", default-features = false }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. The [`Error`] enum covers every
//! failure mode:
//!
//! ```rust,no_run
//! use reefmerge::{Error, MergeRules, Merger};
//!
//! fn merge(dir: &str) -> reefmerge::Result<()> {
//!     match Merger::new(MergeRules::dota()).run(dir) {
//!         Ok(_) => Ok(()),
//!         Err(Error::Io(e)) => {
//!             eprintln!("I/O error: {}", e);
//!             Err(Error::Io(e))
//!         }
//!         Err(e) if e.is_corruption() => {
//!             eprintln!("archive is damaged: {}", e);
//!             Err(e)
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! # fn main() {}
//! ```
//!
//! ## Safety
//!
//! Archive paths are validated before anything touches the filesystem:
//! absolute paths, `..` segments, and NUL bytes are rejected, so a
//! malicious archive cannot write outside the staging directory. Every
//! extraction verifies the entry's recorded CRC32, and version 2 packs
//! have their directory tree checksum verified before parsing.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

/// Default buffer size for read operations (8 KiB).
pub(crate) const READ_BUFFER_SIZE: usize = 8192;

pub mod archive_path;
pub mod digest;
pub mod error;
pub mod marker;
pub mod merge;
pub mod rules;
pub mod select;
pub mod vpk;

pub use archive_path::ArchivePath;
pub use error::{Error, Result};

// Re-export the merge pipeline at crate root for convenience
pub use digest::{ContentDigest, file_digest};
pub use marker::DigestMarker;
pub use merge::{MergeOutcome, MergeReport, Merger};
pub use rules::MergeRules;
pub use select::{EntryOrigin, MergePlan, PlannedEntry, plan_merge};

// Re-export the VPK layer at crate root for convenience
pub use vpk::{PackSummary, VpkArchive, VpkEntry, VpkVersion, VpkWriter};
