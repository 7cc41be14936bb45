//! Shared test utilities for integration tests.
//!
//! This module provides common helper functions used across multiple test
//! files. Archive and maps-directory builders are consolidated here to
//! avoid duplication.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test
//! file compiles as a separate crate and may only use a subset of these
//! helpers.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use reefmerge::{ArchivePath, MergeRules, VpkArchive, VpkVersion, VpkWriter};

/// Builds an in-memory VPK archive from `(path, content)` pairs.
pub fn archive_bytes(version: VpkVersion, entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = VpkWriter::new(version);
    for (path, content) in entries {
        writer.add_bytes(ArchivePath::new(path).unwrap(), content.to_vec());
    }
    let mut bytes = Vec::new();
    writer.write_to(&mut bytes).unwrap();
    bytes
}

/// Writes a VPK archive to disk from `(path, content)` pairs.
pub fn write_archive(path: &Path, version: VpkVersion, entries: &[(&str, &[u8])]) {
    let mut writer = VpkWriter::new(version);
    for (entry_path, content) in entries {
        writer.add_bytes(ArchivePath::new(entry_path).unwrap(), content.to_vec());
    }
    writer.write_path(path).unwrap();
}

/// Creates a maps directory holding a base `dota.vpk` and an overlay
/// `dota_reef.vpk` with the given entries.
///
/// Returns the temp dir guard together with its path; dropping the guard
/// removes the directory.
pub fn setup_maps_dir(
    base_entries: &[(&str, &[u8])],
    overlay_entries: &[(&str, &[u8])],
) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_path_buf();
    let rules = MergeRules::dota();
    write_archive(&path.join(rules.base_name()), VpkVersion::V2, base_entries);
    write_archive(
        &path.join(rules.overlay_name()),
        VpkVersion::V2,
        overlay_entries,
    );
    (dir, path)
}

/// Opens an archive file and extracts one entry's content.
pub fn read_entry(archive_path: &Path, entry: &str) -> Vec<u8> {
    let mut archive = VpkArchive::open_path(archive_path).unwrap();
    archive.extract_to_vec(entry).unwrap()
}

/// Opens an archive file and returns its entry paths, sorted.
pub fn entry_names(archive_path: &Path) -> Vec<String> {
    let archive = VpkArchive::open_path(archive_path).unwrap();
    let mut names: Vec<String> = archive.paths().map(|p| p.as_str().to_string()).collect();
    names.sort();
    names
}

/// Round-trips an in-memory archive through the reader.
pub fn open_bytes(bytes: Vec<u8>) -> VpkArchive<Cursor<Vec<u8>>> {
    VpkArchive::open(Cursor::new(bytes)).unwrap()
}
