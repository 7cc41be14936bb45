//! Directory entry metadata.

use crate::ArchivePath;

/// Metadata for one file inside a VPK archive.
///
/// Offsets are relative to the end of the directory tree. Preload bytes
/// are a prefix of the file content stored inline in the tree itself; the
/// full content of an entry is its preload bytes followed by `length`
/// bytes from the data section.
#[derive(Debug, Clone)]
pub struct VpkEntry {
    /// Archive-relative path of the entry.
    pub path: ArchivePath,
    /// CRC32 of the full entry content (preload plus data).
    pub crc: u32,
    /// Content prefix stored inline in the directory tree.
    pub preload: Vec<u8>,
    /// Which archive file holds the data section bytes.
    pub archive_index: u16,
    /// Offset of the data bytes, relative to the end of the tree.
    pub offset: u32,
    /// Number of data bytes outside the preload.
    pub length: u32,
}

impl VpkEntry {
    /// Total content length in bytes, preload included.
    pub fn total_len(&self) -> u64 {
        self.preload.len() as u64 + u64::from(self.length)
    }
}
