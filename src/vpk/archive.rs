//! VPK archive reading and extraction.

use crate::vpk::reader::{read_bytes, read_nul_string, read_u16_le, read_u32_le};
use crate::vpk::{EMBEDDED_ARCHIVE_INDEX, RECORD_TERMINATOR, VPK_SIGNATURE, VpkEntry, VpkVersion};
use crate::{ArchivePath, Error, READ_BUFFER_SIZE, Result, digest};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// A VPK archive opened for reading.
///
/// The directory tree is parsed eagerly on open and held in memory; entry
/// data stays on disk and is streamed out on demand. Every extraction
/// verifies the entry's recorded CRC32.
///
/// # Examples
///
/// ```no_run
/// use reefmerge::VpkArchive;
///
/// let mut archive = VpkArchive::open_path("dota.vpk")?;
/// for entry in archive.entries() {
///     println!("{} ({} bytes)", entry.path, entry.total_len());
/// }
/// let content = archive.extract_to_vec("maps/dota.vmap_c")?;
/// # Ok::<(), reefmerge::Error>(())
/// ```
#[derive(Debug)]
pub struct VpkArchive<R: Read + Seek> {
    reader: R,
    version: VpkVersion,
    entries: Vec<VpkEntry>,
    index: HashMap<String, usize>,
    data_offset: u64,
}

impl VpkArchive<BufReader<File>> {
    /// Opens a VPK archive from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not a valid,
    /// supported VPK archive.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::open(BufReader::new(file))
    }
}

impl<R: Read + Seek> VpkArchive<R> {
    /// Opens a VPK archive from a reader.
    ///
    /// Parses and validates the header and the full directory tree. For
    /// version 2 archives that carry checksums, the directory tree MD5 is
    /// verified before the tree is parsed.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidFormat`] if the signature or section layout is wrong
    /// - [`Error::UnsupportedVersion`] for versions other than 1 and 2
    /// - [`Error::UnsupportedFeature`] if entry data lives in companion
    ///   archive files
    /// - [`Error::CorruptTree`] if the directory tree is malformed or fails
    ///   its checksum
    /// - [`Error::InvalidArchivePath`] if the tree names an entry with an
    ///   absolute or traversing path
    pub fn open(mut reader: R) -> Result<Self> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let magic = read_u32_le(&mut reader)?;
        if magic != VPK_SIGNATURE {
            return Err(Error::InvalidFormat(format!(
                "bad signature {magic:#010x}, expected {VPK_SIGNATURE:#010x}"
            )));
        }
        let version = VpkVersion::from_u32(read_u32_le(&mut reader)?)?;
        let tree_size = read_u32_le(&mut reader)?;

        let mut file_data_section_size = 0u32;
        let mut archive_md5_section_size = 0u32;
        let mut other_md5_section_size = 0u32;
        let mut signature_section_size = 0u32;
        if version == VpkVersion::V2 {
            file_data_section_size = read_u32_le(&mut reader)?;
            archive_md5_section_size = read_u32_le(&mut reader)?;
            other_md5_section_size = read_u32_le(&mut reader)?;
            signature_section_size = read_u32_le(&mut reader)?;
        }

        let header_len = version.header_len();
        let data_offset = header_len + u64::from(tree_size);
        if data_offset > file_len {
            return Err(Error::corrupt_tree(
                header_len,
                "directory tree extends past end of file",
            ));
        }

        let tree = read_bytes(&mut reader, tree_size as usize)?;

        if version == VpkVersion::V2 {
            let sections_end = data_offset
                + u64::from(file_data_section_size)
                + u64::from(archive_md5_section_size)
                + u64::from(other_md5_section_size)
                + u64::from(signature_section_size);
            if sections_end > file_len {
                return Err(Error::InvalidFormat(
                    "section sizes extend past end of file".into(),
                ));
            }
            match other_md5_section_size {
                0 => {}
                48 => {
                    let checksums_at = data_offset
                        + u64::from(file_data_section_size)
                        + u64::from(archive_md5_section_size);
                    reader.seek(SeekFrom::Start(checksums_at))?;
                    let mut stored = [0u8; 16];
                    reader.read_exact(&mut stored)?;
                    // Some writers leave the checksums zeroed; treat that as absent.
                    if stored != [0u8; 16] && stored != digest::md5_of(&tree) {
                        return Err(Error::corrupt_tree(
                            header_len,
                            "directory tree checksum mismatch",
                        ));
                    }
                }
                size => {
                    return Err(Error::InvalidFormat(format!(
                        "unexpected checksum section size {size}"
                    )));
                }
            }
        }

        let entries = parse_tree(&tree, header_len, file_len, data_offset)?;
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.path.as_str().to_string(), i).is_some() {
                return Err(Error::corrupt_tree(
                    header_len,
                    format!("duplicate path {}", entry.path),
                ));
            }
        }

        Ok(Self {
            reader,
            version,
            entries,
            index,
            data_offset,
        })
    }

    /// Returns the archive's format version.
    pub fn version(&self) -> VpkVersion {
        self.version
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the archive contains no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns all entries in directory tree order.
    pub fn entries(&self) -> &[VpkEntry] {
        &self.entries
    }

    /// Returns an iterator over all entry paths.
    pub fn paths(&self) -> impl Iterator<Item = &ArchivePath> {
        self.entries.iter().map(|entry| &entry.path)
    }

    /// Looks up an entry by its archive path.
    pub fn entry(&self, path: &str) -> Option<&VpkEntry> {
        self.index.get(path).map(|&i| &self.entries[i])
    }

    /// Returns true if the archive contains the given path.
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Extracts an entry's content into a writer, verifying its CRC32.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryNotFound`] if the path is not in the archive
    /// and [`Error::CrcMismatch`] if the content does not match the CRC
    /// recorded in the directory tree.
    pub fn extract_to_writer<W: Write>(&mut self, path: &str, writer: &mut W) -> Result<u64> {
        let i = *self
            .index
            .get(path)
            .ok_or_else(|| Error::EntryNotFound {
                path: path.to_string(),
            })?;
        let entry = &self.entries[i];
        let mut hasher = crc32fast::Hasher::new();
        let mut written = 0u64;

        if !entry.preload.is_empty() {
            hasher.update(&entry.preload);
            writer.write_all(&entry.preload)?;
            written += entry.preload.len() as u64;
        }

        if entry.length > 0 {
            self.reader
                .seek(SeekFrom::Start(self.data_offset + u64::from(entry.offset)))?;
            let mut remaining = u64::from(entry.length);
            let mut buffer = [0u8; READ_BUFFER_SIZE];
            while remaining > 0 {
                let chunk = remaining.min(buffer.len() as u64) as usize;
                self.reader.read_exact(&mut buffer[..chunk])?;
                hasher.update(&buffer[..chunk]);
                writer.write_all(&buffer[..chunk])?;
                remaining -= chunk as u64;
                written += chunk as u64;
            }
        }

        let actual = hasher.finalize();
        if actual != entry.crc {
            return Err(Error::crc_mismatch(entry.path.as_str(), entry.crc, actual));
        }
        Ok(written)
    }

    /// Extracts an entry to a file, creating parent directories as needed.
    ///
    /// Returns the number of bytes written.
    pub fn extract_to_path(&mut self, path: &str, dest: impl AsRef<Path>) -> Result<u64> {
        let dest = dest.as_ref();
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(dest)?;
        let mut writer = BufWriter::new(file);
        let written = self.extract_to_writer(path, &mut writer)?;
        writer.flush()?;
        Ok(written)
    }

    /// Extracts an entry's content into a fresh buffer.
    pub fn extract_to_vec(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        self.extract_to_writer(path, &mut content)?;
        Ok(content)
    }
}

/// Parses the directory tree out of its in-memory bytes.
///
/// Offsets in errors are absolute file offsets, computed from the tree's
/// position after the header.
fn parse_tree(
    tree: &[u8],
    header_len: u64,
    file_len: u64,
    data_offset: u64,
) -> Result<Vec<VpkEntry>> {
    let mut cursor = Cursor::new(tree);
    let mut entries = Vec::new();

    loop {
        let ext = read_nul_string(&mut cursor)
            .map_err(|e| tree_error(header_len + cursor.position(), e))?;
        if ext.is_empty() {
            break;
        }
        loop {
            let dir = read_nul_string(&mut cursor)
                .map_err(|e| tree_error(header_len + cursor.position(), e))?;
            if dir.is_empty() {
                break;
            }
            loop {
                let name = read_nul_string(&mut cursor)
                    .map_err(|e| tree_error(header_len + cursor.position(), e))?;
                if name.is_empty() {
                    break;
                }
                let record_at = header_len + cursor.position();
                let crc = read_u32_le(&mut cursor).map_err(|e| tree_error(record_at, e))?;
                let preload_len = read_u16_le(&mut cursor).map_err(|e| tree_error(record_at, e))?;
                let archive_index =
                    read_u16_le(&mut cursor).map_err(|e| tree_error(record_at, e))?;
                let offset = read_u32_le(&mut cursor).map_err(|e| tree_error(record_at, e))?;
                let length = read_u32_le(&mut cursor).map_err(|e| tree_error(record_at, e))?;
                let terminator = read_u16_le(&mut cursor).map_err(|e| tree_error(record_at, e))?;
                if terminator != RECORD_TERMINATOR {
                    return Err(Error::corrupt_tree(
                        record_at,
                        format!("bad record terminator {terminator:#06x}"),
                    ));
                }
                if archive_index != EMBEDDED_ARCHIVE_INDEX {
                    return Err(Error::UnsupportedFeature {
                        feature: "split archives",
                    });
                }
                let preload = read_bytes(&mut cursor, preload_len as usize)
                    .map_err(|e| tree_error(record_at, e))?;

                // An empty extension or directory is stored as a single space.
                let file_name = if ext == " " {
                    name.clone()
                } else {
                    format!("{name}.{ext}")
                };
                let full = if dir == " " {
                    file_name
                } else {
                    format!("{dir}/{file_name}")
                };
                let path = ArchivePath::new(&full)?;

                let end = data_offset + u64::from(offset) + u64::from(length);
                if end > file_len {
                    return Err(Error::corrupt_tree(
                        record_at,
                        format!("entry {path} extends past end of file"),
                    ));
                }

                entries.push(VpkEntry {
                    path,
                    crc,
                    preload,
                    archive_index,
                    offset,
                    length,
                });
            }
        }
    }

    Ok(entries)
}

fn tree_error(at: u64, err: io::Error) -> Error {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => {
            Error::corrupt_tree(at, "directory tree ends unexpectedly")
        }
        io::ErrorKind::InvalidData => Error::corrupt_tree(at, err.to_string()),
        _ => Error::Io(err),
    }
}
