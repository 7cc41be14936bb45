//! VPK archive writing.

use crate::digest::{self, Md5Writer};
use crate::vpk::{EMBEDDED_ARCHIVE_INDEX, RECORD_TERMINATOR, VPK_SIGNATURE, VpkVersion};
use crate::{ArchivePath, Error, READ_BUFFER_SIZE, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Where an entry's content comes from when the pack is written.
enum EntrySource {
    /// Stream from a file on disk.
    File(PathBuf),
    /// Use an in-memory buffer.
    Bytes(Vec<u8>),
}

/// Builds a VPK archive from files and in-memory buffers.
///
/// Entries are held as sources and only read when the pack is written, so
/// large files are streamed rather than buffered. Output is deterministic:
/// the same set of entries always produces the same bytes, regardless of
/// the order they were added in. Adding a path that is already present
/// replaces the earlier source.
///
/// All entry data is written to the embedded data section; preload is not
/// used and companion archive files are never produced.
///
/// # Examples
///
/// ```no_run
/// use reefmerge::{ArchivePath, VpkVersion, VpkWriter};
///
/// let mut writer = VpkWriter::new(VpkVersion::V2);
/// writer.add_bytes(ArchivePath::new("maps/dota.vmap_c")?, b"level".to_vec());
/// let summary = writer.write_path("dota.vpk")?;
/// println!("packed {} entries", summary.entries_written);
/// # Ok::<(), reefmerge::Error>(())
/// ```
pub struct VpkWriter {
    version: VpkVersion,
    sources: BTreeMap<ArchivePath, EntrySource>,
}

/// What a finished pack looks like on disk.
#[derive(Debug, Clone, Copy)]
pub struct PackSummary {
    /// Number of entries in the pack.
    pub entries_written: usize,
    /// Total output size in bytes, checksums included.
    pub bytes_written: u64,
    /// Size of the directory tree in bytes.
    pub tree_size: u32,
    /// Size of the data section in bytes.
    pub data_size: u64,
}

impl VpkWriter {
    /// Creates a writer targeting the given format version.
    pub fn new(version: VpkVersion) -> Self {
        Self {
            version,
            sources: BTreeMap::new(),
        }
    }

    /// Adds an entry whose content is read from a file when writing.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` does not exist or is not a regular file.
    pub fn add_file(&mut self, path: ArchivePath, source: impl Into<PathBuf>) -> Result<()> {
        let source = source.into();
        let metadata = std::fs::metadata(&source)?;
        if !metadata.is_file() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", source.display()),
            )));
        }
        self.sources.insert(path, EntrySource::File(source));
        Ok(())
    }

    /// Adds an entry with in-memory content.
    pub fn add_bytes(&mut self, path: ArchivePath, data: impl Into<Vec<u8>>) {
        self.sources.insert(path, EntrySource::Bytes(data.into()));
    }

    /// Adds every regular file under `root`, keyed by its path relative
    /// to `root`. Returns the number of files added.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be walked or a relative
    /// path does not form a valid archive path.
    pub fn add_directory(&mut self, root: impl AsRef<Path>) -> Result<usize> {
        let root = root.as_ref();
        let mut added = 0;
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(root).map_err(|_| {
                Error::InvalidArchivePath(format!(
                    "path escapes pack root: {}",
                    entry.path().display()
                ))
            })?;
            let path = ArchivePath::from_host_relative(relative)?;
            self.sources
                .insert(path, EntrySource::File(entry.path().to_path_buf()));
            added += 1;
        }
        Ok(added)
    }

    /// Returns the number of entries added so far.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true if no entries have been added.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Writes the pack to a sink.
    ///
    /// File sources are read twice: once to record CRC and length in the
    /// directory tree, once to stream the data section. A source that
    /// changes between the two reads fails the write.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read, changed while packing,
    /// or exceeds a format limit (entries and data section are capped at
    /// 4 GiB by the 32-bit fields in the directory tree).
    pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<PackSummary> {
        // Group entries the way the tree nests them: extension, then
        // directory, then file name. BTreeMap iteration fixes the on-disk
        // order.
        let mut groups: BTreeMap<String, BTreeMap<String, BTreeMap<String, &EntrySource>>> =
            BTreeMap::new();
        for (path, source) in &self.sources {
            let (ext, dir, name) = split_tree_path(path);
            groups
                .entry(ext)
                .or_default()
                .entry(dir)
                .or_default()
                .insert(name, source);
        }

        // Build the tree, measuring each source and assigning offsets in
        // tree order. Tree order is also the data write order.
        let mut tree: Vec<u8> = Vec::new();
        let mut writes: Vec<(&EntrySource, u32, u32)> = Vec::new();
        let mut next_offset = 0u32;
        for (ext, dirs) in &groups {
            tree.extend_from_slice(ext.as_bytes());
            tree.push(0);
            for (dir, names) in dirs {
                tree.extend_from_slice(dir.as_bytes());
                tree.push(0);
                for (name, &source) in names {
                    let (crc, length) = measure_source(source)?;
                    tree.extend_from_slice(name.as_bytes());
                    tree.push(0);
                    tree.extend_from_slice(&crc.to_le_bytes());
                    tree.extend_from_slice(&0u16.to_le_bytes());
                    tree.extend_from_slice(&EMBEDDED_ARCHIVE_INDEX.to_le_bytes());
                    tree.extend_from_slice(&next_offset.to_le_bytes());
                    tree.extend_from_slice(&length.to_le_bytes());
                    tree.extend_from_slice(&RECORD_TERMINATOR.to_le_bytes());
                    next_offset =
                        next_offset
                            .checked_add(length)
                            .ok_or(Error::UnsupportedFeature {
                                feature: "packs larger than 4 GiB",
                            })?;
                    writes.push((source, crc, length));
                }
                tree.push(0);
            }
            tree.push(0);
        }
        tree.push(0);

        let tree_size = u32::try_from(tree.len()).map_err(|_| Error::UnsupportedFeature {
            feature: "directory trees larger than 4 GiB",
        })?;
        let data_size = u64::from(next_offset);

        match self.version {
            VpkVersion::V1 => {
                sink.write_all(&VPK_SIGNATURE.to_le_bytes())?;
                sink.write_all(&1u32.to_le_bytes())?;
                sink.write_all(&tree_size.to_le_bytes())?;
                sink.write_all(&tree)?;
                write_data(sink, &writes)?;
                Ok(PackSummary {
                    entries_written: writes.len(),
                    bytes_written: VpkVersion::V1.header_len() + u64::from(tree_size) + data_size,
                    tree_size,
                    data_size,
                })
            }
            VpkVersion::V2 => {
                // Hash everything from byte zero; the whole-file checksum
                // covers all bytes before itself.
                let mut hashing = Md5Writer::new(sink);
                hashing.write_all(&VPK_SIGNATURE.to_le_bytes())?;
                hashing.write_all(&2u32.to_le_bytes())?;
                hashing.write_all(&tree_size.to_le_bytes())?;
                hashing.write_all(&next_offset.to_le_bytes())?;
                hashing.write_all(&0u32.to_le_bytes())?;
                hashing.write_all(&48u32.to_le_bytes())?;
                hashing.write_all(&0u32.to_le_bytes())?;
                hashing.write_all(&tree)?;
                write_data(&mut hashing, &writes)?;
                hashing.write_all(&digest::md5_of(&tree))?;
                hashing.write_all(&digest::md5_of(&[]))?;
                let whole_file = hashing.digest_bytes();
                hashing.write_all(&whole_file)?;
                Ok(PackSummary {
                    entries_written: writes.len(),
                    bytes_written: hashing.bytes_written(),
                    tree_size,
                    data_size,
                })
            }
        }
    }

    /// Writes the pack to a file.
    pub fn write_path(&self, path: impl AsRef<Path>) -> Result<PackSummary> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        let summary = self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(summary)
    }
}

impl Default for VpkWriter {
    fn default() -> Self {
        Self::new(VpkVersion::default())
    }
}

/// Splits an archive path into the `(extension, directory, name)` triple
/// the tree is keyed by. Empty extension and root directory are stored as
/// a single space.
fn split_tree_path(path: &ArchivePath) -> (String, String, String) {
    let full = path.as_str();
    let (dir, file_name) = match full.rfind('/') {
        Some(i) => (&full[..i], &full[i + 1..]),
        None => ("", full),
    };
    let (name, ext) = match path.extension() {
        Some(ext) => (&file_name[..file_name.len() - ext.len() - 1], ext),
        None => (file_name, ""),
    };
    let dir = if dir.is_empty() { " " } else { dir };
    let ext = if ext.is_empty() { " " } else { ext };
    (ext.to_string(), dir.to_string(), name.to_string())
}

fn measure_source(source: &EntrySource) -> Result<(u32, u32)> {
    match source {
        EntrySource::Bytes(data) => {
            let length = entry_length(data.len() as u64)?;
            let mut hasher = crc32fast::Hasher::new();
            hasher.update(data);
            Ok((hasher.finalize(), length))
        }
        EntrySource::File(path) => {
            let file = File::open(path)?;
            let mut reader = BufReader::new(file);
            let mut hasher = crc32fast::Hasher::new();
            let mut total = 0u64;
            let mut buffer = [0u8; READ_BUFFER_SIZE];
            loop {
                let n = reader.read(&mut buffer)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buffer[..n]);
                total += n as u64;
            }
            Ok((hasher.finalize(), entry_length(total)?))
        }
    }
}

fn entry_length(len: u64) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::UnsupportedFeature {
        feature: "entries larger than 4 GiB",
    })
}

fn write_data<W: Write>(sink: &mut W, writes: &[(&EntrySource, u32, u32)]) -> Result<()> {
    for &(source, crc, length) in writes {
        match source {
            EntrySource::Bytes(data) => {
                sink.write_all(data)?;
            }
            EntrySource::File(path) => {
                let file = File::open(path)?;
                let mut reader = BufReader::new(file);
                let mut hasher = crc32fast::Hasher::new();
                let mut copied = 0u64;
                let mut buffer = [0u8; READ_BUFFER_SIZE];
                loop {
                    let n = reader.read(&mut buffer)?;
                    if n == 0 {
                        break;
                    }
                    hasher.update(&buffer[..n]);
                    sink.write_all(&buffer[..n])?;
                    copied += n as u64;
                }
                if copied != u64::from(length) || hasher.finalize() != crc {
                    return Err(Error::Io(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("source file changed while packing: {}", path.display()),
                    )));
                }
            }
        }
    }
    Ok(())
}
