//! Digest marker files recording the last merged archive state.

use crate::Result;
use crate::digest::ContentDigest;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A digest marker stored next to an archive.
///
/// The marker holds the content digest the archive had after the last
/// merge, as 32 lowercase hex characters and nothing else. A marker that
/// matches the archive's current digest means the merged content is
/// already in place. A missing or damaged marker carries no information
/// and never blocks a merge.
pub struct DigestMarker {
    path: PathBuf,
}

impl DigestMarker {
    /// Returns the marker for an archive, named `<archive>.md5` in the
    /// same directory.
    pub fn for_archive(archive: impl AsRef<Path>) -> Self {
        let mut path = OsString::from(archive.as_ref().as_os_str());
        path.push(".md5");
        Self {
            path: PathBuf::from(path),
        }
    }

    /// Returns the marker file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the recorded digest.
    ///
    /// A missing marker yields `Ok(None)`. A marker that exists but does
    /// not hold a well-formed digest also yields `Ok(None)` after a
    /// warning, so stale or hand-edited markers degrade to a full merge
    /// rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error only for I/O failures other than the marker being
    /// absent.
    pub fn load(&self) -> Result<Option<ContentDigest>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                log::warn!(
                    "digest marker {} is not UTF-8, ignoring it",
                    self.path.display()
                );
                return Ok(None);
            }
        };
        match ContentDigest::parse(&text) {
            Ok(digest) => Ok(Some(digest)),
            Err(e) => {
                log::warn!(
                    "digest marker {} is unreadable ({e}), ignoring it",
                    self.path.display()
                );
                Ok(None)
            }
        }
    }

    /// Writes the digest, replacing any existing marker.
    pub fn store(&self, digest: &ContentDigest) -> Result<()> {
        fs::write(&self.path, digest.as_str())?;
        Ok(())
    }
}
