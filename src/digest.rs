//! Content digest computation for archive files.
//!
//! The merge pipeline identifies an archive by the MD5 of its full byte
//! content, rendered as 32 lowercase hexadecimal characters. The digest is
//! not a security boundary; it only has to notice that the archive on disk
//! changed since the last merge, and it has to match the markers written by
//! earlier versions of the tool.

use crate::{Error, READ_BUFFER_SIZE, Result};
use md5::{Digest, Md5};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

/// A content digest in its canonical text form.
///
/// Always exactly 32 lowercase hexadecimal characters. Construction goes
/// through [`ContentDigest::parse`] or one of the computation helpers, so a
/// value of this type is known to be well formed.
///
/// # Examples
///
/// ```
/// use reefmerge::ContentDigest;
///
/// let digest = ContentDigest::parse("d41d8cd98f00b204e9800998ecf8427e").unwrap();
/// assert_eq!(digest.as_str().len(), 32);
///
/// // Anything that is not exactly 32 lowercase hex characters is rejected
/// assert!(ContentDigest::parse("D41D8CD98F00B204E9800998ECF8427E").is_err());
/// assert!(ContentDigest::parse("d41d8cd9").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Length of the canonical text form in characters.
    pub const TEXT_LENGTH: usize = 32;

    /// Parses a digest from its canonical text form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDigest`] unless the input is exactly 32
    /// lowercase hexadecimal characters. No whitespace trimming is applied;
    /// callers that read digests from files decide how to treat padding.
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != Self::TEXT_LENGTH {
            return Err(Error::InvalidDigest(format!(
                "expected {} characters, got {}",
                Self::TEXT_LENGTH,
                s.len()
            )));
        }
        if !s.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)) {
            return Err(Error::InvalidDigest(
                "digest must be lowercase hexadecimal".into(),
            ));
        }
        Ok(Self(s.to_string()))
    }

    /// Builds a digest from raw hash output.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Returns the canonical text form.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ContentDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Computes the content digest of a file.
///
/// The file is read in fixed-size chunks, so memory use stays constant
/// regardless of archive size.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn file_digest(path: impl AsRef<Path>) -> Result<ContentDigest> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);
    digest_reader(&mut reader)
}

/// Computes the content digest of everything a reader yields.
///
/// # Errors
///
/// Returns an error if reading fails.
pub fn digest_reader<R: Read>(reader: &mut R) -> Result<ContentDigest> {
    let mut hasher = Md5::new();
    let mut buffer = [0u8; READ_BUFFER_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hasher.finalize());
    Ok(ContentDigest::from_bytes(bytes))
}

/// Hashes a byte slice in one shot.
pub(crate) fn md5_of(data: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(data);
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hasher.finalize());
    bytes
}

/// A writer wrapper that computes an MD5 digest of all written data.
///
/// Wraps any writer and transparently hashes everything that passes
/// through. The archive writer uses this to produce the whole-file
/// checksum of a pack without a second pass over the output.
pub struct Md5Writer<W: Write> {
    inner: W,
    hasher: Md5,
    bytes_written: u64,
}

impl<W: Write> Md5Writer<W> {
    /// Creates a new digesting writer wrapping the given writer.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Md5::new(),
            bytes_written: 0,
        }
    }

    /// Returns the digest of all data written so far.
    pub fn digest(&self) -> ContentDigest {
        ContentDigest::from_bytes(self.digest_bytes())
    }

    /// Returns the raw digest of all data written so far.
    pub fn digest_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&self.hasher.clone().finalize());
        bytes
    }

    /// Returns the total number of bytes written.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Consumes the wrapper and returns the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Returns a reference to the inner writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Returns a mutable reference to the inner writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }
}

impl<W: Write> Write for Md5Writer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.bytes_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";
    const ABC_MD5: &str = "900150983cd24fb0d6963f7d28e17f72";

    #[test]
    fn test_digest_reader_empty() {
        let mut reader = Cursor::new(Vec::new());
        let digest = digest_reader(&mut reader).unwrap();
        assert_eq!(digest.as_str(), EMPTY_MD5);
    }

    #[test]
    fn test_digest_reader_known_vector() {
        let mut reader = Cursor::new(b"abc".to_vec());
        let digest = digest_reader(&mut reader).unwrap();
        assert_eq!(digest.as_str(), ABC_MD5);
    }

    #[test]
    fn test_digest_reader_spans_buffer_boundary() {
        // Same content digested in one read and across many buffer refills
        let data = vec![0x5au8; READ_BUFFER_SIZE * 3 + 17];
        let mut reader = Cursor::new(data.clone());
        let streamed = digest_reader(&mut reader).unwrap();
        let oneshot = ContentDigest::from_bytes(md5_of(&data));
        assert_eq!(streamed, oneshot);
    }

    #[test]
    fn test_file_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"abc").unwrap();
        let digest = file_digest(&path).unwrap();
        assert_eq!(digest.as_str(), ABC_MD5);
    }

    #[test]
    fn test_file_digest_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = file_digest(dir.path().join("absent.bin")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_parse_valid() {
        let digest = ContentDigest::parse(EMPTY_MD5).unwrap();
        assert_eq!(digest.as_str(), EMPTY_MD5);
    }

    #[test]
    fn test_parse_rejects_uppercase() {
        let err = ContentDigest::parse("D41D8CD98F00B204E9800998ECF8427E").unwrap_err();
        assert!(matches!(err, Error::InvalidDigest(_)));
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(ContentDigest::parse("").is_err());
        assert!(ContentDigest::parse("d41d8cd9").is_err());
        assert!(ContentDigest::parse(&"a".repeat(33)).is_err());
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        let err = ContentDigest::parse("g41d8cd98f00b204e9800998ecf8427e").unwrap_err();
        assert!(matches!(err, Error::InvalidDigest(_)));
    }

    #[test]
    fn test_parse_rejects_surrounding_whitespace() {
        assert!(ContentDigest::parse("d41d8cd98f00b204e9800998ecf8427e\n").is_err());
        assert!(ContentDigest::parse(" d41d8cd98f00b204e9800998ecf8427").is_err());
    }

    #[test]
    fn test_from_bytes_is_lowercase_hex() {
        let digest = ContentDigest::from_bytes([0xAB; 16]);
        assert_eq!(digest.as_str(), "ab".repeat(16));
        // Parse accepts its own rendering
        assert_eq!(ContentDigest::parse(digest.as_str()).unwrap(), digest);
    }

    #[test]
    fn test_display_matches_as_str() {
        let digest = ContentDigest::parse(ABC_MD5).unwrap();
        assert_eq!(format!("{}", digest), ABC_MD5);
    }

    #[test]
    fn test_md5_writer_tracks_digest_and_count() {
        let mut writer = Md5Writer::new(Vec::new());
        writer.write_all(b"abc").unwrap();
        assert_eq!(writer.bytes_written(), 3);
        assert_eq!(writer.digest().as_str(), ABC_MD5);
        assert_eq!(writer.into_inner(), b"abc");
    }

    #[test]
    fn test_md5_writer_empty() {
        let writer = Md5Writer::new(Vec::new());
        assert_eq!(writer.bytes_written(), 0);
        assert_eq!(writer.digest().as_str(), EMPTY_MD5);
    }

    #[test]
    fn test_md5_writer_digest_is_observable_midstream() {
        let mut writer = Md5Writer::new(Vec::new());
        writer.write_all(b"ab").unwrap();
        let mid = writer.digest();
        writer.write_all(b"c").unwrap();
        assert_ne!(mid, writer.digest());
        assert_eq!(writer.digest().as_str(), ABC_MD5);
    }
}
