//! Error types for archive merge operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when hashing, reading, merging, and repacking VPK archives,
//! along with a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. You can
//! handle errors using pattern matching or the `?` operator:
//!
//! ## Using the `?` Operator
//!
//! ```rust,no_run
//! use reefmerge::{MergeRules, Merger, Result};
//!
//! fn merge(maps_dir: &str) -> Result<()> {
//!     let merger = Merger::new(MergeRules::dota());
//!     merger.run(maps_dir)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Exhaustive Error Matching
//!
//! For fine-grained error handling, match on specific error variants:
//!
//! ```rust,no_run
//! use reefmerge::{Error, MergeRules, Merger};
//!
//! fn merge_with_diagnostics(maps_dir: &str) {
//!     let merger = Merger::new(MergeRules::dota());
//!     match merger.run(maps_dir) {
//!         Ok(_) => {}
//!
//!         // File system errors
//!         Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
//!             eprintln!("archive not found under {}", maps_dir);
//!         }
//!
//!         // Format errors
//!         Err(Error::InvalidFormat(msg)) => {
//!             eprintln!("not a valid VPK archive: {}", msg);
//!         }
//!         Err(Error::CorruptTree { offset, reason }) => {
//!             eprintln!("archive corrupted at byte {:#x}: {}", offset, reason);
//!         }
//!         Err(Error::CrcMismatch { path, .. }) => {
//!             eprintln!("entry '{}' failed its integrity check", path);
//!         }
//!
//!         Err(e) => eprintln!("merge failed: {}", e),
//!     }
//! }
//! ```

use std::io;

/// Helper struct for formatting CrcMismatch error messages.
struct CrcMismatchDisplay<'a> {
    path: &'a str,
    expected: u32,
    actual: u32,
}

impl std::fmt::Display for CrcMismatchDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CRC mismatch for entry '{}': expected {:#x}, got {:#x}",
            self.path, self.expected, self.actual
        )
    }
}

/// The main error type for archive merge operations.
///
/// This enum represents all possible errors that can occur when reading,
/// repacking, or merging VPK archives. Each variant includes relevant
/// context to help diagnose the issue.
///
/// # Error Categories
///
/// Errors fall into several categories:
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io] | File system operations |
/// | Format | [`InvalidFormat`][Self::InvalidFormat], [`CorruptTree`][Self::CorruptTree] | Invalid archive data |
/// | Compatibility | [`UnsupportedVersion`][Self::UnsupportedVersion], [`UnsupportedFeature`][Self::UnsupportedFeature] | Missing features |
/// | Integrity | [`CrcMismatch`][Self::CrcMismatch] | Data corruption |
/// | Marker | [`InvalidDigest`][Self::InvalidDigest] | Damaged digest marker |
/// | Rules | [`RuleConflict`][Self::RuleConflict] | Misconfigured merge rules |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred during file operations.
    ///
    /// This wraps [`std::io::Error`] and is returned when file operations fail.
    /// Common causes include:
    /// - Base or overlay archive not found
    /// - Permission denied
    /// - Disk full while staging or repacking
    ///
    /// # Recovery
    ///
    /// Check the underlying [`std::io::ErrorKind`] for specific handling:
    ///
    /// ```rust
    /// use reefmerge::Error;
    /// use std::io::ErrorKind;
    ///
    /// fn handle_io_error(error: &Error) {
    ///     if let Error::Io(e) = error {
    ///         match e.kind() {
    ///             ErrorKind::NotFound => println!("Archive not found"),
    ///             ErrorKind::PermissionDenied => println!("Access denied"),
    ///             _ => println!("I/O error: {}", e),
    ///         }
    ///     }
    /// }
    /// ```
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive format is invalid or not recognized.
    ///
    /// This error occurs when:
    /// - The file doesn't have the VPK signature
    /// - Header fields are inconsistent with the file size
    /// - The file is not a VPK archive at all
    ///
    /// The string contains a description of what was expected vs. found.
    #[error("Invalid VPK format: {0}")]
    InvalidFormat(String),

    /// The archive directory tree is corrupt or truncated.
    ///
    /// This indicates the archive was likely damaged during download or
    /// storage. The error includes the byte offset where corruption was
    /// detected.
    #[error("Corrupt directory tree at offset {offset:#x}: {reason}")]
    CorruptTree {
        /// The byte offset where corruption was detected.
        offset: u64,
        /// A description of the corruption.
        reason: String,
    },

    /// The archive uses a VPK version this crate does not handle.
    ///
    /// Only versions 1 and 2 are supported; those are the only versions the
    /// Source engine ships.
    #[error("Unsupported VPK version: {version}")]
    UnsupportedVersion {
        /// The version number found in the header.
        version: u32,
    },

    /// A feature required by the archive is not supported.
    ///
    /// The most common case is a split archive, where entry data lives in
    /// numbered sibling files (`pak01_000.vpk`, ...) instead of the
    /// directory file itself.
    #[error("Unsupported feature: {feature}")]
    UnsupportedFeature {
        /// The name of the unsupported feature.
        feature: &'static str,
    },

    /// The CRC checksum of an entry does not match the stored value.
    ///
    /// This indicates data corruption: the entry's bytes differ from what
    /// was originally packed. The merge is aborted rather than propagating
    /// damaged content into the output archive.
    #[error("{}", CrcMismatchDisplay { path, expected: *expected, actual: *actual })]
    CrcMismatch {
        /// The entry path with the CRC mismatch.
        path: String,
        /// The expected CRC value from the archive.
        expected: u32,
        /// The actual CRC value of the extracted data.
        actual: u32,
    },

    /// An archive path is invalid.
    ///
    /// Archive paths must:
    /// - Not contain NUL bytes
    /// - Not be empty
    /// - Not be absolute or contain `.`/`..` segments
    /// - Use forward slashes as separators
    ///
    /// # Recovery
    ///
    /// Use [`ArchivePath::new`] to validate paths before use:
    ///
    /// ```rust
    /// use reefmerge::ArchivePath;
    ///
    /// match ArchivePath::new("maps/dota/start.vmap_c") {
    ///     Ok(path) => println!("Valid path: {}", path.as_str()),
    ///     Err(e) => eprintln!("Invalid path: {}", e),
    /// }
    /// ```
    ///
    /// [`ArchivePath::new`]: crate::ArchivePath::new
    #[error("Invalid archive path: {0}")]
    InvalidArchivePath(String),

    /// A digest string is not a valid content digest.
    ///
    /// Content digests are exactly 32 lowercase hexadecimal characters.
    /// When the digest marker file contains anything else, the marker is
    /// treated as absent and a full merge proceeds; this variant surfaces
    /// only from explicit parsing via [`ContentDigest::parse`].
    ///
    /// [`ContentDigest::parse`]: crate::ContentDigest::parse
    #[error("Invalid digest: {0}")]
    InvalidDigest(String),

    /// An entry was not found in the archive.
    ///
    /// This error occurs when extracting a path that does not exist in the
    /// archive's directory tree.
    #[error("Entry not found: {path}")]
    EntryNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Two merge rules map different entries to the same output path.
    ///
    /// Under the stock Dota rules this cannot happen; it guards injected
    /// rule sets where the rename target falls inside the protected
    /// subtree.
    #[error("Merge rules map two entries to the same path: {path}")]
    RuleConflict {
        /// The output path claimed by more than one entry.
        path: String,
    },
}

impl Error {
    /// Returns `true` if this is a data corruption error.
    ///
    /// Corruption errors indicate the archive or extracted data is damaged.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::CrcMismatch { .. } | Error::CorruptTree { .. })
    }

    /// Returns `true` if this error indicates an archive that cannot be
    /// parsed as VPK at all, as opposed to one that is damaged.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidFormat(_)
                | Error::UnsupportedVersion { .. }
                | Error::UnsupportedFeature { .. }
        )
    }

    /// Returns `true` if this error is related to unsupported versions or
    /// features.
    ///
    /// These errors indicate the archive uses capabilities this crate does
    /// not implement, not that the archive is damaged.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedVersion { .. } | Error::UnsupportedFeature { .. }
        )
    }

    /// Returns `true` if this error might be recoverable.
    ///
    /// Recoverable errors are those where the operation could potentially
    /// succeed if tried again:
    ///
    /// - `InvalidDigest`: the marker is ignored and the next run re-merges
    /// - `Io` (transient kinds only): retry may succeed for `WouldBlock`,
    ///   `Interrupted`, `TimedOut`
    ///
    /// Non-transient I/O errors like `InvalidData`, `UnexpectedEof`, or
    /// `PermissionDenied` are not recoverable as they indicate fundamental
    /// issues that won't resolve on retry.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::InvalidDigest(_) => true,
            // Only transient I/O errors are recoverable
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    /// Returns the entry path associated with this error, if any.
    ///
    /// Several errors include context about which entry caused them. This
    /// method provides a unified way to access that information.
    pub fn entry_path(&self) -> Option<&str> {
        match self {
            Error::CrcMismatch { path, .. } => Some(path.as_str()),
            Error::EntryNotFound { path } => Some(path.as_str()),
            Error::RuleConflict { path } => Some(path.as_str()),
            _ => None,
        }
    }

    /// Creates a CrcMismatch error.
    ///
    /// This is a convenience constructor for creating CRC mismatch errors.
    pub fn crc_mismatch(path: impl Into<String>, expected: u32, actual: u32) -> Self {
        Error::CrcMismatch {
            path: path.into(),
            expected,
            actual,
        }
    }

    /// Creates a CorruptTree error.
    ///
    /// This is a convenience constructor for creating corrupt tree errors.
    pub fn corrupt_tree(offset: u64, reason: impl Into<String>) -> Self {
        Error::CorruptTree {
            offset,
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for merge operations.
///
/// This is defined as `std::result::Result<T, Error>` for convenience.
///
/// # Example
///
/// ```rust
/// use reefmerge::Result;
///
/// fn my_function() -> Result<()> {
///     // Operations that may fail...
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;
