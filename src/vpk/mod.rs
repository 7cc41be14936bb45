//! VPK archive format support.
//!
//! Implements reading and writing of Valve Pak (VPK) archives, versions 1
//! and 2. Only single-file archives are supported; packs that spread data
//! across numbered `_NNN.vpk` companion files are rejected.
//!
//! A VPK file starts with a fixed header, followed by a three-level
//! directory tree (extension, directory, file name), followed by the entry
//! data. Version 2 appends MD5 checksum sections after the data.

mod archive;
mod entry;
pub(crate) mod reader;
mod writer;

pub use archive::VpkArchive;
pub use entry::VpkEntry;
pub use writer::{PackSummary, VpkWriter};

use crate::{Error, Result};

/// Magic number at the start of every VPK file, stored little-endian.
pub(crate) const VPK_SIGNATURE: u32 = 0x55aa1234;

/// Archive index value marking entry data stored in the directory file
/// itself rather than in a companion archive.
pub(crate) const EMBEDDED_ARCHIVE_INDEX: u16 = 0x7fff;

/// Terminator written after each directory entry record.
pub(crate) const RECORD_TERMINATOR: u16 = 0xffff;

/// VPK format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VpkVersion {
    /// Version 1: header carries only the tree size.
    V1,
    /// Version 2: adds section sizes and MD5 checksums.
    #[default]
    V2,
}

impl VpkVersion {
    /// Returns the on-disk version number.
    pub fn as_u32(self) -> u32 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }

    /// Maps an on-disk version number to a known version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] for anything other than 1 or 2.
    pub fn from_u32(version: u32) -> Result<Self> {
        match version {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            _ => Err(Error::UnsupportedVersion { version }),
        }
    }

    /// Returns the header length in bytes for this version.
    pub(crate) fn header_len(self) -> u64 {
        match self {
            Self::V1 => 12,
            Self::V2 => 28,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_roundtrip() {
        assert_eq!(VpkVersion::from_u32(1).unwrap(), VpkVersion::V1);
        assert_eq!(VpkVersion::from_u32(2).unwrap(), VpkVersion::V2);
        assert_eq!(VpkVersion::V1.as_u32(), 1);
        assert_eq!(VpkVersion::V2.as_u32(), 2);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let err = VpkVersion::from_u32(3).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { version: 3 }));
        assert!(VpkVersion::from_u32(0).is_err());
    }

    #[test]
    fn test_default_is_v2() {
        assert_eq!(VpkVersion::default(), VpkVersion::V2);
    }

    #[test]
    fn test_header_lengths() {
        assert_eq!(VpkVersion::V1.header_len(), 12);
        assert_eq!(VpkVersion::V2.header_len(), 28);
    }
}
