//! Exit codes for the CLI tool.

use reefmerge::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Archive format error
pub const BAD_ARCHIVE: i32 = 3;
/// I/O error
pub const IO_ERROR: i32 = 5;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    FatalError,
    BadArchive,
    IoError,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::IoError => IO_ERROR,
        }
    }
}

/// Converts a reefmerge error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::InvalidFormat(_) | Error::CorruptTree { .. } => ExitCode::BadArchive,
        Error::CrcMismatch { .. } => ExitCode::BadArchive,
        Error::UnsupportedVersion { .. } => ExitCode::BadArchive,
        Error::UnsupportedFeature { .. } => ExitCode::BadArchive,
        Error::InvalidArchivePath(_) => ExitCode::BadArchive,
        Error::EntryNotFound { .. } => ExitCode::BadArchive,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
