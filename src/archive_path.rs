//! Archive path type with validation for secure path handling.

use crate::{Error, Result};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Maximum length for archive paths (in bytes).
///
/// This limit prevents denial-of-service attacks where a malicious archive
/// specifies extremely long paths. 32KB is well above any reasonable file
/// system path limit (e.g., Linux PATH_MAX is 4KB, Windows MAX_PATH is ~260).
const MAX_PATH_LENGTH: usize = 32768;

/// A validated archive path that ensures security against path traversal attacks.
///
/// `ArchivePath` uses forward slashes as separators regardless of the host
/// platform and validates that:
/// - No NUL bytes are present
/// - The path is not absolute (does not start with `/`)
/// - No empty segments exist (no `//` or trailing `/`)
/// - No `.` or `..` segments are present (prevents path traversal)
///
/// # Examples
///
/// ```
/// use reefmerge::ArchivePath;
///
/// // Valid paths
/// let path = ArchivePath::new("maps/dota/start.vmap_c").unwrap();
/// assert_eq!(path.as_str(), "maps/dota/start.vmap_c");
///
/// // Invalid paths are rejected
/// assert!(ArchivePath::new("../secret").is_err());
/// assert!(ArchivePath::new("/absolute/path").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchivePath(String);

impl ArchivePath {
    /// Creates a new `ArchivePath` from a string, validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the path:
    /// - Contains NUL bytes
    /// - Is an absolute path (starts with `/`)
    /// - Contains empty segments (e.g., `a//b`)
    /// - Contains `.` or `..` segments
    /// - Is empty
    pub fn new(s: &str) -> Result<Self> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }

    /// Validates an archive path string.
    fn validate(s: &str) -> Result<()> {
        // Check for NUL bytes
        if s.contains('\0') {
            return Err(Error::InvalidArchivePath("contains NUL byte".into()));
        }

        // Check for empty path
        if s.is_empty() {
            return Err(Error::InvalidArchivePath("empty path".into()));
        }

        // Check for path length limit
        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::InvalidArchivePath(format!(
                "path exceeds maximum length of {} bytes",
                MAX_PATH_LENGTH
            )));
        }

        // Check for absolute path
        if s.starts_with('/') {
            return Err(Error::InvalidArchivePath(
                "absolute path not allowed".into(),
            ));
        }

        // Check for trailing slash
        if s.ends_with('/') {
            return Err(Error::InvalidArchivePath(
                "trailing slash not allowed".into(),
            ));
        }

        // Check each segment
        for segment in s.split('/') {
            if segment.is_empty() {
                return Err(Error::InvalidArchivePath(
                    "empty segment (consecutive slashes)".into(),
                ));
            }
            if segment == "." {
                return Err(Error::InvalidArchivePath("'.' segment not allowed".into()));
            }
            if segment == ".." {
                return Err(Error::InvalidArchivePath(
                    "'..' segment not allowed (path traversal)".into(),
                ));
            }
        }

        Ok(())
    }

    /// Builds an `ArchivePath` from a relative host path.
    ///
    /// Host separators are replaced with forward slashes; everything else
    /// goes through the same validation as [`ArchivePath::new`]. This is the
    /// inverse of [`to_host_path`][Self::to_host_path] and is used when
    /// scanning a staging directory back into archive entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the host path is absolute, contains `.`/`..`
    /// components, or has a non-UTF-8 component.
    pub fn from_host_relative(path: &Path) -> Result<Self> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => match part.to_str() {
                    Some(s) => segments.push(s),
                    None => {
                        return Err(Error::InvalidArchivePath(format!(
                            "non-UTF-8 path component in {}",
                            path.display()
                        )));
                    }
                },
                _ => {
                    return Err(Error::InvalidArchivePath(format!(
                        "host path must be relative without '.' or '..': {}",
                        path.display()
                    )));
                }
            }
        }
        Self::new(&segments.join("/"))
    }

    /// Renders this path as a relative host path.
    ///
    /// Each forward-slash segment becomes one host path component, so the
    /// result uses the platform's separator. Used when materializing an
    /// entry into the staging directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use reefmerge::ArchivePath;
    ///
    /// let path = ArchivePath::new("maps/dota/start.vmap_c").unwrap();
    /// let host = path.to_host_path();
    /// assert_eq!(host.file_name().unwrap(), "start.vmap_c");
    /// ```
    pub fn to_host_path(&self) -> PathBuf {
        self.0.split('/').collect()
    }

    /// Returns the path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins this path with another segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting path would be invalid.
    pub fn join(&self, other: &str) -> Result<Self> {
        let joined = format!("{}/{}", self.0, other);
        Self::new(&joined)
    }

    /// Returns the parent directory of this path, if any.
    ///
    /// Returns `None` if this path has no parent (i.e., is a single segment).
    pub fn parent(&self) -> Option<Self> {
        self.0.rfind('/').map(|idx| {
            // A strict prefix of a valid path ending at a separator is valid
            Self(self.0[..idx].to_string())
        })
    }

    /// Returns the file name (last segment) of this path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns the file extension, if any.
    ///
    /// The extension is the portion of the file name after the last `.`.
    /// Returns `None` if there is no extension, if the file name starts
    /// with a dot (e.g., `.gitignore`), or if it ends with one.
    ///
    /// # Examples
    ///
    /// ```
    /// use reefmerge::ArchivePath;
    ///
    /// let path = ArchivePath::new("maps/dota.vmap_c").unwrap();
    /// assert_eq!(path.extension(), Some("vmap_c"));
    ///
    /// let path = ArchivePath::new("dir/file").unwrap();
    /// assert_eq!(path.extension(), None);
    ///
    /// let path = ArchivePath::new(".gitignore").unwrap();
    /// assert_eq!(path.extension(), None);
    /// ```
    pub fn extension(&self) -> Option<&str> {
        let file_name = self.file_name();
        // Find the last dot, but not if it's the first or last character
        let dot_pos = file_name.rfind('.')?;
        if dot_pos == 0 || dot_pos == file_name.len() - 1 {
            None
        } else {
            Some(&file_name[dot_pos + 1..])
        }
    }

    /// Returns an iterator over the path components (segments).
    ///
    /// # Examples
    ///
    /// ```
    /// use reefmerge::ArchivePath;
    ///
    /// let path = ArchivePath::new("a/b/c.txt").unwrap();
    /// let components: Vec<_> = path.components().collect();
    /// assert_eq!(components, vec!["a", "b", "c.txt"]);
    /// ```
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Returns true if this path starts with the given prefix.
    ///
    /// This performs a component-wise comparison, not a string prefix match.
    /// For example, `"foo/bar"` starts with `"foo"` but not `"fo"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use reefmerge::ArchivePath;
    ///
    /// let path = ArchivePath::new("maps/dota/start.vmap_c").unwrap();
    /// assert!(path.starts_with("maps"));
    /// assert!(path.starts_with("maps/dota"));
    /// assert!(!path.starts_with("map")); // Not a component boundary
    /// assert!(!path.starts_with("other"));
    /// ```
    pub fn starts_with(&self, prefix: &str) -> bool {
        if prefix.is_empty() {
            return true;
        }
        // Component-wise comparison
        let self_components: Vec<_> = self.0.split('/').collect();
        let prefix_components: Vec<_> = prefix.split('/').collect();

        if prefix_components.len() > self_components.len() {
            return false;
        }

        self_components
            .iter()
            .zip(prefix_components.iter())
            .all(|(a, b)| a == b)
    }
}

impl AsRef<str> for ArchivePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for ArchivePath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ArchivePath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_simple_file() {
        let path = ArchivePath::new("file.txt").unwrap();
        assert_eq!(path.as_str(), "file.txt");
    }

    #[test]
    fn test_valid_nested_path() {
        let path = ArchivePath::new("maps/dota/start.vmap_c").unwrap();
        assert_eq!(path.as_str(), "maps/dota/start.vmap_c");
    }

    #[test]
    fn test_valid_deeply_nested() {
        let path = ArchivePath::new("a/b/c/d.txt").unwrap();
        assert_eq!(path.as_str(), "a/b/c/d.txt");
    }

    #[test]
    fn test_valid_unicode() {
        let path = ArchivePath::new("日本語/файл.txt").unwrap();
        assert_eq!(path.as_str(), "日本語/файл.txt");
    }

    #[test]
    fn test_invalid_empty() {
        let err = ArchivePath::new("").unwrap_err();
        assert!(matches!(err, Error::InvalidArchivePath(_)));
    }

    #[test]
    fn test_invalid_nul_byte() {
        let err = ArchivePath::new("file\0.txt").unwrap_err();
        assert!(matches!(err, Error::InvalidArchivePath(_)));
        assert!(err.to_string().contains("NUL"));
    }

    #[test]
    fn test_invalid_absolute_path() {
        let err = ArchivePath::new("/etc/passwd").unwrap_err();
        assert!(matches!(err, Error::InvalidArchivePath(_)));
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn test_invalid_empty_segment() {
        let err = ArchivePath::new("a//b").unwrap_err();
        assert!(matches!(err, Error::InvalidArchivePath(_)));
        assert!(err.to_string().contains("empty segment"));
    }

    #[test]
    fn test_invalid_trailing_slash() {
        let err = ArchivePath::new("dir/").unwrap_err();
        assert!(matches!(err, Error::InvalidArchivePath(_)));
        assert!(err.to_string().contains("trailing slash"));
    }

    #[test]
    fn test_invalid_dot_segment() {
        let err = ArchivePath::new("./file").unwrap_err();
        assert!(matches!(err, Error::InvalidArchivePath(_)));
        assert!(err.to_string().contains("'.'"));
    }

    #[test]
    fn test_invalid_dotdot_traversal() {
        let err = ArchivePath::new("../secret").unwrap_err();
        assert!(matches!(err, Error::InvalidArchivePath(_)));
        assert!(err.to_string().contains(".."));
    }

    #[test]
    fn test_invalid_dotdot_in_middle() {
        let err = ArchivePath::new("a/../b").unwrap_err();
        assert!(matches!(err, Error::InvalidArchivePath(_)));
    }

    #[test]
    fn test_file_name_nested() {
        let path = ArchivePath::new("dir/subdir/file.txt").unwrap();
        assert_eq!(path.file_name(), "file.txt");
    }

    #[test]
    fn test_parent() {
        let path = ArchivePath::new("a/b/c").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.as_str(), "a/b");

        let path = ArchivePath::new("file.txt").unwrap();
        assert!(path.parent().is_none());
    }

    #[test]
    fn test_join() {
        let path = ArchivePath::new("dir").unwrap();
        let joined = path.join("file.txt").unwrap();
        assert_eq!(joined.as_str(), "dir/file.txt");
    }

    #[test]
    fn test_join_invalid() {
        let path = ArchivePath::new("dir").unwrap();
        assert!(path.join("../escape").is_err());
    }

    #[test]
    fn test_extension() {
        assert_eq!(
            ArchivePath::new("maps/dota.vmap_c").unwrap().extension(),
            Some("vmap_c")
        );
        assert_eq!(ArchivePath::new("a/b").unwrap().extension(), None);
        assert_eq!(ArchivePath::new(".gitignore").unwrap().extension(), None);
        assert_eq!(ArchivePath::new("trailing.").unwrap().extension(), None);
        assert_eq!(
            ArchivePath::new("archive.tar.gz").unwrap().extension(),
            Some("gz")
        );
    }

    #[test]
    fn test_starts_with_component_boundary() {
        let path = ArchivePath::new("maps/dota/start.vmap_c").unwrap();
        assert!(path.starts_with("maps"));
        assert!(path.starts_with("maps/dota"));
        assert!(path.starts_with("maps/dota/start.vmap_c"));
        assert!(!path.starts_with("map"));
        assert!(!path.starts_with("maps/do"));
        assert!(!path.starts_with("maps/dota/start.vmap_c/deeper"));
    }

    #[test]
    fn test_starts_with_empty_prefix() {
        let path = ArchivePath::new("a/b").unwrap();
        assert!(path.starts_with(""));
    }

    #[test]
    fn test_to_host_path() {
        let path = ArchivePath::new("maps/dota/start.vmap_c").unwrap();
        let host = path.to_host_path();
        let expected: PathBuf = ["maps", "dota", "start.vmap_c"].iter().collect();
        assert_eq!(host, expected);
    }

    #[test]
    fn test_from_host_relative() {
        let host: PathBuf = ["maps", "dota", "start.vmap_c"].iter().collect();
        let path = ArchivePath::from_host_relative(&host).unwrap();
        assert_eq!(path.as_str(), "maps/dota/start.vmap_c");
    }

    #[test]
    fn test_from_host_relative_rejects_absolute() {
        let err = ArchivePath::from_host_relative(Path::new("/etc/passwd")).unwrap_err();
        assert!(matches!(err, Error::InvalidArchivePath(_)));
    }

    #[test]
    fn test_from_host_relative_rejects_traversal() {
        let err = ArchivePath::from_host_relative(Path::new("../escape")).unwrap_err();
        assert!(matches!(err, Error::InvalidArchivePath(_)));
    }

    #[test]
    fn test_host_path_roundtrip() {
        let original = ArchivePath::new("a/b/c.txt").unwrap();
        let roundtripped = ArchivePath::from_host_relative(&original.to_host_path()).unwrap();
        assert_eq!(original, roundtripped);
    }

    #[test]
    fn test_max_length() {
        let long = "a/".repeat(MAX_PATH_LENGTH / 2) + "b";
        let err = ArchivePath::new(&long).unwrap_err();
        assert!(matches!(err, Error::InvalidArchivePath(_)));
        assert!(err.to_string().contains("maximum length"));
    }

    #[test]
    fn test_try_from() {
        let path: ArchivePath = "dir/file.txt".try_into().unwrap();
        assert_eq!(path.as_str(), "dir/file.txt");

        let path: ArchivePath = String::from("dir/other.txt").try_into().unwrap();
        assert_eq!(path.as_str(), "dir/other.txt");

        let result: Result<ArchivePath> = "../bad".try_into();
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        let path = ArchivePath::new("maps/dota.vmap_c").unwrap();
        assert_eq!(format!("{}", path), "maps/dota.vmap_c");
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let a = ArchivePath::new("maps/a.txt").unwrap();
        let b = ArchivePath::new("maps/b.txt").unwrap();
        assert!(a < b);
    }
}
