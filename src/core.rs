use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extension of record files (without the leading dot).
pub const RECORD_EXTENSION: &str = "json";

/// Suffix appended to a record file name while it is being written.
pub const TEMP_SUFFIX: &str = "tmp";

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the store.
///
/// Every error goes back to the immediate caller; nothing is retried here.
#[derive(Debug, Error)]
pub enum Error {
    /// Empty identifier or empty root. Detected before the filesystem is touched.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A resource exists both under its bare name and with the record
    /// extension. Holds the bare path.
    #[error("ambiguous resource: both {0:?} and its .json form exist")]
    Ambiguous(PathBuf),

    /// The collection or resource does not exist.
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    /// The value cannot be represented as a record.
    #[error("unable to encode record: {0}")]
    Encode(#[source] serde_json::Error),

    /// Stored content is not a valid record.
    #[error("unable to decode record: {0}")]
    Decode(#[source] serde_json::Error),

    /// Underlying filesystem failure.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Error::Ambiguous(_))
    }
}

pub(crate) mod utils {
    use super::*;

    /// Lexically cleans `path`: drops `.` components and trailing separators,
    /// folds `name/..` pairs. Leading `..` of a relative path are kept, `..`
    /// right after the root is dropped.
    pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
        let mut parts: Vec<Component> = Vec::new();

        for component in path.as_ref().components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => match parts.last() {
                    Some(Component::Normal(_)) => {
                        parts.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => parts.push(component),
                },
                _ => parts.push(component),
            }
        }

        if parts.is_empty() {
            return PathBuf::from(".");
        }
        parts.iter().collect()
    }

    /// Appends `.ext` to the file name of `path` (keeps any existing extension).
    pub fn with_suffix<P: AsRef<Path>>(path: P, ext: &str) -> PathBuf {
        let mut os = path.as_ref().as_os_str().to_owned();
        os.push(".");
        os.push(ext);
        PathBuf::from(os)
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize("/a/b/c/"), PathBuf::from("/a/b/c"));
        assert_eq!(normalize("/a/b/./c"), PathBuf::from("/a/b/c"));
        assert_eq!(normalize("/a/b/../c"), PathBuf::from("/a/c"));
        assert_eq!(normalize("/"), PathBuf::from("/"));
        assert_eq!(normalize("/.."), PathBuf::from("/"));
        assert_eq!(normalize("./"), PathBuf::from("."));
        assert_eq!(normalize("./a"), PathBuf::from("a"));
        assert_eq!(normalize("../a"), PathBuf::from("../a"));
        assert_eq!(normalize("a/../../b"), PathBuf::from("../b"));
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(with_suffix("/db/users/alice", "json"), PathBuf::from("/db/users/alice.json"));
        assert_eq!(
            with_suffix("/db/users/alice.json", TEMP_SUFFIX),
            PathBuf::from("/db/users/alice.json.tmp")
        );
        // dots inside the name are not treated as an extension
        assert_eq!(with_suffix("v1.2", "json"), PathBuf::from("v1.2.json"));
    }

    #[test]
    fn test_error_kinds() {
        let err = Error::InvalidArgument("collection is empty".into());
        assert!(err.is_invalid_argument());
        assert!(!err.is_not_found());

        let err = Error::NotFound(PathBuf::from("/db/users"));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "/db/users does not exist");

        let err = Error::Ambiguous(PathBuf::from("/db/users/alice"));
        assert!(err.is_ambiguous());
        assert!(!err.is_invalid_argument());
        assert!(err.to_string().contains("/db/users/alice"));
    }
}
