//! Mapping of `(collection, resource)` identities onto host paths.
//!
//! The resolver itself is pure path arithmetic; [`PathResolver::locate`] is
//! the only place that looks at the filesystem, and it does so without taking
//! any collection lock.

use std::io;
use std::path::{Path, PathBuf};

use crate::core::{Error, RECORD_EXTENSION, Result, TEMP_SUFFIX, utils};

/// Where an existing resource lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// A single record file.
    File(PathBuf),
    /// A directory tree stored under the resource name.
    Subtree(PathBuf),
}

impl Located {
    pub fn path(&self) -> &Path {
        match self {
            Located::File(path) | Located::Subtree(path) => path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns `root/collection`.
    pub fn resolve_collection(&self, collection: &str) -> Result<PathBuf> {
        check_collection(collection)?;
        Ok(self.root.join(collection))
    }

    /// Returns `root/collection/resource.json`.
    pub fn resolve(&self, collection: &str, resource: &str) -> Result<PathBuf> {
        Ok(utils::with_suffix(
            self.resolve_bare(collection, resource)?,
            RECORD_EXTENSION,
        ))
    }

    /// Returns `root/collection/resource`, without the record extension.
    pub fn resolve_bare(&self, collection: &str, resource: &str) -> Result<PathBuf> {
        check_collection(collection)?;
        check_resource(resource)?;
        Ok(self.root.join(collection).join(resource))
    }

    /// Sibling file used while `record` is being written.
    pub fn temp_for<P: AsRef<Path>>(record: P) -> PathBuf {
        utils::with_suffix(record, TEMP_SUFFIX)
    }

    /// Finds an existing resource, accepting its name with or without the
    /// record extension.
    ///
    /// The bare path is checked first: a directory there is a [`Located::Subtree`],
    /// a file is read verbatim. Otherwise `resource.json` is tried.
    /// Existing bare *and* extended entries are rejected as ambiguous.
    pub fn locate(&self, collection: &str, resource: &str) -> Result<Located> {
        let bare = self.resolve_bare(collection, resource)?;
        let extended = utils::with_suffix(&bare, RECORD_EXTENSION);

        let bare_kind = kind_of(&bare)?;
        let extended_kind = kind_of(&extended)?;

        match (bare_kind, extended_kind) {
            (Some(_), Some(_)) => Err(Error::Ambiguous(bare)),
            (Some(Kind::Dir), None) => Ok(Located::Subtree(bare)),
            (Some(Kind::File), None) => Ok(Located::File(bare)),
            (None, Some(Kind::File)) => Ok(Located::File(extended)),
            (None, Some(Kind::Dir)) => Ok(Located::Subtree(extended)),
            (None, None) => Err(Error::NotFound(bare)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    File,
    Dir,
}

/// `Ok(None)` only when the path does not exist; any other metadata failure
/// (permissions, broken parent) is reported as I/O.
fn kind_of(path: &Path) -> Result<Option<Kind>> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(Some(Kind::Dir)),
        Ok(_) => Ok(Some(Kind::File)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

fn check_collection(collection: &str) -> Result<()> {
    if collection.is_empty() {
        return Err(Error::InvalidArgument(
            "missing collection: no directory given for the record".into(),
        ));
    }
    Ok(())
}

fn check_resource(resource: &str) -> Result<()> {
    if resource.is_empty() {
        return Err(Error::InvalidArgument(
            "missing resource: no name given for the record".into(),
        ));
    }
    Ok(())
}
