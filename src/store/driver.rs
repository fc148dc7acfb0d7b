//! The storage driver: JSON records kept as files under a root directory.
//!
//! ### Layout
//! ```text
//! <root>/
//!   <collection>/
//!     <resource>.json       one record per file
//!     <resource>.json.tmp   only while a write is in flight
//! ```
//!
//! ### Concurrency
//! - `write()` and `delete()` hold the collection lock for their whole
//!   filesystem mutation, so calls on the same collection never interleave.
//!   Calls on different collections run in parallel.
//! - `read()` and `read_all()` take no lock. A record is replaced by rename,
//!   so readers see either the old or the new content, never a torn one.
//! - Locks are in-process only: two drivers over the same root are not
//!   coordinated.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::Level;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::{Error, Result, TEMP_SUFFIX, utils};
use crate::store::codec;
use crate::store::locks::LockRegistry;
use crate::store::options::{Options, Sink};
use crate::store::paths::{Located, PathResolver};

/// Handle to a document store rooted at one directory.
///
/// The driver keeps no record data in memory; the filesystem is the only
/// source of truth. It is `Send + Sync` and meant to be shared (e.g. in an
/// `Arc`) by every thread that uses the store.
///
/// ### Example:
/// ```
/// use docstore_kit::Driver;
/// use serde_json::{Value, json};
///
/// let root = std::env::temp_dir().join("docstore_doc_example");
/// let db = Driver::new(&root).unwrap();
///
/// db.write("users", "alice", &json!({"name": "Alice", "age": 23})).unwrap();
///
/// let alice: Value = db.read("users", "alice").unwrap();
/// assert_eq!(alice["age"], 23);
///
/// db.delete("users", "alice").unwrap();
/// assert!(db.read::<Value>("users", "alice").unwrap_err().is_not_found());
/// ```
#[derive(Debug)]
pub struct Driver {
    paths: PathResolver,
    locks: LockRegistry,
    log: Sink,
    sync: bool,
}

impl Driver {
    /// Opens the store at `root` with default [`Options`].
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::with_options(root, Options::default())
    }

    /// Opens the store at `root`, creating the directory and any missing
    /// parents. An existing directory is reused as is.
    pub fn with_options<P: AsRef<Path>>(root: P, options: Options) -> Result<Self> {
        let root = root.as_ref();
        if root.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("invalid root path: empty".into()));
        }
        let root = utils::normalize(root);

        let sync = options.sync();
        let driver = Self {
            paths: PathResolver::new(&root),
            locks: LockRegistry::new(),
            log: options.into_sink(),
            sync,
        };

        match fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => {
                emit!(
                    driver.log,
                    Level::Debug,
                    "Using '{}' (database already exists)", root.display()
                );
                return Ok(driver);
            }
            Ok(_) => {
                return Err(Error::io(
                    &root,
                    std::io::Error::other("root exists and is not a directory"),
                ));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(&root, e)),
        }

        emit!(
            driver.log,
            Level::Debug,
            "Creating the database at '{}'", root.display()
        );
        fs::create_dir_all(&root).map_err(|e| Error::io(&root, e))?;
        Ok(driver)
    }

    /// Returns the normalized root directory.
    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    /// Stores `value` as `collection/resource.json`, replacing any previous
    /// record of that name.
    ///
    /// The encoded record goes to `resource.json.tmp` first and is then renamed
    /// over the target, so the record file always holds a complete value.
    /// The collection directory is created on demand.
    ///
    /// # Errors
    /// * `InvalidArgument` - empty `collection` or `resource`.
    /// * `Encode` - `value` cannot be serialized; the existing record is untouched.
    /// * `Io` - directory creation, temp-file write or rename failed.
    pub fn write<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        resource: &str,
        value: &T,
    ) -> Result<()> {
        let target = self.paths.resolve(collection, resource)?;
        let dir = self.paths.resolve_collection(collection)?;

        let lock = self.locks.lock_for(collection);
        let _guard = lock.lock();

        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        let bytes = codec::encode(value)?;
        self.replace(&target, &bytes)?;

        emit!(
            self.log,
            Level::Debug,
            "Wrote record '{}' ({} bytes)", target.display(), bytes.len()
        );
        Ok(())
    }

    /// Writes `bytes` to the temp sibling of `target` and renames it into place.
    fn replace(&self, target: &Path, bytes: &[u8]) -> Result<()> {
        let temp = PathResolver::temp_for(target);
        let mut guard = TempFileGuard::new(temp.clone());

        let mut file = fs::File::create(&temp).map_err(|e| Error::io(&temp, e))?;
        file.write_all(bytes).map_err(|e| Error::io(&temp, e))?;
        if self.sync {
            file.sync_all().map_err(|e| Error::io(&temp, e))?;
        }
        drop(file);

        fs::rename(&temp, target).map_err(|e| Error::io(target, e))?;
        guard.disarm();
        Ok(())
    }

    /// Reads and decodes one record.
    ///
    /// `resource` may be given with or without the `.json` extension: an entry
    /// named exactly `resource` is read verbatim, otherwise `resource.json`.
    /// If both exist the name is ambiguous and rejected.
    ///
    /// # Errors
    /// * `InvalidArgument` - empty identifier.
    /// * `Ambiguous` - both `resource` and `resource.json` exist.
    /// * `NotFound` - no record of that name (a subtree is not a record).
    /// * `Decode` - content is not a valid `T`.
    /// * `Io` - the lookup or the read failed.
    pub fn read<T: DeserializeOwned>(&self, collection: &str, resource: &str) -> Result<T> {
        let path = match self.locate(collection, resource)? {
            Located::File(path) => path,
            Located::Subtree(path) => return Err(Error::NotFound(path)),
        };

        let bytes = fs::read(&path).map_err(|e| match e.kind() {
            // removed between lookup and read
            std::io::ErrorKind::NotFound => Error::NotFound(path.clone()),
            _ => Error::io(&path, e),
        })?;
        codec::decode(&bytes)
    }

    /// Returns the raw bytes of every record in `collection`, in directory
    /// listing order. Content is not checked; decoding is left to the caller
    /// (see [`Driver::read_all_as`]).
    ///
    /// Subdirectories and `*.tmp` leftovers of interrupted writes are skipped,
    /// and so are entries a concurrent `delete()` removed after the listing.
    /// Any other failing read aborts the whole call.
    pub fn read_all(&self, collection: &str) -> Result<Vec<Vec<u8>>> {
        let dir = self.paths.resolve_collection(collection)?;

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(dir));
            }
            Err(e) => return Err(Error::io(&dir, e)),
        };

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&dir, e))?;
            let path = entry.path();

            if is_temp_file(&path) {
                emit!(
                    self.log,
                    Level::Trace,
                    "Skipping leftover '{}'", path.display()
                );
                continue;
            }
            match entry.file_type() {
                Ok(file_type) if file_type.is_dir() => continue,
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(Error::io(&path, e)),
            }

            match fs::read(&path) {
                Ok(bytes) => records.push(bytes),
                // removed after listing
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    emit!(self.log, Level::Trace, "Skipping vanished '{}'", path.display());
                }
                Err(e) => return Err(Error::io(&path, e)),
            }
        }

        Ok(records)
    }

    /// [`Driver::read_all`] followed by decoding of every record.
    pub fn read_all_as<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        self.read_all(collection)?
            .iter()
            .map(|record| codec::decode(record))
            .collect()
    }

    /// Removes a record file, or a whole directory tree stored under the
    /// resource name.
    ///
    /// The name is resolved like in [`Driver::read`]. A subtree is removed
    /// recursively; an interrupted removal may leave it partially deleted.
    ///
    /// # Errors
    /// * `InvalidArgument` - empty identifier.
    /// * `Ambiguous` - both `resource` and `resource.json` exist.
    /// * `NotFound` - neither a record nor a subtree of that name exists.
    /// * `Io` - the lookup or the removal failed.
    pub fn delete(&self, collection: &str, resource: &str) -> Result<()> {
        self.paths.resolve_bare(collection, resource)?;

        let lock = self.locks.lock_for(collection);
        let _guard = lock.lock();

        match self.locate(collection, resource)? {
            Located::Subtree(path) => {
                fs::remove_dir_all(&path).map_err(|e| Error::io(&path, e))?;
                emit!(
                    self.log,
                    Level::Debug,
                    "Removed subtree '{}'", path.display()
                );
            }
            Located::File(path) => {
                fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
                emit!(
                    self.log,
                    Level::Debug,
                    "Removed record '{}'", path.display()
                );
            }
        }
        Ok(())
    }

    fn locate(&self, collection: &str, resource: &str) -> Result<Located> {
        let located = self.paths.locate(collection, resource);
        match &located {
            Ok(found) => emit!(
                self.log,
                Level::Trace,
                "Resolved '{collection}/{resource}' to {found:?}"
            ),
            Err(err @ Error::Ambiguous(_)) => emit!(self.log, Level::Warn, "{err}"),
            Err(_) => {}
        }
        located
    }
}

fn is_temp_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == TEMP_SUFFIX)
}

/// Removes the temp file on drop unless the write was committed.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}
