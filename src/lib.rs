//! A minimal embedded document store that keeps JSON records as files.
//!
//! ### Overview
//!
//! `docstore-kit` persists serializable values under a single root directory. Records are
//! grouped into named collections (subdirectories); every record is one `<name>.json` file.
//! There is no server, no query language and no index: the directory tree is the database.
//!
//! **Key ideas**:
//! - **Crash-safe writes**: a record is written to a temp sibling and renamed into place,
//!   so a record file never holds a partial value.
//! - **Per-collection locking**: writes and deletes in one collection are serialized,
//!   different collections proceed in parallel. Locks are in-process only.
//! - **Typed records**: any `serde` type can be stored and read back; `serde_json::Value`
//!   works for schema-free data.
//! - **Plain files**: records are tab-indented JSON, easy to inspect and edit by hand.
//!
//! ### Example
//!
//! ```
//! use docstore_kit::Driver;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! let root = std::env::temp_dir().join("docstore_lib_example");
//! let db = Driver::new(&root).unwrap();
//!
//! let john = User { name: "John".into(), age: 23 };
//! db.write("users", "john", &john).unwrap();
//!
//! let back: User = db.read("users", "john").unwrap();
//! assert_eq!(back, john);
//!
//! let all: Vec<User> = db.read_all_as("users").unwrap();
//! assert!(all.contains(&john));
//! ```

mod core;
mod store;

pub use crate::core::{Error, RECORD_EXTENSION, Result, TEMP_SUFFIX, VERSION};
pub use store::{
    CollectionLock, Driver, Located, LockRegistry, Options, PathResolver, decode, encode,
};
