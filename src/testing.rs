//! Test support
//!
//! A deterministic, in-memory [`FileInfo`] provider so filesystem checks
//! can run without touching the real filesystem. Kept in the library (not
//! behind `cfg(test)`) so integration tests and downstream users can reuse
//! it.

use crate::check::FileInfo;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Clone)]
struct MockEntry {
    directory: bool,
    size: u64,
    mtime: SystemTime,
}

/// In-memory filesystem for deterministic check tests.
///
/// Entries are registered up front; queries never touch the OS. Interior
/// mutability keeps registration ergonomic after the mock is shared as
/// `Rc<dyn FileInfo>`.
pub struct MockFileInfo {
    entries: RefCell<HashMap<PathBuf, MockEntry>>,
}

impl MockFileInfo {
    pub fn new() -> Self {
        MockFileInfo {
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Register a regular file of `size` bytes, modified at the epoch.
    pub fn add_file(&self, path: &str, size: u64) {
        self.add_file_with_mtime(path, size, SystemTime::UNIX_EPOCH);
    }

    /// Register a regular file with an explicit modification time.
    pub fn add_file_with_mtime(&self, path: &str, size: u64, mtime: SystemTime) {
        self.entries.borrow_mut().insert(
            PathBuf::from(path),
            MockEntry {
                directory: false,
                size,
                mtime,
            },
        );
    }

    /// Register a directory.
    pub fn add_directory(&self, path: &str) {
        self.entries.borrow_mut().insert(
            PathBuf::from(path),
            MockEntry {
                directory: true,
                size: 0,
                mtime: SystemTime::UNIX_EPOCH,
            },
        );
    }

    fn get(&self, path: &Path) -> Option<MockEntry> {
        self.entries.borrow().get(path).cloned()
    }
}

impl Default for MockFileInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl FileInfo for MockFileInfo {
    fn exists(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    fn is_directory(&self, path: &Path) -> bool {
        self.get(path).is_some_and(|e| e.directory)
    }

    fn is_absolute(&self, path: &Path) -> bool {
        path.is_absolute()
    }

    fn size(&self, path: &Path) -> Option<u64> {
        self.get(path).filter(|e| !e.directory).map(|e| e.size)
    }

    fn mod_time(&self, path: &Path) -> Option<SystemTime> {
        self.get(path).map(|e| e.mtime)
    }
}
