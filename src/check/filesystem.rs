//! Filesystem predicate checks
//!
//! These checks treat the staged value as a path and query an injected
//! [`FileInfo`] provider. Production code passes [`OsFileInfo`]; tests pass
//! the deterministic mock from [`crate::testing`] so no real filesystem is
//! touched. The queries are synchronous and block on the underlying OS
//! call.

use crate::check::{Check, CheckCategory, CheckFailure};
use std::path::Path;
use std::rc::Rc;
use std::time::SystemTime;

/// Filesystem queries the checks need. Injectable so checks can be tested
/// without touching the real filesystem.
pub trait FileInfo {
    fn exists(&self, path: &Path) -> bool;
    fn is_directory(&self, path: &Path) -> bool;
    fn is_absolute(&self, path: &Path) -> bool;
    /// File size in bytes, `None` if the path cannot be inspected.
    fn size(&self, path: &Path) -> Option<u64>;
    /// Last modification time, `None` if the path cannot be inspected.
    fn mod_time(&self, path: &Path) -> Option<SystemTime>;
}

/// [`FileInfo`] backed by `std::fs`.
pub struct OsFileInfo;

impl FileInfo for OsFileInfo {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_absolute(&self, path: &Path) -> bool {
        path.is_absolute()
    }

    fn size(&self, path: &Path) -> Option<u64> {
        std::fs::metadata(path).ok().map(|m| m.len())
    }

    fn mod_time(&self, path: &Path) -> Option<SystemTime> {
        std::fs::metadata(path).ok().and_then(|m| m.modified().ok())
    }
}

enum FsPredicate {
    Exists,
    IsDirectory,
    IsAbsolute,
    SizeAtLeast(u64),
    SizeAtMost(u64),
    ModifiedAfter(SystemTime),
    ModifiedBefore(SystemTime),
}

/// One filesystem predicate over a staged path value.
pub struct FileCheck {
    provider: Rc<dyn FileInfo>,
    predicate: FsPredicate,
}

impl FileCheck {
    fn evaluate(&self, path: &Path) -> Result<(), String> {
        match &self.predicate {
            FsPredicate::Exists => {
                if self.provider.exists(path) {
                    Ok(())
                } else {
                    Err("path does not exist".to_string())
                }
            }
            FsPredicate::IsDirectory => {
                if self.provider.is_directory(path) {
                    Ok(())
                } else {
                    Err("path is not a directory".to_string())
                }
            }
            FsPredicate::IsAbsolute => {
                if self.provider.is_absolute(path) {
                    Ok(())
                } else {
                    Err("path is not absolute".to_string())
                }
            }
            FsPredicate::SizeAtLeast(min) => match self.provider.size(path) {
                Some(size) if size >= *min => Ok(()),
                Some(size) => Err(format!("size {size} is below {min}")),
                None => Err("size unavailable".to_string()),
            },
            FsPredicate::SizeAtMost(max) => match self.provider.size(path) {
                Some(size) if size <= *max => Ok(()),
                Some(size) => Err(format!("size {size} exceeds {max}")),
                None => Err("size unavailable".to_string()),
            },
            FsPredicate::ModifiedAfter(instant) => match self.provider.mod_time(path) {
                Some(mtime) if mtime > *instant => Ok(()),
                Some(_) => Err("modification time is too old".to_string()),
                None => Err("modification time unavailable".to_string()),
            },
            FsPredicate::ModifiedBefore(instant) => match self.provider.mod_time(path) {
                Some(mtime) if mtime < *instant => Ok(()),
                Some(_) => Err("modification time is too recent".to_string()),
                None => Err("modification time unavailable".to_string()),
            },
        }
    }
}

impl Check for FileCheck {
    fn category(&self) -> CheckCategory {
        CheckCategory::Filesystem
    }

    fn describe(&self) -> String {
        match &self.predicate {
            FsPredicate::Exists => "path exists".to_string(),
            FsPredicate::IsDirectory => "path is a directory".to_string(),
            FsPredicate::IsAbsolute => "path is absolute".to_string(),
            FsPredicate::SizeAtLeast(min) => format!("file size at least {min}"),
            FsPredicate::SizeAtMost(max) => format!("file size at most {max}"),
            FsPredicate::ModifiedAfter(_) => "modified after reference time".to_string(),
            FsPredicate::ModifiedBefore(_) => "modified before reference time".to_string(),
        }
    }

    fn run(&self, staged: &str) -> Result<(), CheckFailure> {
        self.evaluate(Path::new(staged))
            .map_err(|detail| CheckFailure::Failed {
                detail: format!("'{staged}': {detail}"),
            })
    }
}

fn file_check(provider: Rc<dyn FileInfo>, predicate: FsPredicate) -> Box<dyn Check> {
    Box::new(FileCheck {
        provider,
        predicate,
    })
}

/// Require the path to exist.
pub fn exists(provider: Rc<dyn FileInfo>) -> Box<dyn Check> {
    file_check(provider, FsPredicate::Exists)
}

/// Require the path to be a directory.
pub fn is_directory(provider: Rc<dyn FileInfo>) -> Box<dyn Check> {
    file_check(provider, FsPredicate::IsDirectory)
}

/// Require the path to be absolute.
pub fn is_absolute(provider: Rc<dyn FileInfo>) -> Box<dyn Check> {
    file_check(provider, FsPredicate::IsAbsolute)
}

/// Require the file size to be at least `min` bytes.
pub fn size_at_least(provider: Rc<dyn FileInfo>, min: u64) -> Box<dyn Check> {
    file_check(provider, FsPredicate::SizeAtLeast(min))
}

/// Require the file size to be at most `max` bytes.
pub fn size_at_most(provider: Rc<dyn FileInfo>, max: u64) -> Box<dyn Check> {
    file_check(provider, FsPredicate::SizeAtMost(max))
}

/// Require the modification time to be after `instant`.
pub fn modified_after(provider: Rc<dyn FileInfo>, instant: SystemTime) -> Box<dyn Check> {
    file_check(provider, FsPredicate::ModifiedAfter(instant))
}

/// Require the modification time to be before `instant`.
pub fn modified_before(provider: Rc<dyn FileInfo>, instant: SystemTime) -> Box<dyn Check> {
    file_check(provider, FsPredicate::ModifiedBefore(instant))
}
