//! Directory lister implementation

use std::ffi::OsString;
use std::fs;
use std::path::Path;

use arrayvec::ArrayVec;
use globset::{Glob, GlobMatcher};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{MAX_FILES, MAX_PATH_LENGTH};

/// Lists the regular files directly inside a directory
#[derive(Debug, Default)]
pub struct Crawler {
    /// Optional file name filter
    include: Option<GlobMatcher>,
}

impl Crawler {
    /// Create a crawler that lists every regular file
    #[must_use]
    pub const fn new() -> Self {
        Self { include: None }
    }

    /// Create a crawler that only lists file names matching `pattern`
    ///
    /// # Errors
    /// Returns error if the pattern is not a valid glob
    pub fn with_include(pattern: &str) -> Result<Self> {
        let glob = Glob::new(pattern)
            .map_err(|e| Error::pattern(&format!("Invalid include pattern: {e}")))?;
        Ok(Self { include: Some(glob.compile_matcher()) })
    }

    /// List file names inside `dir`
    ///
    /// Names are returned in filesystem order. Subdirectories are skipped.
    ///
    /// # Errors
    /// Returns error if:
    /// - `dir` cannot be opened as a directory
    /// - Path length exceeds `MAX_PATH_LENGTH`
    /// - File count exceeds `MAX_FILES`
    pub fn list_files(&self, dir: &Path) -> Result<ArrayVec<OsString, MAX_FILES>> {
        Self::validate_path(dir)?;

        let not_found = |source| Error::DirectoryNotFound { path: dir.to_path_buf(), source };
        let entries = fs::read_dir(dir).map_err(not_found)?;

        let mut files = ArrayVec::new();

        for entry in entries {
            let entry = entry.map_err(not_found)?;
            let path = entry.path();

            // Follow symlinks so a link to a directory is skipped too
            let is_dir = match entry.file_type() {
                Ok(kind) if kind.is_symlink() => path.is_dir(),
                Ok(kind) => kind.is_dir(),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "cannot stat entry, listing it");
                    false
                },
            };
            if is_dir {
                debug!(path = %path.display(), "skipping subdirectory");
                continue;
            }

            let name = entry.file_name();
            if self.include.as_ref().is_some_and(|include| !include.is_match(&name)) {
                debug!(path = %path.display(), "skipping file outside include pattern");
                continue;
            }

            files.try_push(name).map_err(|_| Error::FileCountExceeded)?;
        }

        assert!(files.len() <= MAX_FILES, "File count must not exceed maximum");

        Ok(files)
    }

    /// Check that `dir` is within the path limit and can be opened as a directory
    ///
    /// # Errors
    /// Returns error if:
    /// - Path length exceeds `MAX_PATH_LENGTH`
    /// - `dir` cannot be opened as a directory
    pub fn check_dir(dir: &Path) -> Result<()> {
        Self::validate_path(dir)?;
        fs::read_dir(dir)
            .map(drop)
            .map_err(|source| Error::DirectoryNotFound { path: dir.to_path_buf(), source })
    }

    /// Validate a path against constraints
    fn validate_path(path: &Path) -> Result<()> {
        let path_len = path.as_os_str().len();
        if path_len > MAX_PATH_LENGTH {
            return Err(Error::PathTooLong);
        }
        Ok(())
    }
}
