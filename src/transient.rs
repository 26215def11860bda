//! Scoped temporary files for staging one transfer.
//!
//! A [`StagedFile`] holds the bytes of a single relay invocation between the
//! Telegram download and the hosting upload. The underlying file is removed
//! when the value is dropped, on success, handled failure, and unwinding
//! alike. Creation allocates the path atomically, so a failed creation
//! leaves nothing behind and cleanup never touches a path that was not
//! actually allocated.

use std::io;
use std::path::Path;
use tempfile::TempPath;

/// A uniquely named local byte sink, deleted exactly once on drop.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
}

impl StagedFile {
    /// Allocate a fresh temporary file for one transfer.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn create() -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("gofile-relay-")
            .tempfile()?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    /// Path of the staged file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
