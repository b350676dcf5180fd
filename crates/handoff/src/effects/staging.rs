use std::io::{self, SeekFrom};
use std::path::Path;

use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, warn};

/// Name prefix of staging files.
pub const STAGING_PREFIX: &str = "handoff-download-";

/// Private temporary file holding a response body until it is complete.
///
/// The file is removed when the value is closed or dropped, whichever comes
/// first, so it disappears on every exit path of a download.
pub struct StagingFile {
    file: File,
    path: Option<TempPath>,
}

impl StagingFile {
    /// Create a uniquely named staging file in `dir`.
    pub fn create_in(dir: &Path) -> io::Result<Self> {
        let (file, path) = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(dir)?
            .into_parts();
        debug!(path = %path.display(), "created staging file");
        Ok(Self {
            file: File::from_std(file),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> { self.path.as_deref() }

    pub fn file_mut(&mut self) -> &mut File { &mut self.file }

    /// Flush pending writes and move back to the start for reading.
    pub async fn rewind(&mut self) -> io::Result<()> {
        self.file.flush().await?;
        self.file.seek(SeekFrom::Start(0)).await?;
        Ok(())
    }

    /// Delete the file now, reporting any failure.
    pub fn close(mut self) -> io::Result<()> {
        match self.path.take() {
            Some(path) => path.close(),
            None => Ok(()),
        }
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let path_str = path.display().to_string();
            if let Err(e) = path.close() {
                warn!(path = %path_str, error = %e, "failed to remove staging file");
            }
        }
    }
}
