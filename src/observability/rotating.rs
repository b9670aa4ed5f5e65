//! Size-rotated append-only file.
//!
//! When the file reaches its size limit it is renamed to
//! `<file name>.<UTC timestamp>` and a fresh file is started. Only the newest
//! backups are kept. Timestamps sort lexicographically, so backups are
//! ordered by name rather than by filesystem metadata.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Thread-safe rotating line writer.
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    handle: Mutex<Option<File>>,
}

impl RotatingFile {
    /// 10 MB.
    pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;
    pub const DEFAULT_BACKUPS: usize = 3;

    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self::with_limits(path, Self::DEFAULT_MAX_BYTES, Self::DEFAULT_BACKUPS)
    }

    /// The file is opened lazily on the first write.
    #[must_use]
    pub const fn with_limits(path: PathBuf, max_bytes: u64, backups: usize) -> Self {
        Self {
            path,
            max_bytes,
            backups,
            handle: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `line` plus a newline, rotating first if the file is full.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from rotating, opening or writing the file, and an
    /// error if a previous writer panicked while holding the lock.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut handle = self
            .handle
            .lock()
            .map_err(|e| {
                io::Error::new(io::ErrorKind::Other, format!("writer lock poisoned: {e}"))
            })?;

        let size = fs::metadata(&self.path).map_or(0, |m| m.len());
        if size >= self.max_bytes {
            *handle = None;
            self.rotate()?;
        }

        if handle.is_none() {
            *handle = Some(OpenOptions::new().create(true).append(true).open(&self.path)?);
        }
        let Some(file) = handle.as_mut() else {
            return Err(io::Error::new(io::ErrorKind::Other, "trace file unavailable"));
        };
        writeln!(file, "{line}")?;
        file.flush()
    }

    fn rotate(&self) -> io::Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.6f").to_string();
        let mut backup = self.backup_path(&stamp);
        let mut attempt = 1;
        while backup.exists() {
            backup = self.backup_path(&format!("{stamp}-{attempt}"));
            attempt += 1;
        }
        fs::rename(&self.path, &backup)?;

        let mut backups = self.list_backups()?;
        let excess = backups.len().saturating_sub(self.backups);
        for old in backups.drain(..excess) {
            // best effort; a leftover backup is harmless
            let _ = fs::remove_file(old);
        }
        Ok(())
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn backup_path(&self, suffix: &str) -> PathBuf {
        self.path.with_file_name(format!("{}.{suffix}", self.file_name()))
    }

    /// Existing backups, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be read.
    pub fn list_backups(&self) -> io::Result<Vec<PathBuf>> {
        let prefix = format!("{}.", self.file_name());
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut backups: Vec<PathBuf> = fs::read_dir(parent)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(&prefix))
            })
            .collect();
        backups.sort();
        Ok(backups)
    }
}

impl std::fmt::Debug for RotatingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFile")
            .field("path", &self.path)
            .field("max_bytes", &self.max_bytes)
            .field("backups", &self.backups)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RotatingFile::new(dir.path().join("trace.json"));
        writer.write_line("one").unwrap();
        writer.write_line("two").unwrap();
        let content = fs::read_to_string(writer.path()).unwrap();
        assert_eq!(content, "one\ntwo\n");
        assert!(writer.list_backups().unwrap().is_empty());
    }

    #[test]
    fn rotates_and_prunes_backups() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RotatingFile::with_limits(dir.path().join("trace.json"), 10, 2);
        for n in 0..5 {
            writer.write_line(&format!("line-{n:04}")).unwrap();
        }

        let backups = writer.list_backups().unwrap();
        assert_eq!(backups.len(), 2);
        assert_eq!(fs::read_to_string(&backups[1]).unwrap(), "line-0003\n");
        assert_eq!(fs::read_to_string(writer.path()).unwrap(), "line-0004\n");
    }
}
