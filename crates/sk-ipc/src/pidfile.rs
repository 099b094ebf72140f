use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PidFileError {
    #[error("another instance is already running (pid file {0} is locked)")]
    AlreadyRunning(PathBuf),
    #[error("i/o error on pid file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Holds an advisory exclusive lock on the configured `PidFile` for the
/// lifetime of the process, enforcing single-instance. The lock (not the
/// file's mere existence) is the source of truth, so a stale pid file left
/// behind by a killed process never blocks a fresh start.
pub struct PidFile {
    file: File,
    path: PathBuf,
}

impl PidFile {
    /// Creates (or opens) `path`, takes an exclusive lock, and writes the
    /// current process id. Fails with [`PidFileError::AlreadyRunning`] if a
    /// live instance already holds the lock.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self, PidFileError> {
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| PidFileError::Io { path: path.clone(), source })?;

        file.try_lock_exclusive()
            .map_err(|_| PidFileError::AlreadyRunning(path.clone()))?;

        file.set_len(0)
            .map_err(|source| PidFileError::Io { path: path.clone(), source })?;

        let mut file = file;
        write!(file, "{}", std::process::id())
            .map_err(|source| PidFileError::Io { path: path.clone(), source })?;
        file.flush()
            .map_err(|source| PidFileError::Io { path: path.clone(), source })?;

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_first_is_held() {
        let mut path = std::env::temp_dir();
        path.push(format!("sk-ipc-test-{}.pid", std::process::id()));

        let first = PidFile::acquire(&path).unwrap();
        let second = PidFile::acquire(&path);
        assert!(matches!(second, Err(PidFileError::AlreadyRunning(_))));

        drop(first);
        // Lock released; a new instance can now start.
        let third = PidFile::acquire(&path).unwrap();
        drop(third);
    }
}
