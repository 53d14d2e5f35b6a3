//! Append-only file with size-based rotation.

use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_BACKUPS: usize = 3;

/// Line writer that moves the current file aside once it grows past a limit.
///
/// Backups are named `<file>.<timestamp>` where the timestamp is local time
/// formatted so that lexical order equals chronological order. Only the newest
/// `backups` files are kept.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    handle: Mutex<Option<File>>,
}

impl RotatingFile {
    pub fn new(path: PathBuf) -> Self {
        Self::with_limits(path, DEFAULT_MAX_BYTES, DEFAULT_BACKUPS)
    }

    pub const fn with_limits(path: PathBuf, max_bytes: u64, backups: usize) -> Self {
        Self {
            path,
            max_bytes,
            backups,
            handle: Mutex::new(None),
        }
    }

    /// Appends `line` plus a newline, rotating first if the file is over the limit.
    pub fn append_line(&self, line: &str) -> io::Result<()> {
        let mut handle = self
            .handle
            .lock()
            .map_err(|e| io::Error::other(format!("trace file lock poisoned: {e}")))?;

        if fs::metadata(&self.path).is_ok_and(|m| m.len() >= self.max_bytes) {
            *handle = None;
            self.rotate()?;
        }

        let file = match handle.as_mut() {
            Some(file) => file,
            None => handle.insert(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)?,
            ),
        };
        writeln!(file, "{line}")?;
        file.flush()
    }

    fn rotate(&self) -> io::Result<()> {
        let suffix = Local::now().format("%Y%m%dT%H%M%S%.6f");
        let mut backup = self.path.clone().into_os_string();
        backup.push(format!(".{suffix}"));
        fs::rename(&self.path, PathBuf::from(backup))?;

        for stale in self.backups()?.into_iter().skip(self.backups) {
            if let Err(e) = fs::remove_file(&stale) {
                tracing::debug!(path = %stale.display(), error = %e, "could not prune trace backup");
            }
        }
        Ok(())
    }

    /// Existing backups, newest first.
    fn backups(&self) -> io::Result<Vec<PathBuf>> {
        let Some(name) = self.path.file_name().and_then(|n| n.to_str()) else {
            return Ok(Vec::new());
        };
        let prefix = format!("{name}.");
        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty());

        let mut found: Vec<PathBuf> = fs::read_dir(dir.unwrap_or_else(|| Path::new(".")))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect();
        found.sort_unstable_by(|a, b| b.cmp(a));
        Ok(found)
    }
}
