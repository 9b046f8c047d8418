//! Reflection store contract and JSON-file implementation.
//!
//! # Responsibility
//! - Provide load/append/delete/clear over the whole reflection collection.
//! - Keep file format, locking and atomic replacement inside the store.
//!
//! # Invariants
//! - The file holds one JSON array of `{date, topic, reflection}` objects.
//! - A missing file is an empty collection; a malformed file is `Corrupt`.
//! - Mutations hold an exclusive lock on `<file>.lock` for the whole
//!   read-modify-write and replace the file via temp-file + rename.
//! - A rejected mutation leaves the file untouched.

use super::{StoreError, StoreResult};
use crate::model::reflection::Reflection;
use fs2::FileExt;
use log::{debug, error, info};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::Builder;

const LOCK_SUFFIX: &str = ".lock";
const TEMP_PREFIX: &str = ".reflections-";
const TEMP_SUFFIX: &str = ".tmp";

/// Repository interface for the reflection collection.
pub trait ReflectionStore {
    /// Reads the whole collection in insertion order.
    fn load_all(&self) -> StoreResult<Vec<Reflection>>;
    /// Appends one record at the end.
    fn append(&self, entry: &Reflection) -> StoreResult<()>;
    /// Removes records at zero-based pre-deletion positions.
    ///
    /// Returns the number of removed records.
    fn delete_at(&self, positions: &BTreeSet<usize>) -> StoreResult<usize>;
    /// Removes the persisted collection. Idempotent.
    fn clear(&self) -> StoreResult<()>;
}

/// Reflection store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileReflectionStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileReflectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = sibling_lock_path(&path);
        Self { path, lock_path }
    }

    /// Path of the persisted JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    fn acquire_lock(&self) -> StoreResult<StoreLock> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir).map_err(|err| StoreError::io(dir, err))?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|err| StoreError::io(&self.lock_path, err))?;
        file.lock_exclusive()
            .map_err(|err| StoreError::io(&self.lock_path, err))?;

        debug!("event=store_lock module=store status=acquired");
        Ok(StoreLock { file })
    }

    fn read_entries(&self) -> StoreResult<Vec<Reflection>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::io(&self.path, err)),
        };

        serde_json::from_slice::<Vec<Reflection>>(&bytes).map_err(|err| {
            error!(
                "event=store_read module=store status=error error_code=store_corrupt bytes={}",
                bytes.len()
            );
            StoreError::Corrupt {
                path: self.path.clone(),
                message: err.to_string(),
            }
        })
    }

    fn write_entries(&self, entries: &[Reflection]) -> StoreResult<()> {
        let started_at = Instant::now();
        let dir = self.parent_dir();

        let mut temp = Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)
            .map_err(|err| StoreError::io(dir, err))?;

        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer(&mut writer, entries)
                .map_err(|err| StoreError::io(&self.path, err.into()))?;
            writer
                .flush()
                .map_err(|err| StoreError::io(&self.path, err))?;
        }
        temp.as_file()
            .sync_all()
            .map_err(|err| StoreError::io(&self.path, err))?;

        if let Err(err) = temp.persist(&self.path) {
            error!(
                "event=store_write module=store status=error error_code=rename_failed duration_ms={}",
                started_at.elapsed().as_millis()
            );
            return Err(StoreError::io(&self.path, err.error));
        }

        info!(
            "event=store_write module=store status=ok count={} duration_ms={}",
            entries.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

impl ReflectionStore for JsonFileReflectionStore {
    fn load_all(&self) -> StoreResult<Vec<Reflection>> {
        let entries = self.read_entries()?;
        debug!(
            "event=store_load module=store status=ok count={}",
            entries.len()
        );
        Ok(entries)
    }

    fn append(&self, entry: &Reflection) -> StoreResult<()> {
        let _lock = self.acquire_lock()?;
        let mut entries = self.read_entries()?;
        entries.push(entry.clone());
        self.write_entries(&entries)
    }

    fn delete_at(&self, positions: &BTreeSet<usize>) -> StoreResult<usize> {
        if positions.is_empty() {
            return Ok(0);
        }

        let _lock = self.acquire_lock()?;
        let mut entries = self.read_entries()?;
        let len = entries.len();
        if let Some(&position) = positions.iter().find(|&&position| position >= len) {
            return Err(StoreError::IndexOutOfRange { position, len });
        }

        // Highest first so earlier removals don't shift later targets.
        for &position in positions.iter().rev() {
            entries.remove(position);
        }
        self.write_entries(&entries)?;
        Ok(positions.len())
    }

    fn clear(&self) -> StoreResult<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let _lock = self.acquire_lock()?;
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("event=store_clear module=store status=ok");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::io(&self.path, err)),
        }
    }
}

/// Exclusive advisory lock, released on drop.
struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn sibling_lock_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from(super::DEFAULT_STORE_FILE_NAME));
    name.push(LOCK_SUFFIX);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::{sibling_lock_path, JsonFileReflectionStore};
    use std::path::{Path, PathBuf};

    #[test]
    fn lock_path_sits_next_to_store_file() {
        assert_eq!(
            sibling_lock_path(Path::new("/data/reflections.json")),
            PathBuf::from("/data/reflections.json.lock")
        );
    }

    #[test]
    fn bare_file_name_uses_working_directory() {
        let store = JsonFileReflectionStore::new("reflections.json");
        assert_eq!(store.parent_dir(), Path::new("."));
    }
}
