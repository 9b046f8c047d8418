//! Reflection persistence layer.
//!
//! # Responsibility
//! - Define the store contract consumed by services.
//! - Resolve where the reflection file lives.
//! - Map I/O, decode and range failures to semantic errors.
//!
//! # Invariants
//! - Every mutation rewrites the full collection.
//! - Read paths reject malformed persisted state instead of masking it.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub mod json_file;

pub use json_file::{JsonFileReflectionStore, ReflectionStore};

/// Default file name, resolved against the working directory.
pub const DEFAULT_STORE_FILE_NAME: &str = "reflections.json";

/// Environment variable overriding the store file location.
pub const STORE_PATH_ENV: &str = "REFLECTIONS_FILE";

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error for reflection persistence and export.
#[derive(Debug)]
pub enum StoreError {
    /// The file exists but is not a JSON array of reflection objects.
    Corrupt { path: PathBuf, message: String },
    /// A delete targeted a position outside `[0, len)`.
    IndexOutOfRange { position: usize, len: usize },
    /// File system failure (open, read, write, rename, lock).
    Io { path: PathBuf, source: io::Error },
    /// CSV encoder failure.
    Export(csv::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Corrupt { path, message } => write!(
                f,
                "reflection file `{}` is corrupt: {message}",
                path.display()
            ),
            Self::IndexOutOfRange { position, len } => write!(
                f,
                "reflection position {position} is out of range (have {len})"
            ),
            Self::Io { path, source } => {
                write!(f, "reflection file `{}` I/O failed: {source}", path.display())
            }
            Self::Export(err) => write!(f, "csv export failed: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Corrupt { .. } => None,
            Self::IndexOutOfRange { .. } => None,
            Self::Io { source, .. } => Some(source),
            Self::Export(err) => Some(err),
        }
    }
}

impl From<csv::Error> for StoreError {
    fn from(value: csv::Error) -> Self {
        Self::Export(value)
    }
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Short stable code for structured log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Corrupt { .. } => "store_corrupt",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::Io { .. } => "store_io",
            Self::Export(_) => "export_failed",
        }
    }
}

/// Resolves the store file path.
///
/// Precedence: explicit path, then `REFLECTIONS_FILE`, then
/// `reflections.json` relative to the working directory. Blank values are
/// treated as unset.
pub fn resolve_store_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit.filter(|path| !path.as_os_str().is_empty()) {
        return path.to_path_buf();
    }
    if let Ok(raw) = std::env::var(STORE_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    PathBuf::from(DEFAULT_STORE_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::{resolve_store_path, StoreError};
    use std::path::{Path, PathBuf};

    #[test]
    fn explicit_path_wins() {
        let path = resolve_store_path(Some(Path::new("/tmp/journal.json")));
        assert_eq!(path, PathBuf::from("/tmp/journal.json"));
    }

    #[test]
    fn out_of_range_message_names_position() {
        let err = StoreError::IndexOutOfRange {
            position: 7,
            len: 2,
        };
        assert!(err.to_string().contains("position 7"));
        assert_eq!(err.code(), "index_out_of_range");
    }
}
