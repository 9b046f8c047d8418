//! Front-end use-case API over the reflection service.
//!
//! # Responsibility
//! - Expose submit/list/remove/export/clear as envelope-returning calls.
//! - Own the per-session form state explicitly.
//!
//! # Invariants
//! - Functions never panic; failures come back as `ok = false` + message.
//! - Messages are stable, user-facing strings.

use chrono::NaiveDate;
use reflection_core::{
    resolve_store_path, JsonFileReflectionStore, ReflectionForm, ReflectionService, SearchQuery,
    ViewRow,
};
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Human-readable message for display.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResponse {
    pub ok: bool,
    /// Matching rows with their storage positions.
    pub rows: Vec<ViewRow>,
    /// Stored reflections before filtering.
    pub total: usize,
    pub message: String,
}

/// One interactive session: the store handle plus the form being edited.
pub struct Session {
    service: ReflectionService<JsonFileReflectionStore>,
    form: ReflectionForm,
}

impl Session {
    /// Opens a session on `store_path`, falling back to env/default resolution.
    pub fn open(store_path: Option<&Path>) -> Self {
        let path = resolve_store_path(store_path);
        Self {
            service: ReflectionService::new(JsonFileReflectionStore::new(path)),
            form: ReflectionForm::new(),
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.service.store().path().to_path_buf()
    }

    pub fn form(&self) -> &ReflectionForm {
        &self.form
    }

    /// Fills the form and submits it. `date = None` keeps the form's date.
    pub fn submit(
        &mut self,
        date: Option<NaiveDate>,
        topic: impl Into<String>,
        reflection: impl Into<String>,
    ) -> ActionResponse {
        if let Some(date) = date {
            self.form.date = date;
        }
        self.form.topic = topic.into();
        self.form.reflection = reflection.into();

        match self.service.submit(&mut self.form) {
            Ok(_) => ActionResponse::success("Reflection added successfully!"),
            Err(err) => ActionResponse::failure(format!("submit failed: {err}")),
        }
    }

    /// Lists reflections, optionally filtered.
    pub fn list(&self, search_term: Option<&str>, pattern: bool) -> ListResponse {
        let query = build_query(search_term, pattern);
        match self.service.list_with_query(&query) {
            Ok(view) => {
                let message = if view.total == 0 {
                    "No reflections found.".to_string()
                } else if view.is_empty() {
                    "No matching reflections.".to_string()
                } else {
                    format!("Showing {} of {} reflection(s).", view.rows.len(), view.total)
                };
                ListResponse {
                    ok: true,
                    rows: view.rows,
                    total: view.total,
                    message,
                }
            }
            Err(err) => ListResponse {
                ok: false,
                rows: Vec::new(),
                total: 0,
                message: format!("list failed: {err}"),
            },
        }
    }

    /// Removes reflections at storage positions and resets the form.
    pub fn remove(&mut self, positions: &BTreeSet<usize>) -> ActionResponse {
        if positions.is_empty() {
            return ActionResponse::failure("No reflections selected.");
        }
        match self.service.remove(positions) {
            Ok(_) => {
                self.form.reset();
                ActionResponse::success("Selected reflections removed successfully!")
            }
            Err(err) => ActionResponse::failure(format!("remove failed: {err}")),
        }
    }

    /// Exports the currently filtered rows as CSV.
    ///
    /// Writes to `out_file`, or to `learning_reflections.csv` in the working
    /// directory when unset.
    pub fn export(
        &self,
        search_term: Option<&str>,
        pattern: bool,
        out_file: Option<&Path>,
    ) -> ActionResponse {
        let query = build_query(search_term, pattern);
        let result = self.service.list_with_query(&query).and_then(|view| {
            let rows = view.reflections();
            self.service.export(&rows)
        });
        let blob = match result {
            Ok(blob) => blob,
            Err(err) => return ActionResponse::failure(format!("export failed: {err}")),
        };

        let target = out_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(blob.file_name));
        match write_atomically(&target, &blob.bytes) {
            Ok(()) => ActionResponse::success(format!(
                "Exported {} bytes ({}) to {}.",
                blob.bytes.len(),
                blob.mime_type,
                target.display()
            )),
            Err(err) => ActionResponse::failure(format!(
                "export failed: cannot write `{}`: {err}",
                target.display()
            )),
        }
    }

    /// Removes every reflection.
    pub fn clear_all(&self) -> ActionResponse {
        match self.service.clear_all() {
            Ok(()) => ActionResponse::success("All reflections cleared successfully!"),
            Err(err) => ActionResponse::failure(format!("clear failed: {err}")),
        }
    }
}

/// Replaces `target` via a sibling temp file so readers never see a partial CSV.
fn write_atomically(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = target
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(target).map_err(|err| err.error)?;
    Ok(())
}

fn build_query(search_term: Option<&str>, pattern: bool) -> SearchQuery {
    let text = search_term.unwrap_or_default();
    if pattern {
        SearchQuery::pattern(text)
    } else {
        SearchQuery::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn open_session() -> (TempDir, Session) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let session = Session::open(Some(dir.path().join("reflections.json").as_path()));
        (dir, session)
    }

    fn date(day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 1, day)
    }

    #[test]
    fn empty_store_lists_no_reflections_message() {
        let (_dir, session) = open_session();
        let response = session.list(None, false);
        assert!(response.ok);
        assert!(response.rows.is_empty());
        assert_eq!(response.message, "No reflections found.");
    }

    #[test]
    fn submit_then_list_and_form_resets() {
        let (_dir, mut session) = open_session();
        let response = session.submit(date(3), "Go", "channels");
        assert!(response.ok, "{}", response.message);
        assert!(session.form().topic.is_empty());

        let listed = session.list(Some("GO"), false);
        assert_eq!(listed.rows.len(), 1);
        assert_eq!(listed.rows[0].reflection.date, "2024-01-03");
    }

    #[test]
    fn remove_out_of_range_reports_failure() {
        let (_dir, mut session) = open_session();
        session.submit(date(1), "a", "b");

        let response = session.remove(&BTreeSet::from([5]));
        assert!(!response.ok);
        assert!(response.message.contains("out of range"));
        assert_eq!(session.list(None, false).total, 1);
    }

    #[test]
    fn corrupt_store_surfaces_message() {
        let (_dir, session) = open_session();
        std::fs::write(session.store_path(), "not json").expect("write corrupt file");

        let response = session.list(None, false);
        assert!(!response.ok);
        assert!(response.message.contains("corrupt"));
    }

    #[test]
    fn export_writes_filtered_csv() {
        let (dir, mut session) = open_session();
        session.submit(date(1), "Go", "channels");
        session.submit(date(2), "A,B", "x");

        let out = dir.path().join("out.csv");
        let response = session.export(Some("a,b"), false, Some(out.as_path()));
        assert!(response.ok, "{}", response.message);
        let text = std::fs::read_to_string(out).expect("read export");
        assert_eq!(text, "date,topic,reflection\n2024-01-02,\"A,B\",x\n");
    }

    #[test]
    fn export_replaces_existing_file_without_leftovers() {
        let (dir, mut session) = open_session();
        let out = dir.path().join("out.csv");
        std::fs::write(&out, "stale contents").expect("seed export target");
        session.submit(date(4), "Zig", "comptime");

        let response = session.export(None, false, Some(out.as_path()));
        assert!(response.ok, "{}", response.message);
        let text = std::fs::read_to_string(&out).expect("read export");
        assert_eq!(text, "date,topic,reflection\n2024-01-04,Zig,comptime\n");

        let leftovers = std::fs::read_dir(dir.path())
            .expect("list temp dir")
            .map(|entry| {
                let name = entry.expect("dir entry").file_name();
                name.to_string_lossy().into_owned()
            })
            .filter(|name| name.starts_with(".tmp"))
            .collect::<Vec<_>>();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[test]
    fn export_into_missing_directory_fails() {
        let (dir, session) = open_session();
        let out = dir.path().join("missing/out.csv");

        let response = session.export(None, false, Some(out.as_path()));
        assert!(!response.ok);
        assert!(response.message.contains("cannot write"));
    }

    #[test]
    fn clear_all_succeeds_twice() {
        let (_dir, mut session) = open_session();
        session.submit(date(1), "a", "b");
        assert!(session.clear_all().ok);
        assert!(session.clear_all().ok);
        assert_eq!(session.list(None, false).total, 0);
    }
}
