//! Reflection use-case service.
//!
//! # Responsibility
//! - Provide submit/list/remove/export/clear entry points for front ends.
//! - Translate filtered-view selections into storage positions.
//!
//! # Invariants
//! - Service APIs never bypass the store's persistence contract.
//! - Deletion always targets storage positions, never raw view indices.
//! - Session form state is reset only after a successful mutation.

use crate::export::csv::{export_csv, ExportBlob};
use crate::model::reflection::{Reflection, ReflectionForm};
use crate::search::filter::{filter_view, SearchError, SearchQuery, ViewRow};
use crate::store::{ReflectionStore, StoreError};
use chrono::NaiveDate;
use log::{error, info};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for reflection use-cases.
#[derive(Debug)]
pub enum ServiceError {
    Store(StoreError),
    Search(SearchError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Search(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Search(err) => Some(err),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<SearchError> for ServiceError {
    fn from(value: SearchError) -> Self {
        Self::Search(value)
    }
}

impl ServiceError {
    fn code(&self) -> &'static str {
        match self {
            Self::Store(err) => err.code(),
            Self::Search(_) => "invalid_query",
        }
    }
}

/// Filtered view returned by [`ReflectionService::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    /// Matching rows in storage order.
    pub rows: Vec<ViewRow>,
    /// Query the view was built with.
    pub query: SearchQuery,
    /// Number of stored reflections before filtering.
    pub total: usize,
}

impl ListView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the displayed reflections in view order.
    pub fn reflections(&self) -> Vec<Reflection> {
        self.rows.iter().map(|row| row.reflection.clone()).collect()
    }

    /// Maps selected view indices to storage positions.
    ///
    /// # Errors
    /// - `IndexOutOfRange` when a view index is not in this view.
    pub fn storage_positions(
        &self,
        selected: &BTreeSet<usize>,
    ) -> Result<BTreeSet<usize>, StoreError> {
        selected
            .iter()
            .map(|&index| {
                self.rows
                    .get(index)
                    .map(|row| row.position)
                    .ok_or(StoreError::IndexOutOfRange {
                        position: index,
                        len: self.rows.len(),
                    })
            })
            .collect()
    }
}

/// Use-case service wrapper over a reflection store.
pub struct ReflectionService<S: ReflectionStore> {
    store: S,
}

impl<S: ReflectionStore> ReflectionService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Appends the reflection described by `form` and resets the form.
    ///
    /// On failure the form keeps its values so the user can retry.
    pub fn submit(&self, form: &mut ReflectionForm) -> ServiceResult<Reflection> {
        let entry = form.to_reflection();
        let created = self.append_logged(entry)?;
        form.reset();
        Ok(created)
    }

    /// Appends one reflection without session state.
    pub fn submit_entry(
        &self,
        date: NaiveDate,
        topic: impl Into<String>,
        reflection: impl Into<String>,
    ) -> ServiceResult<Reflection> {
        self.append_logged(Reflection::dated(date, topic, reflection))
    }

    /// Loads all reflections and applies an optional literal search term.
    pub fn list(&self, search_term: Option<&str>) -> ServiceResult<ListView> {
        self.list_with_query(&SearchQuery::new(search_term.unwrap_or_default()))
    }

    /// Loads all reflections and applies `query`.
    pub fn list_with_query(&self, query: &SearchQuery) -> ServiceResult<ListView> {
        let started_at = Instant::now();
        let result = self
            .store
            .load_all()
            .map_err(ServiceError::from)
            .and_then(|all| {
                let rows = filter_view(&all, query)?;
                Ok(ListView {
                    rows,
                    query: query.clone(),
                    total: all.len(),
                })
            });
        log_outcome("reflection_list", started_at, &result);
        result
    }

    /// Deletes reflections at storage positions.
    ///
    /// Returns the number of removed reflections.
    pub fn remove(&self, positions: &BTreeSet<usize>) -> ServiceResult<usize> {
        let started_at = Instant::now();
        let result = self.store.delete_at(positions).map_err(ServiceError::from);
        log_outcome("reflection_remove", started_at, &result);
        result
    }

    /// Deletes the rows selected in `view` and resets the session form.
    pub fn remove_selected(
        &self,
        view: &ListView,
        selected: &BTreeSet<usize>,
        form: &mut ReflectionForm,
    ) -> ServiceResult<usize> {
        let positions = view.storage_positions(selected)?;
        let removed = self.remove(&positions)?;
        form.reset();
        Ok(removed)
    }

    /// Serializes `rows` into a downloadable CSV blob.
    pub fn export(&self, rows: &[Reflection]) -> ServiceResult<ExportBlob> {
        let bytes = export_csv(rows)?;
        Ok(ExportBlob::csv(bytes))
    }

    /// Removes every stored reflection.
    pub fn clear_all(&self) -> ServiceResult<()> {
        let started_at = Instant::now();
        let result = self.store.clear().map_err(ServiceError::from);
        log_outcome("reflection_clear", started_at, &result);
        result
    }

    fn append_logged(&self, entry: Reflection) -> ServiceResult<Reflection> {
        let started_at = Instant::now();
        let result = self
            .store
            .append(&entry)
            .map(|()| entry)
            .map_err(ServiceError::from);
        log_outcome("reflection_submit", started_at, &result);
        result
    }
}

fn log_outcome<T>(event: &str, started_at: Instant, result: &ServiceResult<T>) {
    match result {
        Ok(_) => info!(
            "event={event} module=service status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event={event} module=service status=error duration_ms={} error_code={}",
            started_at.elapsed().as_millis(),
            err.code()
        ),
    }
}
