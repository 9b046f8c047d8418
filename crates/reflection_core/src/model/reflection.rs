//! Reflection record and session form state.
//!
//! # Responsibility
//! - Define the canonical `Reflection` record persisted by the store.
//! - Hold the editable form values for one interactive session.
//!
//! # Invariants
//! - Field names match the persisted JSON keys and the CSV header.
//! - `date` is stored verbatim; callers format it as `YYYY-MM-DD`.
//! - `ReflectionForm` resets to today's date and empty text after use.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Date format used for persisted and exported `date` values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Field names in persisted/exported order.
pub const FIELD_NAMES: [&str; 3] = ["date", "topic", "reflection"];

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reflection {
    /// ISO-8601 calendar date (`YYYY-MM-DD`), kept as text.
    pub date: String,
    /// Short free-form subject line.
    pub topic: String,
    /// Free-form body. Serialized as `reflection` to match the file schema.
    #[serde(rename = "reflection")]
    pub body: String,
}

impl Reflection {
    pub fn new(
        date: impl Into<String>,
        topic: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            topic: topic.into(),
            body: body.into(),
        }
    }

    /// Creates a reflection dated with the canonical `YYYY-MM-DD` form of `date`.
    pub fn dated(date: NaiveDate, topic: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(date.format(DATE_FORMAT).to_string(), topic, body)
    }

    /// Returns field values in `FIELD_NAMES` order.
    pub fn fields(&self) -> [&str; 3] {
        [self.date.as_str(), self.topic.as_str(), self.body.as_str()]
    }
}

/// Editable form values for one interactive session.
///
/// Front ends own one of these per session and pass it into
/// `ReflectionService::submit`; nothing here is process-wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionForm {
    pub date: NaiveDate,
    pub topic: String,
    pub reflection: String,
}

impl ReflectionForm {
    /// Creates a blank form dated today (local time).
    pub fn new() -> Self {
        Self::blank_on(Local::now().date_naive())
    }

    /// Creates a blank form with an explicit date.
    pub fn blank_on(date: NaiveDate) -> Self {
        Self {
            date,
            topic: String::new(),
            reflection: String::new(),
        }
    }

    /// Resets every field to its default (today, empty text).
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Builds the record this form would submit.
    pub fn to_reflection(&self) -> Reflection {
        Reflection::dated(self.date, self.topic.clone(), self.reflection.clone())
    }
}

impl Default for ReflectionForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Reflection, ReflectionForm};
    use chrono::NaiveDate;

    #[test]
    fn dated_formats_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let entry = Reflection::dated(date, "Rust", "borrowck");
        assert_eq!(entry.date, "2024-03-07");
    }

    #[test]
    fn serializes_with_file_schema_keys() {
        let entry = Reflection::new("2024-01-01", "Go", "channels");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"date":"2024-01-01","topic":"Go","reflection":"channels"}"#
        );
    }

    #[test]
    fn form_reset_clears_text() {
        let mut form = ReflectionForm::blank_on(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        form.topic = "topic".to_string();
        form.reflection = "body".to_string();

        form.reset();
        assert!(form.topic.is_empty());
        assert!(form.reflection.is_empty());
        assert_eq!(form, ReflectionForm::blank_on(form.date));
    }
}
