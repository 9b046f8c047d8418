//! CSV export of reflection rows.
//!
//! # Responsibility
//! - Serialize rows in caller order with a `date,topic,reflection` header.
//! - Package the bytes as a downloadable blob.
//!
//! # Invariants
//! - The header row is always written, even for zero rows.
//! - Fields containing delimiters, quotes or newlines are quoted; quotes are
//!   doubled. Records end with `\n`.

use crate::model::reflection::{Reflection, FIELD_NAMES};
use crate::store::StoreResult;
use log::info;
use std::io;

/// Download file name for exported reflections.
pub const EXPORT_FILE_NAME: &str = "learning_reflections.csv";

/// MIME type for exported reflections.
pub const EXPORT_MIME_TYPE: &str = "text/csv";

/// Downloadable export payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBlob {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportBlob {
    pub fn csv(bytes: Vec<u8>) -> Self {
        Self {
            file_name: EXPORT_FILE_NAME,
            mime_type: EXPORT_MIME_TYPE,
            bytes,
        }
    }
}

/// Serializes `rows` as CSV bytes.
pub fn export_csv(rows: &[Reflection]) -> StoreResult<Vec<u8>> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(FIELD_NAMES)?;
    for row in rows {
        writer.write_record(row.fields())?;
    }

    let bytes = writer.into_inner().map_err(|err| {
        ::csv::Error::from(io::Error::new(err.error().kind(), err.to_string()))
    })?;
    info!(
        "event=export_csv module=export status=ok rows={} bytes={}",
        rows.len(),
        bytes.len()
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::export_csv;
    use crate::model::reflection::Reflection;

    #[test]
    fn empty_rows_still_write_header() {
        let bytes = export_csv(&[]).unwrap();
        assert_eq!(bytes, b"date,topic,reflection\n");
    }

    #[test]
    fn quotes_are_doubled() {
        let rows = [Reflection::new("2024-01-01", r#"say "hi""#, "multi\nline")];
        let text = String::from_utf8(export_csv(&rows).unwrap()).unwrap();
        assert_eq!(
            text,
            "date,topic,reflection\n2024-01-01,\"say \"\"hi\"\"\",\"multi\nline\"\n"
        );
    }
}
