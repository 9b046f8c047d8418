use reflection_core::{export_csv, ExportBlob, Reflection, EXPORT_FILE_NAME, EXPORT_MIME_TYPE};

#[test]
fn comma_in_field_is_quoted() {
    let rows = [Reflection::new("2024-01-01", "A,B", "x")];
    let text = String::from_utf8(export_csv(&rows).unwrap()).unwrap();

    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("date,topic,reflection"));
    assert_eq!(lines.next(), Some("2024-01-01,\"A,B\",x"));
    assert_eq!(lines.next(), None);
}

#[test]
fn rows_keep_caller_order() {
    let rows = [
        Reflection::new("2024-05-02", "second", "b"),
        Reflection::new("2024-05-01", "first", "a"),
    ];
    let text = String::from_utf8(export_csv(&rows).unwrap()).unwrap();
    assert_eq!(
        text,
        "date,topic,reflection\n2024-05-02,second,b\n2024-05-01,first,a\n"
    );
}

#[test]
fn blob_uses_download_metadata() {
    let blob = ExportBlob::csv(export_csv(&[]).unwrap());
    assert_eq!(blob.file_name, EXPORT_FILE_NAME);
    assert_eq!(blob.file_name, "learning_reflections.csv");
    assert_eq!(blob.mime_type, EXPORT_MIME_TYPE);
    assert_eq!(blob.mime_type, "text/csv");
}
