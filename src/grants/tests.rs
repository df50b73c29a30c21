use super::*;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn record(value: serde_json::Value) -> GrantRecord {
    serde_json::from_value(value).expect("record should deserialize")
}

#[test]
fn field_access_is_total() {
    let grant = record(json!({
        "program_name": "Alberta Made Production Grant",
        "program_id": 42,
        "for_profit": true,
        "amount": null
    }));

    assert_eq!(grant.field("program_name"), "Alberta Made Production Grant");
    assert_eq!(grant.field("program_id"), "42");
    assert_eq!(grant.field("for_profit"), "true");
    assert_eq!(grant.field("amount"), "");
    assert_eq!(grant.field("no_such_field"), "");
}

#[test]
fn metadata_projects_program_id() {
    let grant = record(json!({
        "program_id": 7,
        "program_name": "Youth Arts Fund",
        "program_status": "Open",
        "location": "Ontario",
        "country": "Canada",
        "target_audience": "Youth",
        "main_industry": "Arts"
    }));

    let doc = grant.normalize();
    assert_eq!(doc.metadata.program_id, grant.program_id());
    assert_eq!(doc.metadata.program_name, "Youth Arts Fund");
    assert_eq!(doc.metadata.country, "Canada");
}

#[test]
fn metadata_empty_when_fields_absent() {
    let doc = record(json!({})).normalize();
    assert_eq!(doc.metadata, GrantMetadata::default());
}

#[test]
fn normalization_is_deterministic() {
    let grant = record(json!({
        "program_name": "Export Readiness Program",
        "description": "Supports exporters.",
        "max_funding": 50000
    }));

    assert_eq!(grant.normalize(), grant.normalize());
}

#[test]
fn normalized_text_keeps_fixed_field_order() {
    let grant = record(json!({
        "country": "Canada",
        "program_name": "Export Readiness Program"
    }));

    let text = grant.normalize().text;
    let name_pos = text.find("Program Name:").expect("name label present");
    let country_pos = text.find("Country:").expect("country label present");
    assert!(name_pos < country_pos);

    // Absent fields still render as labeled empty lines
    assert!(text.contains("Min Employees: \n"));
}

#[test]
fn load_grants_scrubs_control_characters() {
    let mut file = NamedTempFile::new().expect("temp file");
    // A control character embedded inside a string literal, as seen in the
    // upstream export
    write!(
        file,
        "[{{\"program_name\": \"Broken\u{0003}Name\", \"program_id\": 1}}]"
    )
    .expect("write temp grants");

    let grants = load_grants(file.path()).expect("grants should load");
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].field("program_name"), "BrokenName");
}

#[test]
fn load_grants_missing_file_is_index_unavailable() {
    let err = load_grants(std::path::Path::new("/nonexistent/grants.json"))
        .expect_err("missing file should error");
    assert!(matches!(err, GrantRagError::IndexUnavailable(_)));
}

#[test]
fn load_grants_unparseable_file_is_index_unavailable() {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, "this is not json").expect("write temp grants");

    let err = load_grants(file.path()).expect_err("garbage should error");
    assert!(matches!(err, GrantRagError::IndexUnavailable(_)));
}
