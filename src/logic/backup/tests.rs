use chrono::TimeZone;
use chrono::Utc;
use serde_json::json;

use super::csv::{dataset_to_csv, encode_field, sections_to_csv, CsvSection};
use super::*;

/// Minimal CSV line parser for round-trip checks: split on commas outside
/// quotes, unescape doubled quotes.
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}

#[test]
fn test_field_encoding_priority() {
    assert_eq!(encode_field(None), "");
    assert_eq!(encode_field(Some(&json!(null))), "");
    assert_eq!(encode_field(Some(&json!("Ana Souza"))), "Ana Souza");
    assert_eq!(encode_field(Some(&json!(10))), "10");
    assert_eq!(encode_field(Some(&json!("a,b"))), "\"a,b\"");
    assert_eq!(encode_field(Some(&json!("diz \"ai\""))), "\"diz \"\"ai\"\"\"");
    assert_eq!(encode_field(Some(&json!("linha1\nlinha2"))), "\"linha1\nlinha2\"");
}

#[test]
fn test_escaped_field_round_trips() {
    let rows = vec![json!({ "name": "a,b\"c" })];
    let csv = dataset_to_csv(&rows, &["name"]);

    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("name"));
    let encoded = lines.next().unwrap();
    assert_eq!(encoded, "\"a,b\"\"c\"");

    let parsed = parse_csv_line(encoded);
    assert_eq!(parsed, vec!["a,b\"c".to_string()]);
}

#[test]
fn test_missing_value_is_empty_not_null() {
    // One row without photo_url at all, one with an explicit null.
    let rows = vec![
        json!({ "id": "1", "name": "Ana" }),
        json!({ "id": "2", "name": "Bruno", "photo_url": null }),
    ];
    let csv = dataset_to_csv(&rows, &["id", "name", "photo_url"]);

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "id,name,photo_url");
    assert_eq!(lines[1], "1,Ana,");
    assert_eq!(lines[2], "2,Bruno,");
}

#[test]
fn test_empty_dataset_encodes_as_empty_string() {
    assert_eq!(dataset_to_csv(&[], &["id", "name"]), "");
}

#[test]
fn test_combined_document_layout() {
    let patients = vec![json!({
        "id": "1",
        "name": "Ana",
        "phone": "11999990000",
        "pathology": "Lesão no joelho",
        "session_package": "10 sessões",
        "treatment_start_date": "2024-05-01",
        "created_at": "2024-05-01T12:00:00Z",
        "photo_url": null,
    })];

    let combined = sections_to_csv(&[
        CsvSection {
            label: "PACIENTES",
            columns: &PATIENT_COLUMNS,
            rows: &patients,
        },
        CsvSection {
            label: "SESSÕES",
            columns: &SESSION_COLUMNS,
            rows: &[],
        },
    ]);

    let expected = "PACIENTES\n\
                    id,name,phone,pathology,session_package,treatment_start_date,created_at,photo_url\n\
                    1,Ana,11999990000,Lesão no joelho,10 sessões,2024-05-01,2024-05-01T12:00:00Z,\
                    \n\nSESSÕES\n";
    assert_eq!(combined, expected);
}

#[test]
fn test_json_export_scenario() {
    let data = BackupData {
        patients: vec![json!({ "id": "1", "name": "Ana" })],
        sessions: vec![],
        evaluations: vec![],
        export_date: Utc.with_ymd_and_hms(2024, 5, 20, 15, 30, 0).unwrap(),
    };

    let text = to_json(&data).unwrap();

    // Byte-stable field order: patients, sessions, evaluations, exportDate.
    let positions: Vec<usize> = ["\"patients\"", "\"sessions\"", "\"evaluations\"", "\"exportDate\""]
        .iter()
        .map(|k| text.find(k).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["patients"][0]["name"], "Ana");
    assert_eq!(parsed["sessions"].as_array().unwrap().len(), 0);
    assert_eq!(parsed["evaluations"].as_array().unwrap().len(), 0);

    let export_date = parsed["exportDate"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(export_date).is_ok());
}

#[test]
fn test_csv_export_carries_both_labeled_sections() {
    let data = BackupData {
        patients: vec![json!({ "id": "1", "name": "Ana" })],
        sessions: vec![json!({ "id": "s1", "patient_id": "1", "evolution": "Paciente evoluiu bem, sem dor" })],
        evaluations: vec![json!({ "id": "e1", "emoji": "😀" })],
        export_date: Utc::now(),
    };

    let csv = to_csv(&data);
    assert!(csv.starts_with("PACIENTES\n"));
    assert!(csv.contains("\n\nSESSÕES\n"));
    // Evaluations stay out of the CSV backup.
    assert!(!csv.contains("e1"));
    // The quoted evolution text survives intact.
    assert!(csv.contains("\"Paciente evoluiu bem, sem dor\""));
}

#[test]
fn test_backup_filename_uses_iso_date() {
    let date = Utc.with_ymd_and_hms(2024, 5, 20, 23, 59, 59).unwrap();
    assert_eq!(backup_filename("json", date), "backup-2024-05-20.json");
    assert_eq!(backup_filename("csv", date), "backup-2024-05-20.csv");
}
