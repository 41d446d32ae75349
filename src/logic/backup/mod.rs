//! Backup Export
//!
//! Pulls the three record collections from the hosted store and serializes
//! them for download: a single JSON document with an export timestamp, or a
//! combined CSV with one labeled section per collection. Either all three
//! collections are fetched and exported, or the operation fails as a whole.

pub mod csv;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::AppResult;
use crate::logic::records::client::RecordStoreClient;
use csv::CsvSection;

/// Column sets are fixed by the backup format, not inferred from the rows,
/// so output stays deterministic regardless of record key order.
pub const PATIENT_COLUMNS: [&str; 8] = [
    "id",
    "name",
    "phone",
    "pathology",
    "session_package",
    "treatment_start_date",
    "created_at",
    "photo_url",
];

pub const SESSION_COLUMNS: [&str; 5] =
    ["id", "patient_id", "session_date", "evolution", "created_at"];

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Everything the backup covers, as raw rows from the store.
#[derive(Debug, Clone, Serialize)]
pub struct BackupData {
    pub patients: Vec<Value>,
    pub sessions: Vec<Value>,
    pub evaluations: Vec<Value>,
    #[serde(rename = "exportDate")]
    pub export_date: DateTime<Utc>,
}

/// In-memory export artifact; the caller persists or downloads it.
#[derive(Debug, Clone, Serialize)]
pub struct ExportFile {
    pub filename: String,
    pub mime: String,
    pub contents: String,
}

/// Fetch all three collections, newest first.
pub async fn fetch_all_data(client: &RecordStoreClient) -> AppResult<BackupData> {
    let (patients, sessions, evaluations) = tokio::try_join!(
        client.fetch_rows("patients", "created_at.desc", None),
        client.fetch_rows("sessions", "created_at.desc", None),
        client.fetch_rows("evaluations", "created_at.desc", None),
    )?;

    Ok(BackupData {
        patients,
        sessions,
        evaluations,
        export_date: Utc::now(),
    })
}

/// Serialize the backup as a single JSON document.
///
/// Field order is the struct declaration order: patients, sessions,
/// evaluations, exportDate.
pub fn to_json(data: &BackupData) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Serialize the backup as the combined CSV document.
///
/// Evaluations are kiosk survey rows with free-form emoji text; the CSV
/// backup carries the two tabular collections only, as the original did.
pub fn to_csv(data: &BackupData) -> String {
    csv::sections_to_csv(&[
        CsvSection {
            label: "PACIENTES",
            columns: &PATIENT_COLUMNS,
            rows: &data.patients,
        },
        CsvSection {
            label: "SESSÕES",
            columns: &SESSION_COLUMNS,
            rows: &data.sessions,
        },
    ])
}

/// Name the artifact after the export date: `backup-YYYY-MM-DD.<ext>`.
pub fn backup_filename(extension: &str, date: DateTime<Utc>) -> String {
    format!("backup-{}.{}", date.format("%Y-%m-%d"), extension)
}

/// Fetch and serialize in one step, for the export command and the runner.
pub async fn export(client: &RecordStoreClient, format: ExportFormat) -> AppResult<ExportFile> {
    let data = fetch_all_data(client).await?;

    let file = match format {
        ExportFormat::Json => ExportFile {
            filename: backup_filename("json", data.export_date),
            mime: "application/json".to_string(),
            contents: to_json(&data)?,
        },
        ExportFormat::Csv => ExportFile {
            filename: backup_filename("csv", data.export_date),
            mime: "text/csv;charset=utf-8;".to_string(),
            contents: to_csv(&data),
        },
    };

    log::info!(
        "Backup exported: {} ({} patients, {} sessions, {} evaluations)",
        file.filename,
        data.patients.len(),
        data.sessions.len(),
        data.evaluations.len()
    );

    Ok(file)
}
