//! Clinic Record Types
//!
//! Rows of the three hosted collections, plus the insert payloads without
//! server-assigned fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Patient record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub pathology: String,
    pub session_package: String,
    pub treatment_start_date: NaiveDate,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for registering a patient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub phone: String,
    pub pathology: String,
    pub session_package: String,
    pub treatment_start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// One session note in a patient's evolution timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionNote {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub session_date: NaiveDate,
    pub evolution: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for appending a session note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSessionNote {
    pub patient_id: Uuid,
    pub session_date: NaiveDate,
    pub evolution: String,
}

/// Kiosk satisfaction survey entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: Uuid,
    pub emoji: String,
    #[serde(default)]
    pub feedback_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for submitting a survey entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvaluation {
    pub emoji: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_text: Option<String>,
}
