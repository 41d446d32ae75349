//! Record Store Client
//!
//! HTTP client for the clinic's hosted backend (database rows + photo
//! storage). Row access goes through the REST endpoint with query-string
//! filters; photos are uploaded to a public bucket and referenced by URL.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::constants;
use crate::error::{AppError, AppResult};

use super::types::{
    Evaluation, NewEvaluation, NewPatient, NewSessionNote, Patient, SessionNote,
};

/// Hosted backend configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: constants::get_api_url(),
            api_key: constants::get_api_key(),
            timeout_seconds: constants::get_api_timeout(),
        }
    }
}

/// Record store client
pub struct RecordStoreClient {
    config: StoreConfig,
    http_client: reqwest::Client,
}

impl RecordStoreClient {
    /// Create new client
    pub fn new(config: StoreConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url, table)
    }

    /// Fetch raw rows from a table, for the backup exporter.
    pub async fn fetch_rows(
        &self,
        table: &str,
        order: &str,
        limit: Option<u32>,
    ) -> AppResult<Vec<Value>> {
        self.get_rows(table, &[("order", order)], limit).await
    }

    // ========================================================================
    // PATIENTS
    // ========================================================================

    /// All patients, newest first.
    pub async fn list_patients(&self) -> AppResult<Vec<Patient>> {
        self.get_rows("patients", &[("order", "created_at.desc")], None)
            .await
    }

    pub async fn get_patient(&self, id: Uuid) -> AppResult<Patient> {
        let eq = format!("eq.{}", id);
        let rows: Vec<Patient> = self
            .get_rows("patients", &[("id", eq.as_str())], Some(1))
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("patient".to_string()))
    }

    pub async fn create_patient(&self, patient: &NewPatient) -> AppResult<Patient> {
        self.insert_row("patients", patient).await
    }

    // ========================================================================
    // SESSIONS
    // ========================================================================

    /// Session notes for one patient, most recent session first.
    pub async fn list_sessions(&self, patient_id: Uuid) -> AppResult<Vec<SessionNote>> {
        let eq = format!("eq.{}", patient_id);
        self.get_rows(
            "sessions",
            &[("patient_id", eq.as_str()), ("order", "session_date.desc")],
            None,
        )
        .await
    }

    pub async fn create_session(&self, session: &NewSessionNote) -> AppResult<SessionNote> {
        self.insert_row("sessions", session).await
    }

    // ========================================================================
    // EVALUATIONS
    // ========================================================================

    /// Latest survey entries for the kiosk carousel.
    pub async fn recent_evaluations(&self, limit: u32) -> AppResult<Vec<Evaluation>> {
        self.get_rows("evaluations", &[("order", "created_at.desc")], Some(limit))
            .await
    }

    pub async fn create_evaluation(&self, evaluation: &NewEvaluation) -> AppResult<Evaluation> {
        self.insert_row("evaluations", evaluation).await
    }

    // ========================================================================
    // PHOTO STORAGE
    // ========================================================================

    /// Upload a patient photo and return its public URL.
    ///
    /// Object names are randomized; the bucket serves files publicly, the
    /// returned URL is what gets stored on the patient row.
    pub async fn upload_patient_photo(&self, bytes: Vec<u8>, extension: &str) -> AppResult<String> {
        let object_name = format!("{}.{}", Uuid::new_v4(), extension);
        let upload_url = format!(
            "{}/storage/v1/object/{}/{}",
            self.config.base_url,
            constants::PHOTO_BUCKET,
            object_name
        );

        let response = self
            .http_client
            .post(&upload_url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        Self::error_for_status(response).await?;

        log::info!("Patient photo uploaded: {}", object_name);

        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.base_url,
            constants::PHOTO_BUCKET,
            object_name
        ))
    }

    // ========================================================================
    // TRANSPORT
    // ========================================================================

    async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, &str)],
        limit: Option<u32>,
    ) -> AppResult<Vec<T>> {
        let mut request = self
            .http_client
            .get(self.rest_url(table))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .query(&[("select", "*")])
            .query(filters);

        if let Some(limit) = limit {
            request = request.query(&[("limit", limit.to_string())]);
        }

        let response = Self::error_for_status(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Insert one row and return the stored representation.
    async fn insert_row<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        row: &T,
    ) -> AppResult<R> {
        let response = self
            .http_client
            .post(self.rest_url(table))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        let response = Self::error_for_status(response).await?;

        // The REST endpoint answers inserts with an array of stored rows.
        let mut rows: Vec<R> = response.json().await?;
        rows.pop()
            .ok_or_else(|| AppError::Store(format!("insert into {} returned no row", table)))
    }

    async fn error_for_status(response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        log::error!("Record store returned {}: {}", status, body);
        Err(AppError::Store(format!("HTTP {}: {}", status, body)))
    }
}
