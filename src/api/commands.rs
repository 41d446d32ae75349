//! Commands - API for the Frontend
//!
//! Every screen in the UI maps onto one of these functions. The UI renders
//! `AppError` values as toasts; nothing here is fatal to the process.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::constants::{EVALUATION_FEED_LIMIT, KEY_AUTHENTICATED, KEY_PASSWORD_HASH};
use crate::error::{AppError, AppResult};
use crate::logic::auth::storage::{FileStore, KeyValueStore};
use crate::logic::auth::{password, AttemptResult, LoginGuard, LoginStatus};
use crate::logic::backup::{self, ExportFile, ExportFormat};
use crate::logic::records::{
    filter_patients, Evaluation, NewEvaluation, NewPatient, NewSessionNote, Patient,
    RecordStoreClient, SessionNote, StoreConfig,
};
use crate::logic::validation;

// ============================================================================
// APP STATE
// ============================================================================

/// Everything the commands need, created once at startup.
pub struct AppState {
    pub guard: LoginGuard,
    pub store: Arc<dyn KeyValueStore>,
    pub client: RecordStoreClient,
}

impl AppState {
    /// Production wiring: file-backed local state, configured hosted store.
    pub fn new() -> Self {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new());
        Self::with_parts(store, RecordStoreClient::new(StoreConfig::default()))
    }

    /// Explicit wiring, used by tests to substitute an in-memory store.
    pub fn with_parts(store: Arc<dyn KeyValueStore>, client: RecordStoreClient) -> Self {
        Self {
            guard: LoginGuard::new(store.clone()),
            store,
            client,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Photo picked in the patient registration form
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoUpload {
    pub bytes: Vec<u8>,
    pub extension: String,
}

// ============================================================================
// AUTH COMMANDS
// ============================================================================

/// Whether the kiosk still needs its first password.
pub fn needs_password_setup(state: &AppState) -> bool {
    state.store.get(KEY_PASSWORD_HASH).is_none()
}

/// Set or replace the kiosk password.
pub fn setup_password(state: &AppState, new_password: &str, confirmation: &str) -> AppResult<()> {
    validation::validate_password_setup(new_password, confirmation)?;
    let hash = password::hash_password(new_password)?;
    state.store.set(KEY_PASSWORD_HASH, &hash);
    log::info!("Kiosk password updated");
    Ok(())
}

/// Run one login attempt through the guard.
pub fn login(state: &AppState, submitted: &str) -> AppResult<AttemptResult> {
    let Some(stored_hash) = state.store.get(KEY_PASSWORD_HASH) else {
        return Err(AppError::Validation(
            "Cadastre a senha do sistema antes de entrar".to_string(),
        ));
    };

    let result = state.guard.attempt(submitted, &stored_hash);
    match result {
        AttemptResult::Allowed => {
            state.store.set(KEY_AUTHENTICATED, "true");
            log::info!("Login allowed");
        }
        AttemptResult::Denied { remaining } => {
            log::warn!("Login denied, {} attempts remaining", remaining);
        }
        AttemptResult::Locked { remaining_seconds } => {
            log::warn!("Login locked, {}s remaining", remaining_seconds);
        }
    }
    Ok(result)
}

/// Guard state for restoring the login screen after a reload.
pub fn login_status(state: &AppState) -> LoginStatus {
    state.guard.current_status()
}

/// What the protected screens check before rendering.
pub fn is_authenticated(state: &AppState) -> bool {
    state.store.get(KEY_AUTHENTICATED).as_deref() == Some("true")
}

pub fn logout(state: &AppState) {
    state.store.remove(KEY_AUTHENTICATED);
    log::info!("Logged out");
}

// ============================================================================
// PATIENT COMMANDS
// ============================================================================

/// Patient list, optionally filtered by the search box.
pub async fn list_patients(
    state: &AppState,
    search: Option<String>,
) -> AppResult<Vec<Patient>> {
    let patients = state.client.list_patients().await?;
    Ok(match search {
        Some(term) => filter_patients(patients, &term),
        None => patients,
    })
}

pub async fn get_patient(state: &AppState, id: Uuid) -> AppResult<Patient> {
    state.client.get_patient(id).await
}

/// Register a patient, uploading the photo first when one was picked.
pub async fn create_patient(
    state: &AppState,
    mut patient: NewPatient,
    photo: Option<PhotoUpload>,
) -> AppResult<Patient> {
    validation::validate_new_patient(&patient)?;

    if let Some(photo) = photo {
        let url = state
            .client
            .upload_patient_photo(photo.bytes, &photo.extension)
            .await?;
        patient.photo_url = Some(url);
    }

    let stored = state.client.create_patient(&patient).await?;
    log::info!("Patient registered: {}", stored.id);
    Ok(stored)
}

// ============================================================================
// SESSION COMMANDS
// ============================================================================

pub async fn list_sessions(state: &AppState, patient_id: Uuid) -> AppResult<Vec<SessionNote>> {
    state.client.list_sessions(patient_id).await
}

pub async fn add_session(state: &AppState, session: NewSessionNote) -> AppResult<SessionNote> {
    validation::validate_session_note(&session)?;
    let stored = state.client.create_session(&session).await?;
    log::info!("Session note added for patient {}", stored.patient_id);
    Ok(stored)
}

// ============================================================================
// EVALUATION COMMANDS
// ============================================================================

/// Latest survey entries for the kiosk carousel.
pub async fn recent_evaluations(state: &AppState) -> AppResult<Vec<Evaluation>> {
    state.client.recent_evaluations(EVALUATION_FEED_LIMIT).await
}

pub async fn submit_evaluation(
    state: &AppState,
    evaluation: NewEvaluation,
) -> AppResult<Evaluation> {
    validation::validate_evaluation(&evaluation.emoji)?;
    state.client.create_evaluation(&evaluation).await
}

// ============================================================================
// BACKUP COMMANDS
// ============================================================================

/// Export everything; the UI hands the returned artifact to a file save
/// dialog.
pub async fn export_backup(state: &AppState, format: ExportFormat) -> AppResult<ExportFile> {
    backup::export(&state.client, format).await
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::auth::storage::MemoryStore;

    fn state() -> AppState {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        AppState::with_parts(store, RecordStoreClient::new(StoreConfig::default()))
    }

    #[test]
    fn test_login_requires_password_setup() {
        let state = state();
        assert!(needs_password_setup(&state));

        let result = login(&state, "qualquer");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_setup_then_login_flow() {
        let state = state();

        setup_password(&state, "fisio2024", "fisio2024").unwrap();
        assert!(!needs_password_setup(&state));
        assert!(!is_authenticated(&state));

        assert_eq!(
            login(&state, "errada").unwrap(),
            AttemptResult::Denied { remaining: 2 }
        );
        assert!(!is_authenticated(&state));

        assert_eq!(login(&state, "fisio2024").unwrap(), AttemptResult::Allowed);
        assert!(is_authenticated(&state));

        logout(&state);
        assert!(!is_authenticated(&state));
        // Logging out does not relock or consume attempts.
        assert_eq!(login_status(&state), LoginStatus::Unlocked);
    }

    #[test]
    fn test_setup_rejects_mismatched_confirmation() {
        let state = state();
        let err = setup_password(&state, "fisio2024", "fisio2025").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(needs_password_setup(&state));
    }
}
