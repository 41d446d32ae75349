//! Records Module - Patients, Sessions, Evaluations
//!
//! Typed rows plus the HTTP client against the hosted record store. The
//! store owns the data; this module only reads and inserts.

pub mod client;
pub mod types;

pub use client::{RecordStoreClient, StoreConfig};
pub use types::{
    Evaluation, NewEvaluation, NewPatient, NewSessionNote, Patient, SessionNote,
};

/// Case-insensitive name/pathology filter for the patient list screen.
pub fn filter_patients(patients: Vec<Patient>, search: &str) -> Vec<Patient> {
    let term = search.trim().to_lowercase();
    if term.is_empty() {
        return patients;
    }

    patients
        .into_iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&term) || p.pathology.to_lowercase().contains(&term)
        })
        .collect()
}
