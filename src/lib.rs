//! START Clinic - Patient Management Core
//!
//! Engine behind the clinic UI: kiosk login guard, patient/session/evaluation
//! records against the hosted store, and CSV/JSON backup export. The UI layer
//! binds to `api::commands` and renders `AppError` values as toasts.

pub mod api;
pub mod constants;
pub mod error;
pub mod logic;

pub use error::{AppError, AppResult};
