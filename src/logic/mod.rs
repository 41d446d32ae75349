//! Logic Module - Business Logic
//!
//! The engines behind the screens: login guard, record access, validation,
//! backup export.

pub mod auth;
pub mod backup;
pub mod records;
pub mod validation;
