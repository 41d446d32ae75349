//! API Module
//!
//! The surface the UI binds to. One function per screen action; DTOs are
//! plain serde types so the frontend bridge stays thin.

pub mod commands;
