//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To point the app at another hosted backend, only edit this file.

/// Default hosted backend URL
///
/// This is the fallback URL when no environment variable is set.
/// For development: http://localhost:54321 (local stack)
/// For production: the clinic's hosted project URL
pub const DEFAULT_API_URL: &str = "http://localhost:54321";

/// Default service key for the hosted backend
pub const DEFAULT_API_KEY: &str = "dev-service-key-change-in-production";

/// Default HTTP timeout for record store requests (seconds)
pub const DEFAULT_API_TIMEOUT: u64 = 30;

/// Maximum consecutive failed login attempts before lockout
pub const MAX_LOGIN_ATTEMPTS: u32 = 3;

/// Lockout duration after too many failed attempts (milliseconds)
pub const LOCKOUT_DURATION_MS: i64 = 300_000;

/// Storage bucket for patient photos
pub const PHOTO_BUCKET: &str = "patient-photos";

/// How many survey entries the kiosk carousel shows
pub const EVALUATION_FEED_LIMIT: u32 = 10;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "START Clinic";

// ============================================
// Persisted state keys (local key-value store)
// ============================================

/// Counter of consecutive failed login attempts
pub const KEY_FAILED_ATTEMPTS: &str = "login_failed_attempts";

/// Epoch-millisecond deadline of the active lockout (absent = unlocked)
pub const KEY_LOCKOUT_UNTIL: &str = "login_lockout_until";

/// Argon2 PHC hash of the kiosk password
pub const KEY_PASSWORD_HASH: &str = "system_password_hash";

/// Session flag the protected screens check ("true" while logged in)
pub const KEY_AUTHENTICATED: &str = "is_authenticated";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get hosted backend URL from environment or use default
pub fn get_api_url() -> String {
    std::env::var("CLINIC_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Get service key from environment or use default
pub fn get_api_key() -> String {
    std::env::var("CLINIC_API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string())
}

/// Get HTTP timeout from environment or use default
pub fn get_api_timeout() -> u64 {
    std::env::var("CLINIC_API_TIMEOUT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_API_TIMEOUT)
}
