//! Login Guard - Kiosk Access Rate Limiting
//!
//! State machine guarding the kiosk password check: counts consecutive
//! failed attempts, locks the login out for a fixed window after too many,
//! and persists both across restarts through the local key-value store.
//!
//! The persisted state plus recompute-on-call is the source of truth; the
//! auto-clear timer thread is an optimization so the UI unlocks without a
//! further attempt. Both paths test the same boundary (`now >= lockout_until`).

pub mod password;
pub mod storage;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::constants::{
    KEY_FAILED_ATTEMPTS, KEY_LOCKOUT_UNTIL, LOCKOUT_DURATION_MS, MAX_LOGIN_ATTEMPTS,
};
use storage::KeyValueStore;

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Outcome of a single login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AttemptResult {
    Allowed,
    Denied { remaining: u32 },
    Locked { remaining_seconds: u64 },
}

/// Current guard state, used to restore the login screen after a reload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoginStatus {
    Unlocked,
    Locked { remaining_seconds: u64 },
}

// ============================================================================
// LOGIN GUARD
// ============================================================================

pub struct LoginGuard {
    store: Arc<dyn KeyValueStore>,
    /// Serializes recompute-expiry and record-attempt so concurrent callers
    /// cannot lose updates between the two steps.
    state_lock: Arc<Mutex<()>>,
    /// Timers carry the generation they were scheduled under; a bumped
    /// generation logically cancels every older timer.
    timer_generation: Arc<AtomicU64>,
}

impl LoginGuard {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            state_lock: Arc::new(Mutex::new(())),
            timer_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run one login attempt against the stored password hash.
    ///
    /// Never raises: corrupted persisted state reads as a clean slate and
    /// every outcome is a value.
    pub fn attempt(&self, submitted: &str, stored_hash: &str) -> AttemptResult {
        let (result, newly_locked) = self.attempt_at(submitted, stored_hash, now_ms());
        if newly_locked {
            self.schedule_auto_clear(LOCKOUT_DURATION_MS);
        }
        result
    }

    /// Pure read of the guard state (also performs the lazy expiry clear).
    pub fn current_status(&self) -> LoginStatus {
        self.status_at(now_ms())
    }

    /// Attempt with an explicit clock, the core of the state machine.
    /// Returns the outcome and whether this call created a new lockout.
    fn attempt_at(&self, submitted: &str, stored_hash: &str, now: i64) -> (AttemptResult, bool) {
        let _guard = self.state_lock.lock();

        // Recompute before anything else so an elapsed lockout never eats
        // the incoming attempt.
        if let LoginStatus::Locked { remaining_seconds } = refresh_status(&*self.store, now) {
            // Hard gate: no attempt is consumed while locked.
            return (AttemptResult::Locked { remaining_seconds }, false);
        }

        if password::verify_password(submitted, stored_hash) {
            clear_login_state(&*self.store);
            return (AttemptResult::Allowed, false);
        }

        let attempts = read_attempts(&*self.store) + 1;
        self.store.set(KEY_FAILED_ATTEMPTS, &attempts.to_string());

        if attempts >= MAX_LOGIN_ATTEMPTS {
            let until = now + LOCKOUT_DURATION_MS;
            self.store.set(KEY_LOCKOUT_UNTIL, &until.to_string());
            log::warn!("Login locked after {} failed attempts", attempts);
            (
                AttemptResult::Locked {
                    remaining_seconds: (LOCKOUT_DURATION_MS / 1000) as u64,
                },
                true,
            )
        } else {
            (
                AttemptResult::Denied {
                    remaining: MAX_LOGIN_ATTEMPTS - attempts,
                },
                false,
            )
        }
    }

    fn status_at(&self, now: i64) -> LoginStatus {
        let _guard = self.state_lock.lock();
        refresh_status(&*self.store, now)
    }

    /// Spawn a one-shot timer that clears the lockout once it elapses.
    ///
    /// Scheduling bumps the generation, so an earlier timer that is still
    /// sleeping becomes stale and will not touch the newer lockout.
    fn schedule_auto_clear(&self, duration_ms: i64) {
        let generation = self.timer_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let gen_handle = Arc::clone(&self.timer_generation);
        let store = Arc::clone(&self.store);
        let state_lock = Arc::clone(&self.state_lock);

        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(duration_ms.max(0) as u64));

            let _guard = state_lock.lock();
            if gen_handle.load(Ordering::SeqCst) != generation {
                return; // superseded by a newer lockout
            }

            // Same boundary condition as the lazy path.
            if let LoginStatus::Unlocked = refresh_status(&*store, now_ms()) {
                log::info!("Lockout expired, login attempts reset");
            }
        });
    }
}

// ============================================================================
// PERSISTED STATE
// ============================================================================

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Failed attempt counter; anything unreadable counts as zero.
fn read_attempts(store: &dyn KeyValueStore) -> u32 {
    store
        .get(KEY_FAILED_ATTEMPTS)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn clear_login_state(store: &dyn KeyValueStore) {
    store.remove(KEY_FAILED_ATTEMPTS);
    store.remove(KEY_LOCKOUT_UNTIL);
}

/// Recompute the guard state from the persisted fields.
///
/// Clears expired or corrupted state on the way, so repeated reads after
/// expiry stay `Unlocked` with a zero counter.
fn refresh_status(store: &dyn KeyValueStore, now: i64) -> LoginStatus {
    match store.get(KEY_LOCKOUT_UNTIL) {
        None => {
            // A counter at the limit with no deadline is a torn write.
            if read_attempts(store) >= MAX_LOGIN_ATTEMPTS {
                log::warn!("Attempt counter at limit without a deadline, resetting");
                clear_login_state(store);
            }
            LoginStatus::Unlocked
        }
        Some(raw) => match raw.parse::<i64>().ok().filter(|until| *until > 0) {
            Some(until) if now < until => LoginStatus::Locked {
                remaining_seconds: remaining_seconds(until, now),
            },
            Some(_) => {
                clear_login_state(store);
                LoginStatus::Unlocked
            }
            None => {
                log::warn!("Persisted lockout deadline is unreadable, resetting");
                clear_login_state(store);
                LoginStatus::Unlocked
            }
        },
    }
}

/// Seconds left until the deadline, rounded up so the UI never shows 0
/// while still locked.
fn remaining_seconds(until: i64, now: i64) -> u64 {
    ((until - now + 999) / 1000) as u64
}

// ============================================================================
// TESTS
// ============================================================================
