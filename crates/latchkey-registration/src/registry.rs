//! Registrations paused on a second-factor decision, keyed by token.
//!
//! An entry exists exactly while its registration is awaiting a factor.
//! [`take_and_remove`](PendingRegistrations::take_and_remove) is the only
//! way a caller reaches a paused registration, and it hands the entry out
//! at most once. A [`close`](PendingRegistrations::close)d registry accepts
//! no new entries.

use std::collections::HashMap;
use std::sync::Arc;

use latchkey_core::{ContinuationToken, Error, Result};
use parking_lot::Mutex;
use tracing::trace;

use crate::continuation::RegistrationContinuation;

/// Map of paused registrations.
///
/// Lock order: a continuation may call into the registry while holding its
/// own lock; the registry never calls into a continuation.
#[derive(Default)]
pub struct PendingRegistrations {
    entries: Mutex<Entries>,
}

#[derive(Default)]
struct Entries {
    paused: HashMap<ContinuationToken, Arc<RegistrationContinuation>>,
    closed: bool,
}

impl PendingRegistrations {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a paused registration under `token`.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationCancelled` once the registry is closed, and
    /// `DuplicateToken` if `token` is already present; the existing entry is
    /// left untouched.
    pub fn insert(
        &self,
        token: ContinuationToken,
        continuation: Arc<RegistrationContinuation>,
    ) -> Result<()> {
        let mut entries = self.entries.lock();
        if entries.closed {
            return Err(Error::RegistrationCancelled);
        }
        if entries.paused.contains_key(&token) {
            return Err(Error::DuplicateToken {
                token: token.to_string(),
            });
        }
        trace!(%token, "pending registration stored");
        entries.paused.insert(token, continuation);
        Ok(())
    }

    /// Atomically look up and remove the registration under `token`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidContinuationPoint` if `token` was never issued or has
    /// already been consumed.
    pub fn take_and_remove(
        &self,
        token: &ContinuationToken,
    ) -> Result<Arc<RegistrationContinuation>> {
        self.entries
            .lock()
            .paused
            .remove(token)
            .ok_or_else(|| Error::invalid_continuation_point(token.as_str()))
    }

    /// Remove `token` if present. Returns whether an entry was removed.
    pub fn remove_if_present(&self, token: &ContinuationToken) -> bool {
        self.entries.lock().paused.remove(token).is_some()
    }

    pub fn contains(&self, token: &ContinuationToken) -> bool {
        self.entries.lock().paused.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().paused.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().paused.is_empty()
    }

    /// Remove and return every entry.
    pub fn drain(&self) -> Vec<(ContinuationToken, Arc<RegistrationContinuation>)> {
        self.entries.lock().paused.drain().collect()
    }

    /// Refuse further inserts, then remove and return every entry.
    ///
    /// Both happen under one lock, so a registration pausing concurrently
    /// either lands in the returned entries or has its insert refused.
    pub fn close(&self) -> Vec<(ContinuationToken, Arc<RegistrationContinuation>)> {
        let mut entries = self.entries.lock();
        entries.closed = true;
        entries.paused.drain().collect()
    }

    pub fn is_closed(&self) -> bool {
        self.entries.lock().closed
    }
}

impl std::fmt::Debug for PendingRegistrations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("PendingRegistrations")
            .field("len", &entries.paused.len())
            .field("closed", &entries.closed)
            .finish()
    }
}
