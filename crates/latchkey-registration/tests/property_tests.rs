//! Property-based tests for paused registration bookkeeping.
//!
//! These tests drive random sequences of resume attempts, mixing issued and
//! never-issued tokens, and check that every paused registration can be
//! resumed at most once.

use std::collections::HashSet;
use std::sync::Arc;

use latchkey_core::{ContinuationToken, ErrorKind, SecondFactorType};
use latchkey_registration::{
    PendingRegistrations, PendingSettlement, RegistrationContinuation, RegistrationState,
    settlement,
};
use latchkey_sdk::RegistrationListener;
use parking_lot::Mutex;
use proptest::prelude::*;

struct Paused {
    token: ContinuationToken,
    continuation: Arc<RegistrationContinuation>,
    selector_calls: Arc<Mutex<u32>>,
    _first: PendingSettlement,
}

/// Pause `count` registrations, counting selector invocations for each.
fn paused_registrations(registry: &Arc<PendingRegistrations>, count: usize) -> Vec<Paused> {
    (0..count)
        .map(|_| {
            let (continuation, first) = RegistrationContinuation::start(registry, None);
            let selector_calls = Arc::new(Mutex::new(0u32));
            let counter = selector_calls.clone();
            continuation.on_authentication_type_selection_requested(Box::new(move |_, _| {
                *counter.lock() += 1;
            }));
            let token = continuation.token().expect("paused registration has a token");
            Paused {
                token,
                continuation,
                selector_calls,
                _first: first,
            }
        })
        .collect()
}

proptest! {
    /// Property: a token resumes its registration at most once, whatever
    /// the order of attempts and however many unknown tokens are mixed in.
    #[test]
    fn prop_resume_succeeds_at_most_once(
        count in 1usize..8,
        attempts in prop::collection::vec(0usize..12, 0..40),
    ) {
        let registry = Arc::new(PendingRegistrations::new());
        let paused = paused_registrations(&registry, count);
        prop_assert_eq!(registry.len(), count);

        let mut resumed = HashSet::new();
        for index in attempts {
            let token = match paused.get(index) {
                Some(entry) => entry.token.clone(),
                None => ContinuationToken::from(format!("never-issued-{index}")),
            };
            match registry.take_and_remove(&token) {
                Ok(continuation) => {
                    prop_assert!(index < count);
                    prop_assert!(resumed.insert(index), "token {} resumed twice", index);
                    let (settler, _second) = settlement();
                    continuation.resume(settler, true, SecondFactorType::Pin);
                }
                Err(error) => {
                    prop_assert_eq!(error.kind(), ErrorKind::InvalidContinuationPoint);
                    prop_assert!(index >= count || resumed.contains(&index));
                }
            }
        }

        prop_assert_eq!(registry.len(), count - resumed.len());
        for (index, paused) in paused.iter().enumerate() {
            let was_resumed = resumed.contains(&index);
            prop_assert_eq!(*paused.selector_calls.lock(), u32::from(was_resumed));
            prop_assert_eq!(registry.contains(&paused.token), !was_resumed);
            let expected = if was_resumed {
                RegistrationState::Resumed
            } else {
                RegistrationState::AwaitingFactor
            };
            prop_assert_eq!(paused.continuation.state(), expected);
        }
    }

    /// Property: tokens issued to concurrent registrations never collide.
    #[test]
    fn prop_tokens_are_distinct(count in 1usize..32) {
        let registry = Arc::new(PendingRegistrations::new());
        let paused = paused_registrations(&registry, count);
        let tokens: HashSet<_> = paused.iter().map(|p| p.token.clone()).collect();
        prop_assert_eq!(tokens.len(), count);
    }
}
