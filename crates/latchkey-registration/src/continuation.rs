//! The listener that turns one SDK registration into caller settlements.
//!
//! A registration answers up to two callers. The first, which started the
//! registration, is answered either with the final outcome or with a
//! continuation token if the SDK pauses on a second-factor decision. The
//! second, which resumes with a chosen factor, is answered with the final
//! outcome.
//!
//! ```text
//!  begin ──► Started ──(SDK: select factor)──► AwaitingFactor ──(resume)──► Resumed
//!               │                                   │      │                    │
//!               │                         (SDK error)│      │(timeout/teardown)  │
//!               ▼                                   ▼      ▼                    ▼
//!           Completed ◄─────────────────────── Completed  Cancelled         Completed
//! ```
//!
//! A registration still `Started` when its registry is closed goes straight
//! to `Cancelled` on its pause request, answering the first caller with
//! `RegistrationCancelled` instead of a token.
//!
//! No lock is held while calling the selector, the registry's owner, or a
//! settler. The SDK may call back synchronously from inside the selector.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use latchkey_core::{
    ContinuationToken, Credential, CredentialRecord, Error, RegistrationResponse,
    SecondFactorType, exactly_one,
};
use latchkey_sdk::{RegistrationListener, SdkError, SecondFactorSelector};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::registry::PendingRegistrations;
use crate::settlement::{PendingSettlement, Settler, settlement};
use crate::state::RegistrationState;

/// Per-registration continuation, handed to the SDK as its listener.
pub struct RegistrationContinuation {
    me: Weak<Self>,
    registry: Weak<PendingRegistrations>,
    awaiting_factor_timeout: Option<Duration>,
    runtime: Option<Handle>,
    inner: Mutex<Inner>,
}

struct Inner {
    state: RegistrationState,
    settler: Option<Settler>,
    selector: Option<SecondFactorSelector>,
    token: Option<ContinuationToken>,
    timer: Option<AbortHandle>,
}

impl RegistrationContinuation {
    /// Start a registration whose first caller awaits the returned settlement.
    ///
    /// With `awaiting_factor_timeout`, a registration left paused that long
    /// is cancelled with `RegistrationTimedOut`. The timer runs on the tokio
    /// runtime current at this call; without one the timeout is disabled.
    pub fn start(
        registry: &Arc<PendingRegistrations>,
        awaiting_factor_timeout: Option<Duration>,
    ) -> (Arc<Self>, PendingSettlement) {
        let (settler, pending) = settlement();
        let runtime = awaiting_factor_timeout.and_then(|_| match Handle::try_current() {
            Ok(handle) => Some(handle),
            Err(_) => {
                warn!("no tokio runtime available; awaiting-factor timeout disabled");
                None
            }
        });

        let continuation = Arc::new_cyclic(|me| Self {
            me: me.clone(),
            registry: Arc::downgrade(registry),
            awaiting_factor_timeout,
            runtime,
            inner: Mutex::new(Inner {
                state: RegistrationState::Started,
                settler: Some(settler),
                selector: None,
                token: None,
                timer: None,
            }),
        });
        (continuation, pending)
    }

    pub fn state(&self) -> RegistrationState {
        self.inner.lock().state
    }

    /// Token issued when the registration paused, while it is still paused.
    pub fn token(&self) -> Option<ContinuationToken> {
        self.inner.lock().token.clone()
    }

    /// Resume a paused registration with the caller's factor choice.
    ///
    /// `settler` answers the resuming caller. If the registration ended
    /// between the registry lookup and this call, it is answered with
    /// `InvalidContinuationPoint`.
    ///
    /// # Panics
    ///
    /// Panics if the registration is not paused and has not ended, meaning
    /// it was resumed without going through the registry.
    pub fn resume(&self, settler: Settler, factor_selected: bool, factor_type: SecondFactorType) {
        let selector = {
            let mut inner = self.inner.lock();
            let state = inner.state;
            match state {
                RegistrationState::AwaitingFactor => {}
                state if state.is_terminal() => {
                    let token = inner.token.clone().map(|t| t.to_string()).unwrap_or_default();
                    drop(inner);
                    debug!(%state, "resume raced with registration end");
                    settler.settle(Err(Error::invalid_continuation_point(token)));
                    return;
                }
                state => panic!("cannot resume a registration that is {state}"),
            }
            let Some(selector) = inner.selector.take() else {
                panic!("registration is awaiting a factor without a selector");
            };
            inner.state = RegistrationState::Resumed;
            inner.settler = Some(settler);
            inner.token = None;
            if let Some(timer) = inner.timer.take() {
                timer.abort();
            }
            selector
        };

        info!(
            factor_selected,
            factor = factor_type.as_str(),
            "resuming registration"
        );
        selector(factor_selected, factor_type);
    }

    /// Abandon a registration that has not been resumed or ended.
    ///
    /// The selector is dropped without being called and a live settler is
    /// answered with `error`. Has no effect once the registration has been
    /// resumed or has ended.
    pub fn cancel(&self, error: Error) {
        let (settler, selector, token) = {
            let mut inner = self.inner.lock();
            if !inner.state.can_transition_to(&RegistrationState::Cancelled) {
                debug!(state = %inner.state, "cancel ignored");
                return;
            }
            inner.state = RegistrationState::Cancelled;
            if let Some(timer) = inner.timer.take() {
                timer.abort();
            }
            (inner.settler.take(), inner.selector.take(), inner.token.take())
        };
        drop(selector);

        if let (Some(token), Some(registry)) = (&token, self.registry.upgrade()) {
            registry.remove_if_present(token);
        }
        warn!(
            token = token.as_ref().map(ContinuationToken::as_str),
            code = error.code(),
            "registration cancelled"
        );
        if let Some(settler) = settler {
            settler.settle(Err(error));
        }
    }

    fn pause(&self, selector: SecondFactorSelector) {
        let (Some(me), Some(registry)) = (self.me.upgrade(), self.registry.upgrade()) else {
            warn!("second factor requested after the bridge was torn down");
            self.cancel(Error::RegistrationCancelled);
            return;
        };

        let (settler, token) = {
            let mut inner = self.inner.lock();
            if !inner
                .state
                .can_transition_to(&RegistrationState::AwaitingFactor)
            {
                warn!(state = %inner.state, "unexpected second-factor request ignored");
                return;
            }

            let token = loop {
                let token = ContinuationToken::generate();
                match registry.insert(token.clone(), me.clone()) {
                    Ok(()) => break token,
                    Err(Error::DuplicateToken { token }) => {
                        debug_assert!(false, "duplicate continuation token {token}");
                        warn!(%token, "regenerating continuation token");
                    }
                    Err(error) => {
                        drop(inner);
                        warn!(code = error.code(), "registry closed before the pause");
                        self.cancel(error);
                        return;
                    }
                }
            };

            inner.state = RegistrationState::AwaitingFactor;
            inner.selector = Some(selector);
            inner.token = Some(token.clone());
            inner.timer = self.arm_timer(&token);
            (inner.settler.take(), token)
        };

        info!(%token, "registration awaiting second factor");
        let answered = settler.is_some_and(|settler| {
            settler.settle(Ok(RegistrationResponse::Pending {
                continuation_point: token.clone(),
            }))
        });
        if !answered {
            // Nobody holds the token, so nobody can resume.
            debug!(%token, "caller went away before the pause was reported");
            registry.remove_if_present(&token);
            self.cancel(Error::RegistrationCancelled);
        }
    }

    fn arm_timer(&self, token: &ContinuationToken) -> Option<AbortHandle> {
        let timeout = self.awaiting_factor_timeout?;
        let runtime = self.runtime.as_ref()?;
        let registry = self.registry.clone();
        let token = token.clone();

        let task = runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            let Some(registry) = registry.upgrade() else {
                return;
            };
            if let Ok(continuation) = registry.take_and_remove(&token) {
                info!(%token, ?timeout, "second-factor decision timed out");
                continuation.cancel(Error::RegistrationTimedOut);
            }
        });
        Some(task.abort_handle())
    }

    fn complete(&self, outcome: Result<Credential, SdkError>) {
        let (settler, token) = {
            let mut inner = self.inner.lock();
            if !inner
                .state
                .can_transition_to(&RegistrationState::Completed)
            {
                warn!(
                    state = %inner.state,
                    succeeded = outcome.is_ok(),
                    "registration outcome after it already ended; discarded"
                );
                return;
            }
            inner.state = RegistrationState::Completed;
            inner.selector = None;
            if let Some(timer) = inner.timer.take() {
                timer.abort();
            }
            (inner.settler.take(), inner.token.take())
        };

        if let (Some(token), Some(registry)) = (&token, self.registry.upgrade()) {
            registry.remove_if_present(token);
        }

        let response = match outcome {
            Ok(credential) => {
                info!(credential_id = %credential.id, "registration completed");
                Ok(RegistrationResponse::Completed {
                    credential: CredentialRecord::from(&credential),
                })
            }
            Err(error) => {
                warn!(%error, "registration failed");
                Err(Error::registration_failed(error.message()))
            }
        };

        match settler {
            Some(settler) => {
                if !settler.settle(response) {
                    debug!("caller went away before the registration completed");
                }
            }
            None => warn!("registration outcome had no waiting caller; discarded"),
        }
    }
}

impl RegistrationListener for RegistrationContinuation {
    fn on_registration_completed(&self, credential: Option<Credential>, error: Option<SdkError>) {
        self.complete(exactly_one(credential, error, "on_registration_completed"));
    }

    fn on_authentication_type_selection_requested(&self, selector: SecondFactorSelector) {
        self.pause(selector);
    }
}

impl fmt::Debug for RegistrationContinuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("RegistrationContinuation")
            .field("state", &inner.state)
            .field("token", &inner.token)
            .field("awaiting_factor_timeout", &self.awaiting_factor_timeout)
            .finish()
    }
}
