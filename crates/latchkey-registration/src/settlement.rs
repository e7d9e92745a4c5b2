//! One-shot bridge from SDK callbacks to caller futures.
//!
//! A [`Settler`] is the write side held by a registration; the caller awaits
//! the matching [`PendingSettlement`]. `settle` consumes the settler, so a
//! caller can never be answered twice.

use latchkey_core::{Error, RegistrationResponse, Result};
use tokio::sync::oneshot;

/// Final answer handed to a waiting caller.
pub type Settlement = Result<RegistrationResponse>;

/// Create a connected settler and pending settlement.
pub fn settlement() -> (Settler, PendingSettlement) {
    let (tx, rx) = oneshot::channel();
    (Settler { tx }, PendingSettlement { rx })
}

/// Write side of a settlement.
#[derive(Debug)]
pub struct Settler {
    tx: oneshot::Sender<Settlement>,
}

impl Settler {
    /// Answer the waiting caller.
    ///
    /// Returns `false` if the caller stopped waiting.
    pub fn settle(self, outcome: Settlement) -> bool {
        self.tx.send(outcome).is_ok()
    }

    /// Whether the caller stopped waiting.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Read side of a settlement.
#[derive(Debug)]
pub struct PendingSettlement {
    rx: oneshot::Receiver<Settlement>,
}

impl PendingSettlement {
    /// Wait for the registration to answer.
    ///
    /// A settler dropped without answering yields `RegistrationFailed`.
    pub async fn wait(self) -> Settlement {
        self.rx.await.unwrap_or_else(|_| {
            Err(Error::registration_failed(
                "registration was dropped before it settled",
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_core::{ContinuationToken, ErrorKind};

    #[tokio::test]
    async fn test_settle_delivers_outcome() {
        let (settler, pending) = settlement();
        let response = RegistrationResponse::Pending {
            continuation_point: ContinuationToken::from("t1"),
        };
        assert!(settler.settle(Ok(response.clone())));
        assert_eq!(pending.wait().await, Ok(response));
    }

    #[tokio::test]
    async fn test_dropped_settler_fails_the_caller() {
        let (settler, pending) = settlement();
        drop(settler);
        let error = pending.wait().await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::RegistrationFailed);
    }

    #[test]
    fn test_abandoned_caller_is_reported() {
        let (settler, pending) = settlement();
        drop(pending);
        assert!(settler.is_abandoned());
        assert!(!settler.settle(Err(Error::RegistrationCancelled)));
    }
}
