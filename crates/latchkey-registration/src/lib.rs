//! Pausable credential registration for the latchkey bridge.
//!
//! A registration may stop halfway to ask which second factor the user
//! wants. This crate keeps such paused registrations addressable by an
//! opaque [`ContinuationToken`](latchkey_core::ContinuationToken) until a
//! caller resumes them, and answers each caller exactly once.
//!
//! - [`RegistrationContinuation`]: the SDK listener for one registration
//! - [`PendingRegistrations`]: token → paused registration map
//! - [`Settler`] / [`PendingSettlement`]: callback to future bridge
//! - [`RegistrationState`]: lifecycle and its legal transitions
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use latchkey_core::SecondFactorType;
//! use latchkey_registration::{PendingRegistrations, RegistrationContinuation, settlement};
//! use latchkey_sdk::RegistrationListener;
//! use latchkey_sdk::mock::sample_credential;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry = Arc::new(PendingRegistrations::new());
//! let (continuation, first) = RegistrationContinuation::start(&registry, None);
//!
//! // The SDK asks for a second factor: the first caller gets a token.
//! continuation.on_authentication_type_selection_requested(Box::new(|_, _| {}));
//! let token = first.wait().await.unwrap().continuation_point().unwrap().clone();
//!
//! // A second caller resumes with that token.
//! let (settler, second) = settlement();
//! registry
//!     .take_and_remove(&token)
//!     .unwrap()
//!     .resume(settler, true, SecondFactorType::Pin);
//!
//! continuation.on_registration_completed(Some(sample_credential("c1")), None);
//! assert!(second.wait().await.unwrap().is_completed());
//! assert!(registry.is_empty());
//! # }
//! ```

pub mod continuation;
pub mod registry;
pub mod settlement;
pub mod state;

pub use continuation::RegistrationContinuation;
pub use registry::PendingRegistrations;
pub use settlement::{PendingSettlement, Settlement, Settler, settlement};
pub use state::RegistrationState;
