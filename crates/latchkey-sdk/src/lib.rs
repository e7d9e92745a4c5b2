//! Access SDK abstraction layer for the latchkey bridge.
//!
//! This crate describes the boundary between the bridge and the native
//! mobile access SDK: the SDK instance itself, the provider that configures
//! it, and the listener traits through which the SDK reports registration
//! progress, state changes, reader updates and access attempts.
//!
//! # Design Philosophy
//!
//! - **Callback-shaped**: SDK operations return immediately and report
//!   outcomes later through listeners, exactly like the native SDK.
//! - **Object-safe**: every trait is used as `Arc<dyn Trait>`.
//! - **Thread-safe**: every trait requires `Send + Sync`; callbacks may
//!   arrive on any thread, including synchronously from inside a call.
//!
//! # Registering a Credential
//!
//! ```no_run
//! use std::sync::Arc;
//! use latchkey_core::{Credential, SecondFactorType};
//! use latchkey_sdk::{MobileAccessSdk, RegistrationListener, SdkError, SecondFactorSelector};
//!
//! struct PickPin;
//!
//! impl RegistrationListener for PickPin {
//!     fn on_registration_completed(&self, credential: Option<Credential>, error: Option<SdkError>) {
//!         println!("done: {credential:?} {error:?}");
//!     }
//!
//!     fn on_authentication_type_selection_requested(&self, selector: SecondFactorSelector) {
//!         selector(true, SecondFactorType::Pin);
//!     }
//! }
//!
//! fn register(sdk: &dyn MobileAccessSdk, host: &str, code: &str) {
//!     if let Some(url) = sdk.resolve_invitation_url(host, code) {
//!         sdk.register_credential(&url, Arc::new(PickPin));
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! SDK failures arrive as [`SdkError`] values inside callbacks. Their text is
//! the SDK's own description and is surfaced to callers verbatim.
//!
//! # Mock Implementation
//!
//! [`mock::MockProvider`] configures an in-memory SDK whose behaviour is
//! scripted through [`mock::MockSdkHandle`].

pub mod error;
pub mod mock;
pub mod traits;

// Re-export commonly used types for convenience
pub use error::{Result, SdkError};
pub use traits::{
    AccessListener, DeleteCompletion, MobileAccessSdk, ReaderUpdateListener, RegistrationListener,
    SdkProvider, SdkStateListener, SecondFactorSelector, same_listener,
};
