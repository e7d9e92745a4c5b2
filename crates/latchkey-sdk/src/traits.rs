//! SDK boundary trait definitions.
//!
//! The native access SDK is delegate driven: operations return immediately
//! and report their outcome later by calling back into a listener object,
//! on whatever context the SDK serializes its callbacks onto. These traits
//! mirror that contract so the bridge can be exercised against a real
//! binding or against [`MockSdk`](crate::mock::MockSdk).
//!
//! Unlike device I/O, nothing here is `async`: callbacks are plain method
//! calls, which keeps every trait object safe (`Arc<dyn ...>`), and the
//! bridge turns them into futures on the caller side.

use std::sync::Arc;

use latchkey_core::{
    AccessResult, BackgroundScanningMode, Credential, Reader, ReaderAttributes, ReaderUpdateType,
    SdkOptions, SdkState, SecondFactorType,
};
use url::Url;

use crate::error::SdkError;

/// Resumes a registration paused on a second-factor decision.
///
/// Arguments are whether the user opted to provide a factor at all and the
/// factor type. Being `FnOnce`, a selector can be invoked at most once.
pub type SecondFactorSelector = Box<dyn FnOnce(bool, SecondFactorType) + Send>;

/// Completion callback for [`MobileAccessSdk::delete_credential`].
///
/// Exactly one of the two arguments is present.
pub type DeleteCompletion = Box<dyn FnOnce(Option<Credential>, Option<SdkError>) + Send>;

/// Receives the progress of one credential registration.
pub trait RegistrationListener: Send + Sync {
    /// Registration reached a terminal outcome.
    ///
    /// Exactly one of `credential` and `error` is present.
    fn on_registration_completed(&self, credential: Option<Credential>, error: Option<SdkError>);

    /// The SDK needs a second-factor decision before it can continue.
    fn on_authentication_type_selection_requested(&self, selector: SecondFactorSelector);
}

/// Receives scanning and SDK state changes.
pub trait SdkStateListener: Send + Sync {
    fn on_state_changed(&self, is_scanning: bool, states: &[SdkState]);
}

/// Receives reader discovery and availability updates.
pub trait ReaderUpdateListener: Send + Sync {
    fn on_reader_updated(&self, reader: &ReaderAttributes, update_type: ReaderUpdateType);
}

/// Receives access attempts against a reader.
///
/// The same trait serves both user-initiated and automatic access.
pub trait AccessListener: Send + Sync {
    fn on_access_started(&self, reader: &Reader);

    /// Access attempt finished. Exactly one of `result` and `error` is present.
    fn on_access_completed(
        &self,
        reader: &Reader,
        result: Option<&AccessResult>,
        error: Option<&SdkError>,
    );

    /// The user must present the phone to the reader again.
    fn on_return_to_reader_required(&self, _reader: &Reader) {}

    /// The user presented the phone to the reader again.
    fn on_returned_to_reader(&self, _reader: &Reader) {}
}

/// A configured SDK instance.
///
/// All methods take `&self`; implementations synchronize internally.
/// Listener removal matches by identity of the `Arc` passed to `add_*`.
pub trait MobileAccessSdk: Send + Sync + 'static {
    /// Current SDK states.
    fn states(&self) -> Vec<SdkState>;

    /// Credentials currently held by the SDK.
    fn credentials(&self) -> Vec<Credential>;

    fn set_scanning(&self, enabled: bool);

    fn set_automatic_access_enabled(&self, enabled: bool);

    fn set_background_scanning_mode(&self, mode: BackgroundScanningMode);

    /// Build the invitation URL for `host` and `invitation_code`.
    ///
    /// Returns `None` when the SDK rejects either input.
    fn resolve_invitation_url(&self, host: &str, invitation_code: &str) -> Option<Url>;

    /// Start registering the credential behind `url`.
    ///
    /// Progress is reported to `listener`, possibly before this returns.
    fn register_credential(&self, url: &Url, listener: Arc<dyn RegistrationListener>);

    /// Delete `credential`, reporting the outcome to `completion`.
    fn delete_credential(&self, credential: &Credential, completion: DeleteCompletion);

    fn add_sdk_state_listener(&self, listener: Arc<dyn SdkStateListener>);
    fn remove_sdk_state_listener(&self, listener: &Arc<dyn SdkStateListener>);

    fn add_reader_update_listener(&self, listener: Arc<dyn ReaderUpdateListener>);
    fn remove_reader_update_listener(&self, listener: &Arc<dyn ReaderUpdateListener>);

    /// Listen for user-initiated access attempts.
    fn add_access_listener(&self, listener: Arc<dyn AccessListener>);
    fn remove_access_listener(&self, listener: &Arc<dyn AccessListener>);

    /// Listen for automatic (ambient) access attempts.
    fn add_automatic_access_listener(&self, listener: Arc<dyn AccessListener>);
    fn remove_automatic_access_listener(&self, listener: &Arc<dyn AccessListener>);
}

/// Entry point that configures an SDK instance.
pub trait SdkProvider: Send + Sync {
    fn configure(&self, options: &SdkOptions) -> Arc<dyn MobileAccessSdk>;
}

/// Whether two listener handles point at the same object.
///
/// Compares data pointers only, so the same object registered through
/// different trait objects still matches.
pub fn same_listener<T: ?Sized, U: ?Sized>(a: &Arc<T>, b: &Arc<U>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Quiet;

    impl SdkStateListener for Quiet {
        fn on_state_changed(&self, _is_scanning: bool, _states: &[SdkState]) {}
    }

    impl ReaderUpdateListener for Quiet {
        fn on_reader_updated(&self, _reader: &ReaderAttributes, _update_type: ReaderUpdateType) {}
    }

    #[test]
    fn test_same_listener_across_trait_objects() {
        let quiet = Arc::new(Quiet);
        let state: Arc<dyn SdkStateListener> = quiet.clone();
        let reader: Arc<dyn ReaderUpdateListener> = quiet.clone();
        assert!(same_listener(&state, &reader));

        let other: Arc<dyn SdkStateListener> = Arc::new(Quiet);
        assert!(!same_listener(&state, &other));
    }
}
