//! Scriptable in-memory access SDK.
//!
//! [`MockProvider`] hands out a [`MockSdk`] on every configure call, while the
//! paired [`MockSdkHandle`] drives it from the outside: queueing registration
//! outcomes, firing listener callbacks and inspecting what the bridge asked
//! the SDK to do. Both sides share one state block, so a handle keeps working
//! across reconfiguration.
//!
//! Callbacks run synchronously on the thread that triggers them, the same
//! way a real SDK may call back before `register_credential` returns.
//! No lock is held while a callback runs.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use latchkey_core::{
    AccessResult, BackgroundScanningMode, Credential, Reader, ReaderAttributes, ReaderUpdateType,
    SdkOptions, SdkState, SecondFactorType,
};
use parking_lot::Mutex;
use tracing::debug;
use url::Url;

use crate::error::SdkError;
use crate::traits::{
    AccessListener, DeleteCompletion, MobileAccessSdk, ReaderUpdateListener,
    RegistrationListener, SdkProvider, SdkStateListener, SecondFactorSelector, same_listener,
};

/// How the mock answers the next `register_credential` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationScript {
    /// Complete immediately with this credential.
    Succeed(Credential),

    /// Fail immediately with this message.
    Fail(String),

    /// Ask for a second factor, then deliver `outcome` once a factor is chosen.
    RequireSecondFactor { outcome: Result<Credential, String> },
}

/// Which listener family an access notification is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessSource {
    /// User-initiated access listeners.
    User,
    /// Automatic access listeners.
    Automatic,
}

/// Number of listeners currently attached, per family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerCounts {
    pub sdk_state: usize,
    pub reader_update: usize,
    pub access: usize,
    pub automatic_access: usize,
}

impl ListenerCounts {
    pub fn total(&self) -> usize {
        self.sdk_state + self.reader_update + self.access + self.automatic_access
    }
}

struct MockRegistration {
    url: Url,
    listener: Arc<dyn RegistrationListener>,
}

#[derive(Default)]
struct MockState {
    configured: Vec<SdkOptions>,
    states: Vec<SdkState>,
    credentials: Vec<Credential>,
    scanning: bool,
    automatic_access: bool,
    background_mode: Option<BackgroundScanningMode>,

    scripts: VecDeque<RegistrationScript>,
    registrations: Vec<MockRegistration>,
    selections: Vec<(bool, SecondFactorType)>,

    delete_failures: VecDeque<String>,
    deleted: Vec<String>,

    sdk_state_listeners: Vec<Arc<dyn SdkStateListener>>,
    reader_update_listeners: Vec<Arc<dyn ReaderUpdateListener>>,
    access_listeners: Vec<Arc<dyn AccessListener>>,
    automatic_access_listeners: Vec<Arc<dyn AccessListener>>,
}

type Shared = Arc<Mutex<MockState>>;

/// Provider that configures [`MockSdk`] instances.
///
/// # Examples
///
/// ```
/// use latchkey_core::SdkOptions;
/// use latchkey_sdk::SdkProvider;
/// use latchkey_sdk::mock::MockProvider;
///
/// let (provider, handle) = MockProvider::new();
/// let sdk = provider.configure(&SdkOptions::default());
/// handle.add_credential(latchkey_sdk::mock::sample_credential("c1"));
///
/// assert_eq!(handle.configure_count(), 1);
/// assert_eq!(sdk.credentials().len(), 1);
/// ```
pub struct MockProvider {
    shared: Shared,
}

impl MockProvider {
    /// Create a provider and the handle that controls its SDK.
    pub fn new() -> (Self, MockSdkHandle) {
        let shared = Shared::default();
        let handle = MockSdkHandle {
            shared: shared.clone(),
        };
        (Self { shared }, handle)
    }
}

impl SdkProvider for MockProvider {
    fn configure(&self, options: &SdkOptions) -> Arc<dyn MobileAccessSdk> {
        debug!(?options, "mock sdk configured");
        self.shared.lock().configured.push(options.clone());
        Arc::new(MockSdk {
            shared: self.shared.clone(),
        })
    }
}

/// In-memory [`MobileAccessSdk`].
pub struct MockSdk {
    shared: Shared,
}

impl MobileAccessSdk for MockSdk {
    fn states(&self) -> Vec<SdkState> {
        self.shared.lock().states.clone()
    }

    fn credentials(&self) -> Vec<Credential> {
        self.shared.lock().credentials.clone()
    }

    fn set_scanning(&self, enabled: bool) {
        self.shared.lock().scanning = enabled;
    }

    fn set_automatic_access_enabled(&self, enabled: bool) {
        self.shared.lock().automatic_access = enabled;
    }

    fn set_background_scanning_mode(&self, mode: BackgroundScanningMode) {
        self.shared.lock().background_mode = Some(mode);
    }

    fn resolve_invitation_url(&self, host: &str, invitation_code: &str) -> Option<Url> {
        let valid = |part: &str| {
            !part.is_empty() && !part.contains(|c: char| c.is_whitespace() || c == '/')
        };
        if !valid(host) || !valid(invitation_code) {
            return None;
        }
        Url::parse(&format!("https://{host}/api/invitations/{invitation_code}")).ok()
    }

    fn register_credential(&self, url: &Url, listener: Arc<dyn RegistrationListener>) {
        let script = {
            let mut state = self.shared.lock();
            state.registrations.push(MockRegistration {
                url: url.clone(),
                listener: listener.clone(),
            });
            state.scripts.pop_front()
        };

        match script {
            Some(RegistrationScript::Succeed(credential)) => {
                self.shared.lock().credentials.push(credential.clone());
                listener.on_registration_completed(Some(credential), None);
            }
            Some(RegistrationScript::Fail(message)) => {
                listener.on_registration_completed(None, Some(SdkError::registration(message)));
            }
            Some(RegistrationScript::RequireSecondFactor { outcome }) => {
                let shared = self.shared.clone();
                let follow_up = listener.clone();
                let selector: SecondFactorSelector = Box::new(move |selected, factor| {
                    shared.lock().selections.push((selected, factor));
                    match outcome {
                        Ok(credential) => {
                            shared.lock().credentials.push(credential.clone());
                            follow_up.on_registration_completed(Some(credential), None);
                        }
                        Err(message) => follow_up
                            .on_registration_completed(None, Some(SdkError::registration(message))),
                    }
                });
                listener.on_authentication_type_selection_requested(selector);
            }
            // Manual mode: the handle drives this registration.
            None => debug!(%url, "registration awaiting manual completion"),
        }
    }

    fn delete_credential(&self, credential: &Credential, completion: DeleteCompletion) {
        let outcome = {
            let mut state = self.shared.lock();
            match state.delete_failures.pop_front() {
                Some(message) => Err(SdkError::credential_delete(message)),
                None => {
                    state.credentials.retain(|c| c.id != credential.id);
                    state.deleted.push(credential.id.clone());
                    Ok(credential.clone())
                }
            }
        };
        match outcome {
            Ok(credential) => completion(Some(credential), None),
            Err(error) => completion(None, Some(error)),
        }
    }

    fn add_sdk_state_listener(&self, listener: Arc<dyn SdkStateListener>) {
        self.shared.lock().sdk_state_listeners.push(listener);
    }

    fn remove_sdk_state_listener(&self, listener: &Arc<dyn SdkStateListener>) {
        self.shared
            .lock()
            .sdk_state_listeners
            .retain(|l| !same_listener(l, listener));
    }

    fn add_reader_update_listener(&self, listener: Arc<dyn ReaderUpdateListener>) {
        self.shared.lock().reader_update_listeners.push(listener);
    }

    fn remove_reader_update_listener(&self, listener: &Arc<dyn ReaderUpdateListener>) {
        self.shared
            .lock()
            .reader_update_listeners
            .retain(|l| !same_listener(l, listener));
    }

    fn add_access_listener(&self, listener: Arc<dyn AccessListener>) {
        self.shared.lock().access_listeners.push(listener);
    }

    fn remove_access_listener(&self, listener: &Arc<dyn AccessListener>) {
        self.shared
            .lock()
            .access_listeners
            .retain(|l| !same_listener(l, listener));
    }

    fn add_automatic_access_listener(&self, listener: Arc<dyn AccessListener>) {
        self.shared.lock().automatic_access_listeners.push(listener);
    }

    fn remove_automatic_access_listener(&self, listener: &Arc<dyn AccessListener>) {
        self.shared
            .lock()
            .automatic_access_listeners
            .retain(|l| !same_listener(l, listener));
    }
}

/// Handle for controlling a [`MockSdk`] from tests and demos.
#[derive(Clone)]
pub struct MockSdkHandle {
    shared: Shared,
}

impl MockSdkHandle {
    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Queue the outcome of the next registration.
    ///
    /// With an empty queue, registrations wait for
    /// [`request_second_factor`](Self::request_second_factor) and
    /// [`complete_registration`](Self::complete_registration).
    pub fn queue_registration(&self, script: RegistrationScript) {
        self.shared.lock().scripts.push_back(script);
    }

    /// Number of `register_credential` calls received.
    pub fn registration_count(&self) -> usize {
        self.shared.lock().registrations.len()
    }

    /// URL passed to the `index`th registration.
    pub fn registration_url(&self, index: usize) -> Option<Url> {
        self.shared
            .lock()
            .registrations
            .get(index)
            .map(|r| r.url.clone())
    }

    /// Ask the `index`th registration's listener for a second factor.
    ///
    /// The selector only records the choice; finish the registration with
    /// [`complete_registration`](Self::complete_registration).
    ///
    /// Returns `false` if there is no such registration.
    pub fn request_second_factor(&self, index: usize) -> bool {
        let Some(listener) = self.registration_listener(index) else {
            return false;
        };
        let shared = self.shared.clone();
        listener.on_authentication_type_selection_requested(Box::new(move |selected, factor| {
            shared.lock().selections.push((selected, factor));
        }));
        true
    }

    /// Deliver a raw completion to the `index`th registration's listener.
    ///
    /// Both arguments are passed through as given, so misbehaving SDK
    /// completions can be reproduced.
    ///
    /// Returns `false` if there is no such registration.
    pub fn complete_registration(
        &self,
        index: usize,
        credential: Option<Credential>,
        error: Option<SdkError>,
    ) -> bool {
        let Some(listener) = self.registration_listener(index) else {
            return false;
        };
        if let Some(credential) = &credential {
            self.shared.lock().credentials.push(credential.clone());
        }
        listener.on_registration_completed(credential, error);
        true
    }

    /// Second-factor choices received so far, in order.
    pub fn selections(&self) -> Vec<(bool, SecondFactorType)> {
        self.shared.lock().selections.clone()
    }

    fn registration_listener(&self, index: usize) -> Option<Arc<dyn RegistrationListener>> {
        self.shared
            .lock()
            .registrations
            .get(index)
            .map(|r| r.listener.clone())
    }

    // ------------------------------------------------------------------
    // Credentials
    // ------------------------------------------------------------------

    pub fn add_credential(&self, credential: Credential) {
        self.shared.lock().credentials.push(credential);
    }

    /// Make the next delete fail with `message`.
    pub fn fail_next_delete(&self, message: impl Into<String>) {
        self.shared.lock().delete_failures.push_back(message.into());
    }

    /// Ids of credentials deleted so far.
    pub fn deleted(&self) -> Vec<String> {
        self.shared.lock().deleted.clone()
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub fn set_states(&self, states: Vec<SdkState>) {
        self.shared.lock().states = states;
    }

    pub fn is_scanning(&self) -> bool {
        self.shared.lock().scanning
    }

    pub fn is_automatic_access_enabled(&self) -> bool {
        self.shared.lock().automatic_access
    }

    pub fn background_scanning_mode(&self) -> Option<BackgroundScanningMode> {
        self.shared.lock().background_mode
    }

    /// Number of times the provider configured an SDK.
    pub fn configure_count(&self) -> usize {
        self.shared.lock().configured.len()
    }

    /// Options passed to the most recent configure call.
    pub fn last_options(&self) -> Option<SdkOptions> {
        self.shared.lock().configured.last().cloned()
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    pub fn listener_counts(&self) -> ListenerCounts {
        let state = self.shared.lock();
        ListenerCounts {
            sdk_state: state.sdk_state_listeners.len(),
            reader_update: state.reader_update_listeners.len(),
            access: state.access_listeners.len(),
            automatic_access: state.automatic_access_listeners.len(),
        }
    }

    /// Publish a state change to every state listener.
    pub fn emit_state_changed(&self, is_scanning: bool, states: Vec<SdkState>) {
        let listeners = {
            let mut state = self.shared.lock();
            state.scanning = is_scanning;
            state.states = states.clone();
            state.sdk_state_listeners.clone()
        };
        for listener in listeners {
            listener.on_state_changed(is_scanning, &states);
        }
    }

    pub fn emit_reader_updated(&self, reader: &ReaderAttributes, update_type: ReaderUpdateType) {
        let listeners = self.shared.lock().reader_update_listeners.clone();
        for listener in listeners {
            listener.on_reader_updated(reader, update_type);
        }
    }

    pub fn emit_access_started(&self, source: AccessSource, reader: &Reader) {
        for listener in self.access_listeners(source) {
            listener.on_access_started(reader);
        }
    }

    pub fn emit_access_completed(
        &self,
        source: AccessSource,
        reader: &Reader,
        result: Option<&AccessResult>,
        error: Option<&SdkError>,
    ) {
        for listener in self.access_listeners(source) {
            listener.on_access_completed(reader, result, error);
        }
    }

    pub fn emit_return_to_reader_required(&self, source: AccessSource, reader: &Reader) {
        for listener in self.access_listeners(source) {
            listener.on_return_to_reader_required(reader);
        }
    }

    pub fn emit_returned_to_reader(&self, source: AccessSource, reader: &Reader) {
        for listener in self.access_listeners(source) {
            listener.on_returned_to_reader(reader);
        }
    }

    fn access_listeners(&self, source: AccessSource) -> Vec<Arc<dyn AccessListener>> {
        let state = self.shared.lock();
        match source {
            AccessSource::User => state.access_listeners.clone(),
            AccessSource::Automatic => state.automatic_access_listeners.clone(),
        }
    }
}

/// A credential for facility 1 registered at a fixed instant.
pub fn sample_credential(id: &str) -> Credential {
    Credential {
        id: id.to_string(),
        facility_id: 1,
        facility_name: "Head Office".to_string(),
        is_revoked: false,
        registered_at: Utc
            .with_ymd_and_hms(2024, 3, 7, 15, 4, 0)
            .single()
            .unwrap_or_default(),
    }
}
