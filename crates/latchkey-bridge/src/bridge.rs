//! The caller-facing bridge over a configured access SDK.
//!
//! [`MobileAccessBridge`] owns one SDK session at a time. Configuring it
//! creates the SDK instance, the pending registration registry and the
//! event multiplexer together; tearing it down cancels anything still
//! paused and detaches every listener.

use std::sync::Arc;

use latchkey_core::{
    BackgroundScanningMode, CloudTlsValidationMode, ConfigureRequest, ContinuationToken,
    CredentialRecord, Error, RegistrationResponse, Result, SdkFeature, SdkState,
    SecondFactorType, exactly_one,
};
use latchkey_events::{EventMultiplexer, EventSink, EventSubscription, ObserverId};
use latchkey_registration::{PendingRegistrations, RegistrationContinuation, settlement};
use latchkey_sdk::{MobileAccessSdk, SdkProvider};
use parking_lot::RwLock;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::BridgeConfig;

/// Everything created by one `configure` call.
struct Session {
    sdk: Arc<dyn MobileAccessSdk>,
    registry: Arc<PendingRegistrations>,
    events: EventMultiplexer,
}

/// Bridge between callers and a mobile access SDK.
///
/// Every operation except [`configure`](Self::configure) and
/// [`teardown`](Self::teardown) requires a configured session.
pub struct MobileAccessBridge<P: SdkProvider> {
    provider: P,
    config: BridgeConfig,
    session: RwLock<Option<Arc<Session>>>,
}

impl<P: SdkProvider> MobileAccessBridge<P> {
    /// Create an unconfigured bridge with default settings.
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, BridgeConfig::default())
    }

    pub fn with_config(provider: P, config: BridgeConfig) -> Self {
        Self {
            provider,
            config,
            session: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn is_configured(&self) -> bool {
        self.session.read().is_some()
    }

    fn current_session(&self) -> Option<Arc<Session>> {
        self.session.read().clone()
    }

    fn session(&self) -> Result<Arc<Session>> {
        self.current_session().ok_or(Error::NotConfigured)
    }

    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    /// Configure the SDK.
    ///
    /// A repeat call is ignored: the existing session, its pending
    /// registrations and its observers are kept.
    pub fn configure(&self, request: &ConfigureRequest) {
        let mut slot = self.session.write();
        if slot.is_some() {
            info!("already configured; assuming reload");
            return;
        }

        if let Some(mode) = request.cloud_tls_validation_mode.as_deref()
            && CloudTlsValidationMode::from_tag(mode).is_none()
        {
            warn!(mode, "unrecognized cloud TLS validation mode; using default");
        }
        for feature in &request.enabled_features {
            if SdkFeature::from_tag(feature).is_none() {
                warn!(feature = feature.as_str(), "unrecognized SDK feature skipped");
            }
        }

        let options = request.to_options();
        let sdk = self.provider.configure(&options);
        info!(
            tls_mode = options.cloud_tls_validation_mode.as_str(),
            features = ?options.enabled_features,
            database = ?options.database_path,
            "sdk configured"
        );

        *slot = Some(Arc::new(Session {
            events: EventMultiplexer::new(sdk.clone()),
            registry: Arc::new(PendingRegistrations::new()),
            sdk,
        }));
    }

    /// Drop the session.
    ///
    /// Paused registrations are cancelled, event listeners detached and
    /// subscriptions closed. The bridge can be configured again afterwards.
    pub fn teardown(&self) {
        let Some(session) = self.session.write().take() else {
            debug!("teardown before configure ignored");
            return;
        };

        session.events.detach_all();
        let paused = session.registry.close();
        let cancelled = paused.len();
        for (_, continuation) in paused {
            continuation.cancel(Error::RegistrationCancelled);
        }
        info!(cancelled, "bridge torn down");
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub fn set_automatic_access_enabled(&self, enabled: bool) {
        match self.current_session() {
            Some(session) => session.sdk.set_automatic_access_enabled(enabled),
            None => debug!(enabled, "set_automatic_access_enabled before configure ignored"),
        }
    }

    pub fn set_scanning(&self, enabled: bool) {
        match self.current_session() {
            Some(session) => session.sdk.set_scanning(enabled),
            None => debug!(enabled, "set_scanning before configure ignored"),
        }
    }

    /// Set the background scanning mode from its tag.
    ///
    /// Unrecognized modes are ignored.
    pub fn set_background_scanning_mode(&self, mode: &str) {
        let Some(parsed) = BackgroundScanningMode::from_tag(mode) else {
            warn!(mode, "unrecognized background scanning mode ignored");
            return;
        };
        match self.current_session() {
            Some(session) => session.sdk.set_background_scanning_mode(parsed),
            None => debug!(mode, "set_background_scanning_mode before configure ignored"),
        }
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Build the invitation URL for `host` and `invitation_code`.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` before [`configure`](Self::configure)
    /// - `InvalidArgument` if the SDK rejects either input
    pub async fn resolve_invitation_url(&self, host: &str, invitation_code: &str) -> Result<String> {
        let session = self.session()?;
        session
            .sdk
            .resolve_invitation_url(host, invitation_code)
            .map(String::from)
            .ok_or_else(|| Error::invalid_argument("host or invitationCode was invalid"))
    }

    /// Start registering the credential behind an invitation URL.
    ///
    /// Resolves with the credential if no second factor is needed, or with
    /// a continuation point to pass to
    /// [`continue_registration`](Self::continue_registration).
    ///
    /// # Errors
    ///
    /// - `NotConfigured` before [`configure`](Self::configure)
    /// - `InvalidArgument` if `url` does not parse
    /// - `RegistrationFailed` with the SDK's message
    /// - `RegistrationCancelled` if the bridge is torn down before the SDK
    ///   pauses or completes
    pub async fn begin_registration(&self, url: &str) -> Result<RegistrationResponse> {
        let session = self.session()?;
        let url = Url::parse(url).map_err(|_| Error::invalid_argument("url was invalid"))?;

        let (continuation, pending) = RegistrationContinuation::start(
            &session.registry,
            self.config.awaiting_factor_timeout(),
        );
        info!(%url, "registration started");
        session.sdk.register_credential(&url, continuation);
        pending.wait().await
    }

    /// Resume a paused registration with the user's second-factor choice.
    ///
    /// `factor_type` is parsed leniently: unrecognized values select a PIN.
    ///
    /// # Errors
    ///
    /// - `InvalidContinuationPoint` if `continuation_point` is unknown or
    ///   was already used
    /// - `RegistrationFailed` with the SDK's message
    pub async fn continue_registration(
        &self,
        continuation_point: &str,
        factor_selected: bool,
        factor_type: &str,
    ) -> Result<RegistrationResponse> {
        let token = ContinuationToken::from(continuation_point);
        let Some(session) = self.current_session() else {
            return Err(Error::invalid_continuation_point(token.as_str()));
        };
        let continuation = session.registry.take_and_remove(&token)?;

        let factor = SecondFactorType::parse_lenient(factor_type);
        if SecondFactorType::from_tag(factor_type).is_none() {
            debug!(factor_type, "unrecognized second factor; using pin");
        }

        let (settler, pending) = settlement();
        continuation.resume(settler, factor_selected, factor);
        pending.wait().await
    }

    /// Number of registrations currently paused on a second factor.
    pub fn pending_registrations(&self) -> usize {
        self.current_session()
            .map_or(0, |session| session.registry.len())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get_states(&self) -> Result<Vec<SdkState>> {
        Ok(self.session()?.sdk.states())
    }

    pub fn get_credentials(&self) -> Result<Vec<CredentialRecord>> {
        Ok(self
            .session()?
            .sdk
            .credentials()
            .iter()
            .map(CredentialRecord::from)
            .collect())
    }

    /// Delete the credential with `credential_id`.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` before [`configure`](Self::configure)
    /// - `InvalidArgument` if no credential has that id
    /// - `DeleteFailed` with the SDK's message
    pub async fn delete_credential(&self, credential_id: &str) -> Result<CredentialRecord> {
        let session = self.session()?;
        let credential = session
            .sdk
            .credentials()
            .into_iter()
            .find(|c| !credential_id.is_empty() && c.id == credential_id)
            .ok_or_else(|| Error::invalid_argument("credentialId was invalid"))?;

        let (tx, rx) = oneshot::channel();
        session.sdk.delete_credential(
            &credential,
            Box::new(move |deleted, error| {
                let _ = tx.send(exactly_one(deleted, error, "delete_credential completion"));
            }),
        );

        match rx.await {
            Ok(Ok(deleted)) => {
                info!(credential_id = %deleted.id, "credential deleted");
                Ok(CredentialRecord::from(&deleted))
            }
            Ok(Err(error)) => {
                warn!(credential_id, %error, "credential delete failed");
                Err(Error::delete_failed(error.message()))
            }
            Err(_) => Err(Error::delete_failed("delete completion was dropped")),
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Subscribe to SDK events.
    ///
    /// The first observer attaches the SDK listeners; dropping the last one
    /// detaches them.
    pub fn subscribe_events(&self) -> Result<EventSubscription> {
        Ok(self.session()?.events.subscribe())
    }

    pub fn add_event_sink(&self, sink: Arc<dyn EventSink>) -> Result<ObserverId> {
        Ok(self.session()?.events.add_sink(sink))
    }

    pub fn remove_event_sink(&self, id: ObserverId) -> Result<bool> {
        Ok(self.session()?.events.remove_sink(id))
    }
}

impl<P: SdkProvider> std::fmt::Debug for MobileAccessBridge<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MobileAccessBridge")
            .field("config", &self.config)
            .field("configured", &self.is_configured())
            .field("pending_registrations", &self.pending_registrations())
            .finish()
    }
}
