//! Demo driver for the latchkey bridge.
//!
//! Configures the bridge over the mock SDK, subscribes to events and walks
//! through a plain registration, a second-factor registration, an access
//! attempt and a credential deletion, printing every response and event as
//! one JSON line.
//!
//! Logging goes to stderr and honours `RUST_LOG`; the awaiting-factor
//! timeout can be set with `LATCHKEY_AWAITING_FACTOR_TIMEOUT_MS`.

use anyhow::{Context, Result};
use latchkey_bridge::{BridgeConfig, MobileAccessBridge};
use latchkey_core::{
    AccessDecision, AccessMode, AccessResult, ConfigureRequest, ReaderAttributes, ReaderDistance,
    ReaderUpdateType, SdkState,
};
use latchkey_sdk::mock::{AccessSource, MockProvider, RegistrationScript, sample_credential};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CLOUD_HOST: &str = "commandcentre-ap-southeast-2.security.gallagher.cloud";

fn print(label: &str, value: serde_json::Value) {
    println!("{}", json!({ "step": label, "value": value }));
}

fn front_door() -> ReaderAttributes {
    ReaderAttributes {
        id: "reader-1".to_string(),
        name: "Front Door".to_string(),
        measured_path_loss: 62.0,
        distance: ReaderDistance::Near,
        auto_connect_path_loss: 55.0,
        manual_connect_path_loss: 80.0,
        is_ble_manual_connect_enabled: true,
        is_ble_auto_connect_enabled: true,
        is_second_factor_required: false,
        is_ble_actions_enabled: false,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = BridgeConfig::from_env().context("reading bridge configuration")?;
    let (provider, sdk) = MockProvider::new();
    let bridge = MobileAccessBridge::with_config(provider, config);

    bridge.configure(
        &ConfigureRequest::default()
            .with_tls_mode("anyValidCertificateRequired")
            .with_feature("salto"),
    );

    let mut events = bridge.subscribe_events()?;
    let printer = tokio::spawn(async move {
        while let Some(message) = events.recv().await {
            println!(
                "{}",
                json!({ "event": message.channel(), "body": message.body })
            );
        }
    });

    // Ambient notifications.
    sdk.emit_state_changed(true, vec![SdkState::ErrorNoCredentials]);
    sdk.emit_reader_updated(&front_door(), ReaderUpdateType::AttributesChanged);

    // Registration that completes straight away.
    sdk.queue_registration(RegistrationScript::Succeed(sample_credential("cred-001")));
    let url = bridge
        .resolve_invitation_url(CLOUD_HOST, "UUWM-M26T-UDT2-7TUN")
        .await?;
    print("resolveInvitationUrl", json!(url));
    let response = bridge.begin_registration(&url).await?;
    print("registerCredential", serde_json::to_value(&response)?);

    // Registration that pauses for a second factor.
    sdk.queue_registration(RegistrationScript::RequireSecondFactor {
        outcome: Ok(sample_credential("cred-002")),
    });
    let pending = bridge.begin_registration(&url).await?;
    print("registerCredential", serde_json::to_value(&pending)?);
    let token = pending
        .continuation_point()
        .context("expected the registration to pause")?
        .to_string();
    let completed = bridge
        .continue_registration(&token, true, "fingerprint")
        .await?;
    print("registerCredentialContinue", serde_json::to_value(&completed)?);

    // An automatic access attempt at the front door.
    let reader = front_door().reader();
    sdk.emit_access_started(AccessSource::Automatic, &reader);
    sdk.emit_access_completed(
        AccessSource::Automatic,
        &reader,
        Some(&AccessResult {
            granted: true,
            decision: AccessDecision {
                code: 0,
                description: "Access granted".to_string(),
            },
            access_mode: AccessMode::Access,
        }),
        None,
    );

    print("getStates", serde_json::to_value(bridge.get_states()?)?);
    print("getCredentials", serde_json::to_value(bridge.get_credentials()?)?);
    let deleted = bridge.delete_credential("cred-001").await?;
    print("deleteCredential", serde_json::to_value(&deleted)?);

    bridge.teardown();
    printer.await.context("event printer panicked")?;
    info!("demo finished");
    Ok(())
}
