//! Common test utilities for bridge integration tests.
//!
//! Every test builds its own bridge over a fresh mock SDK, so tests never
//! share registries or listeners.

#![allow(dead_code)]

use latchkey_bridge::{BridgeConfig, MobileAccessBridge};
use latchkey_core::{ConfigureRequest, ContinuationToken, RegistrationResponse};
use latchkey_sdk::mock::{MockProvider, MockSdkHandle};

pub const INVITATION_URL: &str =
    "https://commandcentre.example.cloud/api/invitations/UUWM-M26T-UDT2-7TUN";

pub type Bridge = MobileAccessBridge<MockProvider>;

/// An unconfigured bridge over a fresh mock SDK.
pub fn bridge() -> (Bridge, MockSdkHandle) {
    bridge_with_config(BridgeConfig::default())
}

pub fn bridge_with_config(config: BridgeConfig) -> (Bridge, MockSdkHandle) {
    let (provider, handle) = MockProvider::new();
    (MobileAccessBridge::with_config(provider, config), handle)
}

/// A bridge that has already been configured with default options.
pub fn configured_bridge() -> (Bridge, MockSdkHandle) {
    let (bridge, handle) = bridge();
    bridge.configure(&ConfigureRequest::default());
    (bridge, handle)
}

/// Unwrap a pending response into its continuation token.
pub fn expect_pending(response: RegistrationResponse) -> ContinuationToken {
    match response {
        RegistrationResponse::Pending { continuation_point } => continuation_point,
        RegistrationResponse::Completed { credential } => {
            panic!("expected a pending registration, got credential {}", credential.id)
        }
    }
}
