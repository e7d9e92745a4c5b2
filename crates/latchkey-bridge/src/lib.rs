//! Caller-facing bridge to a mobile access SDK.
//!
//! The bridge exposes the SDK's callback-driven API as plain `async`
//! operations with typed errors, keeps registrations paused on a
//! second-factor decision addressable by an opaque token, and republishes
//! SDK notifications as JSON-ready events.
//!
//! # Examples
//!
//! ```
//! use latchkey_bridge::MobileAccessBridge;
//! use latchkey_core::ConfigureRequest;
//! use latchkey_sdk::mock::{MockProvider, RegistrationScript, sample_credential};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> latchkey_core::Result<()> {
//! let (provider, sdk) = MockProvider::new();
//! let bridge = MobileAccessBridge::new(provider);
//! bridge.configure(&ConfigureRequest::default());
//!
//! sdk.queue_registration(RegistrationScript::RequireSecondFactor {
//!     outcome: Ok(sample_credential("c1")),
//! });
//!
//! let url = bridge
//!     .resolve_invitation_url("cc.example.cloud", "UUWM-M26T")
//!     .await?;
//! let pending = bridge.begin_registration(&url).await?;
//! let token = pending.continuation_point().unwrap().to_string();
//!
//! let done = bridge.continue_registration(&token, true, "fingerprint").await?;
//! assert_eq!(done.credential().unwrap().id, "c1");
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod config;

pub use bridge::MobileAccessBridge;
pub use config::{AWAITING_FACTOR_TIMEOUT_ENV, BridgeConfig};
