//! Bridge-level configuration.
//!
//! This is distinct from [`ConfigureRequest`](latchkey_core::ConfigureRequest),
//! which carries the caller's SDK settings; `BridgeConfig` tunes how the
//! bridge itself behaves.

use std::time::Duration;

use latchkey_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the awaiting-factor timeout, in milliseconds.
pub const AWAITING_FACTOR_TIMEOUT_ENV: &str = "LATCHKEY_AWAITING_FACTOR_TIMEOUT_MS";

/// Bridge configuration.
///
/// # Example
///
/// ```
/// use latchkey_bridge::BridgeConfig;
/// use std::time::Duration;
///
/// let config = BridgeConfig::default().with_awaiting_factor_timeout(Duration::from_secs(120));
/// assert_eq!(config.awaiting_factor_timeout(), Some(Duration::from_secs(120)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// How long a registration may wait for a second-factor decision before
    /// it is cancelled. `None` or `0` waits indefinitely.
    pub awaiting_factor_timeout_ms: Option<u64>,
}

impl BridgeConfig {
    /// Set the awaiting-factor timeout. A zero duration disables it.
    pub fn with_awaiting_factor_timeout(mut self, timeout: Duration) -> Self {
        self.awaiting_factor_timeout_ms = (!timeout.is_zero()).then(|| {
            u64::try_from(timeout.as_millis())
                .unwrap_or(u64::MAX)
                .max(1)
        });
        self
    }

    /// Wait indefinitely for second-factor decisions.
    pub fn without_awaiting_factor_timeout(mut self) -> Self {
        self.awaiting_factor_timeout_ms = None;
        self
    }

    pub fn awaiting_factor_timeout(&self) -> Option<Duration> {
        self.awaiting_factor_timeout_ms
            .filter(|&millis| millis > 0)
            .map(Duration::from_millis)
    }

    /// Defaults overridden by `LATCHKEY_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if a variable is set but unparsable.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup(AWAITING_FACTOR_TIMEOUT_ENV) {
            let raw = raw.trim();
            if !raw.is_empty() {
                let millis = raw.parse::<u64>().map_err(|e| {
                    Error::invalid_argument(format!("{AWAITING_FACTOR_TIMEOUT_ENV}={raw}: {e}"))
                })?;
                // Zero disables the timeout.
                config.awaiting_factor_timeout_ms = (millis > 0).then_some(millis);
            }
        }
        Ok(config)
    }
}
