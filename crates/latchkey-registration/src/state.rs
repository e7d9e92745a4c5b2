//! Lifecycle of a single credential registration.
//!
//! # States
//!
//! - `Started`: the SDK is working, the first caller is waiting
//! - `AwaitingFactor`: paused on a second-factor decision, token issued
//! - `Resumed`: a factor was chosen, the second caller is waiting
//! - `Completed`: the SDK reported a terminal outcome
//! - `Cancelled`: timed out while paused, or torn down before completing
//!
//! # Valid Transitions
//!
//! - Started → AwaitingFactor → Resumed → Completed
//! - Started → Completed
//! - Started → Cancelled (torn down before the pause was registered)
//! - AwaitingFactor → Completed (SDK error while paused)
//! - AwaitingFactor → Cancelled

use std::fmt;

/// Where a registration is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationState {
    /// Registration handed to the SDK; no decision requested yet.
    Started,

    /// Paused until a caller picks a second factor.
    AwaitingFactor,

    /// A second factor was chosen and passed to the SDK.
    Resumed,

    /// The SDK delivered a credential or an error.
    Completed,

    /// Abandoned by timeout or teardown before the SDK finished.
    Cancelled,
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            RegistrationState::Started => "Started",
            RegistrationState::AwaitingFactor => "AwaitingFactor",
            RegistrationState::Resumed => "Resumed",
            RegistrationState::Completed => "Completed",
            RegistrationState::Cancelled => "Cancelled",
        };
        write!(f, "{}", state_str)
    }
}

impl RegistrationState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use latchkey_registration::RegistrationState;
    ///
    /// assert!(RegistrationState::Started.can_transition_to(&RegistrationState::AwaitingFactor));
    /// assert!(!RegistrationState::Started.can_transition_to(&RegistrationState::Resumed));
    /// ```
    pub fn can_transition_to(&self, target: &RegistrationState) -> bool {
        matches!(
            (self, target),
            // From Started
            (
                RegistrationState::Started,
                RegistrationState::AwaitingFactor | RegistrationState::Completed | RegistrationState::Cancelled
            )
            // From AwaitingFactor
            | (
                RegistrationState::AwaitingFactor,
                RegistrationState::Resumed | RegistrationState::Completed | RegistrationState::Cancelled
            )
            // From Resumed
            | (RegistrationState::Resumed, RegistrationState::Completed)
        )
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RegistrationState::Completed | RegistrationState::Cancelled
        )
    }
}
