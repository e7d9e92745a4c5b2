use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::constants::SHORT_DATE_TIME_FORMAT;

/// Opaque identifier for a registration paused on a second-factor decision.
///
/// Tokens are random UUID v4 strings, never reused across attempts. Callers
/// only ever hand them back verbatim, so any string is accepted when parsing
/// a caller-supplied token; unknown values are simply not found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    /// Generate a fresh, unguessable token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContinuationToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ContinuationToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A mobile credential issued by the SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: String,
    pub facility_id: u32,
    pub facility_name: String,
    pub is_revoked: bool,
    pub registered_at: DateTime<Utc>,
}

impl Credential {
    /// Registration date rendered as a local short date and time.
    #[must_use]
    pub fn registered_date(&self) -> String {
        self.registered_at
            .with_timezone(&Local)
            .format(SHORT_DATE_TIME_FORMAT)
            .to_string()
    }
}

/// A reader as reported in access notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reader {
    pub id: String,
    pub name: String,
}

impl Reader {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Coarse proximity bucket reported for a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReaderDistance {
    Far,
    Medium,
    Near,
}

/// Full attribute snapshot of a discovered reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderAttributes {
    pub id: String,
    pub name: String,
    pub measured_path_loss: f64,
    pub distance: ReaderDistance,
    pub auto_connect_path_loss: f64,
    pub manual_connect_path_loss: f64,
    pub is_ble_manual_connect_enabled: bool,
    pub is_ble_auto_connect_enabled: bool,
    pub is_second_factor_required: bool,
    pub is_ble_actions_enabled: bool,
}

impl ReaderAttributes {
    /// The identity part of this snapshot.
    #[must_use]
    pub fn reader(&self) -> Reader {
        Reader::new(self.id.clone(), self.name.clone())
    }
}

/// Why a reader update was published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReaderUpdateType {
    AttributesChanged,
    ReaderUnavailable,
}

/// Condition reported by the SDK independently of any reader.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SdkState {
    ErrorDeviceNotSupported,
    ErrorNoPasscodeSet,
    ErrorNoCredentials,
    ErrorUnsupportedOsVersion,
    ErrorNoBleFeature,
    BleErrorLocationServiceDisabled,
    BleErrorNoLocationPermission,
    BleWarningExtendedBackgroundScanningRequiresLocationServiceEnabled,
    BleWarningExtendedBackgroundScanningRequiresLocationAlwaysPermission,
    BleErrorDisabled,
    BleErrorUnauthorized,
    NfcErrorDisabled,
    NoNfcFeature,
    CredentialRequiresBiometricsEnrolment,
    CredentialBiometricsLockedOut,
    BleErrorNoBackgroundLocationPermission,
    /// A state this bridge does not know by name.
    Unknown(String),
}

impl SdkState {
    /// Wire tag for this state. Unknown states render as `unknown:<name>`.
    #[must_use]
    pub fn tag(&self) -> String {
        let tag = match self {
            Self::ErrorDeviceNotSupported => "errorDeviceNotSupported",
            Self::ErrorNoPasscodeSet => "errorNoPasscodeSet",
            Self::ErrorNoCredentials => "errorNoCredentials",
            Self::ErrorUnsupportedOsVersion => "errorUnsupportedOsVersion",
            Self::ErrorNoBleFeature => "errorNoBleFeature",
            Self::BleErrorLocationServiceDisabled => "bleErrorLocationServiceDisabled",
            Self::BleErrorNoLocationPermission => "bleErrorNoLocationPermission",
            Self::BleWarningExtendedBackgroundScanningRequiresLocationServiceEnabled => {
                "bleWarningExtendedBackgroundScanningRequiresLocationServiceEnabled"
            }
            Self::BleWarningExtendedBackgroundScanningRequiresLocationAlwaysPermission => {
                "bleWarningExtendedBackgroundScanningRequiresLocationAlwaysPermission"
            }
            Self::BleErrorDisabled => "bleErrorDisabled",
            Self::BleErrorUnauthorized => "bleErrorUnauthorized",
            Self::NfcErrorDisabled => "nfcErrorDisabled",
            Self::NoNfcFeature => "noNfcFeature",
            Self::CredentialRequiresBiometricsEnrolment => "credentialRequiresBiometricsEnrolment",
            Self::CredentialBiometricsLockedOut => "credentialBiometricsLockedOut",
            Self::BleErrorNoBackgroundLocationPermission => {
                "bleErrorNoBackgroundLocationPermission"
            }
            Self::Unknown(name) => return format!("unknown:{name}"),
        };
        tag.to_string()
    }
}

impl fmt::Display for SdkState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl Serialize for SdkState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.tag())
    }
}

/// Mode the reader was operating in when it made an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessMode {
    Evac,
    Access,
    Challenge,
    Search,
}

/// The reader's decision code and its description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    pub code: i32,
    pub description: String,
}

/// Outcome of a completed access attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessResult {
    pub granted: bool,
    pub decision: AccessDecision,
    pub access_mode: AccessMode,
}

impl AccessResult {
    #[must_use]
    pub fn is_access_granted(&self) -> bool {
        self.granted
    }
}

/// Split a delegate-style `(value, error)` callback pair into a `Result`.
///
/// SDK completions report exactly one of the two. Receiving both or neither
/// is a programming error in the SDK binding and aborts loudly instead of
/// being coerced into a plausible outcome.
///
/// # Panics
///
/// Panics if both or neither of `value` and `error` are present.
#[track_caller]
pub fn exactly_one<T, E>(value: Option<T>, error: Option<E>, context: &str) -> std::result::Result<T, E> {
    match (value, error) {
        (Some(value), None) => Ok(value),
        (None, Some(error)) => Err(error),
        (Some(_), Some(_)) => panic!("{context} invoked with both a result and an error"),
        (None, None) => panic!("{context} invoked with both result and error set to none"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[test]
    fn test_generated_tokens_are_unique_uuids() {
        let a = ContinuationToken::generate();
        let b = ContinuationToken::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_token_serializes_as_plain_string() {
        let token = ContinuationToken::from("abc");
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"abc\"");
    }

    #[rstest]
    #[case(SdkState::ErrorNoCredentials, "errorNoCredentials")]
    #[case(SdkState::BleErrorDisabled, "bleErrorDisabled")]
    #[case(
        SdkState::BleWarningExtendedBackgroundScanningRequiresLocationAlwaysPermission,
        "bleWarningExtendedBackgroundScanningRequiresLocationAlwaysPermission"
    )]
    #[case(SdkState::Unknown("QUANTUM_FLUX".into()), "unknown:QUANTUM_FLUX")]
    fn test_sdk_state_tags(#[case] state: SdkState, #[case] expected: &str) {
        assert_eq!(state.tag(), expected);
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            serde_json::Value::String(expected.to_string())
        );
    }

    #[test]
    fn test_reader_attributes_camel_case() {
        let reader = ReaderAttributes {
            id: "r1".into(),
            name: "Front Door".into(),
            measured_path_loss: 61.5,
            distance: ReaderDistance::Near,
            auto_connect_path_loss: 55.0,
            manual_connect_path_loss: 80.0,
            is_ble_manual_connect_enabled: true,
            is_ble_auto_connect_enabled: false,
            is_second_factor_required: true,
            is_ble_actions_enabled: false,
        };
        let json = serde_json::to_value(&reader).unwrap();
        assert_eq!(json["distance"], "near");
        assert_eq!(json["measuredPathLoss"], 61.5);
        assert_eq!(json["isSecondFactorRequired"], true);
        assert_eq!(reader.reader(), Reader::new("r1", "Front Door"));
    }

    #[test]
    fn test_registered_date_is_short_local_format() {
        let registered_at = Utc.with_ymd_and_hms(2024, 3, 7, 15, 4, 0).unwrap();
        let credential = Credential {
            id: "c1".into(),
            facility_id: 1,
            facility_name: "HQ".into(),
            is_revoked: false,
            registered_at,
        };
        let expected = registered_at
            .with_timezone(&Local)
            .format("%-m/%-d/%y, %-I:%M %p")
            .to_string();
        assert_eq!(credential.registered_date(), expected);
    }

    #[test]
    fn test_exactly_one() {
        assert_eq!(exactly_one::<u8, &str>(Some(1), None, "cb"), Ok(1));
        assert_eq!(exactly_one::<u8, &str>(None, Some("e"), "cb"), Err("e"));
    }

    #[test]
    #[should_panic(expected = "both result and error set to none")]
    fn test_exactly_one_neither_panics() {
        let _ = exactly_one::<u8, &str>(None, None, "onRegistrationCompleted");
    }

    #[test]
    #[should_panic(expected = "both a result and an error")]
    fn test_exactly_one_both_panics() {
        let _ = exactly_one::<u8, &str>(Some(1), Some("e"), "onRegistrationCompleted");
    }
}
