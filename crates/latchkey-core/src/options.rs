//! Closed option enums parsed once at the caller boundary.
//!
//! Callers pass these options as strings. Each field has its own policy for
//! values it does not recognize:
//!
//! | Field | Unrecognized value |
//! |---|---|
//! | [`CloudTlsValidationMode`] | falls back to `anyValidCertificateRequired` |
//! | [`SdkFeature`] | entry skipped |
//! | [`BackgroundScanningMode`] | call ignored |
//! | [`SecondFactorType`] | falls back to `pin` |

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// How the SDK validates the cloud's TLS certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CloudTlsValidationMode {
    #[default]
    AnyValidCertificateRequired,
    GallagherCertificateRequired,
    AllowInvalidCertificate,
}

impl CloudTlsValidationMode {
    /// Parse a known tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            TLS_ANY_VALID_CERTIFICATE_REQUIRED => Some(Self::AnyValidCertificateRequired),
            TLS_GALLAGHER_CERTIFICATE_REQUIRED => Some(Self::GallagherCertificateRequired),
            TLS_ALLOW_INVALID_CERTIFICATE => Some(Self::AllowInvalidCertificate),
            _ => None,
        }
    }

    /// Parse with the default-on-unrecognized policy.
    ///
    /// ```
    /// use latchkey_core::CloudTlsValidationMode;
    ///
    /// assert_eq!(
    ///     CloudTlsValidationMode::parse_or_default(Some("bogus")),
    ///     CloudTlsValidationMode::AnyValidCertificateRequired
    /// );
    /// ```
    pub fn parse_or_default(tag: Option<&str>) -> Self {
        tag.and_then(Self::from_tag).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnyValidCertificateRequired => TLS_ANY_VALID_CERTIFICATE_REQUIRED,
            Self::GallagherCertificateRequired => TLS_GALLAGHER_CERTIFICATE_REQUIRED,
            Self::AllowInvalidCertificate => TLS_ALLOW_INVALID_CERTIFICATE,
        }
    }
}

/// Optional SDK feature sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SdkFeature {
    Salto,
    DigitalId,
}

impl SdkFeature {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            FEATURE_SALTO => Some(Self::Salto),
            FEATURE_DIGITAL_ID => Some(Self::DigitalId),
            _ => None,
        }
    }

    /// Parse a feature list, skipping unknown entries and duplicates.
    pub fn parse_all<'a>(tags: impl IntoIterator<Item = &'a str>) -> Vec<Self> {
        let mut features = Vec::new();
        for feature in tags.into_iter().filter_map(Self::from_tag) {
            if !features.contains(&feature) {
                features.push(feature);
            }
        }
        features
    }
}

/// BLE scanning behaviour while the host app is in the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BackgroundScanningMode {
    Standard,
    Extended,
}

impl BackgroundScanningMode {
    /// Parse a known tag; unrecognized modes yield `None` and are ignored
    /// by the caller.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            SCANNING_MODE_STANDARD => Some(Self::Standard),
            SCANNING_MODE_EXTENDED => Some(Self::Extended),
            _ => None,
        }
    }
}

/// Second factor chosen to finish a credential registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecondFactorType {
    #[default]
    Pin,
    FingerprintOrFaceId,
}

impl SecondFactorType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag == FACTOR_PIN {
            Some(Self::Pin)
        } else if FACTOR_BIOMETRIC_ALIASES.contains(&tag) {
            Some(Self::FingerprintOrFaceId)
        } else {
            None
        }
    }

    /// Parse leniently: unrecognized values select a PIN factor rather than
    /// failing the registration.
    pub fn parse_lenient(tag: &str) -> Self {
        Self::from_tag(tag).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pin => FACTOR_PIN,
            Self::FingerprintOrFaceId => FACTOR_FINGERPRINT_OR_FACE_ID,
        }
    }
}

/// Raw configure inputs as a caller sends them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigureRequest {
    pub database_path: Option<String>,
    pub cloud_tls_validation_mode: Option<String>,
    pub enabled_features: Vec<String>,
}

impl ConfigureRequest {
    pub fn with_database_path(mut self, path: impl Into<String>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    pub fn with_tls_mode(mut self, mode: impl Into<String>) -> Self {
        self.cloud_tls_validation_mode = Some(mode.into());
        self
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.enabled_features.push(feature.into());
        self
    }

    /// Lower the raw request into typed SDK options.
    #[must_use]
    pub fn to_options(&self) -> SdkOptions {
        SdkOptions {
            database_path: self.database_path.as_ref().map(PathBuf::from),
            cloud_tls_validation_mode: CloudTlsValidationMode::parse_or_default(
                self.cloud_tls_validation_mode.as_deref(),
            ),
            enabled_features: SdkFeature::parse_all(
                self.enabled_features.iter().map(String::as_str),
            ),
        }
    }
}

/// Typed options handed to the SDK provider at configure time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdkOptions {
    pub database_path: Option<PathBuf>,
    pub cloud_tls_validation_mode: CloudTlsValidationMode,
    pub enabled_features: Vec<SdkFeature>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, CloudTlsValidationMode::AnyValidCertificateRequired)]
    #[case(Some("anyValidCertificateRequired"), CloudTlsValidationMode::AnyValidCertificateRequired)]
    #[case(Some("gallagherCertificateRequired"), CloudTlsValidationMode::GallagherCertificateRequired)]
    #[case(Some("allowInvalidCertificate"), CloudTlsValidationMode::AllowInvalidCertificate)]
    #[case(Some("strict"), CloudTlsValidationMode::AnyValidCertificateRequired)]
    #[case(Some(""), CloudTlsValidationMode::AnyValidCertificateRequired)]
    fn test_tls_mode_parsing(#[case] tag: Option<&str>, #[case] expected: CloudTlsValidationMode) {
        assert_eq!(CloudTlsValidationMode::parse_or_default(tag), expected);
    }

    #[rstest]
    #[case("pin", SecondFactorType::Pin)]
    #[case("fingerprint", SecondFactorType::FingerprintOrFaceId)]
    #[case("faceId", SecondFactorType::FingerprintOrFaceId)]
    #[case("touchId", SecondFactorType::FingerprintOrFaceId)]
    #[case("fingerprintOrFaceId", SecondFactorType::FingerprintOrFaceId)]
    #[case("retina", SecondFactorType::Pin)]
    #[case("PIN", SecondFactorType::Pin)]
    fn test_second_factor_parsing(#[case] tag: &str, #[case] expected: SecondFactorType) {
        assert_eq!(SecondFactorType::parse_lenient(tag), expected);
    }

    #[test]
    fn test_unknown_scanning_mode_is_none() {
        assert_eq!(
            BackgroundScanningMode::from_tag("extended"),
            Some(BackgroundScanningMode::Extended)
        );
        assert_eq!(BackgroundScanningMode::from_tag("turbo"), None);
    }

    #[test]
    fn test_features_skip_unknown_and_duplicates() {
        let features = SdkFeature::parse_all(["salto", "nfcPlus", "digitalId", "salto"]);
        assert_eq!(features, vec![SdkFeature::Salto, SdkFeature::DigitalId]);
    }

    #[test]
    fn test_configure_request_from_json() {
        let request: ConfigureRequest = serde_json::from_str(
            r#"{"cloudTlsValidationMode":"allowInvalidCertificate","enabledFeatures":["digitalId"]}"#,
        )
        .unwrap();
        let options = request.to_options();
        assert_eq!(options.database_path, None);
        assert_eq!(
            options.cloud_tls_validation_mode,
            CloudTlsValidationMode::AllowInvalidCertificate
        );
        assert_eq!(options.enabled_features, vec![SdkFeature::DigitalId]);
    }

    #[test]
    fn test_configure_request_builder() {
        let options = ConfigureRequest::default()
            .with_database_path("/tmp/access.db")
            .with_tls_mode("gallagherCertificateRequired")
            .with_feature("salto")
            .to_options();
        assert_eq!(options.database_path, Some(PathBuf::from("/tmp/access.db")));
        assert_eq!(
            options.cloud_tls_validation_mode,
            CloudTlsValidationMode::GallagherCertificateRequired
        );
        assert_eq!(options.enabled_features, vec![SdkFeature::Salto]);
    }
}
