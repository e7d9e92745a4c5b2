//! Shared constants for the latchkey bridge.
//!
//! Event channel names and option tags are part of the caller-facing
//! contract; changing any of them breaks existing callers.
//!
//! ```
//! use latchkey_core::constants::*;
//!
//! assert_eq!(EVENT_ACCESS, "access");
//! assert_eq!(TLS_ANY_VALID_CERTIFICATE_REQUIRED, "anyValidCertificateRequired");
//! ```

// ============================================================================
// Event Channels
// ============================================================================

/// Channel carrying SDK state changes (`{isScanning, states}`).
pub const EVENT_SDK_STATE_CHANGED: &str = "sdkStateChanged";

/// Channel carrying reader attribute and availability updates.
pub const EVENT_READER_UPDATED: &str = "readerUpdated";

/// Channel carrying access attempts, both user-initiated and automatic.
pub const EVENT_ACCESS: &str = "access";

// ============================================================================
// Option Tags
// ============================================================================

pub const TLS_ANY_VALID_CERTIFICATE_REQUIRED: &str = "anyValidCertificateRequired";
pub const TLS_GALLAGHER_CERTIFICATE_REQUIRED: &str = "gallagherCertificateRequired";
pub const TLS_ALLOW_INVALID_CERTIFICATE: &str = "allowInvalidCertificate";

pub const FEATURE_SALTO: &str = "salto";
pub const FEATURE_DIGITAL_ID: &str = "digitalId";

pub const SCANNING_MODE_STANDARD: &str = "standard";
pub const SCANNING_MODE_EXTENDED: &str = "extended";

pub const FACTOR_PIN: &str = "pin";
pub const FACTOR_FINGERPRINT_OR_FACE_ID: &str = "fingerprintOrFaceId";

/// Legacy spellings accepted for the biometric second factor.
pub const FACTOR_BIOMETRIC_ALIASES: [&str; 4] =
    ["fingerprintOrFaceId", "fingerprint", "faceId", "touchId"];

// ============================================================================
// Formatting
// ============================================================================

/// Localized short date and time, e.g. `3/7/24, 3:04 PM`.
pub const SHORT_DATE_TIME_FORMAT: &str = "%-m/%-d/%y, %-I:%M %p";
