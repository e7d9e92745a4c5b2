//! Core types shared by every latchkey crate.
//!
//! This crate holds the vocabulary of the bridge: the caller-facing error
//! taxonomy, the passive value records describing SDK domain objects
//! (credentials, readers, SDK states, access results), the closed option
//! enums parsed once at the boundary, and the serialized response records
//! handed back to callers.

pub mod constants;
pub mod error;
pub mod options;
pub mod records;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use options::{
    BackgroundScanningMode, CloudTlsValidationMode, ConfigureRequest, SdkFeature, SdkOptions,
    SecondFactorType,
};
pub use records::{CredentialRecord, RegistrationResponse};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
