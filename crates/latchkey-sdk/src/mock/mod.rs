//! Mock SDK implementation for testing and development.
//!
//! This module provides an in-memory access SDK that can be controlled
//! programmatically without a phone, a reader or a cloud backend.

pub mod sdk;

pub use sdk::{
    AccessSource, ListenerCounts, MockProvider, MockSdk, MockSdkHandle, RegistrationScript,
    sample_credential,
};
