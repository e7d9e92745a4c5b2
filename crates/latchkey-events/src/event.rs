//! Push messages published to observers.
//!
//! Every SDK notification becomes one [`BridgeEvent`], tagged with the
//! [`EventKind`] channel it travels on. The event serializes to the JSON
//! body a platform boundary forwards unchanged:
//!
//! | Channel | Body |
//! |---|---|
//! | `sdkStateChanged` | `{isScanning, states}` |
//! | `readerUpdated` | `{updateType, reader}` |
//! | `access` | `{event, message?, code?, accessMode?, reader}` |

use latchkey_core::constants::{EVENT_ACCESS, EVENT_READER_UPDATED, EVENT_SDK_STATE_CHANGED};
use latchkey_core::{AccessMode, AccessResult, Reader, ReaderAttributes, ReaderUpdateType, SdkState};
use latchkey_sdk::SdkError;
use serde::Serialize;

/// Channel an event is published on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    SdkStateChanged,
    ReaderUpdated,
    Access,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SdkStateChanged => EVENT_SDK_STATE_CHANGED,
            Self::ReaderUpdated => EVENT_READER_UPDATED,
            Self::Access => EVENT_ACCESS,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened during an access attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessEventType {
    Started,
    Granted,
    Denied,
    Error,
    ReturnToReaderRequired,
    ReturnToReaderComplete,
}

/// Body of an `access` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessEvent {
    pub event: AccessEventType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_mode: Option<AccessMode>,

    pub reader: Reader,
}

impl AccessEvent {
    fn bare(event: AccessEventType, reader: &Reader) -> Self {
        Self {
            event,
            message: None,
            code: None,
            access_mode: None,
            reader: reader.clone(),
        }
    }

    pub fn started(reader: &Reader) -> Self {
        Self::bare(AccessEventType::Started, reader)
    }

    /// Granted or denied, carrying the reader's decision.
    pub fn decided(reader: &Reader, result: &AccessResult) -> Self {
        let event = if result.is_access_granted() {
            AccessEventType::Granted
        } else {
            AccessEventType::Denied
        };
        Self {
            event,
            message: Some(result.decision.description.clone()),
            code: Some(result.decision.code),
            access_mode: Some(result.access_mode),
            reader: reader.clone(),
        }
    }

    pub fn failed(reader: &Reader, error: &SdkError) -> Self {
        Self {
            message: Some(error.message().to_string()),
            ..Self::bare(AccessEventType::Error, reader)
        }
    }

    pub fn return_to_reader_required(reader: &Reader) -> Self {
        Self::bare(AccessEventType::ReturnToReaderRequired, reader)
    }

    pub fn return_to_reader_complete(reader: &Reader) -> Self {
        Self::bare(AccessEventType::ReturnToReaderComplete, reader)
    }
}

/// One SDK notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BridgeEvent {
    #[serde(rename_all = "camelCase")]
    SdkStateChanged {
        is_scanning: bool,
        states: Vec<SdkState>,
    },

    #[serde(rename_all = "camelCase")]
    ReaderUpdated {
        update_type: ReaderUpdateType,
        reader: ReaderAttributes,
    },

    Access(AccessEvent),
}

impl BridgeEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::SdkStateChanged { .. } => EventKind::SdkStateChanged,
            Self::ReaderUpdated { .. } => EventKind::ReaderUpdated,
            Self::Access(_) => EventKind::Access,
        }
    }
}

/// An event as delivered to observers, with its serialized body.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMessage {
    pub kind: EventKind,
    pub event: BridgeEvent,
    pub body: serde_json::Value,
}

impl EventMessage {
    /// Serialize `event` into a message.
    pub fn new(event: BridgeEvent) -> serde_json::Result<Self> {
        let body = serde_json::to_value(&event)?;
        Ok(Self {
            kind: event.kind(),
            event,
            body,
        })
    }

    /// Channel name, e.g. `"access"`.
    pub fn channel(&self) -> &'static str {
        self.kind.as_str()
    }
}
