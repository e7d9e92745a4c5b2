//! Event multiplexing for the latchkey bridge.
//!
//! The SDK reports state changes, reader updates and access attempts through
//! separate listener interfaces. This crate turns them into a single stream
//! of [`EventMessage`]s on three channels (`sdkStateChanged`,
//! `readerUpdated`, `access`) and fans that stream out to any number of
//! observers.
//!
//! - [`EventMultiplexer`]: attaches to the SDK, publishes to observers
//! - [`BridgeEvent`]: the tagged union of everything that can be published
//! - [`EventSink`] / [`EventSubscription`]: the observer side

pub mod event;
pub mod multiplexer;
pub mod sink;

pub use event::{AccessEvent, AccessEventType, BridgeEvent, EventKind, EventMessage};
pub use multiplexer::EventMultiplexer;
pub use sink::{ChannelSink, EventSink, EventSubscription, ObserverId, SinkError};
