//! Fan-in of SDK notifications, fan-out to observers.
//!
//! The multiplexer listens to four SDK notification sources and republishes
//! each notification as an [`EventMessage`] to every attached observer.
//! Both access sources share the `access` channel.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐
//! │ SDK state      │──────►┌─────────┐       ┌────────────┐
//! ├────────────────┤       │         │──────►│ observer 1 │
//! │ Reader update  │──────►│  Relay  │       └────────────┘
//! ├────────────────┤       │         │       ┌────────────┐
//! │ User access    │──────►│         │──────►│ observer 2 │
//! ├────────────────┤       │         │       └────────────┘
//! │ Auto access    │──────►└─────────┘
//! └────────────────┘
//! ```
//!
//! SDK listeners are attached when the first observer arrives and detached
//! when the last one leaves, so nothing is delivered while nobody listens.
//! Delivery happens on the SDK's callback context, in callback order, and
//! never waits on an observer.
//!
//! # Examples
//!
//! ```
//! use latchkey_core::{Reader, SdkOptions};
//! use latchkey_events::{EventKind, EventMultiplexer};
//! use latchkey_sdk::SdkProvider;
//! use latchkey_sdk::mock::{AccessSource, MockProvider};
//!
//! let (provider, handle) = MockProvider::new();
//! let events = EventMultiplexer::new(provider.configure(&SdkOptions::default()));
//!
//! let mut subscription = events.subscribe();
//! handle.emit_access_started(AccessSource::Automatic, &Reader::new("r1", "Lobby"));
//!
//! let message = subscription.try_recv().unwrap();
//! assert_eq!(message.kind, EventKind::Access);
//! assert_eq!(message.body["event"], "started");
//! ```

use std::sync::Arc;

use latchkey_core::{
    AccessResult, Reader, ReaderAttributes, ReaderUpdateType, SdkState, exactly_one,
};
use latchkey_sdk::{
    AccessListener, MobileAccessSdk, ReaderUpdateListener, SdkError, SdkStateListener,
};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::event::{AccessEvent, BridgeEvent, EventMessage};
use crate::sink::{ChannelSink, EventSink, EventSubscription, ObserverId};

/// Republishes SDK notifications to observers.
///
/// Cloning yields another handle to the same multiplexer.
#[derive(Clone)]
pub struct EventMultiplexer {
    hub: Arc<Hub>,
}

impl EventMultiplexer {
    /// Create a multiplexer over `sdk`. No SDK listener is attached yet.
    pub fn new(sdk: Arc<dyn MobileAccessSdk>) -> Self {
        let relay = Arc::new(Relay::default());
        Self {
            hub: Arc::new(Hub {
                sdk,
                state_listener: relay.clone(),
                reader_listener: relay.clone(),
                access_listener: relay.clone(),
                relay,
                membership: Mutex::new(Membership::default()),
            }),
        }
    }

    /// Attach a channel-backed observer.
    pub fn subscribe(&self) -> EventSubscription {
        let (sink, rx) = ChannelSink::new();
        let id = self.hub.add(Arc::new(sink));
        EventSubscription::new(id, rx, Arc::downgrade(&self.hub))
    }

    /// Attach a custom observer.
    pub fn add_sink(&self, sink: Arc<dyn EventSink>) -> ObserverId {
        self.hub.add(sink)
    }

    /// Detach an observer. Returns whether it was attached.
    pub fn remove_sink(&self, id: ObserverId) -> bool {
        self.hub.remove(id)
    }

    /// Detach every observer and every SDK listener.
    pub fn detach_all(&self) {
        self.hub.clear();
    }

    pub fn observer_count(&self) -> usize {
        self.hub.relay.observers.lock().len()
    }

    /// Whether SDK listeners are currently attached.
    pub fn is_attached(&self) -> bool {
        self.hub.membership.lock().attached
    }
}

impl std::fmt::Debug for EventMultiplexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventMultiplexer")
            .field("observers", &self.observer_count())
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[derive(Default)]
struct Membership {
    next_id: u64,
    attached: bool,
}

/// Shared state behind a multiplexer and its subscriptions.
///
/// `membership` serializes observer changes with listener attachment. It is
/// never taken on the delivery path, so an SDK that calls back while a
/// listener is being attached does not deadlock.
pub(crate) struct Hub {
    sdk: Arc<dyn MobileAccessSdk>,
    relay: Arc<Relay>,
    state_listener: Arc<dyn SdkStateListener>,
    reader_listener: Arc<dyn ReaderUpdateListener>,
    access_listener: Arc<dyn AccessListener>,
    membership: Mutex<Membership>,
}

impl Hub {
    fn add(&self, sink: Arc<dyn EventSink>) -> ObserverId {
        let mut membership = self.membership.lock();
        let id = ObserverId(membership.next_id);
        membership.next_id += 1;
        self.relay.observers.lock().push((id, sink));

        if !membership.attached {
            self.attach();
            membership.attached = true;
        }
        debug!(%id, "observer attached");
        id
    }

    pub(crate) fn remove(&self, id: ObserverId) -> bool {
        let mut membership = self.membership.lock();
        let (removed, empty) = {
            let mut observers = self.relay.observers.lock();
            let before = observers.len();
            observers.retain(|(observer, _)| *observer != id);
            (observers.len() != before, observers.is_empty())
        };

        if removed {
            debug!(%id, "observer detached");
        }
        if removed && empty && membership.attached {
            self.detach();
            membership.attached = false;
        }
        removed
    }

    fn clear(&self) {
        let mut membership = self.membership.lock();
        let observers = std::mem::take(&mut *self.relay.observers.lock());
        if membership.attached {
            self.detach();
            membership.attached = false;
        }
        debug!(count = observers.len(), "all observers detached");
    }

    fn attach(&self) {
        debug!("attaching sdk listeners");
        self.sdk.add_sdk_state_listener(self.state_listener.clone());
        self.sdk.add_reader_update_listener(self.reader_listener.clone());
        self.sdk.add_access_listener(self.access_listener.clone());
        self.sdk
            .add_automatic_access_listener(self.access_listener.clone());
    }

    fn detach(&self) {
        debug!("detaching sdk listeners");
        self.sdk.remove_sdk_state_listener(&self.state_listener);
        self.sdk.remove_reader_update_listener(&self.reader_listener);
        self.sdk.remove_access_listener(&self.access_listener);
        self.sdk
            .remove_automatic_access_listener(&self.access_listener);
    }
}

/// The single object registered with every SDK notification source.
#[derive(Default)]
struct Relay {
    observers: Mutex<Vec<(ObserverId, Arc<dyn EventSink>)>>,
}

impl Relay {
    fn publish(&self, event: BridgeEvent) {
        let kind = event.kind();
        let message = match EventMessage::new(event) {
            Ok(message) => message,
            // Not reachable with the current payloads: non-finite path
            // losses serialize as null rather than failing.
            Err(error) => {
                warn!(%kind, %error, "event failed to serialize; dropped");
                return;
            }
        };

        let observers = self.observers.lock().clone();
        for (id, sink) in observers {
            if let Err(error) = sink.send_event(&message) {
                warn!(%id, %kind, %error, "observer refused event; dropped");
            }
        }
    }
}

impl SdkStateListener for Relay {
    fn on_state_changed(&self, is_scanning: bool, states: &[SdkState]) {
        self.publish(BridgeEvent::SdkStateChanged {
            is_scanning,
            states: states.to_vec(),
        });
    }
}

impl ReaderUpdateListener for Relay {
    fn on_reader_updated(&self, reader: &ReaderAttributes, update_type: ReaderUpdateType) {
        self.publish(BridgeEvent::ReaderUpdated {
            update_type,
            reader: reader.clone(),
        });
    }
}

impl AccessListener for Relay {
    fn on_access_started(&self, reader: &Reader) {
        self.publish(BridgeEvent::Access(AccessEvent::started(reader)));
    }

    fn on_access_completed(
        &self,
        reader: &Reader,
        result: Option<&AccessResult>,
        error: Option<&SdkError>,
    ) {
        let event = match exactly_one(result, error, "on_access_completed") {
            Ok(result) => AccessEvent::decided(reader, result),
            Err(error) => AccessEvent::failed(reader, error),
        };
        self.publish(BridgeEvent::Access(event));
    }

    fn on_return_to_reader_required(&self, reader: &Reader) {
        self.publish(BridgeEvent::Access(AccessEvent::return_to_reader_required(
            reader,
        )));
    }

    fn on_returned_to_reader(&self, reader: &Reader) {
        self.publish(BridgeEvent::Access(AccessEvent::return_to_reader_complete(
            reader,
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_core::SdkOptions;
    use latchkey_sdk::SdkProvider;
    use latchkey_sdk::mock::{AccessSource, MockProvider, MockSdkHandle};

    fn multiplexer() -> (EventMultiplexer, MockSdkHandle) {
        let (provider, handle) = MockProvider::new();
        (
            EventMultiplexer::new(provider.configure(&SdkOptions::default())),
            handle,
        )
    }

    #[test]
    fn test_listeners_follow_first_and_last_observer() {
        let (events, handle) = multiplexer();
        assert_eq!(handle.listener_counts().total(), 0);

        let first = events.subscribe();
        let second = events.subscribe();
        let counts = handle.listener_counts();
        assert_eq!(counts.sdk_state, 1);
        assert_eq!(counts.reader_update, 1);
        assert_eq!(counts.access, 1);
        assert_eq!(counts.automatic_access, 1);

        drop(first);
        assert!(events.is_attached());
        drop(second);
        assert!(!events.is_attached());
        assert_eq!(handle.listener_counts().total(), 0);
    }

    #[test]
    fn test_nothing_delivered_while_detached() {
        let (events, handle) = multiplexer();
        handle.emit_state_changed(true, vec![]);

        let mut subscription = events.subscribe();
        assert!(subscription.try_recv().is_none());
    }

    #[test]
    fn test_remove_unknown_observer() {
        let (events, _handle) = multiplexer();
        let id = events.add_sink(Arc::new(ChannelSink::new().0));
        assert!(events.remove_sink(id));
        assert!(!events.remove_sink(id));
    }

    #[test]
    fn test_detach_all_closes_subscriptions() {
        let (events, handle) = multiplexer();
        let mut subscription = events.subscribe();
        events.detach_all();

        assert_eq!(events.observer_count(), 0);
        assert_eq!(handle.listener_counts().total(), 0);
        handle.emit_state_changed(false, vec![]);
        assert!(subscription.try_recv().is_none());
    }

    #[test]
    fn test_both_access_sources_share_channel() {
        let (events, handle) = multiplexer();
        let mut subscription = events.subscribe();
        let reader = Reader::new("r1", "Lobby");

        handle.emit_access_started(AccessSource::User, &reader);
        handle.emit_return_to_reader_required(AccessSource::Automatic, &reader);

        let first = subscription.try_recv().unwrap();
        let second = subscription.try_recv().unwrap();
        assert_eq!(first.channel(), "access");
        assert_eq!(second.channel(), "access");
        assert_eq!(second.body["event"], "returnToReaderRequired");
    }

    #[test]
    #[should_panic(expected = "on_access_completed invoked with both result and error set to none")]
    fn test_access_completed_without_outcome_panics() {
        let (events, handle) = multiplexer();
        let _subscription = events.subscribe();
        handle.emit_access_completed(AccessSource::User, &Reader::new("r1", "Lobby"), None, None);
    }
}
