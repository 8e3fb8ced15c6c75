//! EventBatch - the unit of delivery for the receiver
//!
//! A batch is an ordered sequence of opaque event payloads plus the
//! credentials the publisher presented with them. Batches are consumed
//! immediately by the receive callback; nothing here is held long-term.

use bytes::Bytes;

/// Credentials presented alongside a batch
///
/// The harness authenticates with an accept-all stub, but credentials still
/// travel on the wire so publisher-side code paths stay honest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Publisher username
    pub username: String,

    /// Publisher password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// A single opaque event payload
///
/// The harness never interprets event contents; it only counts them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event(Bytes);

impl Event {
    /// Create an event from its payload bytes
    #[inline]
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self(payload.into())
    }

    /// Raw payload bytes
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.0
    }

    /// Payload size in bytes
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.0.len()
    }
}

/// Ordered events plus the credentials that delivered them
///
/// The batch size (its event count) is what the receiver forwards to the
/// event counter.
#[derive(Debug, Clone)]
pub struct EventBatch {
    credentials: Credentials,
    events: Vec<Event>,
}

impl EventBatch {
    /// Create a batch from already-built events
    pub fn new(credentials: Credentials, events: Vec<Event>) -> Self {
        Self {
            credentials,
            events,
        }
    }

    /// Create a batch from raw payloads
    pub fn from_payloads<I, P>(credentials: Credentials, payloads: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Bytes>,
    {
        Self {
            credentials,
            events: payloads.into_iter().map(Event::new).collect(),
        }
    }

    /// Credentials presented with this batch
    #[inline]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Events in delivery order
    #[inline]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Batch size: the number of events
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the batch carries no events
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
