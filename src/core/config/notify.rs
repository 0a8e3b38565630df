//! Change notification
//!
//! Every successful write publishes a [`ChangeEvent`] to the store's
//! [`ChangeSink`]. Delivery is fire-and-forget: the value is already durable
//! when the event is published, so a dropped event only means a missed live
//! update.
//!
//! # Sinks
//!
//! - `()`: no observers
//! - [`PubSubSink`]: Embassy pub/sub channel, for async tasks
//! - [`ObserverList`]: plain callbacks, for synchronous consumers

use super::value::{ConfigValue, Setting};
use crate::core::kv::MAX_VALUE_SIZE;
use core::fmt;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::pubsub::{ImmediatePublisher, PubSubChannel};
use heapless::Vec;

/// Notification emitted after a value has been persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    key: u16,
    value: Vec<u8, MAX_VALUE_SIZE>,
}

impl ChangeEvent {
    /// Create an event for `key` carrying `value`
    ///
    /// Fails with `NotifyError::NoCapacity` if `value` exceeds `MAX_VALUE_SIZE`.
    pub fn new(key: u16, value: &[u8]) -> Result<Self, NotifyError> {
        let value = Vec::from_slice(value).map_err(|_| NotifyError::NoCapacity)?;
        Ok(Self { key, value })
    }

    /// Key that changed
    pub fn key(&self) -> u16 {
        self.key
    }

    /// New value bytes
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Decode the new value if this event is for `setting`
    pub fn value_as<T: ConfigValue>(&self, setting: Setting<T>) -> Option<T> {
        (self.key == setting.key() && self.value.len() == T::SIZE)
            .then(|| T::decode(&self.value))
    }
}

/// Notification delivery errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotifyError {
    /// A subscriber queue is full; the event was dropped
    QueueFull,
    /// No room for another observer, or the value does not fit an event
    NoCapacity,
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::QueueFull => write!(f, "subscriber queue full"),
            NotifyError::NoCapacity => write!(f, "no capacity"),
        }
    }
}

/// Destination for change events
pub trait ChangeSink {
    /// Deliver `event` without blocking
    fn publish(&mut self, event: &ChangeEvent) -> Result<(), NotifyError>;
}

impl ChangeSink for () {
    fn publish(&mut self, _event: &ChangeEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

impl<T: ChangeSink + ?Sized> ChangeSink for &mut T {
    fn publish(&mut self, event: &ChangeEvent) -> Result<(), NotifyError> {
        (**self).publish(event)
    }
}

/// Sink publishing into an Embassy [`PubSubChannel`]
///
/// Uses an immediate publisher, so it never waits. When any subscriber queue
/// is full the event is dropped and `NotifyError::QueueFull` is returned.
///
/// # Example
///
/// ```
/// use embassy_sync::blocking_mutex::raw::NoopRawMutex;
/// use embassy_sync::pubsub::PubSubChannel;
/// use nvconfig::core::config::{ChangeEvent, ChangeSink, PubSubSink};
///
/// let channel = PubSubChannel::<NoopRawMutex, ChangeEvent, 4, 1, 1>::new();
/// let mut subscriber = channel.subscriber().unwrap();
/// let mut sink = PubSubSink::new(&channel);
///
/// sink.publish(&ChangeEvent::new(2, &[5, 0, 0, 0]).unwrap()).unwrap();
/// let event = subscriber.try_next_message_pure().unwrap();
/// assert_eq!(event.key(), 2);
/// ```
pub struct PubSubSink<'a, M: RawMutex, const CAP: usize, const SUBS: usize, const PUBS: usize> {
    publisher: ImmediatePublisher<'a, M, ChangeEvent, CAP, SUBS, PUBS>,
}

impl<'a, M: RawMutex, const CAP: usize, const SUBS: usize, const PUBS: usize>
    PubSubSink<'a, M, CAP, SUBS, PUBS>
{
    /// Create a sink publishing into `channel`
    pub fn new(channel: &'a PubSubChannel<M, ChangeEvent, CAP, SUBS, PUBS>) -> Self {
        Self {
            publisher: channel.immediate_publisher(),
        }
    }
}

impl<M: RawMutex, const CAP: usize, const SUBS: usize, const PUBS: usize> ChangeSink
    for PubSubSink<'_, M, CAP, SUBS, PUBS>
{
    fn publish(&mut self, event: &ChangeEvent) -> Result<(), NotifyError> {
        self.publisher
            .try_publish(event.clone())
            .map_err(|_| NotifyError::QueueFull)
    }
}

/// Observer callback
pub type Observer = fn(&ChangeEvent);

/// Fixed-capacity list of observer callbacks
///
/// Callbacks run synchronously inside `publish`, in subscription order.
#[derive(Clone, Default)]
pub struct ObserverList<const N: usize> {
    observers: Vec<Observer, N>,
}

impl<const N: usize> ObserverList<N> {
    /// Create an empty list
    pub const fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Register an observer
    pub fn subscribe(&mut self, observer: Observer) -> Result<(), NotifyError> {
        self.observers
            .push(observer)
            .map_err(|_| NotifyError::NoCapacity)
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// True if nobody is subscribed
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl<const N: usize> ChangeSink for ObserverList<N> {
    fn publish(&mut self, event: &ChangeEvent) -> Result<(), NotifyError> {
        for observer in &self.observers {
            observer(event);
        }
        Ok(())
    }
}

/// Sink recording every event, for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub events: std::vec::Vec<ChangeEvent>,
    pub fail: bool,
}

#[cfg(test)]
impl ChangeSink for RecordingSink {
    fn publish(&mut self, event: &ChangeEvent) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::QueueFull);
        }
        self.events.push(event.clone());
        Ok(())
    }
}
