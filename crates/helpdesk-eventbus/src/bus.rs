use std::sync::atomic::{AtomicU64, Ordering};

use helpdesk_domain::Notification;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::envelope::{NotificationEnvelope, NotificationKind};

pub const DEFAULT_BUFFER_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationBusConfig {
    pub buffer_capacity: usize,
}

impl Default for NotificationBusConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("subscription lagged behind the bus and skipped {0} notifications")]
    Lagged(u64),
    #[error("notification bus closed")]
    Closed,
}

/// Broadcast bus for navigation notifications.
///
/// Every notification kind travels over one channel, so a subscriber observes
/// notifications in publish order regardless of kind.
#[derive(Debug)]
pub struct NotificationBus {
    next_sequence: AtomicU64,
    sender: broadcast::Sender<NotificationEnvelope>,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(NotificationBusConfig::default())
    }
}

impl NotificationBus {
    pub fn new(config: NotificationBusConfig) -> Self {
        assert!(
            config.buffer_capacity > 0,
            "buffer_capacity must be greater than 0"
        );

        let (sender, _receiver) = broadcast::channel(config.buffer_capacity);
        Self {
            next_sequence: AtomicU64::new(0),
            sender,
        }
    }

    pub fn subscribe_all(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            kinds: None,
        }
    }

    pub fn subscribe(&self, kinds: &[NotificationKind]) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            kinds: Some(kinds.to_vec()),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn publish(&self, notification: Notification) -> NotificationEnvelope {
        let envelope = NotificationEnvelope {
            sequence: self.next_sequence(),
            notification,
        };

        if self.sender.receiver_count() > 0 {
            let _ = self.sender.send(envelope.clone());
        } else {
            tracing::trace!(
                sequence = envelope.sequence,
                kind = ?envelope.kind(),
                "notification published without subscribers"
            );
        }

        envelope
    }

    fn next_sequence(&self) -> u64 {
        let mut current = self.next_sequence.load(Ordering::Relaxed);
        loop {
            let next = current
                .checked_add(1)
                .expect("notification sequence exhausted");
            match self.next_sequence.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(observed) => current = observed,
            }
        }
    }
}

/// Receiving side of a bus subscription. Dropping it (or calling
/// [`Subscription::dispose`]) unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<NotificationEnvelope>,
    kinds: Option<Vec<NotificationKind>>,
}

impl Subscription {
    fn accepts(&self, envelope: &NotificationEnvelope) -> bool {
        self.kinds
            .as_ref()
            .is_none_or(|kinds| kinds.contains(&envelope.kind()))
    }

    pub async fn next(&mut self) -> Result<NotificationEnvelope, SubscriptionError> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) if self.accepts(&envelope) => return Ok(envelope),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => return Err(SubscriptionError::Lagged(skipped)),
                Err(RecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    /// Next already-published notification, without waiting.
    pub fn try_next(&mut self) -> Result<Option<NotificationEnvelope>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(envelope) if self.accepts(&envelope) => return Ok(Some(envelope)),
                Ok(_) => continue,
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Lagged(skipped)) => {
                    return Err(SubscriptionError::Lagged(skipped))
                }
                Err(TryRecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    pub fn dispose(self) {}
}
