//! In-process notification bus shared by the shell and the screens.

pub mod bus;
pub mod envelope;

pub use bus::{
    NotificationBus, NotificationBusConfig, Subscription, SubscriptionError,
    DEFAULT_BUFFER_CAPACITY,
};
pub use envelope::{NotificationEnvelope, NotificationKind};
