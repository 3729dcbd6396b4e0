//! Shared help-desk domain types.
//!
//! Records exchanged with the backend gateway, route parameters and the
//! navigation/tab notifications that flow over the event bus.

pub mod error;
pub mod ids;
pub mod navigation;
pub mod params;
pub mod records;

pub use error::CoreError;
pub use ids::{TicketId, UserId};
pub use navigation::{NavigationCompletedEvent, Notification, Tab, TabOpenedEvent};
pub use params::{ParamValue, RouteParams};
pub use records::{
    Activity, ActivityKind, Post, Ticket, TicketStatus, User, UserSummary,
};
