//! App-level error surface.
//!
//! Declined dialogs, rejected logins, failed validation and unknown ticket ids
//! are ordinary outcomes, not errors. What lands here is either a backend
//! failure that the screen layer has to show, or a misuse of the screen API.

use helpdesk_config::ConfigError;
use helpdesk_domain::CoreError;
use helpdesk_eventbus::SubscriptionError;
use helpdesk_gateway::GatewayError;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The shell missed notifications; its tabs may no longer match the
    /// router.
    #[error(transparent)]
    Notifications(#[from] SubscriptionError),
    #[error("no authenticated user in session")]
    NoActiveSession,
    #[error("no ticket is loaded on this screen")]
    NoTicketLoaded,
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("navigation to '{route}' exceeded {limit} redirects")]
    TooManyRedirects { route: String, limit: u32 },
}

impl AppError {
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, Self::Gateway(GatewayError::Unavailable(_)))
    }
}
