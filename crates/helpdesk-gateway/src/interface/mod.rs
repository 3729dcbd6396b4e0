use helpdesk_domain::{Activity, Ticket, TicketId, User, UserId, UserSummary};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("backend rejected request: {0}")]
    Rejected(String),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("unknown gateway provider key: {0}")]
    UnknownProviderKey(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayProviderKind {
    InMemory,
}

impl GatewayProviderKind {
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::InMemory => "gateway.in_memory",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "gateway.in_memory" => Some(Self::InMemory),
            _ => None,
        }
    }
}

/// Remote help-desk backend. Every call may fail with
/// [`GatewayError::Unavailable`]; callers propagate rather than retry.
#[async_trait::async_trait]
pub trait BackendGateway: Send + Sync {
    fn kind(&self) -> GatewayProviderKind;

    /// `Ok(None)` means the credentials were rejected.
    async fn login(&self, username: &str, password: &str) -> GatewayResult<Option<User>>;

    async fn get_ticket_details(&self, id: TicketId) -> GatewayResult<Option<Ticket>>;

    /// Builds an unsaved draft authored by `author`; it has no id.
    fn create_ticket(&self, title: &str, author: &User) -> Ticket {
        Ticket::draft(title, author)
    }

    /// Returns the canonical ticket; a draft receives its server-issued id.
    async fn save_ticket(&self, ticket: &Ticket) -> GatewayResult<Ticket>;

    async fn get_user_summaries(&self) -> GatewayResult<Vec<UserSummary>>;

    async fn get_user(&self, id: UserId) -> GatewayResult<User>;

    fn create_user(&self) -> User {
        User {
            is_active: true,
            ..User::default()
        }
    }

    async fn save_user(&self, user: &User) -> GatewayResult<User>;

    async fn get_recent_activity(&self) -> GatewayResult<Vec<Activity>> {
        Ok(Vec::new())
    }
}
