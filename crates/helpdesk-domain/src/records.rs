use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::{TicketId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TicketStatus {
    #[default]
    New,
    Open,
    InProgress,
    Solved,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// RFC 3339 timestamp.
    pub created_at: String,
    pub from_id: UserId,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TicketId>,
    pub title: String,
    #[serde(default)]
    pub status: TicketStatus,
    pub from_id: UserId,
    #[serde(default)]
    pub participants: Vec<User>,
    /// Newest first.
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl Ticket {
    pub fn draft(title: impl Into<String>, author: &User) -> Self {
        Self {
            id: None,
            title: title.into(),
            status: TicketStatus::New,
            from_id: author.id.unwrap_or(UserId::new(0)),
            participants: vec![author.clone()],
            posts: Vec::new(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn participant(&self, id: UserId) -> Option<&User> {
        self.participants.iter().find(|user| user.id == Some(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    pub fn summary(&self) -> Option<UserSummary> {
        Some(UserSummary {
            id: self.id?,
            name: self.display_name(),
            email: self.email.clone(),
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    Ticket,
}

impl ActivityKind {
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "ticket" => Ok(Self::Ticket),
            other => Err(CoreError::UnknownActivityType(other.to_owned())),
        }
    }

    pub const fn route_name(self) -> &'static str {
        match self {
            Self::Ticket => "thread",
        }
    }
}

/// Entry of the home screen's recent-activity feed. `activity_type` is kept
/// as the raw backend string so unknown kinds surface when routed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub activity_type: String,
    pub id: u64,
    pub title: String,
    pub created_at: String,
}

impl Activity {
    pub fn kind(&self) -> Result<ActivityKind, CoreError> {
        ActivityKind::parse(&self.activity_type)
    }

    pub fn route_name(&self) -> Result<&'static str, CoreError> {
        self.kind().map(ActivityKind::route_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> User {
        User {
            id: Some(UserId::new(3)),
            first_name: "Ada".to_owned(),
            last_name: "Byron".to_owned(),
            email: "ada@example.com".to_owned(),
            is_active: true,
        }
    }

    #[test]
    fn draft_ticket_is_unpersisted_and_lists_author() {
        let ticket = Ticket::draft("Printer jam", &agent());

        assert!(!ticket.is_persisted());
        assert_eq!(ticket.status, TicketStatus::New);
        assert_eq!(ticket.from_id, UserId::new(3));
        assert!(ticket.participant(UserId::new(3)).is_some());
    }

    #[test]
    fn activity_routes_tickets_to_thread_and_rejects_unknown_kinds() {
        let mut activity = Activity {
            activity_type: "ticket".to_owned(),
            id: 1,
            title: "Printer jam".to_owned(),
            created_at: "2026-10-19T09:00:00Z".to_owned(),
        };
        assert_eq!(activity.route_name().expect("ticket route"), "thread");

        activity.activity_type = "invoice".to_owned();
        assert_eq!(
            activity.route_name().expect_err("unknown kind"),
            CoreError::UnknownActivityType("invoice".to_owned())
        );
    }

    #[test]
    fn user_summary_requires_persisted_id() {
        let mut user = agent();
        assert_eq!(user.summary().map(|summary| summary.name), Some("Ada Byron".to_owned()));

        user.id = None;
        assert!(user.summary().is_none());
    }
}
