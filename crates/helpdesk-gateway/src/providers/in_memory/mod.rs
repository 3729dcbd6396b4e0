use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use helpdesk_domain::{Activity, Ticket, TicketId, TicketStatus, User, UserId, UserSummary};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::interface::{BackendGateway, GatewayError, GatewayProviderKind, GatewayResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedAccount {
    pub username: String,
    pub password: String,
    pub user: User,
}

/// Initial contents of an [`InMemoryGateway`]. Records with ids keep them;
/// later saves allocate above the highest seeded id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemorySeed {
    pub accounts: Vec<SeedAccount>,
    pub tickets: Vec<Ticket>,
}

impl InMemorySeed {
    pub fn demo() -> Self {
        let frank = User {
            id: Some(UserId::new(1)),
            first_name: "Frank".to_owned(),
            last_name: "Foster".to_owned(),
            email: "foo@helpdesk.test".to_owned(),
            is_active: true,
        };
        let grace = User {
            id: Some(UserId::new(2)),
            first_name: "Grace".to_owned(),
            last_name: "Hopper".to_owned(),
            email: "grace@helpdesk.test".to_owned(),
            is_active: true,
        };
        let vpn = Ticket {
            id: Some(TicketId::new(1)),
            title: "VPN drops every hour".to_owned(),
            status: TicketStatus::Open,
            from_id: UserId::new(2),
            participants: vec![grace.clone()],
            posts: Vec::new(),
        };

        Self {
            accounts: vec![
                SeedAccount {
                    username: "foo".to_owned(),
                    password: "bar1".to_owned(),
                    user: frank,
                },
                SeedAccount {
                    username: "grace".to_owned(),
                    password: "cobol".to_owned(),
                    user: grace,
                },
            ],
            tickets: vec![vpn],
        }
    }
}

#[derive(Debug, Default)]
struct InMemoryState {
    credentials: BTreeMap<String, (String, UserId)>,
    users: BTreeMap<UserId, User>,
    tickets: BTreeMap<TicketId, Ticket>,
    activity: Vec<Activity>,
    next_user_id: u64,
    next_ticket_id: u64,
}

/// Backend gateway held entirely in memory. Used by the headless binary and
/// by tests; `set_available(false)` simulates an unreachable server.
#[derive(Debug)]
pub struct InMemoryGateway {
    state: RwLock<InMemoryState>,
    available: AtomicBool,
    save_ticket_calls: AtomicU64,
    save_user_calls: AtomicU64,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new(InMemorySeed::default())
    }
}

impl InMemoryGateway {
    pub fn new(seed: InMemorySeed) -> Self {
        let mut state = InMemoryState::default();
        for account in seed.accounts {
            let id = account
                .user
                .id
                .unwrap_or_else(|| UserId::new(state.users.len() as u64 + 1));
            state.next_user_id = state.next_user_id.max(id.get());
            state
                .credentials
                .insert(account.username, (account.password, id));
            state.users.insert(
                id,
                User {
                    id: Some(id),
                    ..account.user
                },
            );
        }
        for ticket in seed.tickets {
            let Some(id) = ticket.id else {
                continue;
            };
            state.next_ticket_id = state.next_ticket_id.max(id.get());
            state.tickets.insert(id, ticket);
        }

        Self {
            state: RwLock::new(state),
            available: AtomicBool::new(true),
            save_ticket_calls: AtomicU64::new(0),
            save_user_calls: AtomicU64::new(0),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn save_ticket_calls(&self) -> u64 {
        self.save_ticket_calls.load(Ordering::SeqCst)
    }

    pub fn save_user_calls(&self) -> u64 {
        self.save_user_calls.load(Ordering::SeqCst)
    }

    fn ensure_available(&self, operation: &str) -> GatewayResult<()> {
        if self.available.load(Ordering::SeqCst) {
            return Ok(());
        }
        tracing::warn!(operation, "in-memory gateway is marked unavailable");
        Err(GatewayError::Unavailable(format!(
            "{operation}: backend is offline"
        )))
    }
}

#[async_trait::async_trait]
impl BackendGateway for InMemoryGateway {
    fn kind(&self) -> GatewayProviderKind {
        GatewayProviderKind::InMemory
    }

    async fn login(&self, username: &str, password: &str) -> GatewayResult<Option<User>> {
        self.ensure_available("login")?;
        let state = self.state.read().await;
        let user = state
            .credentials
            .get(username)
            .filter(|(expected, _)| expected == password)
            .and_then(|(_, id)| state.users.get(id))
            .cloned();
        Ok(user)
    }

    async fn get_ticket_details(&self, id: TicketId) -> GatewayResult<Option<Ticket>> {
        self.ensure_available("get_ticket_details")?;
        Ok(self.state.read().await.tickets.get(&id).cloned())
    }

    async fn save_ticket(&self, ticket: &Ticket) -> GatewayResult<Ticket> {
        self.save_ticket_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available("save_ticket")?;
        if ticket.title.trim().is_empty() {
            return Err(GatewayError::Rejected(
                "ticket title must not be empty".to_owned(),
            ));
        }

        let mut state = self.state.write().await;
        let mut canonical = ticket.clone();
        match ticket.id {
            Some(id) if !state.tickets.contains_key(&id) => {
                return Err(GatewayError::NotFound(format!("ticket {id}")));
            }
            Some(_) => {}
            None => {
                state.next_ticket_id += 1;
                let id = TicketId::new(state.next_ticket_id);
                canonical.id = Some(id);
                state.activity.insert(
                    0,
                    Activity {
                        activity_type: "ticket".to_owned(),
                        id: id.get(),
                        title: canonical.title.clone(),
                        created_at: now_rfc3339(),
                    },
                );
            }
        }

        if let Some(id) = canonical.id {
            state.tickets.insert(id, canonical.clone());
        }
        Ok(canonical)
    }

    async fn get_user_summaries(&self) -> GatewayResult<Vec<UserSummary>> {
        self.ensure_available("get_user_summaries")?;
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .filter_map(User::summary)
            .collect())
    }

    async fn get_user(&self, id: UserId) -> GatewayResult<User> {
        self.ensure_available("get_user")?;
        self.state
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("user {id}")))
    }

    async fn save_user(&self, user: &User) -> GatewayResult<User> {
        self.save_user_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available("save_user")?;

        let mut state = self.state.write().await;
        let id = match user.id {
            Some(id) if state.users.contains_key(&id) => id,
            Some(id) => return Err(GatewayError::NotFound(format!("user {id}"))),
            None => {
                state.next_user_id += 1;
                UserId::new(state.next_user_id)
            }
        };
        let canonical = User {
            id: Some(id),
            email: user.email.trim().to_owned(),
            ..user.clone()
        };
        state.users.insert(id, canonical.clone());
        Ok(canonical)
    }

    async fn get_recent_activity(&self) -> GatewayResult<Vec<Activity>> {
        self.ensure_available("get_recent_activity")?;
        Ok(self.state.read().await.activity.clone())
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_owned())
}
