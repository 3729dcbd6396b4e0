use std::sync::Arc;

use helpdesk_config::NavigationRuntimeConfig;
use helpdesk_domain::{
    Notification, Post, RouteParams, TabOpenedEvent, Ticket, TicketId, TicketStatus, User, UserId,
};
use helpdesk_eventbus::NotificationBus;
use helpdesk_gateway::BackendGateway;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::collaborators::{
    ActivationOutcome, Dialogs, NavigationOptions, RouteTarget, Router,
};
use crate::error::{AppError, AppResult};
use crate::session::SessionContext;

pub const NEW_TICKET_ID: &str = "new";
pub const TITLE_PROMPT: &str = "What would you like to name the ticket?";
pub const UNSAVED_TICKET_TITLE: &str = "Ticket Not Saved";
pub const UNSAVED_TICKET_MESSAGE: &str = "You have created a ticket but have not yet posted it with a status. If you leave now, your work will be lost. Do you wish to continue?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadPhase {
    #[default]
    Inactive,
    CreatingNew,
    ViewingExisting,
    Saved,
}

/// Screen logic for one ticket thread. A fresh instance is built for every
/// navigation to the thread route.
pub struct ThreadScreen {
    gateway: Arc<dyn BackendGateway>,
    router: Arc<dyn Router>,
    dialogs: Arc<dyn Dialogs>,
    bus: Arc<NotificationBus>,
    session: Arc<SessionContext>,
    navigation: NavigationRuntimeConfig,
    phase: ThreadPhase,
    ticket: Option<Ticket>,
    author: Option<User>,
    message: String,
}

impl ThreadScreen {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        router: Arc<dyn Router>,
        dialogs: Arc<dyn Dialogs>,
        bus: Arc<NotificationBus>,
        session: Arc<SessionContext>,
        navigation: NavigationRuntimeConfig,
    ) -> Self {
        Self {
            gateway,
            router,
            dialogs,
            bus,
            session,
            navigation,
            phase: ThreadPhase::Inactive,
            ticket: None,
            author: None,
            message: String::new(),
        }
    }

    pub fn phase(&self) -> ThreadPhase {
        self.phase
    }

    pub fn ticket(&self) -> Option<&Ticket> {
        self.ticket.as_ref()
    }

    /// Author of the ticket, when they are among its participants.
    pub fn author(&self) -> Option<&User> {
        self.author.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn participant(&self, id: UserId) -> Option<&User> {
        self.ticket.as_ref()?.participant(id)
    }

    /// Entry guard.
    ///
    /// `id = "new"` with a title builds a draft and enters without touching
    /// the backend. Without a title the user is prompted, and a provided
    /// title turns into a redirect carrying it, so back/forward never
    /// re-prompts. Any other id is loaded; unknown or malformed ids redirect
    /// home.
    pub async fn can_activate(&mut self, params: &RouteParams) -> AppResult<ActivationOutcome> {
        let id = params.get_string("id");
        if id.as_deref() == Some(NEW_TICKET_ID) {
            return self.activate_new(params).await;
        }

        let Some(ticket_id) = id.and_then(|raw| raw.parse::<TicketId>().ok()) else {
            tracing::debug!(?params, "thread requested without a usable ticket id");
            return Ok(self.redirect_home());
        };

        let Some(ticket) = self.gateway.get_ticket_details(ticket_id).await? else {
            tracing::debug!(%ticket_id, "ticket not found, redirecting home");
            return Ok(self.redirect_home());
        };

        self.author = ticket.participant(ticket.from_id).cloned();
        self.publish_tab_opened(&ticket, ticket_id);
        self.ticket = Some(ticket);
        self.phase = ThreadPhase::ViewingExisting;
        Ok(ActivationOutcome::Allow)
    }

    async fn activate_new(&mut self, params: &RouteParams) -> AppResult<ActivationOutcome> {
        if let Some(title) = params.get_string("title") {
            let author = self.session.current_user().ok_or(AppError::NoActiveSession)?;
            let ticket = self.gateway.create_ticket(&title, &author);
            self.author = ticket.participant(ticket.from_id).cloned();
            self.ticket = Some(ticket);
            self.phase = ThreadPhase::CreatingNew;
            return Ok(ActivationOutcome::Allow);
        }

        let response = self.dialogs.prompt(TITLE_PROMPT).await;
        if response.was_cancelled {
            return Ok(ActivationOutcome::Deny);
        }
        let title = response.output.unwrap_or_default();
        Ok(ActivationOutcome::Redirect(RouteTarget::new(
            self.navigation.thread_route.clone(),
            RouteParams::new()
                .with("id", NEW_TICKET_ID)
                .with("title", title),
        )))
    }

    pub fn activate(&mut self) {
        self.message.clear();
    }

    /// Posts the pending message (if any) as the current user, sets `status`
    /// and saves.
    pub async fn submit(&mut self, status: TicketStatus) -> AppResult<()> {
        let user = self.session.current_user().ok_or(AppError::NoActiveSession)?;
        let ticket = self.ticket.as_mut().ok_or(AppError::NoTicketLoaded)?;

        if !self.message.is_empty() {
            let author_id = user.id.ok_or(AppError::NoActiveSession)?;
            if ticket.participant(author_id).is_none() {
                ticket.participants.push(user.clone());
            }
            ticket.posts.insert(
                0,
                Post {
                    created_at: now_rfc3339(),
                    from_id: author_id,
                    content: std::mem::take(&mut self.message),
                },
            );
        }

        ticket.status = status;
        self.save().await
    }

    /// Persists the ticket. A first save adopts the server's id, rewrites the
    /// address without re-running guards and opens a tab for the ticket.
    pub async fn save(&mut self) -> AppResult<()> {
        let ticket = self.ticket.as_ref().ok_or(AppError::NoTicketLoaded)?;
        let is_new = !ticket.is_persisted();

        let saved = self.gateway.save_ticket(ticket).await.inspect_err(|error| {
            tracing::warn!(error = %error, "ticket save failed");
        })?;
        let saved_id = saved.id;
        self.author = saved.participant(saved.from_id).cloned();
        self.ticket = Some(saved);
        self.phase = ThreadPhase::Saved;

        if is_new {
            let Some(id) = saved_id else {
                return Ok(());
            };
            tracing::info!(ticket_id = %id, "draft ticket persisted");
            self.router
                .navigate_to_route(
                    &self.navigation.thread_route,
                    &thread_params(id),
                    NavigationOptions::address_only(),
                )
                .await?;
            if let Some(ticket) = self.ticket.as_ref() {
                self.publish_tab_opened(ticket, id);
            }
        }
        Ok(())
    }

    /// Exit guard: leaving an unsaved draft needs confirmation.
    pub async fn can_deactivate(&self) -> bool {
        let Some(ticket) = self.ticket.as_ref() else {
            return true;
        };
        if ticket.is_persisted() {
            return true;
        }

        let response = self
            .dialogs
            .show_message(UNSAVED_TICKET_MESSAGE, UNSAVED_TICKET_TITLE, &["Yes", "No"])
            .await;
        !response.was_cancelled
    }

    fn redirect_home(&self) -> ActivationOutcome {
        ActivationOutcome::Redirect(RouteTarget::new(
            self.navigation.home_route.clone(),
            RouteParams::new(),
        ))
    }

    fn publish_tab_opened(&self, ticket: &Ticket, id: TicketId) {
        self.bus.publish(Notification::TabOpened(TabOpenedEvent::new(
            ticket.title.clone(),
            self.navigation.thread_route.clone(),
            thread_params(id),
        )));
    }
}

fn thread_params(id: TicketId) -> RouteParams {
    RouteParams::new().with("id", id.get())
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_owned())
}
