use std::sync::Arc;

use helpdesk_config::NavigationRuntimeConfig;
use helpdesk_domain::{NavigationCompletedEvent, Notification, RouteParams, Tab, TabOpenedEvent};
use helpdesk_eventbus::{NotificationBus, NotificationKind, Subscription, SubscriptionError};

use crate::collaborators::{Dialogs, NavigationOptions, RouteTarget, Router};
use crate::error::AppResult;
use crate::session::{AppRoot, SessionContext};
use crate::tabs::TabRegistry;

pub const LOGOUT_PROMPT: &str = "Tabs are open, do you want to close?";
pub const LOGOUT_TITLE: &str = "Logout";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    LoggedOut,
    Cancelled,
}

/// Session-level coordinator: owns the open tabs and keeps them in step with
/// the router.
///
/// Notifications are pulled from the bus by [`Shell::sync`], which applies
/// them in publish order. A tab opened by a screen during navigation is
/// therefore registered before that navigation's completion is reconciled.
pub struct Shell {
    bus: Arc<NotificationBus>,
    router: Arc<dyn Router>,
    dialogs: Arc<dyn Dialogs>,
    session: Arc<SessionContext>,
    navigation: NavigationRuntimeConfig,
    tabs: TabRegistry,
    subscription: Option<Subscription>,
}

impl Shell {
    pub fn new(
        bus: Arc<NotificationBus>,
        router: Arc<dyn Router>,
        dialogs: Arc<dyn Dialogs>,
        session: Arc<SessionContext>,
        navigation: NavigationRuntimeConfig,
    ) -> Self {
        Self {
            bus,
            router,
            dialogs,
            session,
            navigation,
            tabs: TabRegistry::new(),
            subscription: None,
        }
    }

    pub fn start(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        self.subscription = Some(self.bus.subscribe(&[
            NotificationKind::TabOpened,
            NotificationKind::NavigationCompleted,
        ]));
    }

    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.dispose();
        }
    }

    pub fn is_started(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn tabs(&self) -> &[Tab] {
        self.tabs.tabs()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.active()
    }

    /// Applies every notification published since the last call. Returns how
    /// many were applied.
    ///
    /// Falling behind the bus is an error: a dropped tab-opened notification
    /// cannot be recovered, so the tab list would silently diverge.
    pub fn sync(&mut self) -> AppResult<usize> {
        let mut applied = 0;
        loop {
            let Some(subscription) = self.subscription.as_mut() else {
                return Ok(applied);
            };
            match subscription.try_next() {
                Ok(Some(envelope)) => {
                    match envelope.notification {
                        Notification::TabOpened(event) => self.on_tab_opened(event),
                        Notification::NavigationCompleted(event) => {
                            self.on_navigation_complete(&event)
                        }
                    }
                    applied += 1;
                }
                Ok(None) => return Ok(applied),
                Err(SubscriptionError::Lagged(skipped)) => {
                    tracing::error!(skipped, applied, "shell fell behind the notification bus");
                    return Err(SubscriptionError::Lagged(skipped).into());
                }
                Err(SubscriptionError::Closed) => {
                    self.subscription = None;
                    return Ok(applied);
                }
            }
        }
    }

    pub fn on_tab_opened(&mut self, event: TabOpenedEvent) {
        self.tabs.open(event);
    }

    pub fn on_navigation_complete(&mut self, event: &NavigationCompletedEvent) {
        tracing::trace!(route = %event.route_name, completed = event.completed, "reconciling tabs");
        self.tabs.reconcile(event);
    }

    /// Where closing `tab` leads: the first other tab, or home when it is
    /// the last one. `None` when the tab is not active or not open. Nothing
    /// is removed.
    pub fn close_target(&self, tab: &Tab) -> Option<RouteTarget> {
        let open = self.tabs.get(tab)?;
        if !open.is_active {
            return None;
        }

        let next = self.tabs.tabs().iter().find(|other| !std::ptr::eq(*other, open));
        Some(match next {
            Some(next) => RouteTarget::new(next.route.clone(), next.params.clone()),
            None => RouteTarget::new(self.navigation.home_route.clone(), RouteParams::new()),
        })
    }

    /// Removes `tab` and returns where to go next, as [`Shell::close_target`]
    /// reported before the removal.
    pub fn detach_tab(&mut self, tab: &Tab) -> Option<RouteTarget> {
        let next = self.close_target(tab);
        let closed = self.tabs.close(tab)?;
        tracing::debug!(route = %tab.route, was_active = closed.was_active, "closed tab");
        next
    }

    /// Closes `tab`, moving the router on when it was the active one.
    pub async fn close_tab(&mut self, tab: &Tab) -> AppResult<()> {
        let Some(next) = self.detach_tab(tab) else {
            return Ok(());
        };
        self.router
            .navigate_to_route(&next.route, &next.params, NavigationOptions::default())
            .await
    }

    pub async fn logout(&mut self) -> AppResult<LogoutOutcome> {
        if !self.tabs.is_empty() {
            let response = self
                .dialogs
                .show_message(LOGOUT_PROMPT, LOGOUT_TITLE, &["Yes", "No"])
                .await;
            if response.was_cancelled {
                return Ok(LogoutOutcome::Cancelled);
            }
        }

        self.terminate_session().await;
        Ok(LogoutOutcome::LoggedOut)
    }

    async fn terminate_session(&mut self) {
        let open_tabs = self.tabs.len();
        self.session.set_root(AppRoot::Login);
        self.session.unregister();
        self.router.reset().await;
        self.router.deactivate().await;
        self.tabs.clear();
        self.stop();
        tracing::info!(open_tabs, "session terminated");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use helpdesk_config::NavigationRuntimeConfig;
    use helpdesk_domain::{
        NavigationCompletedEvent, Notification, RouteParams, TabOpenedEvent, User, UserId,
    };
    use helpdesk_eventbus::{NotificationBus, NotificationBusConfig, SubscriptionError};

    use super::{LogoutOutcome, Shell, LOGOUT_PROMPT};
    use crate::error::AppError;
    use crate::headless::{DialogRequest, HeadlessRouter, ScriptedDialogs};
    use crate::session::{AppRoot, SessionContext};

    struct Fixture {
        bus: Arc<NotificationBus>,
        router: Arc<HeadlessRouter>,
        dialogs: Arc<ScriptedDialogs>,
        session: Arc<SessionContext>,
        shell: Shell,
    }

    fn fixture() -> Fixture {
        let bus = Arc::new(NotificationBus::default());
        let router = Arc::new(HeadlessRouter::new(bus.clone()));
        let dialogs = Arc::new(ScriptedDialogs::new());
        let session = Arc::new(SessionContext::new());
        session.register(User {
            id: Some(UserId::new(1)),
            ..User::default()
        });
        session.set_root(AppRoot::Shell);
        let mut shell = Shell::new(
            bus.clone(),
            router.clone(),
            dialogs.clone(),
            session.clone(),
            NavigationRuntimeConfig::default(),
        );
        shell.start();
        Fixture {
            bus,
            router,
            dialogs,
            session,
            shell,
        }
    }

    fn open_thread(bus: &NotificationBus, id: i64) {
        bus.publish(Notification::TabOpened(TabOpenedEvent::new(
            format!("Ticket {id}"),
            "thread",
            RouteParams::new().with("id", id),
        )));
        bus.publish(Notification::NavigationCompleted(
            NavigationCompletedEvent::completed("thread", RouteParams::new().with("id", id)),
        ));
    }

    #[test]
    fn sync_registers_tabs_before_reconciling_their_navigation() {
        let mut fx = fixture();
        open_thread(&fx.bus, 1);
        open_thread(&fx.bus, 2);

        assert_eq!(fx.shell.sync().expect("sync"), 4);

        let active: Vec<bool> = fx.shell.tabs().iter().map(|tab| tab.is_active).collect();
        assert_eq!(active, vec![false, true]);
    }

    #[test]
    fn stopped_shell_ignores_notifications() {
        let mut fx = fixture();
        fx.shell.stop();
        open_thread(&fx.bus, 1);

        assert_eq!(fx.shell.sync().expect("sync"), 0);
        assert!(fx.shell.tabs().is_empty());
    }

    #[test]
    fn falling_behind_the_bus_is_reported_not_skipped() {
        let bus = Arc::new(NotificationBus::new(NotificationBusConfig { buffer_capacity: 1 }));
        let mut shell = Shell::new(
            bus.clone(),
            Arc::new(HeadlessRouter::new(bus.clone())),
            Arc::new(ScriptedDialogs::new()),
            Arc::new(SessionContext::new()),
            NavigationRuntimeConfig::default(),
        );
        shell.start();
        open_thread(&bus, 1);

        let error = shell.sync().expect_err("lagged subscription");

        assert!(matches!(
            error,
            AppError::Notifications(SubscriptionError::Lagged(1))
        ));
        assert!(shell.tabs().is_empty());
    }

    #[tokio::test]
    async fn closing_active_tab_navigates_to_first_remaining_tab() {
        let mut fx = fixture();
        open_thread(&fx.bus, 1);
        open_thread(&fx.bus, 2);
        open_thread(&fx.bus, 3);
        fx.shell.sync().expect("sync");
        let active = fx.shell.active_tab().cloned().expect("active tab");

        fx.shell.close_tab(&active).await.expect("close tab");

        let target = fx.router.current().expect("navigated");
        assert_eq!(target.route, "thread");
        assert_eq!(target.params.get_string("id").as_deref(), Some("1"));
        fx.shell.sync().expect("sync");
        assert_eq!(fx.shell.active_tab().map(|tab| tab.title.as_str()), Some("Ticket 1"));
    }

    #[tokio::test]
    async fn closing_last_active_tab_navigates_home() {
        let mut fx = fixture();
        open_thread(&fx.bus, 7);
        fx.shell.sync().expect("sync");
        let only = fx.shell.tabs()[0].clone();

        fx.shell.close_tab(&only).await.expect("close tab");

        assert_eq!(fx.router.current().map(|target| target.route), Some("home".to_owned()));
        assert!(fx.shell.tabs().is_empty());
    }

    #[tokio::test]
    async fn closing_inactive_or_absent_tab_does_not_navigate() {
        let mut fx = fixture();
        open_thread(&fx.bus, 1);
        open_thread(&fx.bus, 2);
        fx.shell.sync().expect("sync");
        let inactive = fx.shell.tabs()[0].clone();
        let history_before = fx.router.history().len();

        fx.shell.close_tab(&inactive).await.expect("close inactive");
        fx.shell.close_tab(&inactive).await.expect("close absent");

        assert_eq!(fx.router.history().len(), history_before);
        assert_eq!(fx.shell.tabs().len(), 1);
    }

    #[test]
    fn detach_reports_the_next_target_without_navigating() {
        let mut fx = fixture();
        open_thread(&fx.bus, 4);
        open_thread(&fx.bus, 5);
        fx.shell.sync().expect("sync");
        let active = fx.shell.active_tab().cloned().expect("active tab");

        let next = fx.shell.detach_tab(&active).expect("next target");

        assert_eq!(next.route, "thread");
        assert_eq!(next.params.get_string("id").as_deref(), Some("4"));
        assert!(fx.router.history().is_empty());
        assert_eq!(fx.shell.detach_tab(&active), None);
    }

    #[test]
    fn close_target_leaves_the_tab_open() {
        let mut fx = fixture();
        open_thread(&fx.bus, 4);
        open_thread(&fx.bus, 5);
        fx.shell.sync().expect("sync");
        let active = fx.shell.active_tab().cloned().expect("active tab");
        let inactive = fx.shell.tabs()[0].clone();

        let next = fx.shell.close_target(&active).expect("next target");

        assert_eq!(next.params.get_string("id").as_deref(), Some("4"));
        assert_eq!(fx.shell.close_target(&inactive), None);
        assert_eq!(fx.shell.tabs().len(), 2);
    }

    #[tokio::test]
    async fn logout_without_tabs_terminates_immediately() {
        let mut fx = fixture();

        let outcome = fx.shell.logout().await.expect("logout");

        assert_eq!(outcome, LogoutOutcome::LoggedOut);
        assert!(fx.dialogs.requests().is_empty());
        assert_eq!(fx.session.root(), AppRoot::Login);
        assert!(!fx.session.is_authenticated());
        assert!(!fx.router.is_active());
        assert_eq!(fx.router.reset_count(), 1);
        assert!(!fx.shell.is_started());
    }

    #[tokio::test]
    async fn logout_with_open_tabs_requires_confirmation() {
        let mut fx = fixture();
        open_thread(&fx.bus, 1);
        fx.shell.sync().expect("sync");
        fx.dialogs.push_cancel().push_confirm();

        let declined = fx.shell.logout().await.expect("declined logout");
        assert_eq!(declined, LogoutOutcome::Cancelled);
        assert_eq!(fx.shell.tabs().len(), 1);
        assert!(fx.session.is_authenticated());

        let accepted = fx.shell.logout().await.expect("accepted logout");
        assert_eq!(accepted, LogoutOutcome::LoggedOut);
        assert!(fx.shell.tabs().is_empty());
        assert_eq!(fx.session.root(), AppRoot::Login);

        let requests = fx.dialogs.requests();
        assert_eq!(requests.len(), 2);
        assert!(matches!(
            &requests[0],
            DialogRequest::Message { text, .. } if text == LOGOUT_PROMPT
        ));
    }
}
