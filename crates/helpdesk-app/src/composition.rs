//! Composition root.
//!
//! [`HelpDeskApp`] owns everything that lives for a session (bus, session
//! context, shell, home and users screens) and builds a fresh
//! [`ThreadScreen`] for every thread navigation. Navigations run the exit
//! guard of the current screen, then the entry guard of the target, following
//! redirects up to the configured limit, before the router is told to move.

use std::sync::Arc;
use std::time::Duration;

use helpdesk_config::{HelpDeskConfig, NavigationRuntimeConfig};
use helpdesk_domain::{NavigationCompletedEvent, Notification, RouteParams, Tab, TicketStatus};
use helpdesk_eventbus::NotificationBus;
use helpdesk_gateway::BackendGateway;

use crate::collaborators::{
    ActivationOutcome, Dialogs, NavigationOptions, RouteTarget, Router,
};
use crate::error::{AppError, AppResult};
use crate::home::HomeScreen;
use crate::login::{LoginOutcome, LoginScreen};
use crate::routes::USERS_ROUTE;
use crate::session::SessionContext;
use crate::shell::{LogoutOutcome, Shell};
use crate::thread::ThreadScreen;
use crate::users::UsersScreen;
use crate::validation::UserValidator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationResult {
    Completed(RouteTarget),
    /// The current screen refused to be left.
    Blocked,
    /// The target screen refused entry.
    Denied,
}

impl NavigationResult {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

enum ActiveScreen {
    Home,
    Thread(Box<ThreadScreen>),
    Users,
}

pub struct HelpDeskApp {
    gateway: Arc<dyn BackendGateway>,
    bus: Arc<NotificationBus>,
    router: Arc<dyn Router>,
    dialogs: Arc<dyn Dialogs>,
    session: Arc<SessionContext>,
    navigation: NavigationRuntimeConfig,
    poll_interval: Duration,
    login: LoginScreen,
    shell: Shell,
    home: HomeScreen,
    users: UsersScreen,
    current: Option<ActiveScreen>,
}

impl HelpDeskApp {
    /// `router` must publish navigation completions on `bus`.
    pub fn new(
        config: &HelpDeskConfig,
        gateway: Arc<dyn BackendGateway>,
        bus: Arc<NotificationBus>,
        router: Arc<dyn Router>,
        dialogs: Arc<dyn Dialogs>,
    ) -> Self {
        let navigation = config.navigation_runtime();
        let poll_interval = config.poll_interval();
        let session = Arc::new(SessionContext::new());
        let shell = Shell::new(
            bus.clone(),
            router.clone(),
            dialogs.clone(),
            session.clone(),
            navigation.clone(),
        );
        let users = UsersScreen::new(
            gateway.clone(),
            router.clone(),
            dialogs.clone(),
            Arc::new(UserValidator),
            navigation.clone(),
            poll_interval,
        );

        Self {
            login: LoginScreen::new(gateway.clone(), session.clone()),
            home: HomeScreen::new(gateway.clone()),
            gateway,
            bus,
            router,
            dialogs,
            session,
            navigation,
            poll_interval,
            shell,
            users,
            current: None,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn bus(&self) -> &Arc<NotificationBus> {
        &self.bus
    }

    pub fn login_screen(&self) -> &LoginScreen {
        &self.login
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn home(&self) -> &HomeScreen {
        &self.home
    }

    pub fn users(&self) -> &UsersScreen {
        &self.users
    }

    pub fn users_mut(&mut self) -> &mut UsersScreen {
        &mut self.users
    }

    /// The thread screen, when a thread is the current screen.
    pub fn thread(&self) -> Option<&ThreadScreen> {
        match self.current.as_ref()? {
            ActiveScreen::Thread(screen) => Some(&**screen),
            ActiveScreen::Home | ActiveScreen::Users => None,
        }
    }

    pub fn thread_mut(&mut self) -> Option<&mut ThreadScreen> {
        match self.current.as_mut()? {
            ActiveScreen::Thread(screen) => Some(&mut **screen),
            ActiveScreen::Home | ActiveScreen::Users => None,
        }
    }

    /// Logs in and, on success, starts the shell on the home route.
    pub async fn login(&mut self, username: &str, password: &str) -> AppResult<LoginOutcome> {
        self.login.username = username.to_owned();
        self.login.password = password.to_owned();
        let outcome = self.login.login().await?;
        if outcome == LoginOutcome::Succeeded {
            self.shell.start();
            self.navigate_home().await?;
        }
        Ok(outcome)
    }

    pub async fn navigate_home(&mut self) -> AppResult<NavigationResult> {
        let home = self.navigation.home_route.clone();
        self.navigate(RouteTarget::new(home, RouteParams::new())).await
    }

    pub async fn navigate_thread(&mut self, params: RouteParams) -> AppResult<NavigationResult> {
        let thread = self.navigation.thread_route.clone();
        self.navigate(RouteTarget::new(thread, params)).await
    }

    pub async fn navigate_users(&mut self, params: RouteParams) -> AppResult<NavigationResult> {
        let route = if params.is_empty() {
            USERS_ROUTE.to_owned()
        } else {
            self.navigation.user_route.clone()
        };
        self.navigate(RouteTarget::new(route, params)).await
    }

    /// Runs guard sequencing for `target` and, once every guard agrees,
    /// moves the router and applies the resulting notifications to the shell.
    pub async fn navigate(&mut self, target: RouteTarget) -> AppResult<NavigationResult> {
        if !self.session.is_authenticated() {
            return Err(AppError::NoActiveSession);
        }

        if !self.can_leave_current().await {
            tracing::debug!(route = %target.route, "navigation blocked by current screen");
            self.publish_cancelled(&target)?;
            return Ok(NavigationResult::Blocked);
        }

        let mut target = target;
        let mut redirects = 0_u32;
        let entered = loop {
            let (outcome, entered) = self.try_enter(&target).await?;
            match outcome {
                ActivationOutcome::Allow => break entered,
                ActivationOutcome::Deny => {
                    tracing::debug!(route = %target.route, "navigation denied by target screen");
                    self.publish_cancelled(&target)?;
                    return Ok(NavigationResult::Denied);
                }
                ActivationOutcome::Redirect(next) => {
                    redirects += 1;
                    if redirects > self.navigation.max_redirects {
                        return Err(AppError::TooManyRedirects {
                            route: next.route,
                            limit: self.navigation.max_redirects,
                        });
                    }
                    tracing::debug!(from = %target.route, to = %next.route, "redirecting");
                    target = next;
                }
            }
        };

        // The current screen stays in place until the new one is up, so a
        // failed activation leaves the app where the router still is.
        let entered = self.activate(entered, &target.params).await?;
        self.replace_current(entered);
        self.router
            .navigate_to_route(&target.route, &target.params, NavigationOptions::default())
            .await?;
        self.shell.sync()?;
        Ok(NavigationResult::Completed(target))
    }

    async fn can_leave_current(&self) -> bool {
        match self.current.as_ref() {
            Some(ActiveScreen::Thread(screen)) => screen.can_deactivate().await,
            Some(ActiveScreen::Users) => self.users.can_deactivate().await,
            Some(ActiveScreen::Home) | None => true,
        }
    }

    fn leave_current(&mut self) {
        if let Some(ActiveScreen::Users) = self.current.take() {
            self.users.deactivate();
        }
    }

    /// The users screen is shared, so moving between users keeps it
    /// active; its activation already retracked the new selection.
    fn replace_current(&mut self, entered: ActiveScreen) {
        let staying_on_users = matches!(entered, ActiveScreen::Users);
        let previous = self.current.replace(entered);
        if matches!(previous, Some(ActiveScreen::Users)) && !staying_on_users {
            self.users.deactivate();
        }
    }

    async fn try_enter(
        &mut self,
        target: &RouteTarget,
    ) -> AppResult<(ActivationOutcome, ActiveScreen)> {
        let route = target.route.as_str();
        if route == self.navigation.home_route {
            return Ok((ActivationOutcome::Allow, ActiveScreen::Home));
        }
        if route == self.navigation.thread_route {
            let mut screen = self.thread_screen();
            let outcome = screen.can_activate(&target.params).await?;
            return Ok((outcome, ActiveScreen::Thread(Box::new(screen))));
        }
        if route == self.navigation.user_route || route == USERS_ROUTE {
            return Ok((self.users.can_activate(&target.params), ActiveScreen::Users));
        }
        Err(AppError::Navigation(format!("no screen for route '{route}'")))
    }

    async fn activate(
        &mut self,
        mut entered: ActiveScreen,
        params: &RouteParams,
    ) -> AppResult<ActiveScreen> {
        match &mut entered {
            ActiveScreen::Home => self.home.activate().await?,
            ActiveScreen::Thread(screen) => screen.activate(),
            ActiveScreen::Users => self.users.activate(params).await?,
        }
        Ok(entered)
    }

    fn thread_screen(&self) -> ThreadScreen {
        ThreadScreen::new(
            self.gateway.clone(),
            self.router.clone(),
            self.dialogs.clone(),
            self.bus.clone(),
            self.session.clone(),
            self.navigation.clone(),
        )
    }

    fn publish_cancelled(&mut self, target: &RouteTarget) -> AppResult<()> {
        self.bus.publish(Notification::NavigationCompleted(
            NavigationCompletedEvent::cancelled(target.route.clone(), target.params.clone()),
        ));
        self.shell.sync()?;
        Ok(())
    }

    /// Closes `tab`. When it was active, the replacement screen is reached
    /// through the usual guards and the tab is only removed once that
    /// navigation completes; a blocked, denied or failed move keeps it open.
    pub async fn close_tab(&mut self, tab: &Tab) -> AppResult<Option<NavigationResult>> {
        self.shell.sync()?;
        let Some(next) = self.shell.close_target(tab) else {
            self.shell.detach_tab(tab);
            return Ok(None);
        };

        let result = self.navigate(next).await?;
        if result.is_completed() {
            self.shell.detach_tab(tab);
        } else {
            tracing::debug!(route = %tab.route, ?result, "tab kept open");
        }
        Ok(Some(result))
    }

    /// Saves the current thread and applies the tab it may have opened.
    pub async fn save_thread(&mut self) -> AppResult<()> {
        let screen = self.thread_mut().ok_or(AppError::NoTicketLoaded)?;
        screen.save().await?;
        self.shell.sync()?;
        Ok(())
    }

    pub async fn submit_thread(
        &mut self,
        status: TicketStatus,
    ) -> AppResult<()> {
        let screen = self.thread_mut().ok_or(AppError::NoTicketLoaded)?;
        screen.submit(status).await?;
        self.shell.sync()?;
        Ok(())
    }

    /// Logs out through the shell. On success every session-scoped screen is
    /// rebuilt so the next login starts clean.
    pub async fn logout(&mut self) -> AppResult<LogoutOutcome> {
        self.shell.sync()?;
        let outcome = self.shell.logout().await?;
        if outcome == LogoutOutcome::LoggedOut {
            self.leave_current();
            self.current = None;
            self.login = LoginScreen::new(self.gateway.clone(), self.session.clone());
            self.home = HomeScreen::new(self.gateway.clone());
            self.users = UsersScreen::new(
                self.gateway.clone(),
                self.router.clone(),
                self.dialogs.clone(),
                Arc::new(UserValidator),
                self.navigation.clone(),
                self.poll_interval,
            );
        }
        Ok(outcome)
    }
}
