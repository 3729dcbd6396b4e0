use std::sync::Arc;
use std::time::Duration;

use helpdesk_config::NavigationRuntimeConfig;
use helpdesk_domain::{RouteParams, User, UserId, UserSummary};
use helpdesk_gateway::{BackendGateway, GatewayResult};

use crate::collaborators::{
    ActivationOutcome, Dialogs, NavigationOptions, RouteTarget, Router, Validator,
};
use crate::edit::{EditController, RecordStore, SaveOutcome};
use crate::error::AppResult;

pub const USER_CHANGED_TITLE: &str = "User Has Changed";
pub const USER_CHANGED_MESSAGE: &str =
    "You have made changes. If you leave now, these changes will be lost. Do you wish to continue?";

/// Persists users through the backend gateway.
pub struct GatewayUserStore {
    gateway: Arc<dyn BackendGateway>,
}

impl GatewayUserStore {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait::async_trait]
impl RecordStore<User> for GatewayUserStore {
    async fn persist(&self, record: &User) -> AppResult<User> {
        Ok(self.gateway.save_user(record).await?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserSelection {
    New,
    Existing(UserId),
    Nothing,
}

impl UserSelection {
    fn from_params(params: &RouteParams) -> AppResult<Self> {
        if params.get_string("id").as_deref() == Some("new") {
            return Ok(Self::New);
        }
        Ok(match params.parse::<UserId>("id")? {
            Some(id) => Self::Existing(id),
            None => Self::Nothing,
        })
    }

    async fn fetch(self, gateway: &dyn BackendGateway) -> GatewayResult<Option<User>> {
        match self {
            Self::New => Ok(Some(gateway.create_user())),
            Self::Existing(id) => gateway.get_user(id).await.map(Some),
            Self::Nothing => Ok(None),
        }
    }
}

/// User administration screen. One instance lives for the whole session so
/// the list and the selected user survive navigating away and back.
pub struct UsersScreen {
    gateway: Arc<dyn BackendGateway>,
    router: Arc<dyn Router>,
    dialogs: Arc<dyn Dialogs>,
    navigation: NavigationRuntimeConfig,
    controller: EditController<User>,
    users: Option<Vec<UserSummary>>,
    active_id: Option<UserId>,
}

impl UsersScreen {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        router: Arc<dyn Router>,
        dialogs: Arc<dyn Dialogs>,
        validator: Arc<dyn Validator<User>>,
        navigation: NavigationRuntimeConfig,
        poll_interval: Duration,
    ) -> Self {
        let store = Arc::new(GatewayUserStore::new(gateway.clone()));
        Self {
            gateway,
            router,
            dialogs,
            navigation,
            controller: EditController::new(store, validator, poll_interval),
            users: None,
            active_id: None,
        }
    }

    pub fn users(&self) -> &[UserSummary] {
        self.users.as_deref().unwrap_or_default()
    }

    pub fn active_id(&self) -> Option<UserId> {
        self.active_id
    }

    pub fn controller(&self) -> &EditController<User> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut EditController<User> {
        &mut self.controller
    }

    /// Without an explicit id, returns to the last selected user.
    pub fn can_activate(&self, params: &RouteParams) -> ActivationOutcome {
        match (params.get_string("id"), self.active_id) {
            (None, Some(id)) => ActivationOutcome::Redirect(RouteTarget::new(
                self.navigation.user_route.clone(),
                RouteParams::new().with("id", id.get()),
            )),
            _ => ActivationOutcome::Allow,
        }
    }

    /// First activation fetches the list and the user concurrently; later
    /// ones only reload the user.
    pub async fn activate(&mut self, params: &RouteParams) -> AppResult<()> {
        if self.users.is_some() {
            return self.load(params).await;
        }

        let selection = UserSelection::from_params(params)?;
        let gateway = self.gateway.clone();
        let (record, summaries) = tokio::try_join!(
            selection.fetch(gateway.as_ref()),
            gateway.get_user_summaries()
        )?;
        self.users = Some(summaries);
        self.select(selection, record);
        Ok(())
    }

    pub async fn load(&mut self, params: &RouteParams) -> AppResult<()> {
        let selection = UserSelection::from_params(params)?;
        let record = selection.fetch(self.gateway.as_ref()).await?;
        self.select(selection, record);
        Ok(())
    }

    fn select(&mut self, selection: UserSelection, record: Option<User>) {
        self.active_id = match selection {
            UserSelection::Existing(id) => Some(id),
            UserSelection::New | UserSelection::Nothing => None,
        };
        self.controller.start_tracking(record);
    }

    pub async fn save(&mut self) -> AppResult<SaveOutcome<User>> {
        let outcome = self.controller.save().await?;
        if let SaveOutcome::Saved(user) = &outcome {
            self.on_saved(user).await?;
        }
        Ok(outcome)
    }

    /// Keeps the list in step with a saved user. A newly created user is
    /// prepended and the address is rewritten to its id without re-running
    /// navigation.
    pub async fn on_saved(&mut self, user: &User) -> AppResult<()> {
        let Some(summary) = user.summary() else {
            return Ok(());
        };
        let users = self.users.get_or_insert_with(Vec::new);

        if self.active_id.is_none() {
            let id = summary.id;
            users.insert(0, summary);
            self.active_id = Some(id);
            tracing::info!(user_id = %id, "user created");
            return self
                .router
                .navigate_to_route(
                    &self.navigation.user_route,
                    &RouteParams::new().with("id", id.get()),
                    NavigationOptions::address_only(),
                )
                .await;
        }

        if let Some(existing) = users.iter_mut().find(|existing| existing.id == summary.id) {
            *existing = summary;
        }
        Ok(())
    }

    pub async fn can_deactivate(&self) -> bool {
        if !self.controller.refresh_dirty() {
            return true;
        }
        let response = self
            .dialogs
            .show_message(USER_CHANGED_MESSAGE, USER_CHANGED_TITLE, &["Yes", "No"])
            .await;
        !response.was_cancelled
    }

    pub fn deactivate(&mut self) {
        self.controller.revert();
        self.controller.stop_tracking();
    }

    pub fn toggle_active_status(&self) {
        self.controller.edit(|user| user.is_active = !user.is_active);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use helpdesk_config::NavigationRuntimeConfig;
    use helpdesk_domain::{CoreError, RouteParams, UserId};
    use helpdesk_eventbus::NotificationBus;
    use helpdesk_gateway::{BackendGateway, InMemoryGateway, InMemorySeed};

    use super::*;
    use crate::error::AppError;
    use crate::headless::{DialogRequest, HeadlessRouter, ScriptedDialogs};
    use crate::validation::UserValidator;

    struct Fixture {
        gateway: Arc<InMemoryGateway>,
        router: Arc<HeadlessRouter>,
        dialogs: Arc<ScriptedDialogs>,
        screen: UsersScreen,
    }

    fn fixture() -> Fixture {
        let gateway = Arc::new(InMemoryGateway::new(InMemorySeed::demo()));
        let router = Arc::new(HeadlessRouter::new(Arc::new(NotificationBus::default())));
        let dialogs = Arc::new(ScriptedDialogs::new());
        let screen = UsersScreen::new(
            gateway.clone(),
            router.clone(),
            dialogs.clone(),
            Arc::new(UserValidator),
            NavigationRuntimeConfig::default(),
            Duration::from_millis(500),
        );
        Fixture {
            gateway,
            router,
            dialogs,
            screen,
        }
    }

    fn id(value: u64) -> RouteParams {
        RouteParams::new().with("id", value)
    }

    #[tokio::test]
    async fn first_activation_loads_list_and_user() {
        let mut fx = fixture();

        fx.screen.activate(&id(2)).await.expect("activate");

        assert_eq!(fx.screen.users().len(), 2);
        assert_eq!(fx.screen.active_id(), Some(UserId::new(2)));
        assert_eq!(
            fx.screen.controller().editable().map(|user| user.first_name),
            Some("Grace".to_owned())
        );
    }

    #[tokio::test]
    async fn later_activations_keep_the_cached_list() {
        let mut fx = fixture();
        fx.screen.activate(&id(1)).await.expect("first activation");
        let mut extra = fx.gateway.create_user();
        extra.first_name = "Linus".to_owned();
        fx.gateway.save_user(&extra).await.expect("seed extra user");

        fx.screen.activate(&id(2)).await.expect("second activation");

        assert_eq!(fx.screen.users().len(), 2);
        assert_eq!(fx.screen.active_id(), Some(UserId::new(2)));
    }

    #[tokio::test]
    async fn missing_id_redirects_to_last_selected_user() {
        let mut fx = fixture();
        assert_eq!(
            fx.screen.can_activate(&RouteParams::new()),
            ActivationOutcome::Allow
        );

        fx.screen.activate(&id(2)).await.expect("activate");

        assert_eq!(
            fx.screen.can_activate(&RouteParams::new()),
            ActivationOutcome::Redirect(RouteTarget::new("user", id(2)))
        );
        assert_eq!(fx.screen.can_activate(&id(1)), ActivationOutcome::Allow);
    }

    #[tokio::test]
    async fn load_variants_select_the_expected_record() {
        let mut fx = fixture();

        fx.screen
            .load(&RouteParams::new().with("id", "new"))
            .await
            .expect("load new");
        let draft = fx.screen.controller().editable().expect("draft user");
        assert!(draft.id.is_none());
        assert!(draft.is_active);
        assert_eq!(fx.screen.active_id(), None);

        fx.screen.load(&RouteParams::new()).await.expect("load nothing");
        assert!(fx.screen.controller().editable().is_none());

        let error = fx
            .screen
            .load(&RouteParams::new().with("id", "abc"))
            .await
            .expect_err("malformed id");
        assert!(matches!(
            error,
            AppError::Core(CoreError::InvalidRouteParam { .. })
        ));
    }

    #[tokio::test]
    async fn saving_a_new_user_prepends_summary_and_rewrites_address() {
        let mut fx = fixture();
        fx.screen
            .activate(&RouteParams::new().with("id", "new"))
            .await
            .expect("activate new");
        fx.screen.controller().edit(|user| {
            user.first_name = "Linus".to_owned();
            user.last_name = "Pauling".to_owned();
            user.email = "linus@helpdesk.test".to_owned();
        });

        let outcome = fx.screen.save().await.expect("save");

        assert!(matches!(outcome, SaveOutcome::Saved(ref user) if user.id == Some(UserId::new(3))));
        assert_eq!(fx.screen.users()[0].name, "Linus Pauling");
        assert_eq!(fx.screen.active_id(), Some(UserId::new(3)));
        let navigation = fx.router.last_navigation().expect("address rewrite");
        assert_eq!(navigation.target, RouteTarget::new("user", id(3)));
        assert!(navigation.options.replace);
        assert!(!navigation.options.trigger);
    }

    #[tokio::test]
    async fn saving_an_existing_user_replaces_its_summary_in_place() {
        let mut fx = fixture();
        fx.screen.activate(&id(2)).await.expect("activate");
        fx.screen
            .controller()
            .edit(|user| user.last_name = "Murray".to_owned());

        fx.screen.save().await.expect("save");

        assert_eq!(fx.screen.users().len(), 2);
        let grace = fx
            .screen
            .users()
            .iter()
            .find(|summary| summary.id == UserId::new(2))
            .expect("grace summary");
        assert_eq!(grace.name, "Grace Murray");
        assert!(fx.router.history().is_empty());
    }

    #[tokio::test]
    async fn invalid_user_is_never_sent_to_the_gateway() {
        let mut fx = fixture();
        fx.screen.activate(&id(1)).await.expect("activate");
        fx.screen.controller().edit(|user| user.email = "not-an-email".to_owned());

        let outcome = fx.screen.save().await.expect("save");

        assert!(matches!(outcome, SaveOutcome::Invalid(ref result) if result.errors_for("email").count() == 1));
        assert_eq!(fx.gateway.save_user_calls(), 0);
    }

    #[tokio::test]
    async fn leaving_with_changes_asks_for_confirmation() {
        let mut fx = fixture();
        fx.screen.activate(&id(1)).await.expect("activate");
        assert!(fx.screen.can_deactivate().await);
        assert!(fx.dialogs.requests().is_empty());

        fx.screen.toggle_active_status();
        fx.dialogs.push_cancel();

        assert!(!fx.screen.can_deactivate().await);
        assert_eq!(
            fx.dialogs.requests(),
            vec![DialogRequest::Message {
                text: USER_CHANGED_MESSAGE.to_owned(),
                title: USER_CHANGED_TITLE.to_owned(),
            }]
        );
    }

    #[tokio::test]
    async fn deactivate_discards_edits_and_stops_polling() {
        let mut fx = fixture();
        fx.screen.activate(&id(1)).await.expect("activate");
        fx.screen.toggle_active_status();
        assert_eq!(
            fx.screen.controller().editable().map(|user| user.is_active),
            Some(false)
        );

        fx.screen.deactivate();

        assert_eq!(
            fx.screen.controller().editable().map(|user| user.is_active),
            Some(true)
        );
        assert!(!fx.screen.controller().is_tracking());
        assert!(!fx.screen.controller().is_dirty());
    }

    #[tokio::test]
    async fn backend_outage_surfaces_from_activation() {
        let mut fx = fixture();
        fx.gateway.set_available(false);

        let error = fx.screen.activate(&id(1)).await.expect_err("offline");

        assert!(error.is_backend_unavailable());
        assert!(fx.screen.users().is_empty());
    }
}
