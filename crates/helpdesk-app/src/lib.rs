//! Headless help-desk front end: the tab shell, ticket threads, user
//! administration and the session wiring around them. Rendering, dialogs and
//! routing belong to the host and are reached through [`Router`] and
//! [`Dialogs`].

pub mod collaborators;
pub mod composition;
pub mod edit;
pub mod error;
pub mod headless;
pub mod home;
pub mod login;
pub mod routes;
pub mod session;
pub mod shell;
pub mod tabs;
pub mod thread;
pub mod users;
pub mod validation;

pub use collaborators::{
    ActivationOutcome, DialogOutcome, Dialogs, FieldError, NavigationOptions, RouteTarget, Router,
    ValidationResult, Validator,
};
pub use composition::{HelpDeskApp, NavigationResult};
pub use edit::{EditController, RecordStore, SaveOutcome};
pub use error::{AppError, AppResult};
pub use headless::{DialogRequest, HeadlessRouter, RecordedNavigation, ScriptedDialogs};
pub use home::HomeScreen;
pub use login::{LoginOutcome, LoginScreen, LOGIN_FAILED_MESSAGE};
pub use routes::{group_by_category, settings_routes, shell_routes, RouteConfig, USERS_ROUTE};
pub use session::{AppRoot, SessionContext};
pub use shell::{LogoutOutcome, Shell, LOGOUT_PROMPT, LOGOUT_TITLE};
pub use tabs::{TabClosed, TabRegistry};
pub use thread::{ThreadPhase, ThreadScreen};
pub use users::{GatewayUserStore, UsersScreen};
pub use validation::UserValidator;
