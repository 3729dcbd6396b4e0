//! Seams to the host: dialogs, the router and record validation.

use helpdesk_domain::RouteParams;

use crate::error::AppResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogOutcome {
    pub was_cancelled: bool,
    pub output: Option<String>,
}

impl DialogOutcome {
    pub fn confirmed() -> Self {
        Self::default()
    }

    pub fn cancelled() -> Self {
        Self {
            was_cancelled: true,
            output: None,
        }
    }

    pub fn with_output(output: impl Into<String>) -> Self {
        Self {
            was_cancelled: false,
            output: Some(output.into()),
        }
    }
}

#[async_trait::async_trait]
pub trait Dialogs: Send + Sync {
    async fn show_message(&self, text: &str, title: &str, options: &[&str]) -> DialogOutcome;

    async fn prompt(&self, text: &str) -> DialogOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationOptions {
    /// Replace the current history entry instead of pushing one.
    pub replace: bool,
    /// Run guards and publish navigation-completed; `false` only rewrites the address.
    pub trigger: bool,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            replace: false,
            trigger: true,
        }
    }
}

impl NavigationOptions {
    pub const fn address_only() -> Self {
        Self {
            replace: true,
            trigger: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    pub route: String,
    pub params: RouteParams,
}

impl RouteTarget {
    pub fn new(route: impl Into<String>, params: RouteParams) -> Self {
        Self {
            route: route.into(),
            params,
        }
    }
}

#[async_trait::async_trait]
pub trait Router: Send + Sync {
    async fn navigate_to_route(
        &self,
        name: &str,
        params: &RouteParams,
        options: NavigationOptions,
    ) -> AppResult<()>;

    async fn reset(&self);

    async fn deactivate(&self);
}

/// Result of an entry guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    Allow,
    Deny,
    Redirect(RouteTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub display_name: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors_for(&self, field: &str) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(move |error| error.field == field)
    }
}

pub trait Validator<R>: Send + Sync {
    fn validate(&self, record: &R) -> ValidationResult;
}
