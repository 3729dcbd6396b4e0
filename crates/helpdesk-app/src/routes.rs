use helpdesk_config::NavigationRuntimeConfig;

/// Users list without a selection; a selected user uses the configured
/// user route.
pub const USERS_ROUTE: &str = "users";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    pub name: String,
    pub pattern: String,
    pub title: String,
    /// Shown in the navigation menu.
    pub nav: bool,
    pub category: Option<String>,
}

impl RouteConfig {
    fn new(name: &str, pattern: &str, title: &str) -> Self {
        Self {
            name: name.to_owned(),
            pattern: pattern.to_owned(),
            title: title.to_owned(),
            nav: false,
            category: None,
        }
    }

    fn in_nav(mut self) -> Self {
        self.nav = true;
        self
    }

    fn in_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_owned());
        self
    }
}

pub fn shell_routes(navigation: &NavigationRuntimeConfig) -> Vec<RouteConfig> {
    vec![
        RouteConfig::new(&navigation.home_route, "", "Home").in_nav(),
        RouteConfig::new(&navigation.thread_route, "tickets/:id", "Ticket"),
        RouteConfig::new(USERS_ROUTE, "users", "Users").in_nav(),
        RouteConfig::new(&navigation.user_route, "users/:id", "User"),
        RouteConfig::new("settings", "settings", "Settings").in_nav(),
    ]
}

pub fn settings_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new("profile", "profile", "Profile")
            .in_nav()
            .in_category("Account"),
        RouteConfig::new("password", "password", "Change Password")
            .in_nav()
            .in_category("Account"),
        RouteConfig::new("notifications", "notifications", "Notifications")
            .in_nav()
            .in_category("Application"),
        RouteConfig::new("templates", "templates", "Reply Templates")
            .in_nav()
            .in_category("Application"),
    ]
}

/// Groups routes by category, keeping categories in first-seen order.
/// Uncategorized routes are collected under `""`.
pub fn group_by_category(routes: &[RouteConfig]) -> Vec<(&str, Vec<&RouteConfig>)> {
    let mut groups: Vec<(&str, Vec<&RouteConfig>)> = Vec::new();
    for route in routes {
        let category = route.category.as_deref().unwrap_or_default();
        match groups.iter_mut().find(|(name, _)| *name == category) {
            Some((_, members)) => members.push(route),
            None => groups.push((category, vec![route])),
        }
    }
    groups
}
