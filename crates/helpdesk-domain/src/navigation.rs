use serde::{Deserialize, Serialize};

use crate::params::RouteParams;

/// Published by a screen once a record has an address worth keeping a tab for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabOpenedEvent {
    pub title: String,
    pub route: String,
    pub params: RouteParams,
}

impl TabOpenedEvent {
    pub fn new(title: impl Into<String>, route: impl Into<String>, params: RouteParams) -> Self {
        Self {
            title: title.into(),
            route: route.into(),
            params,
        }
    }
}

/// Published by the router once per navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationCompletedEvent {
    pub completed: bool,
    pub route_name: String,
    pub params: RouteParams,
}

impl NavigationCompletedEvent {
    pub fn completed(route_name: impl Into<String>, params: RouteParams) -> Self {
        Self {
            completed: true,
            route_name: route_name.into(),
            params,
        }
    }

    pub fn cancelled(route_name: impl Into<String>, params: RouteParams) -> Self {
        Self {
            completed: false,
            route_name: route_name.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Notification {
    TabOpened(TabOpenedEvent),
    NavigationCompleted(NavigationCompletedEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub title: String,
    pub route: String,
    pub params: RouteParams,
    pub is_active: bool,
}

impl Tab {
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Same route, and every parameter of `other` has a string-equal value
    /// here. Parameters only present on `self` are not compared.
    pub fn matches(&self, route: &str, params: &RouteParams) -> bool {
        self.route == route && self.params.covers(params)
    }

    pub fn matches_event(&self, event: &TabOpenedEvent) -> bool {
        self.matches(&event.route, &event.params)
    }

    /// Active iff the navigation landed on this tab's route and carries every
    /// parameter of this tab with a string-equal value. A parameter missing
    /// from the navigation is a non-match.
    pub fn update_activation(&mut self, navigation: &NavigationCompletedEvent) {
        self.is_active =
            self.route == navigation.route_name && navigation.params.covers(&self.params);
    }
}

impl From<TabOpenedEvent> for Tab {
    fn from(event: TabOpenedEvent) -> Self {
        Self {
            title: event.title,
            route: event.route,
            params: event.params,
            is_active: true,
        }
    }
}
