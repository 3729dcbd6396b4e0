use helpdesk_domain::{NavigationCompletedEvent, Tab, TabOpenedEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabClosed {
    pub was_active: bool,
    pub remaining: Vec<Tab>,
}

/// Ordered set of open ticket tabs. Insertion order decides which tab takes
/// over when the active one is closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabRegistry {
    tabs: Vec<Tab>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active(&self) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.is_active)
    }

    pub fn find(&self, event: &TabOpenedEvent) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.matches_event(event))
    }

    /// Appends a tab for `event` unless one already matches. Returns whether
    /// a tab was added; an existing match is left untouched.
    pub fn open(&mut self, event: TabOpenedEvent) -> bool {
        if self.find(&event).is_some() {
            tracing::trace!(route = %event.route, "tab already open");
            return false;
        }

        tracing::debug!(route = %event.route, title = %event.title, "opening tab");
        self.tabs.push(Tab::from(event));
        true
    }

    pub fn reconcile(&mut self, navigation: &NavigationCompletedEvent) {
        if !navigation.completed {
            return;
        }

        for tab in &mut self.tabs {
            tab.update_activation(navigation);
        }
    }

    /// The open tab with the same route and parameters as `tab`.
    pub fn get(&self, tab: &Tab) -> Option<&Tab> {
        self.position(tab).map(|index| &self.tabs[index])
    }

    /// Removes the tab with the same route and parameters as `tab`.
    /// `None` when no such tab is open.
    pub fn close(&mut self, tab: &Tab) -> Option<TabClosed> {
        let index = self.position(tab)?;
        let removed = self.tabs.remove(index);

        Some(TabClosed {
            was_active: removed.is_active,
            remaining: self.tabs.clone(),
        })
    }

    pub fn clear(&mut self) {
        self.tabs.clear();
    }

    fn position(&self, tab: &Tab) -> Option<usize> {
        self.tabs
            .iter()
            .position(|open| open.route == tab.route && open.params == tab.params)
    }
}

#[cfg(test)]
mod tests {
    use helpdesk_domain::{NavigationCompletedEvent, RouteParams, TabOpenedEvent};

    use super::TabRegistry;

    fn opened(id: i64) -> TabOpenedEvent {
        TabOpenedEvent::new(
            format!("Ticket {id}"),
            "thread",
            RouteParams::new().with("id", id),
        )
    }

    fn landed_on(id: i64) -> NavigationCompletedEvent {
        NavigationCompletedEvent::completed("thread", RouteParams::new().with("id", id.to_string()))
    }

    #[test]
    fn opening_the_same_resource_twice_keeps_one_tab() {
        let mut registry = TabRegistry::new();

        assert!(registry.open(opened(1)));
        assert!(!registry.open(opened(1)));
        assert!(!registry.open(TabOpenedEvent::new(
            "Renamed",
            "thread",
            RouteParams::new().with("id", "1"),
        )));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.tabs()[0].title, "Ticket 1");
    }

    #[test]
    fn reopening_does_not_touch_activation() {
        let mut registry = TabRegistry::new();
        registry.open(opened(1));
        registry.reconcile(&NavigationCompletedEvent::completed("home", RouteParams::new()));

        registry.open(opened(1));

        assert!(!registry.tabs()[0].is_active);
    }

    #[test]
    fn reconcile_activates_only_the_matching_tab() {
        let mut registry = TabRegistry::new();
        registry.open(opened(1));
        registry.open(opened(2));

        registry.reconcile(&landed_on(2));

        let active: Vec<bool> = registry.tabs().iter().map(|tab| tab.is_active).collect();
        assert_eq!(active, vec![false, true]);
        assert_eq!(registry.active().map(|tab| tab.title.as_str()), Some("Ticket 2"));
    }

    #[test]
    fn incomplete_navigation_never_changes_activation() {
        let mut registry = TabRegistry::new();
        registry.open(opened(1));
        registry.open(opened(2));
        let before = registry.clone();

        registry.reconcile(&NavigationCompletedEvent::cancelled("home", RouteParams::new()));

        assert_eq!(registry, before);
    }

    #[test]
    fn close_reports_active_state_and_remaining_tabs() {
        let mut registry = TabRegistry::new();
        registry.open(opened(1));
        registry.open(opened(2));
        registry.reconcile(&landed_on(2));
        let second = registry.tabs()[1].clone();

        let closed = registry.close(&second).expect("tab was open");

        assert!(closed.was_active);
        assert_eq!(closed.remaining.len(), 1);
        assert_eq!(closed.remaining[0].title, "Ticket 1");
    }

    #[test]
    fn closing_an_absent_tab_is_a_no_op() {
        let mut registry = TabRegistry::new();
        registry.open(opened(1));
        let first = registry.tabs()[0].clone();

        assert!(registry.close(&first).is_some());
        assert!(registry.close(&first).is_none());
        assert!(registry.is_empty());
    }
}
