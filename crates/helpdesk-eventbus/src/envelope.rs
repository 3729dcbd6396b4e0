use helpdesk_domain::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    TabOpened,
    NavigationCompleted,
}

impl NotificationKind {
    pub fn of(notification: &Notification) -> Self {
        match notification {
            Notification::TabOpened(_) => Self::TabOpened,
            Notification::NavigationCompleted(_) => Self::NavigationCompleted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEnvelope {
    pub sequence: u64,
    pub notification: Notification,
}

impl NotificationEnvelope {
    pub fn kind(&self) -> NotificationKind {
        NotificationKind::of(&self.notification)
    }
}
