use std::sync::RwLock;

use helpdesk_domain::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoot {
    #[default]
    Login,
    Shell,
}

/// Identity of the logged-in agent plus which root screen is mounted.
/// Shared by `Arc` between the shell and every screen of the session.
#[derive(Debug, Default)]
pub struct SessionContext {
    user: RwLock<Option<User>>,
    root: RwLock<AppRoot>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, user: User) {
        *self.user.write().expect("session user lock poisoned") = Some(user);
    }

    pub fn unregister(&self) -> Option<User> {
        self.user.write().expect("session user lock poisoned").take()
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.read().expect("session user lock poisoned").clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user
            .read()
            .expect("session user lock poisoned")
            .is_some()
    }

    pub fn set_root(&self, root: AppRoot) {
        *self.root.write().expect("session root lock poisoned") = root;
    }

    pub fn root(&self) -> AppRoot {
        *self.root.read().expect("session root lock poisoned")
    }
}
