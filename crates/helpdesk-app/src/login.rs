use std::sync::Arc;

use helpdesk_gateway::BackendGateway;

use crate::error::AppResult;
use crate::session::{AppRoot, SessionContext};

pub const LOGIN_FAILED_MESSAGE: &str = "Incorrect Username or Password!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Succeeded,
    Rejected,
}

pub struct LoginScreen {
    gateway: Arc<dyn BackendGateway>,
    session: Arc<SessionContext>,
    pub username: String,
    pub password: String,
    pub message: String,
}

impl LoginScreen {
    pub fn new(gateway: Arc<dyn BackendGateway>, session: Arc<SessionContext>) -> Self {
        Self {
            gateway,
            session,
            username: String::new(),
            password: String::new(),
            message: String::new(),
        }
    }

    /// Rejected credentials are a normal outcome with a user-facing message;
    /// only backend failures are errors.
    pub async fn login(&mut self) -> AppResult<LoginOutcome> {
        let Some(user) = self.gateway.login(&self.username, &self.password).await? else {
            tracing::info!(username = %self.username, "login rejected");
            self.message = LOGIN_FAILED_MESSAGE.to_owned();
            return Ok(LoginOutcome::Rejected);
        };

        tracing::info!(username = %self.username, user_id = ?user.id, "login succeeded");
        self.message.clear();
        self.session.register(user);
        self.session.set_root(AppRoot::Shell);
        Ok(LoginOutcome::Succeeded)
    }
}
