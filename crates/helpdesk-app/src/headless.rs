//! In-process stand-ins for the host router and dialog service.
//!
//! The binary drives a whole session with these, and the tests use them to
//! script user answers and inspect navigation history.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use helpdesk_domain::{NavigationCompletedEvent, Notification, RouteParams};
use helpdesk_eventbus::NotificationBus;

use crate::collaborators::{DialogOutcome, Dialogs, NavigationOptions, RouteTarget, Router};
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedNavigation {
    pub target: RouteTarget,
    pub options: NavigationOptions,
}

#[derive(Debug, Default)]
struct HeadlessRouterState {
    current: Option<RouteTarget>,
    history: Vec<RecordedNavigation>,
    active: bool,
    reset_count: u32,
}

/// Router that keeps its location in memory. Triggered navigations publish
/// a completed [`NavigationCompletedEvent`] on the bus; address-only
/// navigations just move the location.
#[derive(Debug)]
pub struct HeadlessRouter {
    bus: Arc<NotificationBus>,
    state: Mutex<HeadlessRouterState>,
}

impl HeadlessRouter {
    pub fn new(bus: Arc<NotificationBus>) -> Self {
        Self {
            bus,
            state: Mutex::new(HeadlessRouterState {
                active: true,
                ..HeadlessRouterState::default()
            }),
        }
    }

    pub fn current(&self) -> Option<RouteTarget> {
        self.lock().current.clone()
    }

    pub fn history(&self) -> Vec<RecordedNavigation> {
        self.lock().history.clone()
    }

    pub fn last_navigation(&self) -> Option<RecordedNavigation> {
        self.lock().history.last().cloned()
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    pub fn reset_count(&self) -> u32 {
        self.lock().reset_count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HeadlessRouterState> {
        self.state.lock().expect("headless router state lock poisoned")
    }
}

#[async_trait::async_trait]
impl Router for HeadlessRouter {
    async fn navigate_to_route(
        &self,
        name: &str,
        params: &RouteParams,
        options: NavigationOptions,
    ) -> AppResult<()> {
        let target = RouteTarget::new(name, params.clone());
        {
            let mut state = self.lock();
            if !state.active {
                tracing::debug!(route = name, "reactivating headless router");
                state.active = true;
            }
            state.current = Some(target.clone());
            state.history.push(RecordedNavigation {
                target: target.clone(),
                options,
            });
        }

        if options.trigger {
            self.bus.publish(Notification::NavigationCompleted(
                NavigationCompletedEvent::completed(target.route, target.params),
            ));
        }
        Ok(())
    }

    async fn reset(&self) {
        let mut state = self.lock();
        state.history.clear();
        state.reset_count += 1;
    }

    async fn deactivate(&self) {
        let mut state = self.lock();
        state.active = false;
        state.current = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogRequest {
    Message { text: String, title: String },
    Prompt { text: String },
}

/// Answers dialogs from a FIFO script; an exhausted script cancels.
#[derive(Debug, Default)]
pub struct ScriptedDialogs {
    answers: Mutex<VecDeque<DialogOutcome>>,
    requests: Mutex<Vec<DialogRequest>>,
}

impl ScriptedDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, outcome: DialogOutcome) -> &Self {
        self.answers
            .lock()
            .expect("scripted dialog answers lock poisoned")
            .push_back(outcome);
        self
    }

    pub fn push_confirm(&self) -> &Self {
        self.push(DialogOutcome::confirmed())
    }

    pub fn push_cancel(&self) -> &Self {
        self.push(DialogOutcome::cancelled())
    }

    pub fn push_output(&self, output: impl Into<String>) -> &Self {
        self.push(DialogOutcome::with_output(output))
    }

    pub fn requests(&self) -> Vec<DialogRequest> {
        self.requests
            .lock()
            .expect("scripted dialog requests lock poisoned")
            .clone()
    }

    fn answer(&self, request: DialogRequest) -> DialogOutcome {
        self.requests
            .lock()
            .expect("scripted dialog requests lock poisoned")
            .push(request);
        self.answers
            .lock()
            .expect("scripted dialog answers lock poisoned")
            .pop_front()
            .unwrap_or_else(DialogOutcome::cancelled)
    }
}

#[async_trait::async_trait]
impl Dialogs for ScriptedDialogs {
    async fn show_message(&self, text: &str, title: &str, _options: &[&str]) -> DialogOutcome {
        self.answer(DialogRequest::Message {
            text: text.to_owned(),
            title: title.to_owned(),
        })
    }

    async fn prompt(&self, text: &str) -> DialogOutcome {
        self.answer(DialogRequest::Prompt {
            text: text.to_owned(),
        })
    }
}
