use std::sync::Arc;

use helpdesk_domain::{Activity, RouteParams};
use helpdesk_gateway::BackendGateway;

use crate::collaborators::RouteTarget;
use crate::error::AppResult;

/// Landing screen listing recent backend activity.
pub struct HomeScreen {
    gateway: Arc<dyn BackendGateway>,
    activity: Option<Vec<Activity>>,
}

impl HomeScreen {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        Self {
            gateway,
            activity: None,
        }
    }

    pub async fn activate(&mut self) -> AppResult<()> {
        let activity = self.gateway.get_recent_activity().await?;
        tracing::debug!(entries = activity.len(), "recent activity loaded");
        self.activity = Some(activity);
        Ok(())
    }

    /// `None` until the first successful activation.
    pub fn activity(&self) -> Option<&[Activity]> {
        self.activity.as_deref()
    }

    /// Route each activity entry links to. Fails on the first entry whose
    /// type has no screen.
    pub fn activity_targets(&self) -> AppResult<Vec<RouteTarget>> {
        self.activity
            .iter()
            .flatten()
            .map(|entry| -> AppResult<RouteTarget> {
                Ok(RouteTarget::new(
                    entry.route_name()?,
                    RouteParams::new().with("id", entry.id),
                ))
            })
            .collect()
    }
}
