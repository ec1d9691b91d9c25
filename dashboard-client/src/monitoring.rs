//! Start/stop/restart controls for the background monitor.
//!
//! Markup: a `#monitoring-status` badge and buttons carrying
//! `data-monitoring-action="start|stop|restart"`.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{DashboardApi, MonitoringAction, StatusResponse};
use crate::dom::{Document, NodeId};
use crate::event_queue::UiEvent;
use crate::loading;
use crate::notifications::{Level, Notice};

pub const BADGE_ID: &str = "monitoring-status";
pub const ACTION_ATTR: &str = "data-monitoring-action";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MonitoringState {
    Running,
    Stopped,
    Unknown,
}

impl From<&StatusResponse> for MonitoringState {
    fn from(resp: &StatusResponse) -> Self {
        match resp.active {
            Some(true) => MonitoringState::Running,
            Some(false) => MonitoringState::Stopped,
            None => MonitoringState::Unknown,
        }
    }
}

impl MonitoringState {
    pub fn label(self) -> &'static str {
        match self {
            MonitoringState::Running => "Running",
            MonitoringState::Stopped => "Stopped",
            MonitoringState::Unknown => "Unknown",
        }
    }

    pub fn badge_kind(self) -> &'static str {
        match self {
            MonitoringState::Running => "success",
            MonitoringState::Stopped => "secondary",
            MonitoringState::Unknown => "warning",
        }
    }

    /// Whether `action`'s button is enabled in this state.
    pub fn allows(self, action: MonitoringAction) -> bool {
        match self {
            MonitoringState::Running => action != MonitoringAction::Start,
            MonitoringState::Stopped => action == MonitoringAction::Start,
            MonitoringState::Unknown => false,
        }
    }
}

/// `GET /api/monitoring/status`; any failure reads as `Unknown`.
pub async fn fetch_state<A: DashboardApi>(api: &A) -> MonitoringState {
    match api.monitoring_status().await {
        Ok(resp) => MonitoringState::from(&resp),
        Err(e) => {
            warn!(error = %e, "monitoring status unavailable");
            MonitoringState::Unknown
        }
    }
}

/// Sends `action`, then re-reads the status whatever the outcome.
#[tracing::instrument(skip(api))]
pub async fn run_action<A: DashboardApi>(api: &A, action: MonitoringAction) -> Vec<UiEvent> {
    let notice = match api.monitoring_command(action).await {
        Ok(resp) => {
            info!(success = resp.success, message = %resp.message, "monitoring command answered");
            let level = if resp.success {
                Level::Success
            } else {
                Level::Danger
            };
            Notice::new(resp.message, level)
        }
        Err(e) => {
            warn!(error = %e, "monitoring command failed");
            Notice::new(format!("Failed to {action} monitoring."), Level::Danger)
        }
    };
    vec![
        UiEvent::Notify(notice),
        UiEvent::Monitoring(fetch_state(api).await),
    ]
}

#[derive(Debug, Clone)]
pub struct MonitoringPanel {
    badge: Option<NodeId>,
    buttons: Vec<(NodeId, MonitoringAction)>,
}

impl MonitoringPanel {
    /// `None` when the page has neither the badge nor any action button.
    pub fn mount(doc: &Document) -> Option<Self> {
        let root = doc.root();
        let badge = doc.get_element_by_id(BADGE_ID);
        let buttons: Vec<_> = doc
            .query_all(root, |el| el.has_attr(ACTION_ATTR))
            .into_iter()
            .filter_map(|node| {
                let raw = doc.attr(node, ACTION_ATTR).unwrap_or_default();
                match raw.parse::<MonitoringAction>() {
                    Ok(action) => Some((node, action)),
                    Err(e) => {
                        debug!(error = %e, "ignoring monitoring button");
                        None
                    }
                }
            })
            .collect();

        if badge.is_none() && buttons.is_empty() {
            return None;
        }
        Some(Self { badge, buttons })
    }

    pub fn badge(&self) -> Option<NodeId> {
        self.badge
    }

    pub fn buttons(&self) -> &[(NodeId, MonitoringAction)] {
        &self.buttons
    }

    /// Marks `action`'s button busy and locks every button until the next
    /// status arrives.
    pub fn begin(&self, doc: &mut Document, action: MonitoringAction) {
        for &(node, a) in &self.buttons {
            if a == action {
                loading::show(doc, node);
            }
            doc.set_disabled(node, true);
        }
    }

    pub fn apply(&self, doc: &mut Document, state: MonitoringState) {
        if let Some(badge) = self.badge {
            doc.set_text(badge, state.label());
            doc.set_class_name(badge, &format!("badge bg-{}", state.badge_kind()));
        }
        for &(node, action) in &self.buttons {
            loading::hide(doc, node);
            doc.set_disabled(node, !state.allows(action));
        }
    }
}
