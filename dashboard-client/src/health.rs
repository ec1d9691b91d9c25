//! The `#status-indicator` badge and the poller that keeps it current.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::DashboardApi;
use crate::dom::{Document, NodeId};
use crate::event_queue::{EventSender, UiEvent};

pub const INDICATOR_ID: &str = "status-indicator";
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Active,
    Degraded,
    Offline,
}

impl HealthStatus {
    /// `None` means the request never got a response.
    pub fn from_probe(status: Option<http::StatusCode>) -> Self {
        match status {
            Some(code) if code.is_success() => HealthStatus::Active,
            Some(_) => HealthStatus::Degraded,
            None => HealthStatus::Offline,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Active => "Active",
            HealthStatus::Degraded => "Degraded",
            HealthStatus::Offline => "Offline",
        }
    }

    pub fn badge_kind(self) -> &'static str {
        match self {
            HealthStatus::Active => "success",
            HealthStatus::Degraded => "warning",
            HealthStatus::Offline => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub checked_at: DateTime<Utc>,
    pub last_ok: Option<DateTime<Utc>>,
}

pub fn apply_badge(doc: &mut Document, indicator: NodeId, status: HealthStatus) {
    doc.set_text(indicator, status.label());
    doc.set_class_name(indicator, &format!("badge bg-{}", status.badge_kind()));
}

/// One probe of `GET /health`.
pub async fn check_health<A: DashboardApi>(api: &A) -> HealthStatus {
    match api.health().await {
        Ok(code) => HealthStatus::from_probe(Some(code)),
        Err(e) => {
            debug!(error = %e, "health probe failed");
            HealthStatus::from_probe(None)
        }
    }
}

pub struct HealthPoller {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

impl HealthPoller {
    /// Probes immediately, then once per `interval` until shut down.
    pub fn spawn<A: DashboardApi>(
        rt: &Handle,
        api: Arc<A>,
        interval: Duration,
        events: EventSender,
    ) -> Self {
        let cancel = CancellationToken::new();
        let child = cancel.clone();

        let handle = rt.spawn(async move {
            let mut tick = time::interval(interval);
            tick.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
            let mut last_ok = None;

            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = tick.tick() => {
                        let status = check_health(api.as_ref()).await;
                        let checked_at = Utc::now();
                        if status == HealthStatus::Active {
                            last_ok = Some(checked_at);
                        }
                        let snapshot = HealthSnapshot { status, checked_at, last_ok };
                        if !events.send(UiEvent::Health(snapshot)) {
                            warn!("event queue closed, stopping health poller");
                            break;
                        }
                    }
                }
            }
        });

        Self { handle, cancel }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for HealthPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::El;
    use crate::error::{Error, Result};
    use crate::api::{ActionResponse, MonitoringAction, StatusResponse};
    use crate::event_queue::EventQueue;
    use http::StatusCode;

    struct FixedHealth(Option<StatusCode>);

    impl DashboardApi for FixedHealth {
        async fn health(&self) -> Result<StatusCode> {
            self.0
                .ok_or_else(|| Error::Io(std::io::Error::other("connection refused")))
        }

        async fn monitoring_status(&self) -> Result<StatusResponse> {
            Ok(StatusResponse::default())
        }

        async fn monitoring_command(&self, _action: MonitoringAction) -> Result<ActionResponse> {
            Ok(ActionResponse::default())
        }
    }

    #[test]
    fn test_from_probe() {
        assert_eq!(HealthStatus::from_probe(Some(StatusCode::OK)), HealthStatus::Active);
        assert_eq!(
            HealthStatus::from_probe(Some(StatusCode::SERVICE_UNAVAILABLE)),
            HealthStatus::Degraded
        );
        assert_eq!(HealthStatus::from_probe(None), HealthStatus::Offline);
    }

    #[test]
    fn test_apply_badge_replaces_classes() {
        let mut doc = Document::new();
        let body = doc.body();
        let badge = doc.append(
            body,
            El::new("span").id(INDICATOR_ID).class("badge bg-secondary ms-2").text("..."),
        );
        apply_badge(&mut doc, badge, HealthStatus::Degraded);
        assert_eq!(doc.text_content(badge), "Degraded");
        assert_eq!(doc.element(badge).class_name(), "badge bg-warning");
    }

    #[tokio::test]
    async fn test_check_health() {
        assert_eq!(
            check_health(&FixedHealth(Some(StatusCode::OK))).await,
            HealthStatus::Active
        );
        assert_eq!(check_health(&FixedHealth(None)).await, HealthStatus::Offline);
    }

    #[tokio::test]
    async fn test_poller_probes_immediately_and_stops() {
        let queue = EventQueue::new();
        let poller = HealthPoller::spawn(
            &Handle::current(),
            Arc::new(FixedHealth(Some(StatusCode::OK))),
            Duration::from_secs(3600),
            queue.sender(),
        );

        let mut events = Vec::new();
        for _ in 0..50 {
            events = queue.drain();
            if !events.is_empty() {
                break;
            }
            time::sleep(Duration::from_millis(10)).await;
        }
        match events.as_slice() {
            [UiEvent::Health(snap)] => {
                assert_eq!(snap.status, HealthStatus::Active);
                assert_eq!(snap.last_ok, Some(snap.checked_at));
            }
            other => panic!("unexpected events: {other:?}"),
        }

        poller.shutdown();
        for _ in 0..50 {
            if poller.is_finished() {
                break;
            }
            time::sleep(Duration::from_millis(10)).await;
        }
        assert!(poller.is_finished());
    }
}
