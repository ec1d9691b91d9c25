//! Background work behind the page: the health poller and monitoring
//! requests. Results come back through the [`EventQueue`](crate::event_queue::EventQueue).

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::DashboardApi;
use crate::dashboard::Effect;
use crate::error::{Error, Result};
use crate::event_queue::{EventSender, UiEvent};
use crate::health::HealthPoller;
use crate::monitoring::{fetch_state, run_action};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Process-wide runtime for hosts that don't bring their own.
pub fn runtime() -> Result<&'static Runtime> {
    if let Some(rt) = RUNTIME.get() {
        return Ok(rt);
    }
    let rt = Runtime::new()?;
    let _ = RUNTIME.set(rt);
    RUNTIME
        .get()
        .ok_or_else(|| Error::Io(std::io::Error::other("tokio runtime unavailable")))
}

pub struct Services<A: DashboardApi> {
    api: Arc<A>,
    events: EventSender,
    rt: Handle,
    health_interval: Duration,
    poller: Option<HealthPoller>,
}

impl<A: DashboardApi> Services<A> {
    pub fn new(api: Arc<A>, events: EventSender, rt: Handle, health_interval: Duration) -> Self {
        Self {
            api,
            events,
            rt,
            health_interval,
            poller: None,
        }
    }

    /// Starts polling unless a poller is already running.
    pub fn start_health_poller(&mut self) {
        if self.poller.as_ref().is_some_and(|p| !p.is_finished()) {
            return;
        }
        info!(interval = ?self.health_interval, "starting health poller");
        self.poller = Some(HealthPoller::spawn(
            &self.rt,
            Arc::clone(&self.api),
            self.health_interval,
            self.events.clone(),
        ));
    }

    pub fn health_poller_running(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_finished())
    }

    /// Runs the effects that need the network; the rest belong to the host.
    pub fn execute(&self, effect: &Effect) -> Option<JoinHandle<()>> {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        match *effect {
            Effect::Dispatch(action) => Some(self.rt.spawn(async move {
                for event in run_action(api.as_ref(), action).await {
                    events.send(event);
                }
            })),
            Effect::RefreshStatus => Some(self.rt.spawn(async move {
                let state = fetch_state(api.as_ref()).await;
                events.send(UiEvent::Monitoring(state));
            })),
            Effect::Navigate(_) | Effect::Reload => {
                debug!(?effect, "left to host");
                None
            }
        }
    }

    /// Spawns every network effect in `effects`; the returned task finishes
    /// once all of them have reported back.
    pub fn execute_all(&self, effects: &[Effect]) -> JoinHandle<()> {
        let tasks: Vec<_> = effects.iter().filter_map(|e| self.execute(e)).collect();
        self.rt.spawn(async move {
            for result in futures::future::join_all(tasks).await {
                if let Err(e) = result {
                    warn!(error = %e, "effect task failed");
                }
            }
        })
    }

    pub fn shutdown(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.shutdown();
        }
    }
}
