// lib.rs
use std::backtrace::Backtrace;
use std::panic;
use std::sync::{Arc, Once};
use std::time::Instant;

use tokio::runtime::Handle;
use tracing::{error, info};

cfg_if::cfg_if! {
    if #[cfg(feature = "telemetry")] {
        use dashboard_telemetry as logging;
    } else {
        mod log;
        use log as logging;
    }
}

pub mod api;
pub mod config;
pub mod dashboard;
pub mod dom;
pub mod enhance;
pub mod error;
pub mod event_queue;
pub mod filter;
pub mod health;
pub mod loading;
pub mod monitoring;
pub mod navigation;
pub mod notifications;
pub mod panels;
pub mod services;
pub mod settings;
pub mod sidebar;
pub mod sort;
pub mod theme;
pub mod utils;

pub use api::{DashboardApi, HttpApi, MonitoringAction};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DomEvent, Effect, PageContext};
pub use dom::{Document, El, NodeId};
pub use error::{Error, Result};
pub use event_queue::{EventQueue, UiEvent};
pub use services::Services;

pub const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";

static PANIC_HOOK: Once = Once::new();

/// A mounted page and the background services feeding it.
pub struct Session<A: DashboardApi> {
    pub dashboard: Dashboard,
    pub services: Services<A>,
    pub events: EventQueue,
}

/// Mounts `doc` against the server in `config`, on the process-wide runtime.
pub fn start(
    doc: Document,
    config: DashboardConfig,
    ctx: &PageContext,
) -> Result<Session<HttpApi>> {
    let api = HttpApi::new(&config.base_url, config.request_timeout())?;
    let rt = services::runtime()?.handle().clone();
    start_with(doc, config, ctx, api, rt)
}

/// [`start`] with the API and runtime supplied by the caller.
pub fn start_with<A: DashboardApi>(
    doc: Document,
    config: DashboardConfig,
    ctx: &PageContext,
    api: A,
    rt: Handle,
) -> Result<Session<A>> {
    let store = config.open_store()?;
    let health_interval = config.health_interval();
    let mut dashboard = Dashboard::mount(doc, store, config, ctx, Instant::now())?;

    let events = EventQueue::new();
    let mut services = Services::new(Arc::new(api), events.sender(), rt, health_interval);
    if dashboard.wants_health() {
        services.start_health_poller();
    }
    let effects = dashboard.take_effects();
    services.execute_all(&effects);
    info!(
        effects = effects.len(),
        health = services.health_poller_running(),
        "session started"
    );

    Ok(Session {
        dashboard,
        services,
        events,
    })
}

/// Sends `tracing` output to `<log_dir>/dashboard.log`, and to the OTLP
/// collector at `endpoint` when built with `telemetry`.
pub fn init_logging(log_dir: &str, endpoint: &str) -> Result<()> {
    logging::setup_logger(log_dir, endpoint)
        .map_err(|e| Error::Io(std::io::Error::other(format!("{e:?}"))))?;
    install_panic_hook();
    Ok(())
}

pub fn shutdown_logging() {
    logging::shutdown();
}

/// Logs panics with a backtrace before the default hook runs.
pub fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let default = panic::take_hook();

        panic::set_hook(Box::new(move |panic_info| {
            let bt = Backtrace::force_capture();
            error!(target: "panic",
                   "panic: {panic_info}\n\nBacktrace:\n{bt}");
            default(panic_info);
        }));
    });
}
