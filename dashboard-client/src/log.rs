use std::{fs::File, path::Path, sync::OnceLock};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

static TRACER: OnceLock<()> = OnceLock::new();
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

pub const LOG_FILE: &str = "dashboard.log";

/// File logging at INFO into `<log_dir>/dashboard.log`. The endpoint is only
/// used by the telemetry build.
pub fn setup_logger(log_dir: &str, _ep: &str) -> Result<(), Box<dyn std::error::Error>> {
    if TRACER.get().is_some() {
        return Ok(());
    }
    let file = File::create(Path::new(log_dir).join(LOG_FILE))?;

    TRACER.get_or_init(|| {
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(file);

        let file_layer = fmt::layer()
            .with_line_number(true)
            .with_writer(non_blocking_writer)
            .with_filter(tracing_subscriber::filter::LevelFilter::from_level(Level::INFO));

        LOG_GUARD.set(guard).ok();

        tracing_subscriber::registry()
            .with(file_layer)
            .try_init()
            .ok();
    });

    Ok(())
}

/// Nothing to flush without telemetry; the writer guard lives until exit.
pub fn shutdown() {}
