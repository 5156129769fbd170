use camino::Utf8Path;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber, writing to a daily-rolling file in `log_dir`.
///
/// Falls back to stderr if the directory cannot be created. Later calls are no-ops.
pub fn init_logging(log_dir: &Utf8Path) {
    if LOG_GUARD.get().is_some() {
        return;
    }

    if let Err(e) = std::fs::create_dir_all(log_dir) {
        let installed = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_target(false)
            .try_init()
            .is_ok();
        if installed {
            tracing::warn!("failed to create log dir {log_dir}: {e}; using stderr");
        }
        return;
    }

    let appender = tracing_appender::rolling::daily(log_dir, "bmm-client.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .is_ok();

    if installed {
        let _ = LOG_GUARD.set(guard);
        tracing::info!(path = %log_dir, "logging initialized");
    }
}
