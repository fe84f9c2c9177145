//! Log setup shared by the stage binaries.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Honours `RUST_LOG`; defaults to `info` so the per-item progress of a
/// multi-hour batch run is visible.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Announce a stage run with a banner so runs are easy to find in long logs.
pub fn log_stage_start(stage: &str, model: &str) {
    tracing::info!("{}", "=".repeat(60));
    tracing::info!(
        "{} - started {} (model: {})",
        stage,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        model
    );
    tracing::info!("{}", "=".repeat(60));
}
