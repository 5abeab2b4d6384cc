use std::env;
use std::sync::OnceLock;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOGGING: OnceLock<()> = OnceLock::new();

/// Install the global stderr subscriber. First call wins; later calls no-op.
///
/// Filter defaults to `info` and can be overridden with `CAMPUS_EVENTS_LOG`
/// or the standard `RUST_LOG`.
pub fn init() {
    LOGGING.get_or_init(|| {
        let filter = build_filter();
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_ansi(false);
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init();
    });
}

fn build_filter() -> EnvFilter {
    if let Ok(spec) = env::var("CAMPUS_EVENTS_LOG") {
        if !spec.trim().is_empty() {
            if let Ok(filter) = EnvFilter::try_new(spec) {
                return filter;
            }
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
