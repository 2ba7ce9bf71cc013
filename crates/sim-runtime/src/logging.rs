//! Tracing subscriber setup, grounded on `client/cli`'s `setup_logging`
//! (stripped of the file-appender half: a headless sim host just logs to
//! stderr).

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs a global subscriber honoring `RUST_LOG`, defaulting to `info`.
///
/// Safe to call once per process; a second call is a no-op failure that is
/// swallowed, since tests may initialize logging more than once.
pub fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let fmt_layer = tracing_subscriber::fmt::layer().with_ansi(true);

    let _ = tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init();
}
