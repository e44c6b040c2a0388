//! Logging setup for hosts that don't install their own subscriber.

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Does nothing if a global subscriber is already set, so it's safe to call
/// more than once.
pub fn init_tracing() {
    init_tracing_with("info");
}

/// Like [`init_tracing`] with a custom fallback directive, e.g.
/// `"doorhunt_session=debug,info"`.
pub fn init_tracing_with(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
