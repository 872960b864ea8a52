//! Tracing subscriber bootstrap for binaries. Library crates never call this
//! themselves; only `frago-cli`'s `main` does, once.

/// Installs a `tracing_subscriber::fmt` subscriber writing to stderr, filtered
/// by `FRAGO_LOG` (falls back to `info`). Safe to call more than once; later
/// calls are no-ops.
pub fn init() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("FRAGO_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .ok();
}
