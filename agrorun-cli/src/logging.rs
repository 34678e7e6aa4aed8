use tracing_subscriber::EnvFilter;

/// Initialize structured logging on stderr.
///
/// Uses the `RUST_LOG` env var if set, otherwise falls back to `info`.
pub fn init(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
