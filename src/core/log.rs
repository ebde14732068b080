use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Initializes tracing output. Quiet by default; `--verbose` turns on debug
/// logging for this crate. `RUST_LOG` can narrow the output further.
pub fn init_logging(verbose: bool) {
    let (crate_filter, fallback) = if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::OFF, "off")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().without_time())
        .with(Targets::new().with_target("folio", crate_filter))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .init();
}
