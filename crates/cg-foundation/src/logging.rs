//! Tracing setup. Always writes to stderr so stdout stays clean for the
//! query server's line-delimited JSON-RPC transport.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

/// Initialize the global tracing subscriber. Safe to call once per process;
/// a second call is a no-op error that we deliberately ignore.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    if let Err(err) = result {
        eprintln!("logging already initialized: {err}");
    }
}

/// Build a tracing span for a single query-server request, the way call
/// sites want it: one span per request, carrying the request id.
pub fn request_span(request_id: &str, tool: &str) -> tracing::Span {
    tracing::info_span!("request", request_id = %request_id, tool = %tool)
}
