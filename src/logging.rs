//! Tracing initialization.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogConfig;

pub const ENV_LOG: &str = "CONTENT_ENGINE_LOG";

/// Install the global subscriber.
///
/// `CONTENT_ENGINE_LOG` takes precedence over `LogConfig::filter`,
/// e.g. `CONTENT_ENGINE_LOG=content_engine=debug,tower_http=warn`.
/// `verbose` forces `debug` for this crate.
/// Calling it again after a subscriber is set is a no-op.
pub fn init_tracing(config: &LogConfig, verbose: bool) {
    let mut filter = EnvFilter::try_from_env(ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info")));
    if verbose {
        if let Ok(directive) = "content_engine=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry.with(fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
