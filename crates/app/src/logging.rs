//! Tracing setup for the `layering` binary

use layering_config::LOG_ENV_VAR;
use tracing_subscriber::EnvFilter;

/// Crates whose events are worth showing. Everything else stays at `warn`.
const ENGINE_TARGETS: [&str; 4] = ["layering", "layering_config", "layering_io", "painting"];

/// Filter directives raising the engine crates to `level`
fn directives(level: &str) -> String {
    ENGINE_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .chain(std::iter::once("warn".to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber.
///
/// `--debug` honors `LAYERING_LOG` and otherwise drops the engine crates to
/// `debug`. Plain runs log engine events at `info`.
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(directives("debug")))
    } else {
        EnvFilter::new(directives("info"))
    };

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
