//! Diagnostic logging via `tracing`.
//!
//! Logs go to stderr so stdout stays reserved for the progress trace and the
//! JSON result. `RUST_LOG` wins over the verbosity flag when set.

use std::sync::Once;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Installs the global subscriber. Later calls are no-ops.
pub fn init(verbose: bool) {
    INIT.call_once(|| {
        let default_level = if verbose { "debug" } else { "warn" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("sweep_core={default_level},sweep={default_level}"))
        });

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(verbose)
            .compact();

        // Another subscriber may already be installed (tests); keep it.
        let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
    });
}
