use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::LOG_ENV_VAR;

static INIT: Once = Once::new();

/// Initialize the tracing subscriber.
///
/// Reads `KVCHAIN_LOG` for filtering, e.g. `KVCHAIN_LOG=kvchain_storage=debug`.
/// Falls back to `info` when unset or invalid. Safe to call repeatedly.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
        install(filter);
    });
}

/// Initialize with an explicit filter string (tests, embedding).
pub fn init_tracing_with_filter(filter: &str) {
    let filter = EnvFilter::new(filter);
    INIT.call_once(|| install(filter));
}

fn install(filter: EnvFilter) {
    // Another subscriber may already be installed by the host process.
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();
}
