//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants;

static INIT: Once = Once::new();

/// Initialize the hostio tracing/logging system.
///
/// Reads the `HOSTIO_LOG` environment variable for per-target log levels.
/// Format: `HOSTIO_LOG=hostio_fs=debug,hostio_net=info`
///
/// Falls back to `hostio=info` if `HOSTIO_LOG` is not set or is invalid.
/// Calling it more than once is safe; only the first call installs a subscriber.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(constants::LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(constants::DEFAULT_LOG_FILTER));

        // A host may already have installed a subscriber; keep theirs.
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
    });
}
