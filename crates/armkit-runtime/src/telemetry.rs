//! `tracing` subscriber initialisation.
//!
//! Call [`init_tracing`] once at process startup.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `ARMKIT_LOG_FORMAT=json` | Emit newline-delimited JSON logs. |

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialise the global `tracing` subscriber.
///
/// Honours `RUST_LOG` for filtering and `ARMKIT_LOG_FORMAT=json` for
/// machine-readable output; falls back to a compact console formatter.
/// Calling it more than once panics, as the global subscriber can only be
/// set once per process.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = std::env::var("ARMKIT_LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}
