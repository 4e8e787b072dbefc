//! Structured logging with `tracing`.
//!
//! Library crates emit events through the `tracing` macros; binaries call
//! [`init_subscriber`] once at startup. `RUST_LOG` takes precedence over the
//! level passed in, so a single run can be made verbose without touching
//! settings.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber with stderr output.
///
/// Subsequent calls are no-ops. Output goes to stderr so that stdout stays
/// reserved for command results (capsule content, JSON reports).
///
/// # Arguments
///
/// * `level` - Minimum level when `RUST_LOG` is unset (e.g. `"warn"`).
pub fn init_subscriber(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // set_global_default fails once a subscriber exists; that is fine here
    let _ = subscriber.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_subscriber_does_not_panic() {
        init_subscriber("warn");
        init_subscriber("debug");
    }

    #[test]
    fn invalid_level_falls_back_silently() {
        init_subscriber("not-a-level");
    }
}
