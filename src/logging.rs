//! Logging setup.
//!
//! `RUST_LOG` wins over whatever default the caller passes:
//! ```bash
//! RUST_LOG=debug numerology calc "John Doe"
//! ```

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the global subscriber, writing to stderr.
///
/// `default_directive` is an `EnvFilter` directive such as `"warn"`,
/// `"numerology=debug"` or `"off"`. Only the first call has any effect.
pub fn init(default_directive: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    });
}
