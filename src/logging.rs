//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Install the global stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` is used, falling back to
/// `info` if it does not parse. Calling this twice is a no-op.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init("debug");
        init("not a level!!");
    }
}
