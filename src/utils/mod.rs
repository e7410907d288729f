/// Logging utilities
pub mod logging {
    use tracing_subscriber::EnvFilter;

    /// Default filter when `RUST_LOG` is unset
    pub const DEFAULT_FILTER: &str = "info";

    /// Installs a fmt subscriber driven by `RUST_LOG`.
    /// Returns false if a global subscriber was already set.
    pub fn init_tracing() -> bool {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
            .is_ok()
    }
}

pub use logging::init_tracing;
