//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system.
///
/// Safe to call more than once; later calls are ignored. Tests call this
/// freely without fighting over the global logger.
pub fn init() {
    let _ = env_logger::Builder::from_default_env().try_init();
}
