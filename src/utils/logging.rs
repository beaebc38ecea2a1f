//! Logging setup plus module-gated logging macros.
//!
//! Chatty modules (the progress estimator, the upload pipeline) declare a
//! module-level switch and log through the macros below:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//! use crate::{log_debug, log_info, log_warn};
//!
//! log_info!("upload attempt {} started", attempt_id);
//! ```

use std::sync::Once;

static INIT: Once = Once::new();

/// Install `env_logger` once, reading `RUST_LOG` and falling back to `Info`.
///
/// Safe to call from every test and from every embedding application entry point.
pub fn init() {
    INIT.call_once(|| {
        let _ = env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .is_test(cfg!(test))
            .try_init();
    });
}

/// Debug-level logging, gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// Info-level logging, gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Warn-level logging, gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}
