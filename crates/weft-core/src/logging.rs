#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! Re-exports of tracing macros when the `tracing` feature is enabled.
//! When the feature is disabled, no-op macros are provided under the same
//! paths, so callers write `use weft_core::logging::trace;` either way.

#[cfg(feature = "tracing")]
pub use tracing::{debug, error, info, trace, warn};

/// No-op log macro used for every level when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __weft_noop_log {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub use crate::__weft_noop_log as debug;
#[cfg(not(feature = "tracing"))]
pub use crate::__weft_noop_log as error;
#[cfg(not(feature = "tracing"))]
pub use crate::__weft_noop_log as info;
#[cfg(not(feature = "tracing"))]
pub use crate::__weft_noop_log as trace;
#[cfg(not(feature = "tracing"))]
pub use crate::__weft_noop_log as warn;

#[cfg(test)]
mod tests {
    #[test]
    fn log_macros_compile_at_every_level() {
        use super::{debug, error, info, trace, warn};
        trace!("trace {}", 1);
        debug!("debug {}", 2);
        info!("info {}", 3);
        warn!("warn {}", 4);
        error!("error {}", 5);
    }
}
