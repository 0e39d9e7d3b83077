//! Logging macros that compile away without the `tracing` feature.
//!
//! ```bash
//! # No logging at all
//! cargo build --release
//!
//! # Node transitions and iterator/copy events, for whatever subscriber the application installs
//! cargo build --release --features tracing
//! ```
//!
//! Arguments are only evaluated when the feature is on, so pass values inline rather than
//! binding them to locals that exist only for the log line.

#![allow(unused_macros, unused_imports)]

/// Node transitions: promotion, demotion, collapse and splits.
#[cfg(feature = "tracing")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

/// Whole-tree events such as `copy` and iterator creation.
#[cfg(feature = "tracing")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

/// Rejected inserts.
#[cfg(feature = "tracing")]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        tracing::warn!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! warn_log {
    ($($arg:tt)*) => {};
}
