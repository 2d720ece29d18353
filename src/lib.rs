pub mod ai;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log a message every 200 simulation ticks when the `perf_stats` feature is enabled.
///
/// Without the feature the macro expands to nothing and its arguments are
/// never evaluated.
///
/// ```ignore
/// profile_log!(tick, "[GOAP] {} agents replanned", replans);
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {
        if $tick.0 % 200 == 0 {
            bevy::prelude::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {};
}
