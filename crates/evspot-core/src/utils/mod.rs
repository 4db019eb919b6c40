//! Utility functions for display formatting and input debouncing.

pub mod debounce;
pub mod format;

// Re-export commonly used functions at module level
pub use debounce::Debouncer;
pub use format::{format_currency, format_distance, format_time, format_time_in};
