//! Exit codes returned by [`crate::run`].

/// Command completed.
pub const SUCCESS: i32 = 0;

/// Usage, input, configuration or I/O failure.
pub const ERROR: i32 = 2;
