//! Stable exit codes for taxcalc CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid arguments, unreadable input or other errors.
pub const INVALID: i32 = 1;
