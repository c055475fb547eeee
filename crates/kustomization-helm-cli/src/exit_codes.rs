//! Standard exit codes for CLI operations
//!
//! Every phase failure maps to the general error code. Argument errors are
//! reported by clap with its own code (2).

/// Success - conversion completed without errors
pub const SUCCESS: u8 = 0;

/// General error - initialization, configuration or run failure
pub const ERROR: u8 = 1;
