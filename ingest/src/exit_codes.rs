//! Stable exit codes for ingest CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed: invalid config, unresolved location, drone or sink error.
pub const INVALID: i32 = 1;
