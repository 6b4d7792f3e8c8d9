//! Host environment utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Environment variable pointing at the root of the software directory tree.
///
/// The `params`, `data`, `scenarios` and `sessions` directories are all
/// resolved relative to this root.
pub const SW_ROOT_ENV_VAR: &str = "HWY_SW_ROOT";

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the root of the software directory tree.
///
/// Returns `Err(())` if the root environment variable is not set.
pub fn get_sw_root() -> Result<PathBuf, ()> {
    match std::env::var(SW_ROOT_ENV_VAR) {
        Ok(v) => Ok(PathBuf::from(v)),
        Err(_) => Err(()),
    }
}
