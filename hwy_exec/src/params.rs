//! # Highway Executable Parameters
//!
//! This module provides parameters for the highway executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct HwyExecParams {
    /// Path to the highway waypoint map, relative to the software root.
    pub map_file: String,

    /// Number of cycles between periodic status log lines.
    pub status_period_cycles: u64,

    /// Limit on the number of consecutive planning errors before the
    /// executable gives up.
    pub max_consec_plan_errors: u64,
}
