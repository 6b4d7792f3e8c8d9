//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::path_plan::{self, PathPlan, Trajectory};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Simulated time elapsed across all executed cycles
    pub sim_time_s: f64,

    // PathPlan
    pub path_plan: PathPlan,
    pub path_plan_output: Option<Trajectory>,
    pub path_plan_status_rpt: path_plan::StatusReport,

    // Monitoring counters
    /// Number of consecutive planning errors
    pub num_consec_plan_errors: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle.
    pub fn cycle_start(&mut self) {
        self.path_plan_output = None;
        self.path_plan_status_rpt = path_plan::StatusReport::default();
    }
}
