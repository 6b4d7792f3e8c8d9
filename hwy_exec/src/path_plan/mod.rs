//! # Path planning module
//!
//! The planner is the decision and trajectory core of the control loop. Once
//! per telemetry tick it:
//!
//!  1. Scores every lane reachable from the current lane with a weighted cost
//!     model and selects the cheapest, with an along-track lockout to stop
//!     the selection oscillating between lanes.
//!  2. Governs the reference speed towards either the speed limit or the
//!     speed of the nearest slow vehicle ahead in the selected lane, stepping
//!     by a bounded increment per tick.
//!  3. Emits a fixed-horizon trajectory: anchor points on the selected lane
//!     centreline are fitted with a smooth curve in a vehicle-local frame,
//!     then resampled at the control period to realise the reference speed.
//!     The unconsumed remainder of the previous trajectory is carried over
//!     untouched so the emitted path is always continuous with what the
//!     vehicle is already following.
//!
//! Processing is strictly synchronous, one tick runs to completion before the
//! next is accepted, and the only state surviving between ticks is the
//! [`ControllerState`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod cost;
pub mod lane;
mod params;
pub mod speed_ctrl;
mod state;
pub mod traj_gen;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::Params;
pub use state::*;
pub use traj_gen::Trajectory;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of lanes on the highway.
pub const NUM_LANES: usize = 3;

/// The lane occupied after initialisation, before any telemetry has arrived.
pub const INITIAL_LANE: usize = 1;

/// Number of points in every emitted trajectory.
pub const TRAJ_HORIZON: usize = 50;

/// Time separation between consecutive trajectory points.
///
/// Units: seconds
pub const TRAJ_DT_S: f64 = 0.02;

/// Five mph expressed in metres per second, the conversion factor between the
/// mph reference speed and the point spacing of the resampled trajectory.
pub const FIVE_MPH_MPS: f64 = 5.0 * 0.44704;

/// Cost assigned to lanes outside the successor set, large enough that they
/// can never win the selection.
pub const LANE_COST_SENTINEL: f64 = 1000.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during PathPlan operation.
#[derive(Debug, thiserror::Error)]
pub enum PathPlanError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Could not initialise the archiver: {0}")]
    ArchInitError(String),

    /// The module was asked to process a tick before `init` provided the map
    /// capability.
    #[error("No map capability has been set")]
    NoMap,

    /// The tick contained non-finite values and cannot be planned against.
    /// The persistent controller state is left untouched.
    #[error("Telemetry tick contains non-finite values")]
    MalformedTelemetry,

    #[error("Could not fit the trajectory curve: {0}")]
    CurveFitError(crate::spline::SplineError),
}
