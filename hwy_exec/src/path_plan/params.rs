//! Parameters structure for PathPlan

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for path planning.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    // ---- ROAD GEOMETRY ----
    /// Width of a single lane.
    ///
    /// Units: meters
    pub lane_width_m: f64,

    // ---- SPEED GOVERNING ----
    /// The speed limit of the highway, the reference speed target on an open
    /// road.
    ///
    /// Units: mph
    pub speed_limit_mph: f64,

    /// Maximum change of the reference speed per processing tick.
    ///
    /// Units: mph
    pub speed_step_mph: f64,

    /// Distance ahead of the ego within which a slower leading vehicle is
    /// followed instead of the speed limit. Also the window of the lane speed
    /// scans in the cost model.
    ///
    /// Units: meters
    pub look_ahead_m: f64,

    // ---- LANE SELECTION ----
    /// Distance that must be travelled after a committed lane change before
    /// another change may be committed.
    ///
    /// Units: meters
    pub lane_change_lockout_m: f64,

    /// The tighter of the two safety gaps used by the collision cost, applied
    /// when the speed difference to the scanned vehicle makes the gap close
    /// slowly.
    ///
    /// Units: meters
    pub tight_gap_m: f64,

    /// The wider of the two safety gaps used by the collision cost.
    ///
    /// Units: meters
    pub wide_gap_m: f64,

    /// Speed difference above which the tighter safety gap applies.
    ///
    /// Units: mph
    pub speed_margin_mph: f64,

    /// Weight of the collision cost term.
    pub collision_weight: f64,

    /// Weight of the lane inefficiency cost term.
    pub inefficiency_weight: f64,

    /// Weight of the speed difference cost term.
    pub diff_speed_weight: f64,

    // ---- TRAJECTORY GENERATION ----
    /// Along-track separation of the far anchor points placed on the target
    /// lane centreline.
    ///
    /// Units: meters
    pub anchor_spacing_m: f64,

    /// Forward distance over which the fitted curve is resampled to realise
    /// the reference speed.
    ///
    /// Units: meters
    pub target_x_m: f64,

    /// Reference speeds below this threshold produce a holding trajectory
    /// instead of resampling the curve.
    ///
    /// Units: mph
    pub min_resample_speed_mph: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    /// Nominal highway parameters, matching `params/path_plan.toml`.
    fn default() -> Self {
        Params {
            lane_width_m: 4.0,
            speed_limit_mph: 49.5,
            speed_step_mph: 0.224,
            look_ahead_m: 40.0,
            lane_change_lockout_m: 60.0,
            tight_gap_m: 20.0,
            wide_gap_m: 40.0,
            speed_margin_mph: 5.0,
            collision_weight: 1.0,
            inefficiency_weight: 0.0,
            diff_speed_weight: 0.0,
            anchor_spacing_m: 30.0,
            target_x_m: 30.0,
            min_resample_speed_mph: 1e-3,
        }
    }
}
