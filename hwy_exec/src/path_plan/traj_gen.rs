//! Trajectory generation.
//!
//! Builds the fixed-horizon output trajectory for one tick. Anchor points are
//! seeded from the tail of the unconsumed previous path (or the current pose
//! when too little of it remains) and extended with far anchors on the target
//! lane centreline, then rotated into a vehicle-local frame where the path is
//! a single-valued function of the forward axis. A cubic spline through the
//! anchors is resampled at the control period to realise the reference speed,
//! and the result is rotated back into the world frame behind the untouched
//! carry-over of the previous path.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Rotation2, Vector2};
use serde::Serialize;

// Internal
use super::lane::lane_centre_m;
use super::state::ControllerState;
use super::{Params, PathPlanError, FIVE_MPH_MPS, TRAJ_DT_S, TRAJ_HORIZON};
use crate::map::FrenetProjector;
use crate::spline::CubicSpline;
use crate::telemetry::TelemetryTick;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of far anchors placed on the target lane centreline.
const NUM_FAR_ANCHORS: usize = 3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The planned trajectory for the next `TRAJ_HORIZON * TRAJ_DT_S` seconds.
///
/// Points are in world coordinates, strictly increasing in time at one point
/// per control period.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Trajectory {
    pub points_m: Vec<Vector2<f64>>,
}

/// The reference pose anchoring the vehicle-local frame for this tick.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RefFrame {
    pub position_m: Vector2<f64>,
    pub heading_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RefFrame {
    /// Map a world point into the local frame: the reference pose sits at the
    /// origin facing the positive x axis.
    pub fn to_local(&self, point_m: Vector2<f64>) -> Vector2<f64> {
        Rotation2::new(-self.heading_rad) * (point_m - self.position_m)
    }

    /// Map a local-frame point back into world coordinates.
    pub fn to_world(&self, point_m: Vector2<f64>) -> Vector2<f64> {
        Rotation2::new(self.heading_rad) * point_m + self.position_m
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate the trajectory for this tick.
///
/// `plan_s_m` is the along-track position planning continues from, the end of
/// the previous path remainder when one exists.
pub fn generate(
    tick: &TelemetryTick,
    ctrl: &ControllerState,
    plan_s_m: f64,
    map: &dyn FrenetProjector,
    params: &Params,
) -> Result<Trajectory, PathPlanError> {
    let prev_path = &tick.prev_path_m;

    // ---- SEED POINTS ----
    //
    // With enough of the previous path left, seed from its last two points so
    // the new curve is tangent-continuous with what the vehicle is already
    // following. Otherwise synthesise a second point behind the current pose.
    let (frame, mut anchors_m) = if prev_path.len() < 2 {
        let frame = RefFrame {
            position_m: tick.position_m,
            heading_rad: tick.heading_rad,
        };
        let behind_m = tick.position_m
            - Vector2::new(tick.heading_rad.cos(), tick.heading_rad.sin());

        (frame, vec![behind_m, tick.position_m])
    } else {
        let last_m = prev_path[prev_path.len() - 1];
        let before_m = prev_path[prev_path.len() - 2];
        let diff_m = last_m - before_m;

        let frame = RefFrame {
            position_m: last_m,
            heading_rad: diff_m[1].atan2(diff_m[0]),
        };

        (frame, vec![before_m, last_m])
    };

    // ---- FAR ANCHORS ----
    //
    // Evenly spaced points ahead on the target lane centreline.
    let centre_d_m = lane_centre_m(ctrl.current_lane, params.lane_width_m);
    for k in 1..=NUM_FAR_ANCHORS {
        anchors_m.push(map.xy_from_frenet(
            plan_s_m + params.anchor_spacing_m * k as f64,
            centre_d_m,
        ));
    }

    // ---- CURVE FIT ----
    //
    // Fitting happens in the local frame, where the anchors run forward along
    // the x axis and the path is a function of x.
    let local_anchors_m: Vec<Vector2<f64>> =
        anchors_m.iter().map(|&p| frame.to_local(p)).collect();

    let spline = CubicSpline::fit(&local_anchors_m).map_err(PathPlanError::CurveFitError)?;

    // ---- CARRY-OVER ----
    //
    // The unconsumed remainder of the previous trajectory is emitted
    // unchanged, committed points are never resmoothed.
    let mut points_m = prev_path.clone();
    points_m.truncate(TRAJ_HORIZON);

    // ---- RESAMPLE ----

    if ctrl.reference_speed_mph < params.min_resample_speed_mph {
        // Holding trajectory: the spacing calculation is undefined at zero
        // reference speed, so pad out the horizon at the last known point.
        let hold_m = points_m.last().copied().unwrap_or(tick.position_m);
        points_m.resize(TRAJ_HORIZON, hold_m);

        return Ok(Trajectory { points_m });
    }

    // Split the curve into steps that cover the target distance at the
    // reference speed, one step per control period.
    let target_x_m = params.target_x_m;
    let target_dist_m = target_x_m.hypot(spline.y_at(target_x_m));
    let num_steps = target_dist_m / (TRAJ_DT_S * ctrl.reference_speed_mph / FIVE_MPH_MPS);
    let step_m = target_x_m / num_steps;

    let mut x_m = 0.0;
    while points_m.len() < TRAJ_HORIZON {
        x_m += step_m;
        points_m.push(frame.to_world(Vector2::new(x_m, spline.y_at(x_m))));
    }

    Ok(Trajectory { points_m })
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::map::StraightTrack;

    fn straight_track() -> StraightTrack {
        StraightTrack { length_m: 6945.554 }
    }

    /// A tick in lane 1 of the straight track with no previous path.
    fn fresh_tick(s_m: f64, speed_mph: f64) -> TelemetryTick {
        TelemetryTick {
            position_m: Vector2::new(s_m, -6.0),
            heading_rad: 0.0,
            speed_mph,
            s_m,
            d_m: 6.0,
            ..Default::default()
        }
    }

    fn ctrl(reference_speed_mph: f64) -> ControllerState {
        ControllerState {
            reference_speed_mph,
            ..Default::default()
        }
    }

    #[test]
    fn test_frame_round_trip() {
        let frame = RefFrame {
            position_m: Vector2::new(12.0, -3.0),
            heading_rad: 0.7,
        };

        let points = [
            Vector2::new(0.0, 0.0),
            Vector2::new(5.0, 1.0),
            Vector2::new(-2.0, 7.5),
        ];

        for &p in &points {
            let round_trip = frame.to_world(frame.to_local(p));
            assert!((round_trip - p).norm() < 1e-12);
        }

        // The reference pose maps to the local origin
        assert!(frame.to_local(frame.position_m).norm() < 1e-12);
    }

    #[test]
    fn test_full_horizon_from_fresh_start() {
        let tick = fresh_tick(0.0, 0.0);
        let trajectory =
            generate(&tick, &ctrl(10.0), 0.0, &straight_track(), &Params::default()).unwrap();

        assert_eq!(trajectory.points_m.len(), TRAJ_HORIZON);

        // On a straight track the points advance monotonically along x and
        // stay on the lane centreline
        for pair in trajectory.points_m.windows(2) {
            assert!(pair[1][0] > pair[0][0]);
        }
        for p in &trajectory.points_m {
            assert!((p[1] + 6.0).abs() < 0.1);
        }
    }

    #[test]
    fn test_point_spacing_matches_reference_speed() {
        let reference_mph = 25.0;
        let tick = fresh_tick(0.0, reference_mph);
        let trajectory = generate(
            &tick,
            &ctrl(reference_mph),
            0.0,
            &straight_track(),
            &Params::default(),
        )
        .unwrap();

        let expected_m = TRAJ_DT_S * reference_mph / FIVE_MPH_MPS;

        for pair in trajectory.points_m.windows(2) {
            let spacing_m = (pair[1] - pair[0]).norm();
            assert!((spacing_m - expected_m).abs() < 0.05 * expected_m);
        }
    }

    #[test]
    fn test_carry_over_is_untouched() {
        // A previous remainder running down the lane centreline
        let prev_path: Vec<Vector2<f64>> =
            (0..10).map(|i| Vector2::new(i as f64 * 0.5, -6.0)).collect();

        let mut tick = fresh_tick(0.0, 10.0);
        tick.prev_path_m = prev_path.clone();
        tick.end_path_s_m = 4.5;

        let trajectory =
            generate(&tick, &ctrl(10.0), 4.5, &straight_track(), &Params::default()).unwrap();

        assert_eq!(trajectory.points_m.len(), TRAJ_HORIZON);
        assert_eq!(&trajectory.points_m[..10], &prev_path[..]);
    }

    #[test]
    fn test_zero_reference_speed_holds_position() {
        let tick = fresh_tick(0.0, 0.0);
        let trajectory =
            generate(&tick, &ctrl(0.0), 0.0, &straight_track(), &Params::default()).unwrap();

        assert_eq!(trajectory.points_m.len(), TRAJ_HORIZON);
        for p in &trajectory.points_m {
            assert_eq!(*p, tick.position_m);
        }
    }

    #[test]
    fn test_lane_change_reaches_target_centreline() {
        let tick = fresh_tick(0.0, 30.0);

        // Controller already committed to lane 2, the trajectory should bend
        // towards its centreline at y = -10
        let ctrl = ControllerState {
            current_lane: 2,
            reference_speed_mph: 30.0,
            lockout_s_m: 0.0,
        };

        let trajectory =
            generate(&tick, &ctrl, 0.0, &straight_track(), &Params::default()).unwrap();

        let last = trajectory.points_m.last().unwrap();
        assert!(last[1] < -6.0);
    }
}
