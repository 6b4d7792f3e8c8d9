//! Speed governor.
//!
//! The governor picks a desired speed for the current lane (car-following
//! behind a slower leader, the speed limit otherwise) and ramps the
//! persistent reference speed towards it by a bounded step per tick, giving a
//! bounded acceleration profile instead of instantaneous speed changes.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use ordered_float::NotNan;

// Internal
use super::lane::lane_for_offset;
use super::Params;
use crate::telemetry::SensedVehicle;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// The desired speed for the given lane.
///
/// The desired speed is computed once over the full set of sensing records:
/// it defaults to the speed limit and is overridden only by the slowest
/// qualifying leading vehicle, one in the given lane, ahead of the ego within
/// the look-ahead window, and travelling below the limit.
pub fn desired_speed_mph(
    ego_s_m: f64,
    lane: usize,
    elapsed_s: f64,
    vehicles: &[SensedVehicle],
    params: &Params,
) -> f64 {
    let limit_mph = params.speed_limit_mph;

    vehicles
        .iter()
        .filter(|v| lane_for_offset(v.d_m, params.lane_width_m) == Some(lane))
        .filter_map(|v| {
            let s_m = v.projected_s_m(elapsed_s);
            let speed_mph = v.speed_mph();

            let qualifying = s_m > ego_s_m
                && s_m < ego_s_m + params.look_ahead_m
                && speed_mph < limit_mph;

            if qualifying {
                NotNan::new(speed_mph).ok()
            } else {
                None
            }
        })
        .min()
        .map_or(limit_mph, NotNan::into_inner)
}

/// Ramp the reference speed one bounded step towards the desired speed.
pub fn ramp_reference_mph(reference_mph: f64, desired_mph: f64, step_mph: f64) -> f64 {
    if desired_mph > reference_mph {
        reference_mph + step_mph
    } else if desired_mph < reference_mph {
        reference_mph - step_mph
    } else {
        reference_mph
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Vector2;

    fn vehicle(s_m: f64, d_m: f64, speed_mph: f64) -> SensedVehicle {
        SensedVehicle {
            id: 0,
            position_m: Vector2::new(s_m, -d_m),
            velocity_mph: Vector2::new(speed_mph, 0.0),
            s_m,
            d_m,
        }
    }

    #[test]
    fn test_open_lane_targets_the_limit() {
        let params = Params::default();

        assert_eq!(
            desired_speed_mph(100.0, 1, 0.0, &[], &params),
            params.speed_limit_mph
        );
    }

    #[test]
    fn test_follows_slow_leader() {
        let params = Params::default();

        let vehicles = [vehicle(120.0, 6.0, 30.0)];
        assert_eq!(desired_speed_mph(100.0, 1, 0.0, &vehicles, &params), 30.0);
    }

    #[test]
    fn test_slowest_leader_wins() {
        let params = Params::default();

        let vehicles = [vehicle(110.0, 6.0, 35.0), vehicle(130.0, 6.0, 25.0)];
        assert_eq!(desired_speed_mph(100.0, 1, 0.0, &vehicles, &params), 25.0);
    }

    #[test]
    fn test_non_qualifying_records_leave_the_limit() {
        let params = Params::default();
        let limit = params.speed_limit_mph;

        // Records exist, but none qualify: wrong lane, behind, beyond the
        // window, or faster than the limit. The desired speed must fall back
        // to the limit regardless of record order.
        let vehicles = [
            vehicle(120.0, 10.0, 20.0),
            vehicle(90.0, 6.0, 20.0),
            vehicle(150.0, 6.0, 20.0),
            vehicle(120.0, 6.0, 55.0),
        ];

        assert_eq!(desired_speed_mph(100.0, 1, 0.0, &vehicles, &params), limit);
    }

    #[test]
    fn test_projection_can_qualify_a_record() {
        let params = Params::default();

        // Just outside the window now, but projected inside it over the
        // elapsed remainder
        let vehicles = [vehicle(95.0, 6.0, 20.0)];

        let limit = params.speed_limit_mph;
        assert_eq!(desired_speed_mph(100.0, 1, 0.0, &vehicles, &params), limit);
        assert_eq!(desired_speed_mph(100.0, 1, 0.5, &vehicles, &params), 20.0);
    }

    #[test]
    fn test_ramp_is_bounded_both_ways() {
        let step = 0.224;

        assert!((ramp_reference_mph(0.0, 49.5, step) - step).abs() < 1e-12);
        assert!((ramp_reference_mph(30.0, 20.0, step) - (30.0 - step)).abs() < 1e-12);
        assert_eq!(ramp_reference_mph(25.0, 25.0, step), 25.0);
    }

    #[test]
    fn test_ramp_overshoot_is_at_most_one_step() {
        let step = 0.224;
        let reference = ramp_reference_mph(49.4, 49.5, step);

        assert!(reference - 49.5 < step);
    }
}
