//! Lane cost model.
//!
//! Three independent cost terms share a uniform signature and are combined by
//! fixed weights from the parameters. New terms can be added to the list in
//! [`total_cost`] without touching the lane selector.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use ordered_float::NotNan;

// Internal
use super::lane::{lane_for_offset, successor_lanes};
use super::{Params, LANE_COST_SENTINEL, NUM_LANES};
use crate::telemetry::SensedVehicle;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything a cost term may consider when scoring a candidate lane.
pub struct CostCtx<'a> {
    /// Ego along-track position, taken from the end of the unconsumed path
    /// remainder when one exists.
    pub ego_s_m: f64,

    /// The lane the ego currently occupies.
    pub ego_lane: usize,

    /// Ego speed.
    ///
    /// Units: mph
    pub ego_speed_mph: f64,

    /// Time covered by the unconsumed path remainder. Sensing records are
    /// projected forward by this much before being compared against the ego.
    pub elapsed_s: f64,

    /// The sensing records for this tick.
    pub vehicles: &'a [SensedVehicle],

    pub params: &'a Params,
}

/// A cost term: scores a candidate lane in roughly `[0, 2]`.
pub type CostFn = fn(&CostCtx, usize) -> f64;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the dense cost table over all lanes.
///
/// Lanes outside the successor set of the current lane get the sentinel cost
/// so they can never be selected.
pub fn lane_costs(ctx: &CostCtx) -> [f64; NUM_LANES] {
    let mut costs = [LANE_COST_SENTINEL; NUM_LANES];

    for lane in successor_lanes(ctx.ego_lane, NUM_LANES) {
        costs[lane] = total_cost(ctx, lane);
    }

    costs
}

/// The weighted sum of all cost terms for one candidate lane.
pub fn total_cost(ctx: &CostCtx, lane: usize) -> f64 {
    let terms: [(CostFn, f64); 3] = [
        (collision_cost, ctx.params.collision_weight),
        (inefficiency_cost, ctx.params.inefficiency_weight),
        (diff_speed_cost, ctx.params.diff_speed_weight),
    ];

    terms
        .iter()
        .map(|&(term, weight)| weight * term(ctx, lane))
        .sum()
}

/// Collision risk of moving into (or staying in) the candidate lane.
///
/// Lanes that are neither the current lane nor adjacent to it are scored 1.0
/// outright. Otherwise the lane's sensing records are scanned: a vehicle
/// ahead within the front safety gap (same lane), or straddling the ego's
/// along-track position within the front/rear gaps (adjacent lane), scores
/// 1.0. The gaps tighten from `wide_gap_m` to `tight_gap_m` when the speed
/// difference to the scanned vehicle exceeds `speed_margin_mph`.
pub fn collision_cost(ctx: &CostCtx, lane: usize) -> f64 {
    let same_lane = lane == ctx.ego_lane;
    let adjacent = (lane as isize - ctx.ego_lane as isize).abs() == 1;

    if !same_lane && !adjacent {
        return 1.0;
    }

    for vehicle in ctx.vehicles {
        if lane_for_offset(vehicle.d_m, ctx.params.lane_width_m) != Some(lane) {
            continue;
        }

        let speed_mph = vehicle.speed_mph();
        let s_m = vehicle.projected_s_m(ctx.elapsed_s);

        let front_gap_m = if ctx.ego_speed_mph > speed_mph + ctx.params.speed_margin_mph {
            ctx.params.tight_gap_m
        } else {
            ctx.params.wide_gap_m
        };

        if same_lane {
            if s_m > ctx.ego_s_m && s_m - ctx.ego_s_m < front_gap_m {
                return 1.0;
            }
        } else {
            let rear_gap_m = if ctx.ego_speed_mph < speed_mph - ctx.params.speed_margin_mph {
                ctx.params.tight_gap_m
            } else {
                ctx.params.wide_gap_m
            };

            if ctx.ego_s_m < s_m + front_gap_m && ctx.ego_s_m > s_m - rear_gap_m {
                return 1.0;
            }
        }
    }

    0.0
}

/// Preference for lanes whose traffic ahead moves quickly.
///
/// Scored against the speed limit: an open lane costs 1.0, a fully blocked
/// lane approaches 2.0.
pub fn inefficiency_cost(ctx: &CostCtx, lane: usize) -> f64 {
    let limit_mph = ctx.params.speed_limit_mph;

    (2.0 * limit_mph - lane_speed_mph(ctx, lane)) / limit_mph
}

/// Like [`inefficiency_cost`], but measured against the ego's own current
/// speed rather than the limit.
pub fn diff_speed_cost(ctx: &CostCtx, lane: usize) -> f64 {
    (2.0 * ctx.ego_speed_mph - lane_speed_mph(ctx, lane)) / ctx.params.speed_limit_mph
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// The speed of the slowest vehicle ahead of the ego in the given lane within
/// the look-ahead window, capped at the speed limit. The speed limit itself
/// when the lane is open.
fn lane_speed_mph(ctx: &CostCtx, lane: usize) -> f64 {
    let limit_mph = ctx.params.speed_limit_mph;

    ctx.vehicles
        .iter()
        .filter(|v| lane_for_offset(v.d_m, ctx.params.lane_width_m) == Some(lane))
        .filter_map(|v| {
            let s_m = v.projected_s_m(ctx.elapsed_s);
            let ahead = s_m > ctx.ego_s_m && s_m < ctx.ego_s_m + ctx.params.look_ahead_m;

            if ahead {
                NotNan::new(v.speed_mph()).ok()
            } else {
                None
            }
        })
        .min()
        .map_or(limit_mph, |slowest| slowest.into_inner().min(limit_mph))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Vector2;

    /// A vehicle travelling straight down a lane at the given speed.
    fn vehicle(id: u32, s_m: f64, d_m: f64, speed_mph: f64) -> SensedVehicle {
        SensedVehicle {
            id,
            position_m: Vector2::new(s_m, -d_m),
            velocity_mph: Vector2::new(speed_mph, 0.0),
            s_m,
            d_m,
        }
    }

    fn ctx<'a>(vehicles: &'a [SensedVehicle], params: &'a Params) -> CostCtx<'a> {
        CostCtx {
            ego_s_m: 100.0,
            ego_lane: 1,
            ego_speed_mph: 20.0,
            elapsed_s: 0.0,
            vehicles,
            params,
        }
    }

    #[test]
    fn test_collision_ahead_in_lane() {
        let params = Params::default();

        // Slow vehicle 15 m ahead in the ego lane, within the tightened 20 m
        // front gap
        let vehicles = [vehicle(0, 115.0, 6.0, 10.0)];
        assert_eq!(collision_cost(&ctx(&vehicles, &params), 1), 1.0);

        // Same vehicle far ahead is no risk
        let vehicles = [vehicle(0, 160.0, 6.0, 10.0)];
        assert_eq!(collision_cost(&ctx(&vehicles, &params), 1), 0.0);
    }

    #[test]
    fn test_collision_front_gap_widens_at_matched_speed() {
        let params = Params::default();

        // At matched speed the 40 m gap applies, so 25 m ahead is a risk...
        let vehicles = [vehicle(0, 125.0, 6.0, 20.0)];
        assert_eq!(collision_cost(&ctx(&vehicles, &params), 1), 1.0);

        // ...but when the ego is more than the margin faster, the gap
        // tightens to 20 m and the same separation is clear
        let vehicles = [vehicle(0, 125.0, 6.0, 10.0)];
        assert_eq!(collision_cost(&ctx(&vehicles, &params), 1), 0.0);
    }

    #[test]
    fn test_collision_adjacent_lane_straddle() {
        let params = Params::default();

        // Vehicle slightly behind in the adjacent lane, inside the straddle
        // interval
        let vehicles = [vehicle(0, 95.0, 10.0, 19.0)];
        assert_eq!(collision_cost(&ctx(&vehicles, &params), 2), 1.0);

        // Well clear behind
        let vehicles = [vehicle(0, 30.0, 10.0, 19.0)];
        assert_eq!(collision_cost(&ctx(&vehicles, &params), 2), 0.0);
    }

    #[test]
    fn test_collision_non_successor_lane_penalised() {
        let params = Params::default();
        let mut c = ctx(&[], &params);
        c.ego_lane = 0;

        assert_eq!(collision_cost(&c, 2), 1.0);
    }

    #[test]
    fn test_collision_ignores_off_road_records() {
        let params = Params::default();

        let vehicles = [vehicle(0, 110.0, -3.0, 10.0)];
        assert_eq!(collision_cost(&ctx(&vehicles, &params), 1), 0.0);
    }

    #[test]
    fn test_inefficiency_cost() {
        let params = Params::default();
        let limit = params.speed_limit_mph;

        // Open lane scores exactly 1.0
        let open = inefficiency_cost(&ctx(&[], &params), 1);
        assert!((open - 1.0).abs() < 1e-12);

        // A slow leader raises the cost
        let vehicles = [vehicle(0, 120.0, 6.0, 20.0)];
        let blocked = inefficiency_cost(&ctx(&vehicles, &params), 1);
        assert!((blocked - (2.0 * limit - 20.0) / limit).abs() < 1e-12);
        assert!(blocked > open);
    }

    #[test]
    fn test_diff_speed_cost() {
        let params = Params::default();
        let limit = params.speed_limit_mph;

        let vehicles = [vehicle(0, 120.0, 6.0, 15.0)];
        let cost = diff_speed_cost(&ctx(&vehicles, &params), 1);

        assert!((cost - (2.0 * 20.0 - 15.0) / limit).abs() < 1e-12);
    }

    #[test]
    fn test_lane_speed_scans_only_the_window_ahead() {
        let params = Params::default();

        // Behind, and ahead beyond the window: both ignored
        let vehicles = [vehicle(0, 90.0, 6.0, 5.0), vehicle(1, 150.0, 6.0, 5.0)];
        let cost = inefficiency_cost(&ctx(&vehicles, &params), 1);
        assert!((cost - 1.0).abs() < 1e-12);

        // The slowest qualifying vehicle wins, not the nearest
        let vehicles = [vehicle(0, 110.0, 6.0, 30.0), vehicle(1, 130.0, 6.0, 12.0)];
        let cost = inefficiency_cost(&ctx(&vehicles, &params), 1);
        let limit = params.speed_limit_mph;
        assert!((cost - (2.0 * limit - 12.0) / limit).abs() < 1e-12);
    }

    #[test]
    fn test_default_weights_are_collision_only() {
        let params = Params::default();

        let vehicles = [vehicle(0, 120.0, 6.0, 10.0)];
        let c = ctx(&vehicles, &params);

        // Lane 1 has a slow leader (inefficiency > 1) but no collision risk
        // at 20 m separation with the tightened gap, so the total is zero
        assert_eq!(collision_cost(&c, 1), 0.0);
        assert!(inefficiency_cost(&c, 1) > 1.0);
        assert_eq!(total_cost(&c, 1), 0.0);
    }

    #[test]
    fn test_lane_costs_sentinels_non_successors() {
        let params = Params::default();
        let mut c = ctx(&[], &params);
        c.ego_lane = 0;

        let costs = lane_costs(&c);

        assert_eq!(costs[2], LANE_COST_SENTINEL);
        assert!(costs[0] < LANE_COST_SENTINEL);
        assert!(costs[1] < LANE_COST_SENTINEL);
    }
}
