//! Lane classification and lane selection primitives.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::NUM_LANES;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Classify a lateral offset into a lane index.
///
/// Lane `i` covers offsets `[i * width, (i + 1) * width)`. Offsets outside
/// the carriageway return `None`, the record is then excluded from planning
/// for the tick.
pub fn lane_for_offset(d_m: f64, lane_width_m: f64) -> Option<usize> {
    if d_m < 0.0 {
        return None;
    }

    let lane = (d_m / lane_width_m).floor() as usize;

    if lane < NUM_LANES {
        Some(lane)
    } else {
        None
    }
}

/// The lateral offset of a lane's centreline.
pub fn lane_centre_m(lane: usize, lane_width_m: f64) -> f64 {
    lane_width_m / 2.0 + lane as f64 * lane_width_m
}

/// The set of lanes reachable from the given lane in one decision step: the
/// lane itself and its immediate neighbours.
pub fn successor_lanes(lane: usize, num_lanes: usize) -> Vec<usize> {
    let mut lanes = Vec::with_capacity(3);

    if lane > 0 {
        lanes.push(lane - 1);
    }
    lanes.push(lane);
    if lane < num_lanes - 1 {
        lanes.push(lane + 1);
    }

    lanes
}

/// Select the cheapest lane from a dense cost table.
///
/// The incumbent lane's cost is the baseline to beat: another lane is only
/// selected if its cost is strictly lower, and ties between improving lanes
/// go to the lowest index.
pub fn select_lane(costs: &[f64; NUM_LANES], current_lane: usize) -> usize {
    let mut new_lane = current_lane;
    let mut min_cost = costs[current_lane];

    for (lane, &cost) in costs.iter().enumerate() {
        if cost < min_cost {
            min_cost = cost;
            new_lane = lane;
        }
    }

    new_lane
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const LANE_WIDTH_M: f64 = 4.0;

    #[test]
    fn test_lane_for_offset() {
        // One sample inside each lane plus both edges of each boundary
        assert_eq!(lane_for_offset(0.0, LANE_WIDTH_M), Some(0));
        assert_eq!(lane_for_offset(2.0, LANE_WIDTH_M), Some(0));
        assert_eq!(lane_for_offset(3.999, LANE_WIDTH_M), Some(0));
        assert_eq!(lane_for_offset(4.0, LANE_WIDTH_M), Some(1));
        assert_eq!(lane_for_offset(6.0, LANE_WIDTH_M), Some(1));
        assert_eq!(lane_for_offset(8.0, LANE_WIDTH_M), Some(2));
        assert_eq!(lane_for_offset(11.999, LANE_WIDTH_M), Some(2));

        // Off the carriageway on either side
        assert_eq!(lane_for_offset(12.0, LANE_WIDTH_M), None);
        assert_eq!(lane_for_offset(20.0, LANE_WIDTH_M), None);
        assert_eq!(lane_for_offset(-0.5, LANE_WIDTH_M), None);
    }

    #[test]
    fn test_lane_centre() {
        assert_eq!(lane_centre_m(0, LANE_WIDTH_M), 2.0);
        assert_eq!(lane_centre_m(1, LANE_WIDTH_M), 6.0);
        assert_eq!(lane_centre_m(2, LANE_WIDTH_M), 10.0);
    }

    #[test]
    fn test_successor_lanes() {
        assert_eq!(successor_lanes(0, NUM_LANES), vec![0, 1]);
        assert_eq!(successor_lanes(1, NUM_LANES), vec![0, 1, 2]);
        assert_eq!(successor_lanes(2, NUM_LANES), vec![1, 2]);
    }

    #[test]
    fn test_select_lane_prefers_incumbent_on_tie() {
        assert_eq!(select_lane(&[0.5, 0.5, 0.5], 1), 1);
    }

    #[test]
    fn test_select_lane_takes_strict_improvement() {
        assert_eq!(select_lane(&[0.2, 0.5, 0.1], 1), 2);
    }

    #[test]
    fn test_select_lane_breaks_ties_to_lowest_index() {
        assert_eq!(select_lane(&[0.1, 0.5, 0.1], 1), 0);
    }
}
